//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration file problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// Google credential or calendar failure.
    #[error(transparent)]
    Google(#[from] calsync_google::GoogleError),

    /// Host editor failure.
    #[error(transparent)]
    Host(#[from] calsync_host::HostError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ClientError::Config("missing host token".to_string());
        assert_eq!(err.to_string(), "configuration error: missing host token");
    }

    #[test]
    fn google_error_passes_through() {
        let err: ClientError =
            calsync_google::GoogleError::Auth("token refresh failed".to_string()).into();
        assert!(err.to_string().contains("token refresh failed"));
    }
}

//! Error types for Google Calendar access.

use thiserror::Error;

/// A specialized Result type for Google Calendar operations.
pub type GoogleResult<T> = Result<T, GoogleError>;

/// Errors from credential handling, the OAuth flow, or the calendar fetch.
///
/// All variants are fatal for the sync in progress; recovery is re-invoking
/// the command. [`ConfigMissing`] additionally means nothing will work until
/// the credentials file is fixed.
///
/// [`ConfigMissing`]: GoogleError::ConfigMissing
#[derive(Debug, Error)]
pub enum GoogleError {
    /// The client credentials file is absent or malformed.
    #[error("credentials unavailable: {0}")]
    ConfigMissing(String),

    /// Token exchange, refresh, or authorization failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The network request itself failed (connect, timeout, DNS).
    #[error("network error: {0}")]
    Network(String),

    /// The API rejected the request with 429.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// The API returned a server-side error.
    #[error("calendar API error: {0}")]
    Server(String),

    /// The API response could not be parsed.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Reading or writing local state (token file) failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GoogleError {
    /// True when the error concerns authentication rather than fetching.
    ///
    /// Used by callers to decide whether a re-authorization prompt is the
    /// right suggestion.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::ConfigMissing(_))
    }
}

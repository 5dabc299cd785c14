//! OAuth client credentials and provider configuration.
//!
//! Credentials come from the JSON file downloaded from the Google Cloud
//! Console (`credentials.json`). Both the nested `installed`/`web` layout
//! and a flat `client_id`/`client_secret` layout are accepted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GoogleError, GoogleResult};

/// Redirect URI used when the credentials file does not carry one.
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// OAuth 2.0 client credentials for Google API access.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// The redirect URI registered for this client (first entry of
    /// `redirect_uris` in the credentials file).
    pub redirect_uri: String,
}

/// On-disk structure of the credentials JSON file.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uris: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl GoogleCredentials {
    /// Creates credentials directly.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Loads credentials from a Google Cloud Console JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::ConfigMissing`] if the file cannot be read or
    /// does not parse into a known layout.
    pub fn from_file(path: impl AsRef<Path>) -> GoogleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GoogleError::ConfigMissing(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from a JSON string.
    pub fn from_json(json: &str) -> GoogleResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            GoogleError::ConfigMissing(format!("failed to parse credentials JSON: {}", e))
        })?;

        if let Some(creds) = file.installed.or(file.web) {
            let redirect_uri = creds
                .redirect_uris
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
            return Ok(Self::new(creds.client_id, creds.client_secret, redirect_uri));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            let redirect_uri = file
                .redirect_uris
                .and_then(|uris| uris.into_iter().next())
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
            return Ok(Self::new(client_id, client_secret, redirect_uri));
        }

        Err(GoogleError::ConfigMissing(
            "credentials file must contain an 'installed'/'web' section \
             or 'client_id'/'client_secret' at the root"
                .to_string(),
        ))
    }

    /// Checks that the credentials look usable.
    pub fn validate(&self) -> GoogleResult<()> {
        if self.client_id.is_empty() {
            return Err(GoogleError::ConfigMissing("client_id is empty".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(GoogleError::ConfigMissing(
                "client_secret is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for Google Calendar access.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials.
    pub credentials: GoogleCredentials,

    /// Path of the persisted token file.
    pub token_path: PathBuf,

    /// Calendar to fetch from. Always the authenticated user's default
    /// calendar unless overridden.
    pub calendar_id: String,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Request timeout for API calls.
    pub timeout: Duration,

    /// Port range for the loopback authorization listener.
    pub loopback_port_range: (u16, u16),
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Read-only calendar scope.
    pub const SCOPE_CALENDAR_READONLY: &'static str =
        "https://www.googleapis.com/auth/calendar.readonly";

    /// Scope to read the acting user's email address.
    pub const SCOPE_USERINFO_EMAIL: &'static str =
        "https://www.googleapis.com/auth/userinfo.email";

    /// Creates a configuration with the given credentials and defaults for
    /// everything else.
    pub fn new(credentials: GoogleCredentials) -> Self {
        Self {
            credentials,
            token_path: Self::default_token_path(),
            calendar_id: "primary".to_string(),
            scopes: vec![
                Self::SCOPE_CALENDAR_READONLY.to_string(),
                Self::SCOPE_USERINFO_EMAIL.to_string(),
            ],
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            loopback_port_range: (8080, 8090),
        }
    }

    /// Returns the default token storage path.
    pub fn default_token_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".local").join("share"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calsync")
            .join("google-tokens.json")
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the calendar to fetch from.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the loopback port range for the authorization listener.
    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GoogleResult<()> {
        self.credentials.validate()?;
        if self.scopes.is_empty() {
            return Err(GoogleError::ConfigMissing(
                "at least one OAuth scope is required".to_string(),
            ));
        }
        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err(GoogleError::ConfigMissing(
                "invalid loopback port range".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> GoogleCredentials {
        GoogleCredentials::new(
            "test-client.apps.googleusercontent.com",
            "test-secret",
            "http://localhost",
        )
    }

    #[test]
    fn from_json_installed_section() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
            }
        }"#;

        let creds = GoogleCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
        assert_eq!(creds.redirect_uri, "urn:ietf:wg:oauth:2.0:oob");
    }

    #[test]
    fn from_json_web_section() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;

        let creds = GoogleCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
        assert_eq!(creds.redirect_uri, "http://localhost");
    }

    #[test]
    fn from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret"
        }"#;

        let creds = GoogleCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "flat-id.apps.googleusercontent.com");
    }

    #[test]
    fn from_json_unknown_layout() {
        let err = GoogleCredentials::from_json(r#"{ "other": {} }"#).unwrap_err();
        assert!(matches!(err, GoogleError::ConfigMissing(_)));
    }

    #[test]
    fn from_json_malformed() {
        let err = GoogleCredentials::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn from_file_missing() {
        let err = GoogleCredentials::from_file("/nonexistent/credentials.json").unwrap_err();
        assert!(matches!(err, GoogleError::ConfigMissing(_)));
    }

    #[test]
    fn credentials_validation() {
        assert!(test_credentials().validate().is_ok());
        assert!(
            GoogleCredentials::new("", "secret", "http://localhost")
                .validate()
                .is_err()
        );
        assert!(
            GoogleCredentials::new("id", "", "http://localhost")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new(test_credentials());
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.scopes.len(), 2);
        assert!(
            config
                .scopes
                .contains(&GoogleConfig::SCOPE_CALENDAR_READONLY.to_string())
        );
        assert!(
            config
                .scopes
                .contains(&GoogleConfig::SCOPE_USERINFO_EMAIL.to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_validation_rejects_empty_scopes() {
        let mut config = GoogleConfig::new(test_credentials());
        config.scopes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_builders() {
        let config = GoogleConfig::new(test_credentials())
            .with_token_path("/tmp/tokens.json")
            .with_calendar_id("work@example.com")
            .with_timeout(Duration::from_secs(5))
            .with_loopback_port_range(9000, 9010);

        assert_eq!(config.token_path, PathBuf::from("/tmp/tokens.json"));
        assert_eq!(config.calendar_id, "work@example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.loopback_port_range, (9000, 9010));
    }
}

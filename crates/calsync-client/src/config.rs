//! Client configuration.
//!
//! All settings live in a single `config.toml` at
//! `~/.config/calsync/config.toml` by default:
//!
//! ```toml
//! [google]
//! credentials_file = "/home/me/.config/calsync/credentials.json"
//!
//! [host]
//! endpoint = "http://127.0.0.1:12315"
//! token = "my-logseq-api-token"
//!
//! [templates]
//! external = "External Meeting Template"
//! internal = "Internal Meeting Template"
//! one_on_one = "One-on-One Meeting Template"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calsync_core::TemplateBindings;
use calsync_google::{GoogleConfig, GoogleCredentials};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the calsync client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google Calendar settings.
    pub google: GoogleSettings,

    /// Host editor settings.
    pub host: HostSettings,

    /// Template name per meeting category.
    pub templates: TemplateBindings,
}

/// Google Calendar settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Path to the OAuth client credentials JSON. Defaults to
    /// `credentials.json` next to the config file.
    pub credentials_file: Option<PathBuf>,

    /// Path to the persisted token file. Defaults to
    /// `~/.local/share/calsync/google-tokens.json`.
    pub token_file: Option<PathBuf>,

    /// Calendar to fetch from. Defaults to the primary calendar.
    pub calendar_id: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Host editor (Logseq HTTP API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Endpoint of the host's local HTTP API server.
    pub endpoint: String,

    /// API token for the host's HTTP server.
    pub token: String,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            endpoint: calsync_host::logseq::DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
        }
    }
}

impl ClientConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calsync")
            .join("config.toml")
    }

    /// Loads the configuration from the default path.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Serializes the effective configuration as TOML.
    pub fn dump(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Resolves the credentials file path.
    pub fn credentials_path(&self) -> PathBuf {
        self.google.credentials_file.clone().unwrap_or_else(|| {
            Self::default_path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("credentials.json")
        })
    }

    /// Builds the Google configuration, loading the credentials file.
    ///
    /// # Errors
    ///
    /// Fails with the credential provider's `ConfigMissing` when the
    /// credentials file is absent or malformed.
    pub fn google_config(&self) -> ClientResult<GoogleConfig> {
        let credentials = GoogleCredentials::from_file(self.credentials_path())?;

        let mut config = GoogleConfig::new(credentials);
        if let Some(ref path) = self.google.token_file {
            config = config.with_token_path(path);
        }
        if let Some(ref id) = self.google.calendar_id {
            config = config.with_calendar_id(id);
        }
        if let Some(secs) = self.google.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

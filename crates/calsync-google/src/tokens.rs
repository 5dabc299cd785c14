//! OAuth token persistence.
//!
//! Tokens live in a single JSON file created and overwritten by the
//! credential provider. Writes go through a temp file + rename so a crash
//! never leaves a truncated token file behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GoogleError, GoogleResult};

/// An access/refresh token pair with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Creates a token set from token-endpoint response data.
    ///
    /// The stored expiry is 60 seconds earlier than the reported lifetime so
    /// a refresh happens before the token actually lapses.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        let expires_at = expires_in_secs
            .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(60));

        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            // No expiry recorded: assume still valid.
            None => false,
        }
    }

    /// Replaces the access token after a refresh.
    pub fn update_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs
            .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(60));
    }
}

/// File-backed token storage.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: RwLock<Option<TokenSet>>,
}

impl TokenStore {
    /// Creates a store at the given path; nothing is read until [`load`].
    ///
    /// [`load`]: TokenStore::load
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    /// Loads tokens from disk into memory.
    ///
    /// Returns `Ok(true)` if tokens were loaded, `Ok(false)` if the file does
    /// not exist. An unreadable or unparsable file is an error; the caller
    /// treats it like an absent token and re-authorizes.
    pub fn load(&self) -> GoogleResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path)?;
        let tokens: TokenSet = serde_json::from_str(&content).map_err(|e| {
            GoogleError::Auth(format!("failed to parse token file: {}", e))
        })?;

        debug!("loaded tokens from {:?}", self.path);
        *self.tokens.write().unwrap() = Some(tokens);
        Ok(true)
    }

    /// Saves the in-memory tokens to disk.
    pub fn save(&self) -> GoogleResult<()> {
        let tokens = self.tokens.read().unwrap();
        let tokens = tokens
            .as_ref()
            .ok_or_else(|| GoogleError::Auth("no tokens to save".to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens).map_err(|e| {
            GoogleError::InvalidResponse(format!("failed to serialize tokens: {}", e))
        })?;

        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved tokens to {:?}", self.path);
        Ok(())
    }

    /// Returns a clone of the current tokens, if any.
    pub fn get(&self) -> Option<TokenSet> {
        self.tokens.read().unwrap().clone()
    }

    /// Sets new tokens and persists them.
    pub fn set(&self, tokens: TokenSet) -> GoogleResult<()> {
        *self.tokens.write().unwrap() = Some(tokens);
        self.save()
    }

    /// Updates the access token and persists the result.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) -> GoogleResult<()> {
        let mut tokens = self.tokens.write().unwrap();
        if let Some(ref mut t) = *tokens {
            t.update_access_token(access_token, expires_in_secs);
            drop(tokens);
            self.save()
        } else {
            Err(GoogleError::Auth("no tokens to update".to_string()))
        }
    }

    /// Removes stored tokens from memory and disk.
    pub fn clear(&self) -> GoogleResult<()> {
        *self.tokens.write().unwrap() = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("cleared tokens from {:?}", self.path);
        }
        Ok(())
    }

    /// Returns the token storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

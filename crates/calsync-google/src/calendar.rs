//! The authenticated Google Calendar context.
//!
//! [`GoogleCalendar`] ties the credential provider and the fetcher together:
//! it loads persisted tokens, refreshes them silently when expired, falls
//! back to the interactive authorization flow when nothing usable exists,
//! and exposes the two calendar operations a sync needs.

use std::sync::RwLock;

use calsync_core::{day_bounds, EventRecord};
use chrono::{Local, Utc};
use tracing::{debug, info};

use crate::client::CalendarClient;
use crate::credentials::GoogleConfig;
use crate::error::{GoogleError, GoogleResult};
use crate::fetch;
use crate::oauth::{CodeAcquirer, OAuthFlow};
use crate::tokens::TokenStore;

/// Google Calendar access for one account.
pub struct GoogleCalendar {
    config: GoogleConfig,
    store: TokenStore,
    oauth: OAuthFlow,
    client: RwLock<Option<CalendarClient>>,
}

impl GoogleCalendar {
    /// Creates the context and loads any persisted tokens.
    ///
    /// Does not touch the network; call [`connect`] to make the context
    /// usable.
    ///
    /// [`connect`]: GoogleCalendar::connect
    pub fn new(config: GoogleConfig) -> GoogleResult<Self> {
        config.validate()?;

        let store = TokenStore::new(&config.token_path);
        // An unreadable token file is treated like an absent one: the
        // interactive flow will replace it.
        if let Err(e) = store.load() {
            debug!("ignoring unreadable token file: {}", e);
        }

        let oauth = OAuthFlow::new(config.credentials.clone(), config.timeout);

        Ok(Self {
            config,
            store,
            oauth,
            client: RwLock::new(None),
        })
    }

    /// Returns true if a persisted token pair exists.
    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_some()
    }

    /// Ensures the context is authenticated and ready for API calls.
    ///
    /// Persisted, unexpired tokens are used directly; expired tokens are
    /// refreshed silently. With no usable tokens the interactive
    /// authorization flow runs through `acquirer`, and the resulting pair is
    /// persisted.
    pub async fn connect(&self, acquirer: &dyn CodeAcquirer) -> GoogleResult<()> {
        match self.store.get() {
            Some(tokens) if !tokens.is_expired() => {
                debug!("using persisted access token");
                self.install_client(&tokens.access_token);
            }
            Some(tokens) => match tokens.refresh_token {
                Some(ref refresh_token) => {
                    debug!("refreshing expired access token");
                    match self.oauth.refresh_token(refresh_token).await {
                        Ok((access_token, expires_in)) => {
                            self.store.update_access_token(&access_token, expires_in)?;
                            self.install_client(&access_token);
                        }
                        Err(e) if e.is_auth() => {
                            // A rejected refresh token will not recover;
                            // drop it so the next attempt re-prompts.
                            let _ = self.store.clear();
                            return Err(e);
                        }
                        Err(e) => return Err(e),
                    }
                }
                None => {
                    info!("expired token without refresh token, re-authorizing");
                    self.authenticate(acquirer).await?;
                }
            },
            None => {
                info!("no persisted tokens, starting authorization");
                self.authenticate(acquirer).await?;
            }
        }
        Ok(())
    }

    /// Runs the interactive authorization flow unconditionally and persists
    /// the resulting token pair.
    pub async fn authenticate(&self, acquirer: &dyn CodeAcquirer) -> GoogleResult<()> {
        let tokens = self.oauth.authorize(&self.config.scopes, acquirer).await?;
        self.store.set(tokens.clone())?;
        self.install_client(&tokens.access_token);
        info!("authorization complete, tokens persisted");
        Ok(())
    }

    fn install_client(&self, access_token: &str) {
        *self.client.write().unwrap() =
            Some(CalendarClient::new(access_token, self.config.timeout));
    }

    fn api_client(&self) -> GoogleResult<CalendarClient> {
        self.client
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| GoogleError::Auth("not connected - call connect() first".to_string()))
    }

    /// Resolves the acting user's email address.
    pub async fn user_email(&self) -> GoogleResult<String> {
        self.api_client()?.user_email().await
    }

    /// Fetches today's events as flattened [`EventRecord`]s.
    ///
    /// "Today" is the local calendar day; cancelled events, all-day events,
    /// and events the user declined are excluded. Records come back in
    /// chronological order.
    pub async fn fetch_todays_events(&self, user_email: &str) -> GoogleResult<Vec<EventRecord>> {
        let (start, end) = day_bounds(&Local::now());
        debug!(
            "fetching events in [{}, {}]",
            start.to_rfc3339(),
            end.to_rfc3339()
        );

        let items = self
            .api_client()?
            .list_events(
                &self.config.calendar_id,
                start.with_timezone(&Utc),
                end.with_timezone(&Utc),
            )
            .await?;

        Ok(fetch::to_records(items, user_email))
    }
}

//! Google Calendar access for calsync.
//!
//! This crate covers the two calendar-facing components of a sync:
//!
//! - **Credential Provider**: loads the OAuth client credentials, obtains or
//!   refreshes a token pair (persisted to disk), and runs the interactive
//!   authorization-code exchange when no usable token exists. The way the
//!   authorization code reaches us is pluggable via [`CodeAcquirer`]:
//!   a console prompt or a localhost callback listener.
//! - **Calendar Fetcher**: resolves the acting user's email and lists today's
//!   non-cancelled, non-declined, timed events from the primary calendar,
//!   flattening each into an [`EventRecord`].
//!
//! [`EventRecord`]: calsync_core::EventRecord

pub mod calendar;
pub mod client;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod oauth;
pub mod tokens;

pub use calendar::GoogleCalendar;
pub use client::CalendarClient;
pub use credentials::{GoogleConfig, GoogleCredentials};
pub use error::{GoogleError, GoogleResult};
pub use oauth::{CodeAcquirer, ConsolePrompt, LoopbackListener, OAuthFlow};
pub use tokens::{TokenSet, TokenStore};

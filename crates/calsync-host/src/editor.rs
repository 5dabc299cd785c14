//! The host editor capability trait.

use std::future::Future;
use std::pin::Pin;

use calsync_core::TemplateBlock;
use thiserror::Error;

/// Boxed future type for trait-object async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A specialized Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors from talking to the host editor.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host could not be reached.
    #[error("host connection failed: {0}")]
    Connection(String),

    /// The host rejected or failed the API call.
    #[error("host API error: {0}")]
    Api(String),

    /// The host's response could not be interpreted.
    #[error("invalid host response: {0}")]
    InvalidResponse(String),
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// The severity keyword host UIs understand.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A page open in the host editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Host-side page identifier, used as the insertion target.
    pub id: String,
    /// Human-readable page name.
    pub name: String,
}

/// Capability interface onto the note-taking host.
///
/// Implemented by one adapter per host; all sync logic goes through this
/// trait so it can run against a mock in tests.
pub trait HostEditor: Send + Sync {
    /// Returns the currently open page, or `None` when no page is focused.
    fn current_page(&self) -> BoxFuture<'_, HostResult<Option<Page>>>;

    /// Lists the template blocks registered in the host.
    fn template_blocks(&self) -> BoxFuture<'_, HostResult<Vec<TemplateBlock>>>;

    /// Appends `content` as a new child block at the end of the page.
    fn insert_block<'a>(
        &'a self,
        page_id: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, HostResult<()>>;

    /// Shows a message to the user in the host UI.
    fn show_message<'a>(
        &'a self,
        text: &'a str,
        severity: Severity,
    ) -> BoxFuture<'a, HostResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_keywords() {
        assert_eq!(Severity::Info.as_str(), "info");
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::Error.as_str(), "error");
    }
}

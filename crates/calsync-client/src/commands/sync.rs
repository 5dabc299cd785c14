//! The sync driver.
//!
//! One invocation runs one sync: authenticate, resolve the user's email,
//! fetch today's events, then classify, render, and insert each one under
//! the currently open page, in chronological order.
//!
//! Failure handling follows a single rule: a missing template skips that
//! event with a warning notice and the sync continues; anything else aborts
//! the sync, is logged, and surfaces as one user-facing error notice. There
//! is no retry and no rollback of blocks already inserted. With no page
//! open the sync is a silent no-op.
//!
//! Nothing guards against two invocations running concurrently; their
//! insertions would interleave. Running this from a foreground command makes
//! that a non-issue in practice, and the behavior is left undefined.

use calsync_core::{classify, render, resolve, EventRecord, TemplateBindings, TemplateError};
use calsync_google::{GoogleCalendar, LoopbackListener};
use calsync_host::{HostEditor, LogseqHost, Severity};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// What a completed sync did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Number of blocks inserted.
    pub inserted: usize,
    /// Template names that could not be resolved, one entry per skipped
    /// event.
    pub skipped: Vec<String>,
}

/// Runs one full sync against the configured host.
///
/// Fatal errors are reported once through the host UI (best effort) and
/// returned for the process exit code.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let host = LogseqHost::new(&config.host.endpoint, &config.host.token);
    let result = sync_once(config, &host).await;
    conclude(&host, result).await
}

/// Logs the sync result and, on failure, shows exactly one error notice.
async fn conclude(
    host: &dyn HostEditor,
    result: ClientResult<Option<SyncOutcome>>,
) -> ClientResult<()> {
    match result {
        Ok(None) => {
            debug!("no page currently open, nothing to do");
            Ok(())
        }
        Ok(Some(outcome)) => {
            info!(
                "sync complete: {} inserted, {} skipped",
                outcome.inserted,
                outcome.skipped.len()
            );
            Ok(())
        }
        Err(e) => {
            error!("failed to sync calendar: {}", e);
            let _ = host
                .show_message("Failed to sync calendar. Check the log for details.", Severity::Error)
                .await;
            Err(e)
        }
    }
}

/// One sync: authenticate, fetch, insert.
async fn sync_once(config: &ClientConfig, host: &dyn HostEditor) -> ClientResult<Option<SyncOutcome>> {
    let google_config = config.google_config()?;
    let acquirer = LoopbackListener::new(google_config.loopback_port_range);

    let calendar = GoogleCalendar::new(google_config)?;
    calendar.connect(&acquirer).await?;

    let user_email = calendar.user_email().await?;
    debug!("acting user: {}", user_email);

    let events = calendar.fetch_todays_events(&user_email).await?;
    info!("fetched {} events for today", events.len());

    insert_events(host, &events, &user_email, &config.templates).await
}

/// Classifies, renders, and inserts the given events under the currently
/// open page.
///
/// Returns `None` when no page is open (silent no-op). Events whose
/// configured template is missing are skipped with a warning notice; the
/// remaining events are still inserted.
pub async fn insert_events(
    host: &dyn HostEditor,
    events: &[EventRecord],
    user_email: &str,
    bindings: &TemplateBindings,
) -> ClientResult<Option<SyncOutcome>> {
    let Some(page) = host.current_page().await? else {
        return Ok(None);
    };
    debug!("inserting under page '{}'", page.name);

    let templates = host.template_blocks().await?;
    let mut outcome = SyncOutcome::default();

    for event in events {
        let category = classify(event, user_email);
        let template_name = bindings.name_for(category);

        let template = match resolve(&templates, template_name) {
            Ok(template) => template,
            Err(TemplateError::NotFound(name)) => {
                warn!("template '{}' not found, skipping '{}'", name, event.summary);
                host.show_message(&format!("Template '{}' not found.", name), Severity::Warning)
                    .await?;
                outcome.skipped.push(name);
                continue;
            }
        };

        let content = render(&template.content, event);
        host.insert_block(&page.id, &content).await?;
        outcome.inserted += 1;
    }

    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::TemplateBlock;
    use calsync_host::{BoxFuture, HostError, HostResult, Page};
    use std::sync::Mutex;

    /// In-memory host recording insertions and messages.
    struct MockHost {
        page: Option<Page>,
        templates: Vec<TemplateBlock>,
        inserted: Mutex<Vec<(String, String)>>,
        messages: Mutex<Vec<(String, &'static str)>>,
    }

    impl MockHost {
        fn new(page: Option<Page>, templates: Vec<TemplateBlock>) -> Self {
            Self {
                page,
                templates,
                inserted: Mutex::new(Vec::new()),
                messages: Mutex::new(Vec::new()),
            }
        }

        fn with_page(templates: Vec<TemplateBlock>) -> Self {
            Self::new(
                Some(Page {
                    id: "page-uuid".to_string(),
                    name: "Jun 12th, 2025".to_string(),
                }),
                templates,
            )
        }

        fn inserted(&self) -> Vec<(String, String)> {
            self.inserted.lock().unwrap().clone()
        }

        fn messages(&self) -> Vec<(String, &'static str)> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl HostEditor for MockHost {
        fn current_page(&self) -> BoxFuture<'_, HostResult<Option<Page>>> {
            let page = self.page.clone();
            Box::pin(async move { Ok(page) })
        }

        fn template_blocks(&self) -> BoxFuture<'_, HostResult<Vec<TemplateBlock>>> {
            let templates = self.templates.clone();
            Box::pin(async move { Ok(templates) })
        }

        fn insert_block<'a>(
            &'a self,
            page_id: &'a str,
            content: &'a str,
        ) -> BoxFuture<'a, HostResult<()>> {
            Box::pin(async move {
                self.inserted
                    .lock()
                    .unwrap()
                    .push((page_id.to_string(), content.to_string()));
                Ok(())
            })
        }

        fn show_message<'a>(
            &'a self,
            text: &'a str,
            severity: Severity,
        ) -> BoxFuture<'a, HostResult<()>> {
            Box::pin(async move {
                self.messages
                    .lock()
                    .unwrap()
                    .push((text.to_string(), severity.as_str()));
                Ok(())
            })
        }
    }

    /// Host whose page lookup fails, to exercise error propagation.
    struct BrokenHost;

    impl HostEditor for BrokenHost {
        fn current_page(&self) -> BoxFuture<'_, HostResult<Option<Page>>> {
            Box::pin(async { Err(HostError::Connection("refused".to_string())) })
        }
        fn template_blocks(&self) -> BoxFuture<'_, HostResult<Vec<TemplateBlock>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
        fn insert_block<'a>(&'a self, _: &'a str, _: &'a str) -> BoxFuture<'a, HostResult<()>> {
            Box::pin(async { Ok(()) })
        }
        fn show_message<'a>(&'a self, _: &'a str, _: Severity) -> BoxFuture<'a, HostResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn all_templates() -> Vec<TemplateBlock> {
        vec![
            TemplateBlock::new("External Meeting Template", "EXT {{time}} {{summary}}"),
            TemplateBlock::new("Internal Meeting Template", "INT {{time}} {{summary}}"),
            TemplateBlock::new("One-on-One Meeting Template", "1:1 {{time}} {{summary}}"),
        ]
    }

    fn event(summary: &str, time: &str, attendees: &[&str]) -> EventRecord {
        EventRecord::new(time, summary)
            .with_attendees(attendees.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn inserts_with_category_templates() {
        let host = MockHost::with_page(all_templates());
        let events = vec![
            event("Standup", "09:00", &["me@co.com", "a@co.com", "b@co.com"]),
            event("1:1 Ana", "10:00", &["me@co.com", "ana@co.com"]),
            event("Vendor call", "11:00", &["me@co.com", "x@vendor.com"]),
        ];

        let outcome = insert_events(&host, &events, "me@co.com", &TemplateBindings::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.inserted, 3);
        assert!(outcome.skipped.is_empty());

        let inserted = host.inserted();
        assert_eq!(inserted[0], ("page-uuid".to_string(), "INT 09:00 Standup".to_string()));
        assert_eq!(inserted[1], ("page-uuid".to_string(), "1:1 10:00 1:1 Ana".to_string()));
        assert_eq!(inserted[2], ("page-uuid".to_string(), "EXT 11:00 Vendor call".to_string()));
        assert!(host.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_template_skips_event_but_continues() {
        // No one-on-one template registered.
        let templates = vec![
            TemplateBlock::new("External Meeting Template", "EXT {{summary}}"),
            TemplateBlock::new("Internal Meeting Template", "INT {{summary}}"),
        ];
        let host = MockHost::with_page(templates);
        let events = vec![
            event("Standup", "09:00", &["me@co.com", "a@co.com", "b@co.com"]),
            event("1:1 Ana", "10:00", &["me@co.com", "ana@co.com"]),
            event("Vendor call", "11:00", &["me@co.com", "x@vendor.com"]),
        ];

        let outcome = insert_events(&host, &events, "me@co.com", &TemplateBindings::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.skipped, vec!["One-on-One Meeting Template".to_string()]);

        let messages = host.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            (
                "Template 'One-on-One Meeting Template' not found.".to_string(),
                "warning"
            )
        );
    }

    #[tokio::test]
    async fn no_open_page_is_a_silent_no_op() {
        let host = MockHost::new(None, all_templates());
        let events = vec![event("Standup", "09:00", &["me@co.com", "a@co.com"])];

        let outcome = insert_events(&host, &events, "me@co.com", &TemplateBindings::default())
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(host.inserted().is_empty());
        assert!(host.messages().is_empty());
    }

    #[tokio::test]
    async fn no_events_inserts_nothing() {
        let host = MockHost::with_page(all_templates());
        let outcome = insert_events(&host, &[], "me@co.com", &TemplateBindings::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome, SyncOutcome::default());
        assert!(host.inserted().is_empty());
    }

    #[tokio::test]
    async fn custom_bindings_are_honored() {
        let templates = vec![TemplateBlock::new("Huddle", "HUDDLE {{summary}}")];
        let host = MockHost::with_page(templates);
        let bindings = TemplateBindings {
            internal: "Huddle".to_string(),
            ..TemplateBindings::default()
        };
        let events = vec![event("Standup", "09:00", &["me@co.com"])];

        let outcome = insert_events(&host, &events, "me@co.com", &bindings)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.inserted, 1);
        assert_eq!(host.inserted()[0].1, "HUDDLE Standup");
    }

    #[tokio::test]
    async fn fetch_failure_shows_one_error_notice() {
        let host = MockHost::with_page(all_templates());
        let failed: ClientResult<Option<SyncOutcome>> = Err(
            calsync_google::GoogleError::Network("connection failed".to_string()).into(),
        );

        let result = conclude(&host, failed).await;
        assert!(result.is_err());
        assert!(host.inserted().is_empty());

        let messages = host.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            (
                "Failed to sync calendar. Check the log for details.".to_string(),
                "error"
            )
        );
    }

    #[tokio::test]
    async fn successful_sync_shows_no_notice() {
        let host = MockHost::with_page(all_templates());
        let result = conclude(&host, Ok(Some(SyncOutcome::default()))).await;
        assert!(result.is_ok());
        assert!(host.messages().is_empty());
    }

    #[tokio::test]
    async fn host_failure_propagates() {
        let events = vec![event("Standup", "09:00", &["me@co.com"])];
        let result = insert_events(
            &BrokenHost,
            &events,
            "me@co.com",
            &TemplateBindings::default(),
        )
        .await;
        assert!(result.is_err());
    }
}

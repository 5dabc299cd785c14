//! Logseq adapter over its local HTTP API.
//!
//! Logseq's desktop app exposes the plugin API on a local HTTP server
//! (Settings → Features → HTTP APIs server). Every call is a POST to `/api`
//! with a bearer token and a `{"method", "args"}` body; the response is the
//! plugin API's return value as JSON.

use calsync_core::TemplateBlock;
use serde_json::{json, Value};
use tracing::debug;

use crate::editor::{BoxFuture, HostEditor, HostError, HostResult, Page, Severity};

/// Default endpoint of Logseq's local HTTP API server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:12315";

/// Logseq host adapter.
#[derive(Debug, Clone)]
pub struct LogseqHost {
    endpoint: String,
    token: String,
    http_client: reqwest::Client,
}

impl LogseqHost {
    /// Creates an adapter for the given endpoint and API token.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Invokes one plugin API method and returns its JSON result.
    async fn invoke(&self, method: &str, args: Value) -> HostResult<Value> {
        debug!("logseq api call: {}", method);

        let response = self
            .http_client
            .post(format!("{}/api", self.endpoint))
            .bearer_auth(&self.token)
            .json(&json!({ "method": method, "args": args }))
            .send()
            .await
            .map_err(|e| HostError::Connection(format!("{}: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::Api(format!("{} ({}): {}", method, status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

/// Interprets the `getCurrentPage` result; `null` means no page is focused.
fn parse_page(value: &Value) -> Option<Page> {
    let obj = value.as_object()?;
    let id = obj.get("uuid")?.as_str()?;
    let name = obj
        .get("originalName")
        .or_else(|| obj.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(id);
    Some(Page {
        id: id.to_string(),
        name: name.to_string(),
    })
}

/// Interprets the `getTemplateBlocks` result as name/content pairs.
///
/// Entries without both fields are ignored rather than failing the listing.
fn parse_templates(value: &Value) -> Vec<TemplateBlock> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let name = item.get("name")?.as_str()?;
                    let content = item.get("content")?.as_str()?;
                    Some(TemplateBlock::new(name, content))
                })
                .collect()
        })
        .unwrap_or_default()
}

impl HostEditor for LogseqHost {
    fn current_page(&self) -> BoxFuture<'_, HostResult<Option<Page>>> {
        Box::pin(async move {
            let value = self
                .invoke("logseq.Editor.getCurrentPage", json!([]))
                .await?;
            Ok(parse_page(&value))
        })
    }

    fn template_blocks(&self) -> BoxFuture<'_, HostResult<Vec<TemplateBlock>>> {
        Box::pin(async move {
            let value = self
                .invoke("logseq.Editor.getTemplateBlocks", json!([]))
                .await?;
            Ok(parse_templates(&value))
        })
    }

    fn insert_block<'a>(
        &'a self,
        page_id: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, HostResult<()>> {
        Box::pin(async move {
            // sibling=false appends as a child of the page block.
            self.invoke(
                "logseq.Editor.insertBlock",
                json!([page_id, content, { "sibling": false }]),
            )
            .await?;
            Ok(())
        })
    }

    fn show_message<'a>(
        &'a self,
        text: &'a str,
        severity: Severity,
    ) -> BoxFuture<'a, HostResult<()>> {
        Box::pin(async move {
            self.invoke("logseq.App.showMsg", json!([text, severity.as_str()]))
                .await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_from_response() {
        let value = json!({
            "uuid": "665f1c2e-aaaa-bbbb-cccc-1234567890ab",
            "originalName": "Jun 12th, 2025",
            "name": "jun 12th, 2025"
        });

        let page = parse_page(&value).unwrap();
        assert_eq!(page.id, "665f1c2e-aaaa-bbbb-cccc-1234567890ab");
        assert_eq!(page.name, "Jun 12th, 2025");
    }

    #[test]
    fn parse_page_null_means_no_page() {
        assert!(parse_page(&Value::Null).is_none());
    }

    #[test]
    fn parse_page_falls_back_to_name() {
        let value = json!({ "uuid": "u1", "name": "scratch" });
        assert_eq!(parse_page(&value).unwrap().name, "scratch");
    }

    #[test]
    fn parse_templates_from_response() {
        let value = json!([
            { "name": "External Meeting Template", "content": "- {{time}} {{summary}}" },
            { "name": "Internal Meeting Template", "content": "- {{summary}}" }
        ]);

        let templates = parse_templates(&value);
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "External Meeting Template");
        assert_eq!(templates[1].content, "- {{summary}}");
    }

    #[test]
    fn parse_templates_skips_incomplete_entries() {
        let value = json!([
            { "name": "No content" },
            { "content": "no name" },
            { "name": "Good", "content": "ok" }
        ]);

        let templates = parse_templates(&value);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Good");
    }

    #[test]
    fn parse_templates_non_array_is_empty() {
        assert!(parse_templates(&Value::Null).is_empty());
        assert!(parse_templates(&json!({})).is_empty());
    }
}

//! Template bindings, lookup, and placeholder substitution.
//!
//! Each [`TemplateCategory`] maps to a user-configured template name; the
//! named template is looked up among the host's registered template blocks
//! and its content filled in from an [`EventRecord`].
//!
//! Substitution is literal, global, and case-sensitive. Unrecognized
//! placeholders are left untouched, and substituted values are never
//! re-expanded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::TemplateCategory;
use crate::event::EventRecord;

/// The placeholders recognized in template content.
pub const PLACEHOLDERS: [&str; 7] = [
    "{{time}}",
    "{{summary}}",
    "{{description}}",
    "{{location}}",
    "{{attendees}}",
    "{{organizer}}",
    "{{event_link}}",
];

/// Errors from template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// No registered template block matches the configured name.
    ///
    /// Recoverable per event: the caller skips the event with a warning
    /// instead of aborting the sync.
    #[error("template '{0}' not found")]
    NotFound(String),
}

/// A named, reusable content snippet registered in the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBlock {
    /// The template name, as shown in the host's template list.
    pub name: String,
    /// The raw template content with `{{...}}` placeholders.
    pub content: String,
}

impl TemplateBlock {
    /// Creates a new template block.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// User-configured mapping from meeting category to template name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateBindings {
    /// Template for meetings with attendees outside the user's domain.
    pub external: String,
    /// Template for same-domain group meetings.
    pub internal: String,
    /// Template for same-domain 1:1 meetings.
    pub one_on_one: String,
}

impl Default for TemplateBindings {
    fn default() -> Self {
        Self {
            external: "External Meeting Template".to_string(),
            internal: "Internal Meeting Template".to_string(),
            one_on_one: "One-on-One Meeting Template".to_string(),
        }
    }
}

impl TemplateBindings {
    /// Returns the configured template name for a category.
    pub fn name_for(&self, category: TemplateCategory) -> &str {
        match category {
            TemplateCategory::External => &self.external,
            TemplateCategory::Internal => &self.internal,
            TemplateCategory::OneOnOne => &self.one_on_one,
        }
    }
}

/// Finds the template block with exactly the given name.
pub fn resolve<'a>(
    blocks: &'a [TemplateBlock],
    name: &str,
) -> Result<&'a TemplateBlock, TemplateError> {
    blocks
        .iter()
        .find(|block| block.name == name)
        .ok_or_else(|| TemplateError::NotFound(name.to_string()))
}

/// Substitutes every recognized placeholder in `content` with the
/// corresponding event field.
///
/// All occurrences of each placeholder are replaced, one pass per
/// placeholder in a fixed order. There is no recursive expansion: a value
/// that re-introduces an already-processed placeholder stays literal.
pub fn render(content: &str, event: &EventRecord) -> String {
    let attendees = event.attendees_joined();

    let substitutions: [(&str, &str); 7] = [
        ("{{time}}", &event.time),
        ("{{summary}}", &event.summary),
        ("{{description}}", &event.description),
        ("{{location}}", &event.location),
        ("{{attendees}}", &attendees),
        ("{{organizer}}", &event.organizer),
        ("{{event_link}}", &event.event_link),
    ];

    let mut rendered = content.to_string();
    for (placeholder, value) in substitutions {
        rendered = rendered.replace(placeholder, value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> EventRecord {
        EventRecord::new("09:30", "Design review")
            .with_description("Quarterly design review")
            .with_location("Room 4")
            .with_attendees(vec!["me@co.com".to_string(), "x@co.com".to_string()])
            .with_organizer("me@co.com")
            .with_event_link("https://www.google.com/calendar/event?eid=abc123")
    }

    #[test]
    fn default_bindings() {
        let bindings = TemplateBindings::default();
        assert_eq!(
            bindings.name_for(TemplateCategory::External),
            "External Meeting Template"
        );
        assert_eq!(
            bindings.name_for(TemplateCategory::Internal),
            "Internal Meeting Template"
        );
        assert_eq!(
            bindings.name_for(TemplateCategory::OneOnOne),
            "One-on-One Meeting Template"
        );
    }

    #[test]
    fn resolve_exact_match() {
        let blocks = vec![
            TemplateBlock::new("Internal Meeting Template", "- {{summary}}"),
            TemplateBlock::new("External Meeting Template", "- EXT {{summary}}"),
        ];

        let block = resolve(&blocks, "External Meeting Template").unwrap();
        assert_eq!(block.content, "- EXT {{summary}}");
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let blocks = vec![TemplateBlock::new("My Template", "x")];
        assert_eq!(
            resolve(&blocks, "my template"),
            Err(TemplateError::NotFound("my template".to_string()))
        );
    }

    #[test]
    fn resolve_missing_reports_name() {
        let err = resolve(&[], "Ghost Template").unwrap_err();
        assert_eq!(err.to_string(), "template 'Ghost Template' not found");
    }

    #[test]
    fn render_substitutes_all_fields() {
        let content = "{{time}} {{summary}} @ {{location}}\n\
                       {{description}}\n\
                       with: {{attendees}} (organizer {{organizer}})\n\
                       {{event_link}}";
        let rendered = render(content, &sample_event());

        insta::assert_snapshot!(rendered, @r"
        09:30 Design review @ Room 4
        Quarterly design review
        with: me@co.com, x@co.com (organizer me@co.com)
        https://www.google.com/calendar/event?eid=abc123
        ");
    }

    #[test]
    fn render_leaves_no_recognized_placeholder_behind() {
        let content = PLACEHOLDERS.join(" ");
        let rendered = render(&content, &sample_event());
        for placeholder in PLACEHOLDERS {
            assert!(!rendered.contains(placeholder), "{placeholder} survived");
        }
    }

    #[test]
    fn render_replaces_every_occurrence() {
        let rendered = render("{{time}} / {{time}} / {{time}}", &sample_event());
        assert_eq!(rendered, "09:30 / 09:30 / 09:30");
    }

    #[test]
    fn render_leaves_unknown_placeholders_untouched() {
        let rendered = render("{{time}} {{weather}}", &sample_event());
        assert_eq!(rendered, "09:30 {{weather}}");
    }

    #[test]
    fn render_empty_fields_substitute_to_empty() {
        let event = EventRecord::new("10:00", "Focus");
        let rendered = render("[{{description}}][{{location}}][{{attendees}}]", &event);
        assert_eq!(rendered, "[][][]");
    }

    #[test]
    fn render_does_not_recursively_expand_values() {
        // A substituted value that re-introduces an already-processed
        // placeholder stays literal; there is no second pass.
        let event = EventRecord::new("10:00", "{{time}}");
        let rendered = render("{{summary}}", &event);
        assert_eq!(rendered, "{{time}}");
    }
}

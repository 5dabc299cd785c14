//! Meeting classification.
//!
//! Maps an [`EventRecord`] plus the acting user's email to one of three
//! template categories, based on the other attendees' email domains and
//! count. Pure and total: every event classifies to exactly one category.

use serde::{Deserialize, Serialize};

use crate::event::EventRecord;

/// The template category for a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    /// At least one attendee from outside the user's email domain.
    External,
    /// Same-domain attendees only: none, or two or more besides the user.
    Internal,
    /// Exactly one same-domain attendee besides the user.
    OneOnOne,
}

impl TemplateCategory {
    /// Returns a human-readable name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Internal => "internal",
            Self::OneOnOne => "one-on-one",
        }
    }
}

/// Returns the domain part of an email address (everything after the last `@`).
///
/// Addresses without an `@` yield the whole string, which can never match a
/// well-formed attendee domain.
pub fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map_or(email, |(_, domain)| domain)
}

/// Classifies an event into a template category.
///
/// The other attendees are the event's attendees excluding `user_email`.
/// Any cross-domain other attendee makes the meeting [`External`]; domain
/// mismatch always wins over attendee count. With same-domain others only,
/// exactly one means [`OneOnOne`] and anything else (zero, or two and more)
/// means [`Internal`]. Solo events with no other attendees are internal.
///
/// [`External`]: TemplateCategory::External
/// [`OneOnOne`]: TemplateCategory::OneOnOne
/// [`Internal`]: TemplateCategory::Internal
pub fn classify(event: &EventRecord, user_email: &str) -> TemplateCategory {
    let user_domain = email_domain(user_email);

    let others: Vec<&String> = event
        .attendees
        .iter()
        .filter(|email| email.as_str() != user_email)
        .collect();

    if others
        .iter()
        .any(|email| email_domain(email) != user_domain)
    {
        return TemplateCategory::External;
    }

    if others.len() == 1 {
        TemplateCategory::OneOnOne
    } else {
        TemplateCategory::Internal
    }
}

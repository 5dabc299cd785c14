//! The flat event record produced by a calendar fetch.
//!
//! An [`EventRecord`] is derived once per sync from a raw calendar API event
//! and carries exactly the fields the templates can reference. It is immutable
//! after construction and discarded after insertion.

use serde::{Deserialize, Serialize};

/// A single calendar event, flattened for template substitution.
///
/// Optional source fields (description, location, organizer) default to the
/// empty string rather than `None` so templates always have something to
/// substitute. The attendee list is ordered as the calendar API returned it
/// and is empty (never absent) for events without attendees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Start time of the event, formatted `HH:mm` in the timezone the
    /// calendar reports for it.
    pub time: String,
    /// Event title.
    pub summary: String,
    /// Event description, or `""`.
    pub description: String,
    /// Event location, or `""`.
    pub location: String,
    /// Attendee email addresses, in calendar order.
    pub attendees: Vec<String>,
    /// Organizer email address, or `""`.
    pub organizer: String,
    /// Canonical link to the event in the calendar web UI.
    pub event_link: String,
}

impl EventRecord {
    /// Creates a record with the required fields; optional fields start empty.
    pub fn new(time: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            summary: summary.into(),
            description: String::new(),
            location: String::new(),
            attendees: Vec::new(),
            organizer: String::new(),
            event_link: String::new(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the attendee list.
    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }

    /// Builder method to set the organizer.
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = organizer.into();
        self
    }

    /// Builder method to set the event link.
    pub fn with_event_link(mut self, link: impl Into<String>) -> Self {
        self.event_link = link.into();
        self
    }

    /// Attendee emails joined with `", "` for template substitution.
    pub fn attendees_joined(&self) -> String {
        self.attendees.join(", ")
    }
}

//! Filtering and flattening of raw calendar events into [`EventRecord`]s.
//!
//! The pipeline, in order: drop cancelled events, drop events without a
//! concrete start time (all-day events), drop events the acting user has
//! declined. Survivors are flattened, keeping the API's chronological order.

use calsync_core::{clock_time, EventRecord};
use chrono::DateTime;
use tracing::warn;

use crate::client::ApiEvent;

/// Builds the canonical web link for an event identifier.
pub fn event_link(event_id: &str) -> String {
    format!(
        "https://www.google.com/calendar/event?eid={}",
        urlencoding::encode(event_id)
    )
}

/// Converts raw API events into [`EventRecord`]s, applying the filter
/// pipeline.
///
/// `user_email` identifies the acting user's attendee entry for the decline
/// check; another attendee's decline does not exclude an event. Events whose
/// start time cannot be parsed are skipped with a warning.
pub fn to_records(items: Vec<ApiEvent>, user_email: &str) -> Vec<EventRecord> {
    items
        .into_iter()
        .filter(|event| event.status.as_deref() != Some("cancelled"))
        .filter(|event| event.start.date_time.is_some())
        .filter(|event| !declined_by(event, user_email))
        .filter_map(flatten)
        .collect()
}

/// True when the acting user's own attendee entry declined the event.
fn declined_by(event: &ApiEvent, user_email: &str) -> bool {
    event
        .attendees
        .iter()
        .flatten()
        .find(|a| a.email.as_deref() == Some(user_email))
        .is_some_and(|me| me.response_status.as_deref() == Some("declined"))
}

fn flatten(event: ApiEvent) -> Option<EventRecord> {
    let id = event.id?;
    // Guaranteed by the pipeline; belt for direct callers.
    let start = event.start.date_time?;

    let start = match DateTime::parse_from_rfc3339(&start) {
        Ok(dt) => dt,
        Err(e) => {
            warn!("skipping event {}: unparsable start time: {}", id, e);
            return None;
        }
    };

    let attendees: Vec<String> = event
        .attendees
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.email)
        .collect();

    Some(
        EventRecord::new(clock_time(&start), event.summary.unwrap_or_default())
            .with_description(event.description.unwrap_or_default())
            .with_location(event.location.unwrap_or_default())
            .with_attendees(attendees)
            .with_organizer(
                event
                    .organizer
                    .and_then(|o| o.email)
                    .unwrap_or_default(),
            )
            .with_event_link(event_link(&id)),
    )
}

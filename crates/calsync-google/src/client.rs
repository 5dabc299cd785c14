//! Low-level HTTP client for the Google Calendar and userinfo APIs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{GoogleError, GoogleResult};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Authenticated client for the calendar and userinfo endpoints.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl CalendarClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");
        Self {
            http_client,
            access_token: access_token.into(),
        }
    }

    /// Updates the access token after a refresh.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Resolves the acting user's email address.
    pub async fn user_email(&self) -> GoogleResult<String> {
        let response = self
            .http_client
            .get(USERINFO_URL)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(map_request_error)?;

        let body = check_status(response).await?;
        let userinfo: UserInfo = serde_json::from_str(&body).map_err(|e| {
            GoogleError::InvalidResponse(format!("failed to parse userinfo: {}", e))
        })?;

        userinfo.email.ok_or_else(|| {
            GoogleError::InvalidResponse("userinfo response has no email".to_string())
        })
    }

    /// Lists a calendar's events in `[time_min, time_max]`, recurring
    /// instances expanded and ordered by start time.
    ///
    /// Follows `nextPageToken` pagination until the window is exhausted.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> GoogleResult<Vec<ApiEvent>> {
        let mut all_events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_events_page(calendar_id, time_min, time_max, page_token.as_deref())
                .await?;

            all_events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "fetched {} events from calendar {}",
            all_events.len(),
            calendar_id
        );
        Ok(all_events)
    }

    async fn list_events_page(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> GoogleResult<EventListResponse> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(map_request_error)?;
        let body = check_status(response).await?;

        serde_json::from_str(&body).map_err(|e| {
            GoogleError::InvalidResponse(format!("failed to parse event list: {}", e))
        })
    }
}

fn map_request_error(e: reqwest::Error) -> GoogleError {
    if e.is_timeout() {
        GoogleError::Network("request timeout".to_string())
    } else if e.is_connect() {
        GoogleError::Network(format!("connection failed: {}", e))
    } else {
        GoogleError::Network(format!("request failed: {}", e))
    }
}

/// Maps API status codes to errors and returns the body on success.
async fn check_status(response: reqwest::Response) -> GoogleResult<String> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleError::Auth(
            "access token expired or invalid".to_string(),
        ));
    }
    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(GoogleError::Auth("access denied".to_string()));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(GoogleError::RateLimited(
            retry_after
                .map(|s| format!("retry after {} seconds", s))
                .unwrap_or_else(|| "too many requests".to_string()),
        ));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GoogleError::Server(format!("({}): {}", status, body)));
    }

    response
        .text()
        .await
        .map_err(|e| GoogleError::Network(format!("failed to read response: {}", e)))
}

/// Response from the userinfo endpoint.
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

/// A single event as returned by the Calendar API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub start: ApiEventTime,
    pub organizer: Option<ApiOrganizer>,
    pub attendees: Option<Vec<ApiAttendee>>,
}

/// Event start/end time: either a timed `dateTime` or an all-day `date`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}

/// Event organizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrganizer {
    pub email: Option<String>,
}

/// Event attendee with their response status.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub email: Option<String>,
    pub response_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_event_list_response() {
        let json = r#"{
            "items": [
                {
                    "id": "event1",
                    "summary": "Test Meeting",
                    "status": "confirmed",
                    "start": { "dateTime": "2025-03-15T10:00:00+01:00" },
                    "organizer": { "email": "org@co.com" },
                    "attendees": [
                        { "email": "me@co.com", "responseStatus": "accepted" },
                        { "email": "x@co.com", "responseStatus": "needsAction" }
                    ]
                }
            ],
            "nextPageToken": "page2"
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.next_page_token.as_deref(), Some("page2"));

        let event = &response.items[0];
        assert_eq!(event.summary.as_deref(), Some("Test Meeting"));
        assert_eq!(
            event.start.date_time.as_deref(),
            Some("2025-03-15T10:00:00+01:00")
        );
        assert_eq!(
            event.organizer.as_ref().unwrap().email.as_deref(),
            Some("org@co.com")
        );
        assert_eq!(event.attendees.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn parse_all_day_event() {
        let json = r#"{
            "id": "event1",
            "summary": "Conference day",
            "start": { "date": "2025-03-15" }
        }"#;

        let event: ApiEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start.date.as_deref(), Some("2025-03-15"));
        assert!(event.start.date_time.is_none());
    }

    #[test]
    fn parse_event_without_attendees() {
        let json = r#"{
            "id": "event1",
            "summary": "Focus time",
            "start": { "dateTime": "2025-03-15T10:00:00Z" }
        }"#;

        let event: ApiEvent = serde_json::from_str(json).unwrap();
        assert!(event.attendees.is_none());
        assert!(event.organizer.is_none());
    }

    #[test]
    fn parse_userinfo() {
        let info: UserInfo = serde_json::from_str(r#"{"email": "me@co.com"}"#).unwrap();
        assert_eq!(info.email.as_deref(), Some("me@co.com"));

        let info: UserInfo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(info.email.is_none());
    }
}

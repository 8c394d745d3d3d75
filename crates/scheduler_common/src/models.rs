// --- File: crates/scheduler_common/src/models.rs ---

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event as the calendar provider returns it.
///
/// Only the fields the scheduler reads are typed. Everything else the provider
/// sends is kept in `extra` and written back out unchanged, so clients receive
/// the raw provider event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderEvent {
    /// Start and end instant, if both ends carry a timed `dateTime`.
    ///
    /// All-day events only have a `date` and yield `None`.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start.as_ref()?.date_time?;
        let end = self.end.as_ref()?.date_time?;
        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    pub fn start_instant(&self) -> Option<DateTime<FixedOffset>> {
        self.start.as_ref().and_then(|t| t.date_time)
    }

    pub fn end_instant(&self) -> Option<DateTime<FixedOffset>> {
        self.end.as_ref().and_then(|t| t.date_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    /// Set instead of `date_time` for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(instant.fixed_offset()),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event to insert into the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
}

/// Filter for listing events. Results are always single events ordered by start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
    pub max_results: Option<i32>,
}

// --- Wire types shared by the proxy and its clients ---

/// Body of `POST /create-event`. Timestamps are ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub summary: String,
    pub start_date_time: String,
    pub end_date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub message: String,
    pub event: ProviderEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub success: bool,
}

/// One open slot offered by `GET /available-slots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOffer {
    /// `HH:MM` on the booking zone's wall clock
    pub time: String,
    pub start_date_time: String,
    pub end_date_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlots {
    pub date: NaiveDate,
    pub time_zone: String,
    pub slots: Vec<SlotOffer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_event_keeps_unknown_fields() {
        let raw = json!({
            "id": "abc123",
            "kind": "calendar#event",
            "summary": "Appointment with Ada",
            "start": { "dateTime": "2024-05-01T10:00:00+02:00", "timeZone": "Europe/Zurich" },
            "end": { "dateTime": "2024-05-01T10:30:00+02:00" },
            "attendees": [{ "email": "ada@example.com", "organizer": true }],
            "reminders": { "useDefault": true }
        });

        let event: ProviderEvent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(event.summary.as_deref(), Some("Appointment with Ada"));
        assert_eq!(event.attendees[0].email.as_deref(), Some("ada@example.com"));
        assert_eq!(event.extra.get("kind"), Some(&json!("calendar#event")));

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["reminders"], json!({ "useDefault": true }));
        assert_eq!(back["attendees"][0]["organizer"], json!(true));
        assert_eq!(back["start"]["timeZone"], json!("Europe/Zurich"));
    }

    #[test]
    fn test_time_range_in_utc() {
        let event: ProviderEvent = serde_json::from_value(json!({
            "start": { "dateTime": "2024-05-01T10:00:00+02:00" },
            "end": { "dateTime": "2024-05-01T10:30:00+02:00" }
        }))
        .unwrap();

        let (start, end) = event.time_range().unwrap();
        assert_eq!(start.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-05-01T08:30:00+00:00");
    }

    #[test]
    fn test_all_day_event_has_no_time_range() {
        let event: ProviderEvent = serde_json::from_value(json!({
            "summary": "Holiday",
            "start": { "date": "2024-05-01" },
            "end": { "date": "2024-05-02" }
        }))
        .unwrap();

        assert!(event.time_range().is_none());
        assert_eq!(
            event.start.unwrap().date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_create_event_request_wire_names() {
        let request: CreateEventRequest = serde_json::from_value(json!({
            "summary": "Appointment with Ada",
            "startDateTime": "2024-05-01T09:00:00.000Z",
            "endDateTime": "2024-05-01T09:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(request.start_date_time, "2024-05-01T09:00:00.000Z");
        assert!(request.description.is_none());
        assert!(serde_json::to_value(&request)
            .unwrap()
            .get("description")
            .is_none());
    }
}

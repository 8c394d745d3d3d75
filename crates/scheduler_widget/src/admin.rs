// --- File: crates/scheduler_widget/src/admin.rs ---
//! The calendar owner's dashboard: connection status and the event list.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use scheduler_common::logging::log_error;
use scheduler_common::logic::EventRange;
use scheduler_common::models::ProviderEvent;
use tokio::sync::watch;

use crate::api::SchedulerApi;

pub const CHECK_CONNECTION_FAILED: &str = "Failed to check connection status";
pub const FETCH_EVENTS_FAILED: &str = "Failed to fetch events";
pub const DISCONNECT_FAILED: &str = "Failed to disconnect";

/// One line of the event table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub summary: String,
    pub when: String,
    pub attendees: String,
}

pub struct AdminPanel<A> {
    api: A,
    time_zone: Tz,
    connected: bool,
    range: EventRange,
    events: Vec<ProviderEvent>,
    loading: watch::Sender<bool>,
    error: Option<String>,
}

impl<A: SchedulerApi> AdminPanel<A> {
    pub fn new(api: A, time_zone: Tz) -> Self {
        Self {
            api,
            time_zone,
            connected: false,
            range: EventRange::default(),
            events: Vec::new(),
            loading: watch::channel(false).0,
            error: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn range(&self) -> EventRange {
        self.range
    }

    pub fn events(&self) -> &[ProviderEvent] {
        &self.events
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Watches the loading flag.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Checks the connection and, when connected, loads the current range.
    pub async fn load(&mut self) {
        self.loading.send_replace(true);
        match self.api.check_connection().await {
            Ok(connected) => {
                self.connected = connected;
                if connected {
                    self.fetch_events().await;
                }
            }
            Err(e) => {
                log_error(e, CHECK_CONNECTION_FAILED);
                self.error = Some(CHECK_CONNECTION_FAILED.to_string());
            }
        }
        self.loading.send_replace(false);
    }

    pub async fn fetch_events(&mut self) {
        self.loading.send_replace(true);
        match self.api.admin_events(self.range).await {
            Ok(events) => {
                self.events = events;
                self.error = None;
            }
            Err(e) => {
                log_error(e, FETCH_EVENTS_FAILED);
                self.error = Some(FETCH_EVENTS_FAILED.to_string());
            }
        }
        self.loading.send_replace(false);
    }

    /// Switches the range; re-fetches only while connected.
    pub async fn set_range(&mut self, range: EventRange) {
        self.range = range;
        if self.connected {
            self.fetch_events().await;
        }
    }

    pub async fn refresh(&mut self) {
        if self.connected {
            self.fetch_events().await;
        }
    }

    pub async fn disconnect(&mut self) {
        self.loading.send_replace(true);
        match self.api.disconnect().await {
            Ok(()) => {
                self.connected = false;
                self.events.clear();
            }
            Err(e) => {
                log_error(e, DISCONNECT_FAILED);
                self.error = Some(DISCONNECT_FAILED.to_string());
            }
        }
        self.loading.send_replace(false);
    }

    pub fn rows(&self) -> Vec<EventRow> {
        self.events
            .iter()
            .map(|event| EventRow {
                summary: event.summary.clone().unwrap_or_default(),
                when: event_when(event, self.time_zone),
                attendees: attendees_label(event),
            })
            .collect()
    }
}

/// e.g. `Wed, May 1, 10:00 AM`, in the dashboard's zone.
pub fn format_event_time(date_time: DateTime<FixedOffset>, time_zone: Tz) -> String {
    date_time
        .with_timezone(&time_zone)
        .format("%a, %b %-d, %I:%M %p")
        .to_string()
}

fn event_when(event: &ProviderEvent, time_zone: Tz) -> String {
    if let Some(start) = event.start_instant() {
        return format_event_time(start, time_zone);
    }
    match event.start.as_ref().and_then(|t| t.date) {
        Some(date) => format!("{}, all day", date.format("%a, %b %-d")),
        None => String::new(),
    }
}

/// Attendee emails joined by `, `, or `No attendees`.
pub fn attendees_label(event: &ProviderEvent) -> String {
    let emails: Vec<&str> = event
        .attendees
        .iter()
        .filter_map(|attendee| attendee.email.as_deref())
        .collect();
    if emails.is_empty() {
        "No attendees".to_string()
    } else {
        emails.join(", ")
    }
}

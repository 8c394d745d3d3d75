// --- File: crates/scheduler_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! Every call reads the current credential from the [`CredentialStore`],
//! refreshing it first when it is about to expire, and talks to the Calendar
//! API through a hub authenticated with that token.

use chrono::Utc;
use google_calendar3::api::{Event, EventDateTime};
use scheduler_common::models::{CalendarEvent, EventQuery, ProviderEvent};
use scheduler_common::services::{BoxFuture, CalendarService};
use scheduler_common::{external_service_error, SchedulerError, NOT_CONNECTED_MESSAGE};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{create_calendar_hub, AuthError, Connector, GoogleOAuthClient};
use crate::credentials::CredentialStore;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("{}", NOT_CONNECTED_MESSAGE)]
    NotConnected,
    #[error("Token refresh failed: {0}")]
    TokenError(#[from] AuthError),
    #[error("Failed to convert event: {0}")]
    ConversionError(#[from] serde_json::Error),
}

impl GcalServiceError {
    /// Maps to the HTTP-facing error, `message` being what the caller sees.
    pub fn into_scheduler_error(self, message: &str) -> SchedulerError {
        match self {
            GcalServiceError::NotConnected => SchedulerError::NotConnected,
            other => external_service_error("google_calendar", message, other),
        }
    }
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    connector: Connector,
    credentials: CredentialStore,
    oauth: Arc<GoogleOAuthClient>,
}

impl GoogleCalendarService {
    pub fn new(
        connector: Connector,
        credentials: CredentialStore,
        oauth: Arc<GoogleOAuthClient>,
    ) -> Self {
        Self {
            connector,
            credentials,
            oauth,
        }
    }

    /// The access token to use for the next call, refreshed if it is stale.
    async fn access_token(&self) -> Result<String, GcalServiceError> {
        let credential = self
            .credentials
            .snapshot()
            .await
            .ok_or(GcalServiceError::NotConnected)?;

        let now = Utc::now();
        let refresh_token = match credential.refresh_token.as_deref() {
            Some(token) if credential.needs_refresh(now) => token,
            _ => return Ok(credential.access_token),
        };

        let tokens = self.oauth.refresh(refresh_token).await?;
        let access_token = tokens.access_token.clone();
        if !self.credentials.apply_refresh(tokens, now).await {
            // Disconnected while the refresh was in flight
            return Err(GcalServiceError::NotConnected);
        }
        info!("Refreshed Google access token");
        Ok(access_token)
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    fn list_events(
        &self,
        calendar_id: &str,
        query: EventQuery,
    ) -> BoxFuture<'_, Vec<ProviderEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            let hub = create_calendar_hub(&self.connector, self.access_token().await?);

            let mut request = hub
                .events()
                .list(&calendar_id)
                .single_events(true) // Expand recurring events
                .order_by("startTime");
            if let Some(time_min) = query.time_min {
                request = request.time_min(time_min);
            }
            if let Some(time_max) = query.time_max {
                request = request.time_max(time_max);
            }
            if let Some(max_results) = query.max_results {
                request = request.max_results(max_results);
            }

            let (_response, events) = request.doit().await?;
            let items = events.items.unwrap_or_default();
            debug!("Fetched {} events from {}", items.len(), calendar_id);

            items.into_iter().map(to_provider_event).collect()
        })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, ProviderEvent, Self::Error> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            let hub = create_calendar_hub(&self.connector, self.access_token().await?);

            let new_event = Event {
                summary: Some(event.summary),
                description: event.description,
                start: Some(EventDateTime {
                    date_time: Some(event.start_time),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                end: Some(EventDateTime {
                    date_time: Some(event.end_time),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let (_response, created) = hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;
            info!("Created event {:?} in {}", created.id, calendar_id);

            to_provider_event(created)
        })
    }
}

/// Re-reads a Calendar API event as the provider-agnostic model.
fn to_provider_event(event: Event) -> Result<ProviderEvent, GcalServiceError> {
    let mut value = serde_json::to_value(event)?;
    prune_nulls(&mut value);
    Ok(serde_json::from_value(value)?)
}

/// Drops `null` members so unset API fields do not show up in responses.
fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// Mock implementation of CalendarService for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use scheduler_common::models::EventTime;
    use std::sync::Mutex;

    /// In-memory calendar. Mirrors the not-connected behavior of the real
    /// service through a shared [`CredentialStore`].
    pub struct MockCalendarService {
        credentials: CredentialStore,
        events: Mutex<Vec<ProviderEvent>>,
        queries: Mutex<Vec<EventQuery>>,
        fail: bool,
    }

    impl MockCalendarService {
        pub fn new(credentials: CredentialStore) -> Self {
            Self {
                credentials,
                events: Mutex::new(Vec::new()),
                queries: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        /// A service whose provider calls always fail.
        pub fn failing(credentials: CredentialStore) -> Self {
            Self {
                fail: true,
                ..Self::new(credentials)
            }
        }

        pub fn with_events(self, events: Vec<ProviderEvent>) -> Self {
            *self.events.lock().unwrap() = events;
            self
        }

        pub fn queries(&self) -> Vec<EventQuery> {
            self.queries.lock().unwrap().clone()
        }

        pub fn events(&self) -> Vec<ProviderEvent> {
            self.events.lock().unwrap().clone()
        }

        async fn check(&self) -> Result<(), GcalServiceError> {
            if !self.credentials.is_connected().await {
                return Err(GcalServiceError::NotConnected);
            }
            if self.fail {
                return Err(GcalServiceError::TokenError(AuthError::InvalidUrl(oauth2::url::ParseError::EmptyHost)));
            }
            Ok(())
        }
    }

    impl CalendarService for MockCalendarService {
        type Error = GcalServiceError;

        fn list_events(
            &self,
            _calendar_id: &str,
            query: EventQuery,
        ) -> BoxFuture<'_, Vec<ProviderEvent>, Self::Error> {
            Box::pin(async move {
                self.check().await?;
                self.queries.lock().unwrap().push(query.clone());

                let events = self.events.lock().unwrap().clone();
                Ok(events
                    .into_iter()
                    .filter(|event| match event.time_range() {
                        Some((start, end)) => {
                            query.time_max.map_or(true, |max| start < max)
                                && query.time_min.map_or(true, |min| end > min)
                        }
                        None => true,
                    })
                    .collect())
            })
        }

        fn create_event(
            &self,
            _calendar_id: &str,
            event: CalendarEvent,
        ) -> BoxFuture<'_, ProviderEvent, Self::Error> {
            Box::pin(async move {
                self.check().await?;

                let mut events = self.events.lock().unwrap();
                let created = ProviderEvent {
                    id: Some(format!("evt{}", events.len() + 1)),
                    summary: Some(event.summary),
                    description: event.description,
                    status: Some("confirmed".to_string()),
                    start: Some(EventTime::at(event.start_time)),
                    end: Some(EventTime::at(event.end_time)),
                    ..ProviderEvent::default()
                };
                events.push(created.clone());
                Ok(created)
            })
        }
    }
}

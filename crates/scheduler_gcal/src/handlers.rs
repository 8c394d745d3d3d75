// --- File: crates/scheduler_gcal/src/handlers.rs ---
use axum::{
    extract::{Query, State},
    response::{Json, Redirect},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use scheduler_common::logic::{
    admin_range_bounds, filter_available_slots, generate_time_slots, is_date_disabled,
    local_day_bounds, parse_date, EventRange, TimeSlot, WorkingHours,
};
use scheduler_common::models::{
    AvailableSlots, CalendarEvent, ConnectionStatus, CreateEventRequest, CreateEventResponse,
    DisconnectResponse, EventQuery, ProviderEvent, SlotOffer,
};
use scheduler_common::services::CalendarService;
use scheduler_common::{external_service_error, validation_error, SchedulerError};
use scheduler_config::AppConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::GoogleOAuthClient;
use crate::credentials::{Credential, CredentialStore};
use crate::service::GcalServiceError;

/// Page size of the admin event listing.
pub const ADMIN_MAX_RESULTS: i32 = 50;

// Define shared state needed by GCal handlers
#[derive(Clone)]
pub struct GcalState {
    pub config: Arc<AppConfig>,
    pub credentials: CredentialStore,
    pub oauth: Arc<GoogleOAuthClient>,
    pub calendar: Arc<dyn CalendarService<Error = GcalServiceError>>,
    pub working_hours: WorkingHours,
}

impl GcalState {
    fn calendar_id(&self) -> &str {
        &self.config.google.calendar_id
    }

    /// `{target}?status=...` on the first allowed origin, `/` when none is configured.
    fn status_redirect(&self, status: &str) -> Redirect {
        let target = self
            .config
            .cors
            .redirect_target()
            .unwrap_or_else(|| "/".to_string());
        let separator = if target.contains('?') { '&' } else { '?' };
        Redirect::to(&format!("{}{}status={}", target, separator, status))
    }

    fn day_query(&self, date: NaiveDate) -> EventQuery {
        let (time_min, time_max) = local_day_bounds(date, self.working_hours.time_zone);
        EventQuery {
            time_min: Some(time_min),
            time_max: Some(time_max),
            max_results: None,
        }
    }

    async fn require_connection(&self) -> Result<(), SchedulerError> {
        if self.credentials.is_connected().await {
            Ok(())
        } else {
            Err(SchedulerError::NotConnected)
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct EventsQuery {
    pub date: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AdminEventsQuery {
    pub range: Option<String>,
}

/// Sends the browser to the Google consent screen.
#[axum::debug_handler]
pub async fn connect_handler(State(state): State<Arc<GcalState>>) -> Redirect {
    info!("Redirecting to Google consent screen");
    Redirect::to(&state.oauth.consent_url())
}

/// Completes the OAuth flow and sends the browser back to the front end.
#[axum::debug_handler]
pub async fn oauth_callback_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    if let Some(provider_error) = query.error {
        warn!("OAuth consent was not granted: {}", provider_error);
        return state.status_redirect("error");
    }

    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        warn!("OAuth callback without authorization code");
        return state.status_redirect("error");
    };

    match state.oauth.exchange_code(&code).await {
        Ok(tokens) => {
            state
                .credentials
                .set(Credential::from_token_response(tokens, Utc::now()))
                .await;
            state.status_redirect("success")
        }
        Err(e) => {
            error!("Error during OAuth callback: {}", e);
            state.status_redirect("error")
        }
    }
}

#[axum::debug_handler]
pub async fn create_event_handler(
    State(state): State<Arc<GcalState>>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, SchedulerError> {
    state.require_connection().await?;

    let start_time = parse_timestamp("startDateTime", &request.start_date_time)?;
    let end_time = parse_timestamp("endDateTime", &request.end_date_time)?;

    let event = CalendarEvent {
        summary: request.summary,
        start_time,
        end_time,
        description: request.description,
    };

    let created = state
        .calendar
        .create_event(state.calendar_id(), event)
        .await
        .map_err(|e| e.into_scheduler_error("Failed to create event."))?;

    Ok(Json(CreateEventResponse {
        message: "Event created!".to_string(),
        event: created,
    }))
}

/// Events of one day in the booking zone, used by the widget to hide taken slots.
#[axum::debug_handler]
pub async fn get_events_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<ProviderEvent>>, SchedulerError> {
    state.require_connection().await?;

    let date = query
        .date
        .as_deref()
        .ok_or_else(|| validation_error("Missing date"))
        .and_then(parse_date)?;
    let events = state
        .calendar
        .list_events(state.calendar_id(), state.day_query(date))
        .await
        .map_err(|e| e.into_scheduler_error("Failed to fetch events."))?;

    Ok(Json(events))
}

/// Open slots of one day in the booking zone, for the embedded widget.
///
/// Like the widget, a failed event fetch (including a missing credential)
/// offers every slot of the day.
#[axum::debug_handler]
pub async fn available_slots_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<AvailableSlots>, SchedulerError> {
    let hours = &state.working_hours;
    let date = query
        .date
        .as_deref()
        .ok_or_else(|| validation_error("Missing date"))
        .and_then(parse_date)?;
    let today = Utc::now().with_timezone(&hours.time_zone).date_naive();
    if is_date_disabled(date, today) {
        return Err(validation_error(format!("Date is in the past: {}", date)));
    }

    let booked = match state
        .calendar
        .list_events(state.calendar_id(), state.day_query(date))
        .await
    {
        Ok(events) => events,
        Err(e) => {
            warn!("Offering every slot on {}: {}", date, e);
            Vec::new()
        }
    };

    let slots = filter_available_slots(date, &generate_time_slots(hours), &booked, hours)
        .into_iter()
        .filter_map(|slot| slot_offer(slot, date, hours))
        .collect();

    Ok(Json(AvailableSlots {
        date,
        time_zone: hours.time_zone.name().to_string(),
        slots,
    }))
}

fn slot_offer(slot: TimeSlot, date: NaiveDate, hours: &WorkingHours) -> Option<SlotOffer> {
    let start = slot.start_on(date, hours.time_zone)?;
    let end = start + hours.slot_duration();
    Some(SlotOffer {
        time: slot.to_string(),
        start_date_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
        end_date_time: end.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[axum::debug_handler]
pub async fn check_connection_handler(
    State(state): State<Arc<GcalState>>,
) -> Json<ConnectionStatus> {
    Json(ConnectionStatus {
        connected: state.credentials.is_connected().await,
    })
}

#[axum::debug_handler]
pub async fn admin_events_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<AdminEventsQuery>,
) -> Result<Json<Vec<ProviderEvent>>, SchedulerError> {
    let range = query
        .range
        .as_deref()
        .map(EventRange::from_tag)
        .unwrap_or_default();
    let now = Utc::now().with_timezone(&state.working_hours.time_zone);
    let (time_min, time_max) = admin_range_bounds(range, now);

    // The admin listing reports every failure, including a missing credential, the same way
    let events = state
        .calendar
        .list_events(
            state.calendar_id(),
            EventQuery {
                time_min,
                time_max,
                max_results: Some(ADMIN_MAX_RESULTS),
            },
        )
        .await
        .map_err(|e| external_service_error("google_calendar", "Failed to fetch events", e))?;

    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn disconnect_handler(State(state): State<Arc<GcalState>>) -> Json<DisconnectResponse> {
    state.credentials.clear().await;
    Json(DisconnectResponse { success: true })
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, SchedulerError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| validation_error(format!("Invalid {}: {}", field, e)))
}

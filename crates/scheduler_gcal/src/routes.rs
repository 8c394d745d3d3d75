// --- File: crates/scheduler_gcal/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use scheduler_common::logic::WorkingHours;
use scheduler_common::{config_error, SchedulerError};
use scheduler_config::AppConfig;
use std::sync::Arc;

use crate::auth::{create_connector, GoogleOAuthClient};
use crate::credentials::CredentialStore;
use crate::handlers::{
    admin_events_handler, available_slots_handler, check_connection_handler, connect_handler,
    create_event_handler, disconnect_handler, get_events_handler, oauth_callback_handler,
    GcalState,
};
use crate::service::GoogleCalendarService;

/// Builds the calendar proxy and admin routes backed by Google Calendar.
///
/// The credential store starts empty; the owner connects through `/auth/google`.
pub fn routes(config: Arc<AppConfig>) -> Result<Router, SchedulerError> {
    let connector =
        create_connector().map_err(|e| config_error(format!("TLS roots unavailable: {}", e)))?;
    let working_hours = WorkingHours::try_from(&config.booking)?;
    let credentials = CredentialStore::new();
    let oauth = Arc::new(
        GoogleOAuthClient::from_config(&config.google)
            .map_err(|e| config_error(format!("Invalid Google OAuth settings: {}", e)))?,
    );
    let calendar = Arc::new(GoogleCalendarService::new(
        connector,
        credentials.clone(),
        oauth.clone(),
    ));

    Ok(router_with_state(Arc::new(GcalState {
        config,
        credentials,
        oauth,
        calendar,
        working_hours,
    })))
}

/// Same routes over an already assembled state.
pub fn router_with_state(state: Arc<GcalState>) -> Router {
    let admin = Router::new()
        .route("/check-connection", get(check_connection_handler))
        .route("/events", get(admin_events_handler))
        .route("/disconnect", post(disconnect_handler));

    Router::new()
        .route("/auth/google", get(connect_handler))
        .route("/oauth/callback", get(oauth_callback_handler))
        .route("/create-event", post(create_event_handler))
        .route("/get-events", get(get_events_handler))
        .route("/available-slots", get(available_slots_handler))
        .nest("/admin", admin)
        .with_state(state)
}

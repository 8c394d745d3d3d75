// --- File: crates/scheduler_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::{HttpStatusCode, SchedulerError};

pub mod client;

/// Extension trait for SchedulerError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for SchedulerError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let SchedulerError::ExternalServiceError {
            service_name,
            message,
            detail,
        } = &self
        {
            error!(service = %service_name, "{}: {}", message, detail);
        }

        // Clients read a flat {"error": "..."} body
        let body = Json(json!({ "error": self.to_string() }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{external_service_error, validation_error};
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_connected_response() {
        let response = SchedulerError::NotConnected.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "No access token available. Please reconnect Google Calendar." })
        );
    }

    #[tokio::test]
    async fn test_external_error_response_has_only_message() {
        let response =
            external_service_error("google_calendar", "Failed to fetch events.", "invalid_grant")
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Failed to fetch events." })
        );
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let response = validation_error("Invalid date: 2024-13-01").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

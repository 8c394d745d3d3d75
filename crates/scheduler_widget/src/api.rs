// --- File: crates/scheduler_widget/src/api.rs ---
use chrono::NaiveDate;
use reqwest::{Client, Response};
use scheduler_common::http::client::DEFAULT_TIMEOUT_SECS;
use scheduler_common::logic::EventRange;
use scheduler_common::models::{
    ConnectionStatus, CreateEventRequest, CreateEventResponse, DisconnectResponse, ProviderEvent,
};
use scheduler_common::{create_client, BoxFuture};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The proxy answered with a non-success status.
    #[error("Proxy returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    pub fn is_not_connected(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// The calendar proxy as seen by the widget and the admin panel.
pub trait SchedulerApi: Send + Sync {
    /// Events already booked on `date`.
    fn fetch_events(&self, date: NaiveDate) -> BoxFuture<'_, Vec<ProviderEvent>, ApiError>;

    fn create_event(
        &self,
        request: CreateEventRequest,
    ) -> BoxFuture<'_, CreateEventResponse, ApiError>;

    fn check_connection(&self) -> BoxFuture<'_, bool, ApiError>;

    fn admin_events(&self, range: EventRange) -> BoxFuture<'_, Vec<ProviderEvent>, ApiError>;

    fn disconnect(&self) -> BoxFuture<'_, (), ApiError>;
}

/// [`SchedulerApi`] over HTTP, against the proxy at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpSchedulerApi {
    base_url: String,
    client: Client,
}

impl HttpSchedulerApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self::with_client(
            base_url,
            create_client(DEFAULT_TIMEOUT_SECS, true)?,
        ))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decodes a success body, or turns the proxy's `{"error": ...}` into [`ApiError::Status`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    debug!("Proxy error {}: {}", status, message);

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

impl SchedulerApi for HttpSchedulerApi {
    fn fetch_events(&self, date: NaiveDate) -> BoxFuture<'_, Vec<ProviderEvent>, ApiError> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url("/get-events"))
                .query(&[("date", date.format("%Y-%m-%d").to_string())])
                .send()
                .await?;
            read_json(response).await
        })
    }

    fn create_event(
        &self,
        request: CreateEventRequest,
    ) -> BoxFuture<'_, CreateEventResponse, ApiError> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("/create-event"))
                .json(&request)
                .send()
                .await?;
            read_json(response).await
        })
    }

    fn check_connection(&self) -> BoxFuture<'_, bool, ApiError> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url("/admin/check-connection"))
                .send()
                .await?;
            let status: ConnectionStatus = read_json(response).await?;
            Ok(status.connected)
        })
    }

    fn admin_events(&self, range: EventRange) -> BoxFuture<'_, Vec<ProviderEvent>, ApiError> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url("/admin/events"))
                .query(&[("range", range.as_tag())])
                .send()
                .await?;
            read_json(response).await
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, (), ApiError> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("/admin/disconnect"))
                .send()
                .await?;
            let _: DisconnectResponse = read_json(response).await?;
            Ok(())
        })
    }
}

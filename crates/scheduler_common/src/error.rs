// --- File: crates/scheduler_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// Message returned whenever a calendar call is attempted without a credential.
pub const NOT_CONNECTED_MESSAGE: &str =
    "No access token available. Please reconnect Google Calendar.";

/// The base error type shared by the scheduler crates.
///
/// Crates with their own error enums convert into this one at the HTTP
/// boundary, where it becomes a status code and a JSON body.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// No OAuth credential is held by the server
    #[error("{}", NOT_CONNECTED_MESSAGE)]
    NotConnected,

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("{0}")]
    ValidationError(String),

    /// The calendar provider rejected or failed a call.
    ///
    /// `message` is what the caller sees, `detail` is only logged.
    #[error("{message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
        detail: String,
    },
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SchedulerError {
    fn status_code(&self) -> u16 {
        match self {
            SchedulerError::NotConnected => 401,
            SchedulerError::ConfigError(_) => 500,
            SchedulerError::ValidationError(_) => 400,
            // Provider failures surface as a plain 500, there is no gateway semantics here
            SchedulerError::ExternalServiceError { .. } => 500,
        }
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> SchedulerError {
    SchedulerError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> SchedulerError {
    SchedulerError::ValidationError(message.to_string())
}

pub fn external_service_error<M: fmt::Display, D: fmt::Display>(
    service_name: &str,
    message: M,
    detail: D,
) -> SchedulerError {
    SchedulerError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
        detail: detail.to_string(),
    }
}

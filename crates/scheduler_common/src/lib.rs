// --- File: crates/scheduler_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP error responses and the shared client
pub mod logging; // Logging utilities
pub mod logic; // Slot generation and availability
pub mod models; // Provider-agnostic calendar models and wire types
pub mod services; // Service abstractions

#[cfg(test)]
mod logic_proptest;

// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, validation_error, HttpStatusCode, SchedulerError,
    NOT_CONNECTED_MESSAGE,
};

pub use http::{
    client::{create_client, HTTP_CLIENT},
    IntoHttpResponse,
};

pub use logging::{init, init_with_level, log_error};

pub use services::{BoxFuture, CalendarService};

// --- File: crates/scheduler_common/src/services.rs ---
//! Service abstractions for the calendar provider.
//!
//! Handlers depend on [`CalendarService`] rather than on a concrete client so
//! tests can swap in an in-memory implementation.

use std::future::Future;
use std::pin::Pin;

use crate::models::{CalendarEvent, EventQuery, ProviderEvent};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Calendar operations the scheduler needs from its provider.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List single events ordered by start time.
    fn list_events(
        &self,
        calendar_id: &str,
        query: EventQuery,
    ) -> BoxFuture<'_, Vec<ProviderEvent>, Self::Error>;

    /// Insert an event and return the provider's copy of it.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, ProviderEvent, Self::Error>;
}

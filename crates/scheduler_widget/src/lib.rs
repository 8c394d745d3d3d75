// --- File: crates/scheduler_widget/src/lib.rs ---
//! Client-side state of the booking widget and the admin dashboard.
//!
//! Rendering is left to the host; this crate owns the transitions, the
//! validation and the calls to the calendar proxy.

pub mod admin;
pub mod api;
pub mod calendar;
pub mod flow;
pub mod notice;

pub use admin::AdminPanel;
pub use api::{ApiError, HttpSchedulerApi, SchedulerApi};
pub use flow::{BookingFlow, BookingState, FlowError};

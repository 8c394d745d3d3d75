// --- File: crates/scheduler_gcal/src/lib.rs ---
pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod credentials;
pub mod handlers;
pub mod routes;
pub mod service;

pub use credentials::{Credential, CredentialStore};
pub use handlers::GcalState;
pub use routes::{router_with_state, routes};

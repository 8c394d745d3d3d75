// --- File: crates/scheduler_gcal/src/credentials.rs ---
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::TokenResponse;

/// Seconds before expiry at which a token is already treated as stale.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// The OAuth2 credential of the connected calendar owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

impl Credential {
    pub fn from_token_response(tokens: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: tokens.expires_at(now),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            scope: tokens.scope,
        }
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= now,
            None => false,
        }
    }
}

/// Single-slot, process-wide credential holder.
///
/// Cloning shares the slot. Empty until an OAuth callback succeeds, emptied
/// again by a disconnect, never persisted.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, credential: Credential) {
        *self.inner.write().await = Some(credential);
        info!("Google Calendar credential stored");
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
        info!("Google Calendar credential cleared");
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.is_some()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|credential| credential.access_token.clone())
    }

    pub async fn snapshot(&self) -> Option<Credential> {
        self.inner.read().await.clone()
    }

    /// Applies a refresh result to the held credential.
    ///
    /// Returns `false` and stores nothing when the credential was cleared in
    /// the meantime.
    pub async fn apply_refresh(&self, tokens: TokenResponse, now: DateTime<Utc>) -> bool {
        let mut slot = self.inner.write().await;
        match slot.as_mut() {
            Some(credential) => {
                credential.expires_at = tokens.expires_at(now);
                credential.access_token = tokens.access_token;
                if tokens.refresh_token.is_some() {
                    credential.refresh_token = tokens.refresh_token;
                }
                if tokens.scope.is_some() {
                    credential.scope = tokens.scope;
                }
                true
            }
            None => false,
        }
    }
}

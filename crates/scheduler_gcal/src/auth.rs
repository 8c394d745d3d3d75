// --- File: crates/scheduler_gcal/src/auth.rs ---
use chrono::{DateTime, Duration, Utc};
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    CalendarHub,
};
use oauth2::basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, HttpClientError, RedirectUrl, RefreshToken, Scope, TokenResponse as _, TokenUrl,
};
use scheduler_common::create_client;
use scheduler_common::http::client::DEFAULT_TIMEOUT_SECS;
use scheduler_config::GoogleConfig;
use thiserror::Error;
use tracing::{debug, warn};

// Type aliases for clarity
pub type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Authorization-code client with the endpoints Google needs set.
type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Token endpoint failure as reported by the `oauth2` crate.
pub type TokenRequestError = BasicRequestTokenError<HttpClientError<reqwest::Error>>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid OAuth endpoint URL: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),
    #[error("Failed to build token client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token request failed: {0}")]
    Token(#[from] TokenRequestError),
}

/// The parts of a token endpoint answer the credential store keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

impl TokenResponse {
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }
}

impl From<BasicTokenResponse> for TokenResponse {
    fn from(tokens: BasicTokenResponse) -> Self {
        Self {
            access_token: tokens.access_token().secret().clone(),
            expires_in: tokens
                .expires_in()
                .and_then(|ttl| i64::try_from(ttl.as_secs()).ok()),
            refresh_token: tokens.refresh_token().map(|token| token.secret().clone()),
            scope: tokens.scopes().map(|scopes| {
                scopes
                    .iter()
                    .map(|scope| scope.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            }),
        }
    }
}

/// OAuth2 authorization-code client for the Google consent screen.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    client: GoogleClient,
    scope: String,
    http: reqwest::Client,
}

impl GoogleOAuthClient {
    pub fn from_config(config: &GoogleConfig) -> Result<Self, AuthError> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(config.auth_url.clone())?)
            .set_token_uri(TokenUrl::new(config.token_url.clone())?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_uri.clone())?)
            .set_auth_type(AuthType::RequestBody);

        Ok(Self {
            client,
            scope: config.scope.clone(),
            // token calls must not follow redirects
            http: create_client(DEFAULT_TIMEOUT_SECS, false)?,
        })
    }

    /// The consent URL the connect endpoint redirects to.
    ///
    /// Asks for offline access so the callback also yields a refresh token.
    /// The `state` value is not checked on the callback.
    pub fn consent_url(&self) -> String {
        let (url, _state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(self.scope.clone()))
            .add_extra_param("access_type", "offline")
            .url();
        url.to_string()
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        debug!("Exchanging authorization code");
        let tokens = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .inspect_err(|e| warn!("Code exchange failed: {}", e))?;
        Ok(tokens.into())
    }

    /// Obtains a fresh access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        debug!("Refreshing Google access token");
        let refresh_token = RefreshToken::new(refresh_token.to_string());
        let tokens = self
            .client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .inspect_err(|e| warn!("Token refresh failed: {}", e))?;
        Ok(tokens.into())
    }
}

/// Builds the TLS connector shared by every Calendar API call.
pub fn create_connector() -> Result<Connector, std::io::Error> {
    Ok(HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build())
}

/// A Calendar hub authenticated with a plain bearer token.
pub fn create_calendar_hub(connector: &Connector, access_token: String) -> HubType {
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector.clone());
    CalendarHub::new(client, access_token)
}

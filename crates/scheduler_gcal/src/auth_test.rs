// --- File: crates/scheduler_gcal/src/auth_test.rs ---
#[cfg(test)]
mod tests {
    use crate::auth::{AuthError, GoogleOAuthClient, TokenResponse};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use chrono::{Duration, TimeZone, Utc};
    use oauth2::basic::BasicTokenResponse;
    use oauth2::url::Url;
    use oauth2::RequestTokenError;
    use scheduler_config::GoogleConfig;
    use serde_json::json;
    use std::collections::HashMap;

    fn google_config(auth_url: &str, token_url: &str) -> GoogleConfig {
        GoogleConfig {
            client_id: "client id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3001/oauth/callback".to_string(),
            calendar_id: "primary".to_string(),
            auth_url: auth_url.to_string(),
            token_url: token_url.to_string(),
            scope: "https://www.googleapis.com/auth/calendar".to_string(),
        }
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Token endpoint on a loopback port answering every request with `answer`.
    async fn token_endpoint(status: StatusCode, answer: serde_json::Value) -> String {
        let app = Router::new().route(
            "/token",
            post(move || {
                let answer = answer.clone();
                async move { (status, Json(answer)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/token", addr)
    }

    #[test]
    fn test_consent_url_carries_offline_code_request() {
        let client = GoogleOAuthClient::from_config(&google_config(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
        ))
        .unwrap();

        let url = client.consent_url();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));

        let query = query_of(&url);
        assert_eq!(query["client_id"], "client id");
        assert_eq!(query["redirect_uri"], "http://localhost:3001/oauth/callback");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "https://www.googleapis.com/auth/calendar");
        assert_eq!(query["access_type"], "offline");
        assert!(!query["state"].is_empty());
    }

    #[test]
    fn test_consent_url_keeps_existing_query() {
        let client = GoogleOAuthClient::from_config(&google_config(
            "https://accounts.example.com/auth?hd=example.com",
            "https://oauth2.example.com/token",
        ))
        .unwrap();

        let query = query_of(&client.consent_url());
        assert_eq!(query["hd"], "example.com");
        assert_eq!(query["response_type"], "code");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let result =
            GoogleOAuthClient::from_config(&google_config("not a url", "https://example.com/t"));
        assert!(matches!(result, Err(AuthError::InvalidUrl(_))));
    }

    #[test]
    fn test_token_response_conversion() {
        let tokens: BasicTokenResponse = serde_json::from_value(json!({
            "access_token": "ya29.a0Af",
            "expires_in": 3599,
            "refresh_token": "1//0g",
            "scope": "https://www.googleapis.com/auth/calendar",
            "token_type": "Bearer"
        }))
        .unwrap();
        let tokens = TokenResponse::from(tokens);

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(tokens.access_token, "ya29.a0Af");
        assert_eq!(tokens.expires_at(now), Some(now + Duration::seconds(3599)));
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//0g"));
        assert_eq!(
            tokens.scope.as_deref(),
            Some("https://www.googleapis.com/auth/calendar")
        );

        // refresh answers usually carry no refresh token
        let refreshed: BasicTokenResponse = serde_json::from_value(json!({
            "access_token": "ya29.b",
            "expires_in": 3599,
            "token_type": "Bearer"
        }))
        .unwrap();
        assert!(TokenResponse::from(refreshed).refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_exchange_code_reads_tokens() {
        let token_url = token_endpoint(
            StatusCode::OK,
            json!({
                "access_token": "ya29.fresh",
                "expires_in": 3599,
                "refresh_token": "1//fresh",
                "token_type": "Bearer"
            }),
        )
        .await;
        let client =
            GoogleOAuthClient::from_config(&google_config("https://accounts.example.com/auth", &token_url))
                .unwrap();

        let tokens = client.exchange_code("4/0Adeu5B").await.unwrap();
        assert_eq!(tokens.access_token, "ya29.fresh");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//fresh"));
        assert_eq!(tokens.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn test_rejected_grant_is_a_server_response() {
        let token_url = token_endpoint(
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_grant", "error_description": "Bad Request" }),
        )
        .await;
        let client =
            GoogleOAuthClient::from_config(&google_config("https://accounts.example.com/auth", &token_url))
                .unwrap();

        let result = client.refresh("1//revoked").await;
        assert!(matches!(
            result,
            Err(AuthError::Token(RequestTokenError::ServerResponse(_)))
        ));
    }

    #[tokio::test]
    async fn test_exchange_against_unreachable_endpoint_fails() {
        let client = GoogleOAuthClient::from_config(&google_config(
            "https://accounts.example.com/auth",
            "http://127.0.0.1:1/token",
        ))
        .unwrap();

        let result = client.exchange_code("4/0Adeu5B").await;
        assert!(matches!(
            result,
            Err(AuthError::Token(RequestTokenError::Request(_)))
        ));

        let result = client.refresh("1//0g").await;
        assert!(matches!(
            result,
            Err(AuthError::Token(RequestTokenError::Request(_)))
        ));
    }
}

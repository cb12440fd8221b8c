//! Session check endpoint.

use super::{cookies::session_token, types::SessionResponse};
use crate::api::state::AppState;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authentication status; anonymous for missing, invalid or expired tokens", body = SessionResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn me(headers: HeaderMap, state: Extension<Arc<AppState>>) -> impl IntoResponse {
    // Missing and rejected tokens produce the same body so callers cannot tell them apart.
    let token = session_token(&headers);
    let outcome = state.sessions().check(token.as_deref());

    (StatusCode::OK, Json(SessionResponse::from(outcome)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        api::state::AppConfig,
        auth::{IdentityClaims, SessionVerifier},
        config::ConfigStore,
    };
    use anyhow::Result;
    use axum::{body::to_bytes, http::HeaderValue};
    use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
    use secrecy::SecretString;

    const SECRET: &str = "session-test-secret";

    fn state() -> Extension<Arc<AppState>> {
        Extension(Arc::new(AppState::new(
            AppConfig::new(),
            ConfigStore::default(),
            SessionVerifier::new(&SecretString::from(SECRET.to_string())),
        )))
    }

    fn token(exp: u64) -> String {
        let claims = IdentityClaims {
            user_id: "user_1".to_string(),
            email: "roofer@example.com".to_string(),
            iat: Some(get_current_timestamp()),
            exp: Some(exp),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn with_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("auth-token={token}")).unwrap(),
        );
        headers
    }

    async fn body_of(headers: HeaderMap) -> Result<(StatusCode, String)> {
        let response = me(headers, state()).await.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, String::from_utf8(body.to_vec())?))
    }

    #[tokio::test]
    async fn no_token_is_anonymous() -> Result<()> {
        let (status, body) = body_of(HeaderMap::new()).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"authenticated":false}"#);
        Ok(())
    }

    #[tokio::test]
    async fn valid_token_returns_user() -> Result<()> {
        let (status, body) = body_of(with_cookie(&token(get_current_timestamp() + 600))).await?;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body)?;
        assert_eq!(value["authenticated"], serde_json::json!(true));
        assert_eq!(value["user"]["userId"], serde_json::json!("user_1"));
        assert_eq!(value["user"]["email"], serde_json::json!("roofer@example.com"));
        Ok(())
    }

    #[tokio::test]
    async fn expired_and_garbage_tokens_look_like_no_token() -> Result<()> {
        let (_, anonymous) = body_of(HeaderMap::new()).await?;

        let (status, expired) =
            body_of(with_cookie(&token(get_current_timestamp() - 600))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(expired, anonymous);

        let (status, garbage) = body_of(with_cookie("definitely-not-a-jwt")).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(garbage, anonymous);
        Ok(())
    }
}

//! Admin area password check.
//!
//! Independent of the site gate: a different secret and a different default,
//! read from the same configuration file.

use super::{
    PasswordCheck, check_password, cookies,
    types::{PasswordRequest, VerifyResponse},
};
use crate::{api::state::AppState, auth::SecretKind};
use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[utoipa::path(
    post,
    path = "/api/admin/verify-password",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Admin password accepted", body = VerifyResponse),
        (status = 401, description = "Wrong admin password", body = VerifyResponse),
        (status = 500, description = "Body is not valid JSON, or is null", body = VerifyResponse),
    ),
    tag = "admin"
)]
#[instrument(skip_all)]
pub async fn verify_admin_password(
    state: Extension<Arc<AppState>>,
    body: Bytes,
) -> impl IntoResponse {
    let check = check_password(&state, SecretKind::Admin, &body);

    let mut headers = HeaderMap::new();
    if check == PasswordCheck::Accepted {
        info!("Admin area unlocked");
        match cookies::admin_cookie(state.config()) {
            Ok(cookie) => {
                headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build admin cookie: {err}"),
        }
    }

    (check.status(), headers, Json(check.body()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::state::AppConfig,
        auth::SessionVerifier,
        config::{ConfigStore, DEFAULT_ADMIN_PASSWORD},
    };
    use anyhow::Result;
    use axum::{body::to_bytes, http::StatusCode};
    use std::fs;
    use tempfile::TempDir;

    fn state(dir: &TempDir, contents: &str) -> Result<Extension<Arc<AppState>>> {
        let path = dir.path().join("site-config.json");
        fs::write(&path, contents)?;
        Ok(Extension(Arc::new(AppState::new(
            AppConfig::new().with_admin_cookie_ttl_seconds(600),
            ConfigStore::new(path),
            SessionVerifier::from_optional_secret(None),
        ))))
    }

    #[tokio::test]
    async fn admin_password_sets_cookie() -> Result<()> {
        let dir = TempDir::new()?;
        let state = state(&dir, r#"{"password": "site", "adminPassword": "Adm1n!"}"#)?;

        let response = verify_admin_password(state, Bytes::from_static(br#"{"password":"Adm1n!"}"#))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cookie.starts_with("admin-password-verified=true"));
        assert!(cookie.contains("Max-Age=600"));
        Ok(())
    }

    #[tokio::test]
    async fn site_password_does_not_unlock_admin() -> Result<()> {
        let dir = TempDir::new()?;
        let state = state(&dir, r#"{"password": "site", "adminPassword": "Adm1n!"}"#)?;

        let response = verify_admin_password(state, Bytes::from_static(br#"{"password":"site"}"#))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], br#"{"success":false}"#);
        Ok(())
    }

    #[tokio::test]
    async fn missing_admin_field_uses_default() -> Result<()> {
        let dir = TempDir::new()?;
        let state = state(&dir, r#"{"passwordProtected": true, "password": "Xyz1#"}"#)?;

        let anything = verify_admin_password(
            state.clone(),
            Bytes::from_static(br#"{"password":"anything"}"#),
        )
        .await
        .into_response();
        assert_eq!(anything.status(), StatusCode::UNAUTHORIZED);

        let body = format!(r#"{{"password":"{DEFAULT_ADMIN_PASSWORD}"}}"#);
        let default = verify_admin_password(state, Bytes::from(body))
            .await
            .into_response();
        assert_eq!(default.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_server_error() -> Result<()> {
        let dir = TempDir::new()?;
        let state = state(&dir, "{}")?;

        let response = verify_admin_password(state, Bytes::from_static(b"{\"password\":"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}

//! Site gate endpoints: gate status and site password verification.

use super::{
    PasswordCheck, check_password, cookies,
    types::{GateStatusResponse, PasswordRequest, VerifyResponse},
};
use crate::{api::state::AppState, auth::SecretKind};
use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    get,
    path = "/api/password-verify",
    responses(
        (status = 200, description = "Whether the site gate is enabled", body = GateStatusResponse),
    ),
    tag = "gate"
)]
#[instrument(skip(state))]
pub async fn gate_status(state: Extension<Arc<AppState>>) -> impl IntoResponse {
    let config = state.store().load();

    (
        StatusCode::OK,
        Json(GateStatusResponse {
            password_protected: config.password_protected(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/api/password-verify",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password accepted", body = VerifyResponse),
        (status = 401, description = "Wrong password", body = VerifyResponse),
        (status = 500, description = "Body is not valid JSON, or is null", body = VerifyResponse),
    ),
    tag = "gate"
)]
#[instrument(skip_all)]
pub async fn verify_site_password(
    state: Extension<Arc<AppState>>,
    body: Bytes,
) -> impl IntoResponse {
    let check = check_password(&state, SecretKind::Site, &body);

    let mut headers = HeaderMap::new();
    if check == PasswordCheck::Accepted {
        match cookies::site_gate_cookie(state.config()) {
            Ok(cookie) => {
                headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build site gate cookie: {err}"),
        }
    }

    (check.status(), headers, Json(check.body()))
}

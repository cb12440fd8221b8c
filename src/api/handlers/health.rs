use crate::{GIT_COMMIT_HASH, api::state::AppState};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    config: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Service is up; `config` reports ok, missing or invalid", body = [Health]),
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(method: Method, state: Extension<Arc<AppState>>) -> impl IntoResponse {
    // Defaults cover both failure cases, so a bad file degrades the gate but not the service.
    let config_status = match state.store().try_load() {
        Ok(_) => "ok",
        Err(err) if err.is_missing_file() => "missing",
        Err(err) => {
            error!("Config file is not usable: {}", err);
            "invalid"
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: config_status.to_string(),
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let headers = x_app(&health)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();

            headers.insert("X-App", x_app_header_value);

            headers
        })
        .map_err(|err| {
            error!("Failed to parse X-App header: {}", err);
        });

    let headers = headers.unwrap_or_else(|()| HeaderMap::new());

    (StatusCode::OK, headers, body)
}

/// `name:version:commit`, with the commit cut to seven characters when longer.
fn x_app(health: &Health) -> String {
    let short_hash = health.commit.get(..7).unwrap_or(&health.commit);
    format!("{}:{}:{}", health.name, health.version, short_hash)
}

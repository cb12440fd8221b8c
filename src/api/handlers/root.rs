use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use tracing::debug;

pub async fn root() -> impl IntoResponse {
    format!(
        "{} {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!("No route for {}", uri.path());
    StatusCode::NOT_FOUND
}

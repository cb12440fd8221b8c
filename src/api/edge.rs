//! Edge filter wrapped around every page request.
//!
//! Page paths (anything outside `/api`, the Next.js asset folders and the
//! favicon) are *covered*. Under the default [`EdgePolicy::PassThrough`] a
//! covered request is only traced and forwarded. [`EdgePolicy::EnforceGate`]
//! turns the filter into a real gate that sends unverified browsers to the
//! password page while the site is protected.

use crate::api::{handlers::cookies::gate_verified, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};
use url::form_urlencoded;

/// Path prefixes (after the leading `/`) the filter never looks at.
const UNCOVERED_PREFIXES: [&str; 4] = ["api", "_next/static", "_next/image", "favicon.ico"];

const PASSWORD_PAGE: &str = "/password-verify";

static STATIC_ASSET: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\.(ico|png|jpg|jpeg|svg|gif|webp|css|js|woff|woff2|ttf|eot)$").ok()
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    #[default]
    PassThrough,
    EnforceGate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Path is outside the filter.
    Skip,
    Allow,
    /// Send the browser to this location with a temporary redirect.
    Redirect(String),
}

/// Whether the filter applies to `path`.
#[must_use]
pub fn covered(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    !UNCOVERED_PREFIXES
        .iter()
        .any(|prefix| rest.starts_with(prefix))
}

fn is_static_asset(path: &str) -> bool {
    STATIC_ASSET
        .as_ref()
        .is_some_and(|regex| regex.is_match(path))
}

fn exempt(path: &str) -> bool {
    path.starts_with("/_next")
        || path.starts_with("/admin")
        || path.starts_with(PASSWORD_PAGE)
        || is_static_asset(path)
}

fn password_page(path: &str) -> String {
    let redirect: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("{PASSWORD_PAGE}?redirect={redirect}")
}

/// Decide what to do with a request for `path`.
///
/// `gate_enabled` is only consulted when the decision depends on it, so the
/// configuration file is not read for pass-through or exempt requests.
pub fn decide(
    policy: EdgePolicy,
    path: &str,
    verified: bool,
    gate_enabled: impl FnOnce() -> bool,
) -> EdgeDecision {
    if !covered(path) {
        return EdgeDecision::Skip;
    }

    match policy {
        EdgePolicy::PassThrough => EdgeDecision::Allow,
        EdgePolicy::EnforceGate => {
            if exempt(path) || verified || !gate_enabled() {
                EdgeDecision::Allow
            } else {
                EdgeDecision::Redirect(password_page(path))
            }
        }
    }
}

/// Middleware entry point, installed with `middleware::from_fn_with_state`.
pub async fn filter(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let decision = decide(
        state.config().edge_policy(),
        req.uri().path(),
        gate_verified(req.headers()),
        || state.store().load().password_protected(),
    );

    match decision {
        EdgeDecision::Skip => next.run(req).await,
        EdgeDecision::Allow => {
            trace!(path = req.uri().path(), "edge filter pass");
            next.run(req).await
        }
        EdgeDecision::Redirect(location) => {
            debug!(path = req.uri().path(), "Site gate redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}

//! Cookie and bearer helpers for the gate and session endpoints.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};

use crate::api::state::AppConfig;

/// Cookie holding the identity token set by the login flow.
pub const SESSION_COOKIE_NAME: &str = "auth-token";
/// Cookie marking a browser that passed the site gate.
pub const SITE_GATE_COOKIE_NAME: &str = "site-password-verified";
/// Cookie marking a browser that passed the admin password check.
pub const ADMIN_COOKIE_NAME: &str = "admin-password-verified";

/// Return the value of the first cookie called `name`, across all `Cookie` headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == name {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Identity token from the session cookie, or a bearer header as a fallback.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE_NAME)
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(headers))
}

#[must_use]
pub fn gate_verified(headers: &HeaderMap) -> bool {
    cookie_value(headers, SITE_GATE_COOKIE_NAME).is_some_and(|value| value == "true")
}

/// Browser-session cookie set after a correct site password.
pub fn site_gate_cookie(config: &AppConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SITE_GATE_COOKIE_NAME}=true; Path=/; SameSite=Lax");
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Cookie set after a correct admin password; readable by the admin layout script.
pub fn admin_cookie(config: &AppConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.admin_cookie_ttl_seconds();
    let mut cookie =
        format!("{ADMIN_COOKIE_NAME}=true; Path=/; SameSite=Lax; Max-Age={ttl_seconds}");
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

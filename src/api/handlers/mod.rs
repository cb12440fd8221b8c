pub mod admin;
pub use self::admin::verify_admin_password;

pub mod gate;
pub use self::gate::{gate_status, verify_site_password};

pub mod health;
pub use self::health::health;

pub mod root;
pub use self::root::{not_found, root};

pub mod session;
pub use self::session::me;

pub mod cookies;
pub mod types;

// common functions for the handlers
use crate::{
    api::state::AppState,
    auth::{SecretKind, verify_password},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::any::Any;
use tracing::{debug, error};
use types::{SessionResponse, VerifyResponse};

/// Result of checking a password submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordCheck {
    Accepted,
    Rejected,
    /// The body could not be parsed; reported apart from a wrong password.
    Malformed,
}

impl PasswordCheck {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Accepted => StatusCode::OK,
            Self::Rejected => StatusCode::UNAUTHORIZED,
            Self::Malformed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn body(self) -> VerifyResponse {
        VerifyResponse {
            success: matches!(self, Self::Accepted),
        }
    }
}

/// Read the submitted password from a JSON body, whatever the declared content type.
///
/// Only an object with a string `password` yields a submission. Arrays,
/// scalars and objects with a missing or non-string `password` yield `None`.
///
/// # Errors
/// Returns an error if the body is not valid JSON or is `null`.
pub fn parse_password(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Null => Err(<serde_json::Error as serde::de::Error>::custom(
            "request body is null",
        )),
        Value::Object(fields) => Ok(fields
            .get("password")
            .and_then(Value::as_str)
            .map(str::to_string)),
        _ => Ok(None),
    }
}

/// Check a submission against the secret selected by `kind`, reading the
/// configuration fresh for this request.
pub fn check_password(state: &AppState, kind: SecretKind, body: &[u8]) -> PasswordCheck {
    let submitted = match parse_password(body) {
        Ok(submitted) => submitted,
        Err(err) => {
            error!("Error parsing {} password request: {err}", kind.as_str());
            return PasswordCheck::Malformed;
        }
    };

    let config = state.store().load();
    match submitted {
        Some(password) if verify_password(&config, kind, &password) => PasswordCheck::Accepted,
        _ => {
            debug!("Rejected {} password", kind.as_str());
            PasswordCheck::Rejected
        }
    }
}

/// Panic fallback for the password verifiers.
pub(crate) fn verify_panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    error!("Password verifier panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PasswordCheck::Malformed.body()),
    )
        .into_response()
}

/// Panic fallback for the session check: still answer "not authenticated".
pub(crate) fn session_panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    error!("Session check panicked");
    (StatusCode::OK, Json(SessionResponse::anonymous())).into_response()
}

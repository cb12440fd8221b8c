//! Request/response types for the gate and session endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Identity, SessionOutcome};

/// Public view of the gate; never carries the password.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateStatusResponse {
    pub password_protected: bool,
}

/// Documented shape of a password submission. Bodies are read loosely by
/// [`super::parse_password`], so this type only feeds the `OpenAPI` schema.
// No Debug: the body carries a plaintext password.
#[derive(ToSchema)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyResponse {
    pub success: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub email: String,
}

impl From<Identity> for SessionUser {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            email: identity.email,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

impl SessionResponse {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
        }
    }
}

impl From<SessionOutcome> for SessionResponse {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome.into_identity() {
            Some(identity) => Self {
                authenticated: true,
                user: Some(identity.into()),
            },
            None => Self::anonymous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AnonymousReason, TokenError};
    use anyhow::{Context, Result};

    #[test]
    fn gate_status_has_no_password_field() -> Result<()> {
        let value = serde_json::to_value(GateStatusResponse {
            password_protected: true,
        })?;
        let object = value.as_object().context("expected object")?;
        assert_eq!(object.len(), 1);
        assert_eq!(
            object.get("passwordProtected").and_then(serde_json::Value::as_bool),
            Some(true)
        );
        assert!(!object.contains_key("password"));
        Ok(())
    }

    #[test]
    fn anonymous_outcomes_serialize_identically() -> Result<()> {
        let none = serde_json::to_string(&SessionResponse::from(SessionOutcome::Anonymous(
            AnonymousReason::NoToken,
        )))?;
        let rejected = serde_json::to_string(&SessionResponse::from(SessionOutcome::Anonymous(
            AnonymousReason::Rejected(TokenError::Expired),
        )))?;
        assert_eq!(none, r#"{"authenticated":false}"#);
        assert_eq!(none, rejected);
        Ok(())
    }

    #[test]
    fn authenticated_outcome_uses_camel_case_user() -> Result<()> {
        let response = SessionResponse::from(SessionOutcome::Authenticated(Identity {
            user_id: "u1".to_string(),
            email: "a@example.com".to_string(),
        }));
        let value = serde_json::to_value(&response)?;
        assert_eq!(
            value,
            serde_json::json!({
                "authenticated": true,
                "user": { "userId": "u1", "email": "a@example.com" }
            })
        );
        Ok(())
    }
}

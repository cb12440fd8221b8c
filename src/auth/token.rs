//! Identity token verification.
//!
//! Tokens are HS256 JWTs minted by the login flow with `userId` and `email`
//! claims. Verification never fails the caller: every problem collapses into
//! [`SessionOutcome::Anonymous`], and the reason is kept for logs only.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument};

/// Insecure fallback used when no signing secret is configured.
pub const DEFAULT_JWT_SECRET: &str = "rif-roofing-secret-key-change-in-production";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    Immature,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("unsupported algorithm")]
    Algorithm,
    #[error("missing required claim: {0}")]
    MissingClaim(String),
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::Immature,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => Self::Algorithm,
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Claims carried by an identity token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    // Presence is enforced by validation so a missing `exp` reports as such.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// The authenticated user behind a valid token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Why a request was treated as anonymous. Never serialized.
#[derive(Debug)]
pub enum AnonymousReason {
    NoToken,
    Rejected(TokenError),
}

#[derive(Debug)]
pub enum SessionOutcome {
    Authenticated(Identity),
    Anonymous(AnonymousReason),
}

impl SessionOutcome {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous(_) => None,
        }
    }
}

/// Verifies identity tokens against a shared HS256 secret.
#[derive(Clone)]
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    fallback_secret: bool,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self::build(secret.expose_secret().as_bytes(), false)
    }

    /// Use `secret` when set, otherwise [`DEFAULT_JWT_SECRET`].
    #[must_use]
    pub fn from_optional_secret(secret: Option<&SecretString>) -> Self {
        match secret {
            Some(secret) if !secret.expose_secret().is_empty() => Self::new(secret),
            _ => Self::build(DEFAULT_JWT_SECRET.as_bytes(), true),
        }
    }

    fn build(secret: &[u8], fallback_secret: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            fallback_secret,
        }
    }

    /// True when running with the insecure built-in secret.
    #[must_use]
    pub const fn uses_fallback_secret(&self) -> bool {
        self.fallback_secret
    }

    /// Verify a token and extract its identity.
    ///
    /// # Errors
    /// Returns an error if the signature, algorithm, validity window or claims are invalid.
    pub fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims.into())
    }

    /// Answer the session question for an optional token.
    #[instrument(skip_all, fields(token_present = token.is_some()))]
    pub fn check(&self, token: Option<&str>) -> SessionOutcome {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return SessionOutcome::Anonymous(AnonymousReason::NoToken);
        };

        match self.decode(token) {
            Ok(identity) => SessionOutcome::Authenticated(identity),
            Err(err) => {
                debug!("Rejected identity token: {err}");
                SessionOutcome::Anonymous(AnonymousReason::Rejected(err))
            }
        }
    }
}

impl fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("decoding_key", &"***")
            .field("algorithms", &self.validation.algorithms)
            .field("fallback_secret", &self.fallback_secret)
            .finish()
    }
}

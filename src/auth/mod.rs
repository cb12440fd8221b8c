//! Credential checks shared by the HTTP handlers.
//!
//! - [`secret`] compares submitted passwords with the configured ones.
//! - [`token`] verifies the signed identity token behind the session check.

pub mod secret;
pub mod token;

pub use secret::{SecretKind, secret_matches, verify_password};
pub use token::{
    AnonymousReason, DEFAULT_JWT_SECRET, Identity, IdentityClaims, SessionOutcome,
    SessionVerifier, TokenError,
};

//! Shared-secret comparison for the site gate and the admin area.

use crate::config::GateConfig;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// Which configured secret a submission is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretKind {
    Site,
    Admin,
}

impl SecretKind {
    #[must_use]
    pub const fn expected(self, config: &GateConfig) -> &SecretString {
        match self {
            Self::Site => config.password(),
            Self::Admin => config.admin_password(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Admin => "admin",
        }
    }
}

/// Byte-exact, case-sensitive comparison that does not short-circuit on the
/// first differing byte. Lengths are not hidden.
#[must_use]
pub fn secret_matches(submitted: &str, expected: &SecretString) -> bool {
    submitted
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into()
}

#[must_use]
pub fn verify_password(config: &GateConfig, kind: SecretKind, submitted: &str) -> bool {
    secret_matches(submitted, kind.expected(config))
}

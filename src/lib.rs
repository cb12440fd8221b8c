//! # Sitegate (Site Gate & Session Verification)
//!
//! `sitegate` is the authentication back end of the roofing network website.
//! It answers four questions for the front end:
//!
//! - **Is the site gated?** `GET /api/password-verify` reports the
//!   `passwordProtected` flag and never the password itself.
//! - **Is this the site password?** `POST /api/password-verify`.
//! - **Is this the admin password?** `POST /api/admin/verify-password`.
//! - **Who is signed in?** `GET /api/auth/me` decodes the `auth-token` cookie.
//!
//! ## Configuration File
//!
//! Gate secrets live in a small JSON file that is re-read on every request, so
//! manual edits take effect without a restart. Unreadable files and missing
//! fields fall back to built-in defaults, one field at a time.
//!
//! > **Warning:** the built-in default passwords and the fallback JWT secret
//! > are placeholders. Operators should always provide their own.
//!
//! ## Failure Model
//!
//! Verifiers never fail the request on bad credentials. Wrong passwords answer
//! `401`, unparsable bodies answer `500`, and the session check always answers
//! `200` with a single `authenticated` boolean so callers cannot tell a missing
//! token from a forged or expired one.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

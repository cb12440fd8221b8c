use crate::{
    api::{
        self,
        edge::EdgePolicy,
        state::{AppConfig, AppState},
    },
    auth::SessionVerifier,
    cli::telemetry,
    config::ConfigStore,
};
use anyhow::Result;
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub config_file: PathBuf,
    pub jwt_secret: Option<SecretString>,
    pub secure_cookies: bool,
    pub admin_cookie_ttl_seconds: i64,
    pub enforce_gate: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let state = Arc::new(build_state(&args));

    log_startup_args(&args);
    warn_on_placeholders(&state);

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}

fn build_state(args: &Args) -> AppState {
    let edge_policy = if args.enforce_gate {
        EdgePolicy::EnforceGate
    } else {
        EdgePolicy::PassThrough
    };

    let config = AppConfig::new()
        .with_secure_cookies(args.secure_cookies)
        .with_admin_cookie_ttl_seconds(args.admin_cookie_ttl_seconds)
        .with_edge_policy(edge_policy);

    AppState::new(
        config,
        ConfigStore::new(args.config_file.clone()),
        SessionVerifier::from_optional_secret(args.jwt_secret.as_ref()),
    )
}

fn warn_on_placeholders(state: &AppState) {
    if state.sessions().uses_fallback_secret() {
        warn!("JWT_SECRET is not set; identity tokens are verified with the built-in fallback secret");
    }

    let gate = state.store().load();
    if gate.uses_default_password() {
        warn!("Site password is the built-in default; set \"password\" in the config file");
    }
    if gate.uses_default_admin_password() {
        warn!("Admin password is the built-in default; set \"adminPassword\" in the config file");
    }
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("config_file", args.config_file.display().to_string()),
        ("jwt_secret_set", args.jwt_secret.is_some().to_string()),
        ("secure_cookies", args.secure_cookies.to_string()),
        (
            "admin_cookie_ttl_seconds",
            args.admin_cookie_ttl_seconds.to_string(),
        ),
        ("enforce_gate", args.enforce_gate.to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

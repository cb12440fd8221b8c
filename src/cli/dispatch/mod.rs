//! Map parsed CLI arguments to an [`Action`].

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, gate};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if the gate arguments are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let gate_opts = gate::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        config_file: gate_opts.config_file,
        jwt_secret: gate_opts.jwt_secret,
        secure_cookies: gate_opts.secure_cookies,
        admin_cookie_ttl_seconds: gate_opts.admin_cookie_ttl_seconds,
        enforce_gate: gate_opts.enforce_gate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use std::path::PathBuf;

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(
            [
                ("SITEGATE_PORT", None::<&str>),
                ("SITEGATE_CONFIG_FILE", None),
                ("JWT_SECRET", None),
                ("SITEGATE_SECURE_COOKIES", None),
                ("SITEGATE_ADMIN_COOKIE_TTL_SECONDS", None),
                ("SITEGATE_ENFORCE_GATE", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "sitegate",
                    "--port",
                    "3001",
                    "--config-file",
                    "/srv/site-config.json",
                    "--secure-cookies",
                ]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 3001);
                    assert_eq!(args.config_file, PathBuf::from("/srv/site-config.json"));
                    assert!(args.jwt_secret.is_none());
                    assert!(args.secure_cookies);
                    assert!(!args.enforce_gate);
                }
            },
        );
    }
}

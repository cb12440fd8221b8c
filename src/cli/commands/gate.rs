use crate::{api::state::DEFAULT_ADMIN_COOKIE_TTL_SECONDS, config::DEFAULT_CONFIG_FILE};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::BoolishValueParser};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_CONFIG_FILE: &str = "config-file";
pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_SECURE_COOKIES: &str = "secure-cookies";
pub const ARG_ADMIN_COOKIE_TTL_SECONDS: &str = "admin-cookie-ttl-seconds";
pub const ARG_ENFORCE_GATE: &str = "enforce-gate";

#[derive(Debug)]
pub struct Options {
    pub config_file: PathBuf,
    pub jwt_secret: Option<SecretString>,
    pub secure_cookies: bool,
    pub admin_cookie_ttl_seconds: i64,
    pub enforce_gate: bool,
}

impl Options {
    /// Parse gate arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the admin cookie TTL is not positive.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let config_file = matches
            .get_one::<String>(ARG_CONFIG_FILE)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);

        // An empty JWT_SECRET counts as unset
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::from(value.clone()));

        let admin_cookie_ttl_seconds = matches
            .get_one::<i64>(ARG_ADMIN_COOKIE_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_ADMIN_COOKIE_TTL_SECONDS);
        if admin_cookie_ttl_seconds <= 0 {
            anyhow::bail!("--{ARG_ADMIN_COOKIE_TTL_SECONDS} must be greater than zero");
        }

        Ok(Self {
            config_file,
            jwt_secret,
            secure_cookies: matches.get_flag(ARG_SECURE_COOKIES),
            admin_cookie_ttl_seconds,
            enforce_gate: matches.get_flag(ARG_ENFORCE_GATE),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CONFIG_FILE)
                .short('c')
                .long(ARG_CONFIG_FILE)
                .help("Path to the site configuration JSON file")
                .env("SITEGATE_CONFIG_FILE")
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("HMAC secret used to verify identity tokens")
                .env("JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIES)
                .long(ARG_SECURE_COOKIES)
                .help("Add the Secure attribute to cookies set by the verifiers")
                .env("SITEGATE_SECURE_COOKIES")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_ADMIN_COOKIE_TTL_SECONDS)
                .long(ARG_ADMIN_COOKIE_TTL_SECONDS)
                .help("Lifetime of the admin verification cookie in seconds")
                .env("SITEGATE_ADMIN_COOKIE_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_ENFORCE_GATE)
                .long(ARG_ENFORCE_GATE)
                .help("Redirect unverified page requests to /password-verify while the gate is on")
                .env("SITEGATE_ENFORCE_GATE")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> anyhow::Result<Options> {
        let command = with_args(Command::new("test"));
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        let matches = command.try_get_matches_from(argv)?;
        Options::parse(&matches)
    }

    #[test]
    fn defaults() {
        temp_env::with_vars(
            [
                ("SITEGATE_CONFIG_FILE", None::<&str>),
                ("JWT_SECRET", None),
                ("SITEGATE_SECURE_COOKIES", None),
                ("SITEGATE_ADMIN_COOKIE_TTL_SECONDS", None),
                ("SITEGATE_ENFORCE_GATE", None),
            ],
            || {
                let options = parse(&[]);
                assert!(options.is_ok());
                if let Ok(options) = options {
                    assert_eq!(options.config_file, PathBuf::from(DEFAULT_CONFIG_FILE));
                    assert!(options.jwt_secret.is_none());
                    assert!(!options.secure_cookies);
                    assert_eq!(options.admin_cookie_ttl_seconds, 86_400);
                    assert!(!options.enforce_gate);
                }
            },
        );
    }

    #[test]
    fn reads_environment() {
        temp_env::with_vars(
            [
                ("SITEGATE_CONFIG_FILE", Some("/etc/sitegate/site-config.json")),
                ("JWT_SECRET", Some("s3cret")),
                ("SITEGATE_SECURE_COOKIES", Some("true")),
                ("SITEGATE_ADMIN_COOKIE_TTL_SECONDS", Some("3600")),
                ("SITEGATE_ENFORCE_GATE", Some("yes")),
            ],
            || {
                let options = parse(&[]);
                assert!(options.is_ok());
                if let Ok(options) = options {
                    assert_eq!(
                        options.config_file,
                        PathBuf::from("/etc/sitegate/site-config.json")
                    );
                    assert_eq!(
                        options.jwt_secret.as_ref().map(ExposeSecret::expose_secret),
                        Some("s3cret")
                    );
                    assert!(options.secure_cookies);
                    assert_eq!(options.admin_cookie_ttl_seconds, 3600);
                    assert!(options.enforce_gate);
                }
            },
        );
    }

    #[test]
    fn empty_jwt_secret_is_unset() {
        temp_env::with_var("JWT_SECRET", Some(""), || {
            let options = parse(&[]);
            assert!(options.is_ok_and(|options| options.jwt_secret.is_none()));
        });
    }

    #[test]
    fn rejects_non_positive_ttl() {
        temp_env::with_var("SITEGATE_ADMIN_COOKIE_TTL_SECONDS", None::<&str>, || {
            assert!(parse(&["--admin-cookie-ttl-seconds", "0"]).is_err());
            assert!(parse(&["--admin-cookie-ttl-seconds", "120"]).is_ok());
        });
    }
}

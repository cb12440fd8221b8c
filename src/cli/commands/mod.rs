pub mod gate;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("sitegate")
        .about("Site gate, admin password and session verification")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("SITEGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = gate::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "sitegate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Site gate, admin password and session verification".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_port() {
        temp_env::with_var("SITEGATE_PORT", None::<&str>, || {
            let matches = new().get_matches_from(vec!["sitegate", "--port", "3000"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(3000));

            let matches = new().get_matches_from(vec!["sitegate"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
        });
    }

    #[test]
    fn test_port_from_env() {
        temp_env::with_var("SITEGATE_PORT", Some("9090"), || {
            let matches = new().get_matches_from(vec!["sitegate"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
        });
    }

    #[test]
    fn test_invalid_port() {
        temp_env::with_var("SITEGATE_PORT", None::<&str>, || {
            let result = new().try_get_matches_from(vec!["sitegate", "--port", "not-a-port"]);
            assert!(result.is_err());
        });
    }
}

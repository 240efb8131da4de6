//! Command-line configuration.
//!
//! Mode words and flags resolve to a [`Role`]. Arguments the chat does not
//! understand never abort startup; they become notices shown in the chat
//! window once it is drawn.

use std::{ffi::OsString, path::PathBuf};

use clap::{
    Parser,
    error::{ContextKind, ContextValue, ErrorKind},
};
use parley_app::{DEFAULT_PORT, Level, Message, Role};

/// One-to-one terminal chat over TCP
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "parley")]
#[command(about = "One-to-one terminal chat over TCP")]
#[command(version)]
pub struct Args {
    /// Mode: `server` to host, `client` to join (default)
    #[arg(value_name = "MODE")]
    pub mode: Vec<String>,

    /// Host a chat instead of joining one
    #[arg(short, long)]
    pub server: bool,

    /// Address of the host to join
    #[arg(short, long, value_name = "ADDRESS", num_args = 0..=1, default_missing_value = "")]
    pub ip: Option<String>,

    /// Port to listen on or dial
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to join when no address is given
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write logs to this file. Without it nothing is logged.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Flags that were not recognized, in the order they were dropped.
    #[arg(skip)]
    pub unknown: Vec<String>,
}

impl Args {
    /// Parse `argv` without failing on flags the chat does not know.
    ///
    /// `-ip` is read as `--ip`. Unknown flags are dropped and kept in
    /// [`Args::unknown`]. Help, version and invalid values still error.
    pub fn parse_lenient<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv: Vec<OsString> = argv
            .into_iter()
            .map(|arg| {
                let arg = arg.into();
                if arg.to_str().is_some_and(|a| a.eq_ignore_ascii_case("-ip")) {
                    OsString::from("--ip")
                } else {
                    arg
                }
            })
            .collect();
        let mut unknown = Vec::new();

        loop {
            let err = match Self::try_parse_from(&argv) {
                Ok(mut args) => {
                    args.unknown = unknown;
                    return Ok(args);
                },
                Err(err) => err,
            };
            if err.kind() != ErrorKind::UnknownArgument {
                return Err(err);
            }
            let Some(ContextValue::String(token)) = err.get(ContextKind::InvalidArg) else {
                return Err(err);
            };
            // The program name is never a flag.
            let Some(index) = argv.iter().skip(1).position(|arg| {
                arg.to_str().is_some_and(|a| a == token.as_str() || a.starts_with(&format!("{token}=")))
            }) else {
                return Err(err);
            };
            let dropped = argv.remove(index + 1);
            unknown.push(dropped.to_string_lossy().into_owned());
        }
    }
}

/// Resolved session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Which side of the chat to play.
    pub role: Role,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Log destination.
    pub log_file: Option<PathBuf>,
    /// Messages to show before the role starts.
    pub notices: Vec<Message>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            role: Role::default(),
            log_level: "info".to_string(),
            log_file: None,
            notices: Vec::new(),
        }
    }
}

impl ChatConfig {
    /// Resolve parsed arguments.
    ///
    /// The first `server` or `client` word (any case) picks the mode; other
    /// words and unknown flags become warnings. `--server` always hosts.
    pub fn from_args(args: &Args) -> Self {
        let mut notices = Vec::new();
        let mut hosting = None;

        for token in &args.mode {
            let word = token.to_lowercase();
            match word.as_str() {
                "server" | "client" => {
                    hosting.get_or_insert(word == "server");
                },
                _ => notices.push(unrecognized(&word)),
            }
        }
        notices.extend(args.unknown.iter().map(|flag| unrecognized(&flag.to_lowercase())));

        let host = match args.ip.as_deref() {
            Some("") => {
                notices.push(Message::system(Level::Error, "No address specified!"));
                args.host.clone()
            },
            Some(ip) => ip.to_string(),
            None => args.host.clone(),
        };

        let role = if args.server || hosting == Some(true) {
            Role::Host { port: args.port }
        } else {
            Role::Peer { host, port: args.port }
        };

        Self {
            role,
            log_level: args.log_level.clone(),
            log_file: args.log_file.clone(),
            notices,
        }
    }
}

fn unrecognized(token: &str) -> Message {
    Message::system(Level::Warning, format!("Unrecognized parameter \"{token}\"!"))
}

#[cfg(test)]
mod tests {
    use parley_app::Origin;

    use super::*;

    fn config(argv: &[&str]) -> ChatConfig {
        let args =
            Args::parse_lenient(std::iter::once("parley").chain(argv.iter().copied())).unwrap();
        ChatConfig::from_args(&args)
    }

    fn notice_texts(config: &ChatConfig) -> Vec<&str> {
        config.notices.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn no_arguments_joins_localhost() {
        assert_eq!(config(&[]), ChatConfig::default());
    }

    #[test]
    fn server_word_hosts_on_default_port() {
        let config = config(&["SERVER"]);
        assert_eq!(config.role, Role::Host { port: DEFAULT_PORT });
        assert!(config.notices.is_empty());
    }

    #[test]
    fn server_flag_hosts_on_given_port() {
        let config = config(&["-s", "-p", "4000"]);
        assert_eq!(config.role, Role::Host { port: 4000 });
    }

    #[test]
    fn first_mode_word_wins() {
        let config = config(&["client", "server"]);
        assert!(matches!(config.role, Role::Peer { .. }));
    }

    #[test]
    fn ip_picks_the_host() {
        let config = config(&["client", "--ip", "10.0.0.7"]);
        assert_eq!(config.role, Role::Peer { host: "10.0.0.7".into(), port: DEFAULT_PORT });
    }

    #[test]
    fn empty_ip_is_an_error_notice() {
        let config = config(&["-i"]);

        assert_eq!(config.role, Role::Peer { host: "localhost".into(), port: DEFAULT_PORT });
        assert_eq!(config.notices, [Message::system(Level::Error, "No address specified!")]);
    }

    #[test]
    fn unknown_words_become_warnings() {
        let config = config(&["server", "Bogus", "extra"]);

        assert_eq!(config.role, Role::Host { port: DEFAULT_PORT });
        assert_eq!(notice_texts(&config), [
            "Unrecognized parameter \"bogus\"!",
            "Unrecognized parameter \"extra\"!",
        ]);
        assert!(config.notices.iter().all(|m| m.origin == Origin::System(Level::Warning)));
    }

    #[test]
    fn logging_options_pass_through() {
        let config = config(&["--log-level", "debug", "--log-file", "/tmp/parley.log"]);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/parley.log")));
    }

    #[test]
    fn dash_ip_takes_the_next_address() {
        let config = config(&["-ip", "10.0.0.7"]);

        assert_eq!(config.role, Role::Peer { host: "10.0.0.7".into(), port: DEFAULT_PORT });
        assert!(config.notices.is_empty());
    }

    #[test]
    fn dash_ip_without_address_is_an_error_notice() {
        let config = config(&["client", "-IP"]);

        assert_eq!(config.role, Role::Peer { host: "localhost".into(), port: DEFAULT_PORT });
        assert_eq!(config.notices, [Message::system(Level::Error, "No address specified!")]);
    }

    #[test]
    fn unknown_flag_is_a_warning_not_an_exit() {
        let config = config(&["server", "-x"]);

        assert_eq!(config.role, Role::Host { port: DEFAULT_PORT });
        assert_eq!(config.notices, [Message::system(
            Level::Warning,
            "Unrecognized parameter \"-x\"!"
        )]);
    }

    #[test]
    fn unknown_long_flags_are_dropped_in_order() {
        let args =
            Args::parse_lenient(["parley", "--Loud", "-p", "4000", "--color=never"]).unwrap();

        assert_eq!(args.unknown, ["--Loud", "--color=never"]);
        assert_eq!(args.port, 4000);
        assert_eq!(notice_texts(&ChatConfig::from_args(&args)), [
            "Unrecognized parameter \"--loud\"!",
            "Unrecognized parameter \"--color=never\"!",
        ]);
    }

    #[test]
    fn invalid_values_still_fail() {
        let err = Args::parse_lenient(["parley", "--port", "many"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}

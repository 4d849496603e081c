//! Server configuration, parsed from command-line flags.

use crate::protocol::DEFAULT_MAX_LINE_LENGTH;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use thiserror::Error;

/// Errors from command-line parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Start the server with this configuration
    Run(Config),
    /// Print usage and exit
    Help,
    /// Print the version and exit
    Version,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Longest accepted command line, in bytes
    pub max_line_length: usize,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parses configuration from command-line arguments, excluding the program name.
    pub fn from_args<I>(args: I) -> Result<Action, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => {
                    config.host = next_value(&mut args, &arg)?;
                }
                "--port" | "-p" => {
                    config.port = parse_value(&mut args, &arg)?;
                }
                "--max-line" => {
                    config.max_line_length = parse_value(&mut args, &arg)?;
                }
                "--log-level" => {
                    config.log_level = next_value(&mut args, &arg)?;
                }
                "--help" => return Ok(Action::Help),
                "--version" | "-v" => return Ok(Action::Version),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(Action::Run(config))
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, ConfigError> {
    let value = next_value(args, flag)?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}

/// Usage text for `--help`.
pub const HELP: &str = r#"
LineKV - An In-Memory, Multi-Type Key-Value Store

USAGE:
    linekv [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>        Port to listen on (default: 6379)
        --max-line <BYTES>   Longest accepted command line (default: 65536)
        --log-level <LEVEL>  Log filter when RUST_LOG is unset (default: info)
    -v, --version            Print version information
        --help               Print this help message

CONNECTING:
    Any line-based client works, one command per line:
    $ nc 127.0.0.1 6379
    SET name Ariz
    OK
    GET name
    Ariz
"#;

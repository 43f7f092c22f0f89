//! Command-line parsing
//!
//! Flags only override values; everything else comes from the layered
//! configuration in [`super::Config::load`].

use std::fmt;

pub const USAGE: &str = "Usage: epubcheck-server [options]
Options:
  -H, --hostname <hostname>  Hostname to bind to (default: localhost)
  -p, --port <port>          Port to bind to (default: 8003)
  -t, --threads <threads>    Number of worker threads (default: 4)
  -c, --config <file>        Configuration file (default: epubcheck-server.toml)
  -h, --help                 Print this help and exit";

/// Values given on the command line
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub threads: Option<usize>,
    pub config_file: Option<String>,
}

/// What the process should do after parsing its arguments
#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    Run(CliOverrides),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    UnknownOption(String),
    MissingValue(String),
    InvalidValue { option: String, value: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOption(option) => write!(f, "Unknown option: {option}"),
            Self::MissingValue(option) => write!(f, "Missing argument for option: {option}"),
            Self::InvalidValue { option, value } => {
                write!(f, "Invalid value for option {option}: {value}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

/// Parse process arguments (without the program name)
pub fn parse<I, S>(args: I) -> Result<CliAction, ArgsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut overrides = CliOverrides::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(option) = args.next() {
        match option.as_str() {
            "-H" | "--hostname" => overrides.host = Some(value_for(&option, &mut args)?),
            "-p" | "--port" => overrides.port = Some(parse_number(&option, &mut args)?),
            "-t" | "--threads" => overrides.threads = Some(parse_number(&option, &mut args)?),
            "-c" | "--config" => overrides.config_file = Some(value_for(&option, &mut args)?),
            "-h" | "--help" => return Ok(CliAction::Help),
            _ => return Err(ArgsError::UnknownOption(option)),
        }
    }

    Ok(CliAction::Run(overrides))
}

fn value_for(option: &str, args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    args.next()
        .ok_or_else(|| ArgsError::MissingValue(option.to_string()))
}

fn parse_number<T: std::str::FromStr>(
    option: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<T, ArgsError> {
    let value = value_for(option, args)?;
    value.parse().map_err(|_| ArgsError::InvalidValue {
        option: option.to_string(),
        value,
    })
}

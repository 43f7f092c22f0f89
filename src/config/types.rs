// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Size of the validation worker pool
    pub threads: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// `plain` or `json`
    pub access_log_format: String,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
}

/// External validator invocation
///
/// `args` entries may contain the `{file}` and `{locale}` placeholders,
/// substituted for every check.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    #[serde(default = "default_validator_program")]
    pub program: String,
    #[serde(default = "default_validator_args")]
    pub args: Vec<String>,
    #[serde(default = "default_validator_locale")]
    pub locale: String,
}

fn default_validator_program() -> String {
    "epubcheck".to_string()
}

fn default_validator_args() -> Vec<String> {
    ["{file}", "--json", "-", "--locale", "{locale}"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_validator_locale() -> String {
    "en".to_string()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            program: default_validator_program(),
            args: default_validator_args(),
            locale: default_validator_locale(),
        }
    }
}

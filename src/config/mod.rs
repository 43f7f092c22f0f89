// Configuration module entry point
// Builds the immutable process configuration and the shared request state

pub mod args;
mod state;
pub mod types;

pub use args::{CliAction, CliOverrides};
pub use state::AppState;
pub use types::{Config, ValidatorConfig};

/// Configuration file looked up when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "epubcheck-server";

impl Config {
    /// Load configuration from defaults, config file, `EPUBCHECK_*`
    /// environment variables and command-line overrides, in increasing
    /// precedence.
    pub fn load(overrides: &CliOverrides) -> Result<Self, config::ConfigError> {
        Self::load_from(overrides, environment())
    }

    fn load_from(
        overrides: &CliOverrides,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let file = match overrides.config_file.as_deref() {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut builder = config::Config::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 8003)?
            .set_default("server.threads", 4)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "plain")?
            .add_source(file)
            .add_source(env);

        if let Some(host) = &overrides.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(port) = overrides.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(threads) = overrides.threads {
            builder = builder.set_override("server.threads", i64::try_from(threads).unwrap_or(i64::MAX))?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loopback config with the given pool size and access logging off
    #[cfg(test)]
    pub fn for_tests(threads: usize) -> Self {
        Self {
            server: types::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                threads,
            },
            logging: types::LoggingConfig {
                access_log: false,
                access_log_format: "plain".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            validator: ValidatorConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.threads == 0 {
            return Err(config::ConfigError::Message(
                "server.threads must be at least 1".to_string(),
            ));
        }
        match self.logging.access_log_format.as_str() {
            "plain" | "json" => Ok(()),
            other => Err(config::ConfigError::Message(format!(
                "logging.access_log_format must be 'plain' or 'json', got '{other}'"
            ))),
        }
    }
}

/// `EPUBCHECK_SERVER__PORT=9000` sets `server.port`
fn environment() -> config::Environment {
    config::Environment::with_prefix("EPUBCHECK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

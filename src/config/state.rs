// Application state module
// Everything a request handler needs, shared read-only across connections

use std::sync::Arc;

use super::types::Config;
use crate::logger::LogWriter;
use crate::report::{ReportSettings, Validator};
use crate::server::WorkerPool;

/// Application state
pub struct AppState {
    pub config: Config,
    pub pool: WorkerPool,
    pub validator: Arc<dyn Validator>,
    /// Destination of per-request access lines
    pub log: Arc<LogWriter>,
}

impl AppState {
    /// Create `AppState` with a worker pool sized from `server.threads`
    pub fn new(config: Config, validator: Arc<dyn Validator>, log: Arc<LogWriter>) -> Self {
        let pool = WorkerPool::new(config.server.threads);
        Self {
            config,
            pool,
            validator,
            log,
        }
    }

    /// Loopback state with access logging off
    #[cfg(test)]
    pub fn for_tests(threads: usize, validator: Arc<dyn Validator>) -> Self {
        let log = LogWriter::open(None, None).unwrap();
        Self::new(Config::for_tests(threads), validator, Arc::new(log))
    }

    /// Report sink settings for a target with the given label
    pub fn report_settings(&self, label: String) -> ReportSettings {
        ReportSettings::new(label).with_locale(&self.config.validator.locale)
    }
}

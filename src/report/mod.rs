//! Validation report module
//!
//! The external validator is reached only through the [`Validator`] trait. It
//! receives the target path and a pre-configured [`Report`] sink, and fills
//! the sink with diagnostic messages. The handler then serializes the sink
//! with [`Report::generate`].

mod command;

pub use command::CommandValidator;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Message severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Suppressed,
    Usage,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Position of a diagnostic inside the publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub path: String,
    #[serde(default = "unknown_position")]
    pub line: i64,
    #[serde(default = "unknown_position")]
    pub column: i64,
    #[serde(default)]
    pub context: Option<String>,
}

const fn unknown_position() -> i64 {
    -1
}

/// One diagnostic entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "ID")]
    pub id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub additional_locations: usize,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// How a report sink is configured before the validator sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub locale: String,
    pub min_severity: Severity,
    pub label: String,
}

impl ReportSettings {
    /// English locale, reporting `Info` and above
    pub fn new(label: String) -> Self {
        Self {
            locale: "en".to_string(),
            min_severity: Severity::Info,
            label,
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }
}

/// Report sink handed to the validator
#[derive(Debug)]
pub struct Report {
    settings: ReportSettings,
    messages: Vec<Message>,
    publication: Map<String, Value>,
    items: Vec<Value>,
    checker_version: Option<String>,
    started: DateTime<Local>,
}

impl Report {
    pub fn new(settings: ReportSettings) -> Self {
        Self {
            settings,
            messages: Vec::new(),
            publication: Map::new(),
            items: Vec::new(),
            checker_version: None,
            started: Local::now(),
        }
    }

    pub const fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Record a message. Returns `false` when it falls below the reporting level.
    pub fn message(&mut self, message: Message) -> bool {
        if message.severity < self.settings.min_severity {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    pub fn set_publication(&mut self, publication: Map<String, Value>) {
        self.publication = publication;
    }

    pub fn add_item(&mut self, item: Value) {
        self.items.push(item);
    }

    pub fn set_checker_version(&mut self, version: String) {
        self.checker_version = Some(version);
    }

    /// Serialize the collected diagnostics as the JSON report document
    pub fn generate(&self) -> Result<String, serde_json::Error> {
        let elapsed = Local::now().signed_duration_since(self.started);
        let document = ReportDocument {
            messages: &self.messages,
            custom_message_file_name: None,
            checker: CheckerInfo {
                path: &self.settings.label,
                filename: &self.settings.label,
                checker_version: self.checker_version.as_deref(),
                check_date: self.started.format("%d-%m-%Y %H:%M:%S").to_string(),
                elapsed_time: elapsed.num_milliseconds(),
                n_fatal: self.count(Severity::Fatal),
                n_error: self.count(Severity::Error),
                n_warning: self.count(Severity::Warning),
                n_usage: self.count(Severity::Usage),
            },
            publication: &self.publication,
            items: &self.items,
        };
        serde_json::to_string_pretty(&document)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    messages: &'a [Message],
    custom_message_file_name: Option<&'a str>,
    checker: CheckerInfo<'a>,
    publication: &'a Map<String, Value>,
    items: &'a [Value],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckerInfo<'a> {
    path: &'a str,
    filename: &'a str,
    checker_version: Option<&'a str>,
    check_date: String,
    elapsed_time: i64,
    n_fatal: usize,
    n_error: usize,
    n_warning: usize,
    n_usage: usize,
}

/// Validator failure; surfaced as a failed request, never as a report
#[derive(Debug)]
pub enum ValidatorError {
    Spawn {
        program: String,
        source: std::io::Error,
    },
    Output {
        program: String,
        detail: String,
    },
    Encode(serde_json::Error),
}

impl fmt::Display for ValidatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { program, source } => write!(f, "failed to run '{program}': {source}"),
            Self::Output { program, detail } => {
                write!(f, "unreadable output from '{program}': {detail}")
            }
            Self::Encode(e) => write!(f, "failed to encode report: {e}"),
        }
    }
}

impl std::error::Error for ValidatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Output { .. } => None,
            Self::Encode(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ValidatorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}

/// The external validator
///
/// Implementations block for as long as the check takes.
pub trait Validator: Send + Sync {
    fn check(&self, path: &Path, report: &mut Report) -> Result<(), ValidatorError>;
}

/// Base name of the target, or the whole path when it has none
pub fn label_for(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Run one check against a fresh sink and return the serialized report
pub fn run_check(
    validator: &dyn Validator,
    path: &Path,
    settings: ReportSettings,
) -> Result<String, ValidatorError> {
    let mut report = Report::new(settings);
    validator.check(path, &mut report)?;
    Ok(report.generate()?)
}

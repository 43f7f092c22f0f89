// External validator process
// Runs the configured checker program and imports its JSON output into the sink

use serde::Deserialize;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use super::{Message, Report, Validator, ValidatorError};
use crate::config::ValidatorConfig;

const FILE_PLACEHOLDER: &str = "{file}";
const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Validator backed by an external checker program writing a JSON report to stdout
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

#[derive(Deserialize)]
struct CheckerOutput {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    publication: Option<Map<String, Value>>,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    checker: Option<CheckerMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckerMetadata {
    #[serde(default)]
    checker_version: Option<String>,
}

impl CommandValidator {
    pub const fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn command_args(&self, path: &Path, locale: &str) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| {
                if arg == FILE_PLACEHOLDER {
                    // Passed through untouched so non-UTF-8 paths survive
                    path.as_os_str().to_os_string()
                } else {
                    arg.replace(FILE_PLACEHOLDER, &path.to_string_lossy())
                        .replace(LOCALE_PLACEHOLDER, locale)
                        .into()
                }
            })
            .collect()
    }
}

impl Validator for CommandValidator {
    fn check(&self, path: &Path, report: &mut Report) -> Result<(), ValidatorError> {
        let args = self.command_args(path, &report.settings().locale);
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ValidatorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The checker exits non-zero when it finds errors, so only the output decides
        let parsed: CheckerOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| ValidatorError::Output {
                program: self.program.clone(),
                detail: format!(
                    "{e} (exit status {}, stderr: {})",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })?;

        for message in parsed.messages {
            report.message(message);
        }
        if let Some(publication) = parsed.publication {
            report.set_publication(publication);
        }
        for item in parsed.items {
            report.add_item(item);
        }
        if let Some(version) = parsed.checker.and_then(|c| c.checker_version) {
            report.set_checker_version(version);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportSettings, Severity};

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "epubcheck-server-command-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn sink() -> Report {
        Report::new(ReportSettings::new("book.epub".to_string()))
    }

    #[test]
    fn test_placeholders_substituted() {
        let validator = CommandValidator::from_config(&ValidatorConfig::default());
        let args = validator.command_args(Path::new("/tmp/book.epub"), "de");
        assert_eq!(
            args,
            vec![
                OsString::from("/tmp/book.epub"),
                OsString::from("--json"),
                OsString::from("-"),
                OsString::from("--locale"),
                OsString::from("de"),
            ]
        );

        let embedded = CommandValidator::new("java".to_string(), vec!["--in={file}".to_string()]);
        assert_eq!(
            embedded.command_args(Path::new("a.epub"), "en"),
            vec![OsString::from("--in=a.epub")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_imports_checker_output() {
        // The target file holds the JSON the fake checker prints back
        let target = temp_file(
            "output.json",
            r#"{
                "messages": [
                    {"ID": "RSC-005", "severity": "ERROR", "message": "Error while parsing file", "locations": []},
                    {"ID": "ACC-004", "severity": "USAGE", "message": "Usage hint", "locations": []}
                ],
                "checker": {"checkerVersion": "5.1.0"},
                "publication": {"title": "Test Book", "language": "en"},
                "items": [{"id": "chapter1", "fileName": "EPUB/chapter1.xhtml"}]
            }"#,
        );
        let validator = CommandValidator::new(
            "sh".to_string(),
            vec!["-c".to_string(), "cat \"$0\"".to_string(), "{file}".to_string()],
        );

        let mut report = sink();
        validator.check(&target, &mut report).unwrap();
        std::fs::remove_file(&target).ok();

        assert_eq!(report.count(Severity::Error), 1);
        assert_eq!(report.count(Severity::Usage), 0);

        let doc: Value = serde_json::from_str(&report.generate().unwrap()).unwrap();
        assert_eq!(doc["checker"]["checkerVersion"], "5.1.0");
        assert_eq!(doc["publication"]["title"], "Test Book");
        assert_eq!(doc["items"][0]["id"], "chapter1");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_json_output_is_an_error() {
        let validator = CommandValidator::new(
            "sh".to_string(),
            vec!["-c".to_string(), "echo not json; echo boom >&2".to_string()],
        );
        let err = validator
            .check(Path::new("/tmp/book.epub"), &mut sink())
            .unwrap_err();
        assert!(matches!(err, ValidatorError::Output { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let validator =
            CommandValidator::new("epubcheck-server-no-such-program".to_string(), Vec::new());
        let err = validator
            .check(Path::new("/tmp/book.epub"), &mut sink())
            .unwrap_err();
        assert!(matches!(err, ValidatorError::Spawn { .. }));
    }
}

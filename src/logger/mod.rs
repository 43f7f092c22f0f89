//! Logger module
//!
//! Provides logging utilities for the server:
//! - Server lifecycle logging
//! - Per-request access lines (`plain` or `json`)
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogWriter;

use crate::config::Config;
use std::net::SocketAddr;
use std::sync::Arc;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. The returned writer is the
/// one request handlers write access lines to.
pub fn init(config: &Config) -> std::io::Result<Arc<LogWriter>> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_starting(host: &str, port: u16) {
    write_info(&format!("Starting server on {host}:{port}"));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Worker threads: {}", config.server.threads));
    write_info(&format!(
        "Validator: {} {}",
        config.validator.program,
        config.validator.args.join(" ")
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_shutdown() {
    write_info("[Shutdown] Interrupt received, stopping");
}

/// Log formatted access log entry
pub fn log_access(writer: &LogWriter, entry: &AccessLogEntry, format: &str) {
    writer.write_access(&entry.format(format));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

//! Access log format module
//!
//! Supports two formats:
//! - `plain`: `[time] Request POST (/path/to/book.epub) - Response 200 OK`
//! - `json`: one JSON object per line

use chrono::{DateTime, Local};
use hyper::StatusCode;
use std::net::SocketAddr;

/// Access log entry for one request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub time: DateTime<Local>,
    pub remote_addr: Option<SocketAddr>,
    pub method: String,
    /// Decoded validation target; absent when the body was never read
    pub path: Option<String>,
    pub status: StatusCode,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(method: String, status: StatusCode) -> Self {
        Self {
            time: Local::now(),
            remote_addr: None,
            method,
            path: None,
            status,
            request_time_us: 0,
        }
    }

    /// Format the log entry; anything other than `json` is plain
    pub fn format(&self, format: &str) -> String {
        match format {
            "json" => self.format_json(),
            _ => self.format_plain(),
        }
    }

    fn format_plain(&self) -> String {
        let target = self
            .path
            .as_ref()
            .map(|p| format!(" ({p})"))
            .unwrap_or_default();
        format!(
            "[{}] Request {}{} - Response {} {}",
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            target,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "time": self.time.to_rfc3339(),
            "remote_addr": self.remote_addr.map(|a| a.to_string()),
            "method": self.method,
            "path": self.path,
            "status": self.status.as_u16(),
            "reason": self.status.canonical_reason(),
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}

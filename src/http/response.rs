//! HTTP response building module
//!
//! Builders for the three responses the server emits, decoupled from the
//! request handling that picks between them.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Build 405 Method Not Allowed response with an empty body
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a JSON response from an already serialized body
pub fn build_json_response(status: StatusCode, json: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 400 response for a validation target that does not exist
pub fn build_not_found_response(path: &str) -> Response<Full<Bytes>> {
    build_json_response(StatusCode::BAD_REQUEST, not_found_body(path))
}

/// `{ "message": "File not found: <path>" }`
pub fn not_found_body(path: &str) -> String {
    format!(
        "{{ \"message\": \"{}\" }}",
        escape_quotes_and_backslashes(&format!("File not found: {path}"))
    )
}

/// Escape `\` as `\\` and `"` as `\"`; every other character passes through
///
/// Not a general JSON string escaper: control characters are left as they are.
pub fn escape_quotes_and_backslashes(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

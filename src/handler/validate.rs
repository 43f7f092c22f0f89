//! Validation request handling
//!
//! Method check, body decoding, existence check, delegation to the validator
//! on the worker pool, response encoding. One access line per request.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::error::HandlerError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::report;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, HandlerError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::new(req.method().to_string(), StatusCode::METHOD_NOT_ALLOWED);
    entry.remote_addr = remote_addr;

    // 1. Only POST carries a validation target
    if req.method() != Method::POST {
        log_access(&state, entry, started);
        return Ok(http::build_405_response());
    }

    // 2. Whole body as the candidate path
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            entry.status = StatusCode::BAD_REQUEST;
            log_access(&state, entry, started);
            return Err(HandlerError::Body(e.into()));
        }
    };
    let path = http::decode_path(&body);
    entry.path = Some(path.clone());

    // 3. Existence check
    let target = PathBuf::from(&path);
    if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
        entry.status = StatusCode::BAD_REQUEST;
        log_access(&state, entry, started);
        return Ok(http::build_not_found_response(&path));
    }

    // 4. Delegation, logged before the check runs
    entry.status = StatusCode::OK;
    log_access(&state, entry, started);
    match validate(&state, target).await {
        Ok(json) => Ok(http::build_json_response(StatusCode::OK, json)),
        Err(e) => {
            logger::log_error(&format!("Validation of '{path}' failed: {e}"));
            Err(e)
        }
    }
}

/// Run the validator for `target` on the worker pool
async fn validate(state: &Arc<AppState>, target: PathBuf) -> Result<String, HandlerError> {
    let settings = state.report_settings(report::label_for(&target));
    let validator = Arc::clone(&state.validator);
    let json = state
        .pool
        .submit(move || report::run_check(validator.as_ref(), &target, settings))
        .await??;
    Ok(json)
}

fn log_access(state: &AppState, mut entry: AccessLogEntry, started: Instant) {
    if !state.config.logging.access_log {
        return;
    }
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&state.log, &entry, &state.config.logging.access_log_format);
}

//! Error types
//!
//! Input problems never become errors: they are answered with a 400 or 405
//! response. These types cover startup failures and the per-request failures
//! that close a single connection.

use std::fmt;
use std::net::SocketAddr;

use crate::report::ValidatorError;
use crate::server::PoolError;

/// Fatal startup error
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Logger(std::io::Error),
    Runtime(std::io::Error),
    Resolve {
        host: String,
        port: u16,
        source: Option<std::io::Error>,
    },
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Logger(e) => write!(f, "failed to open log file: {e}"),
            Self::Runtime(e) => write!(f, "failed to start runtime: {e}"),
            Self::Resolve {
                host,
                port,
                source: Some(e),
            } => write!(f, "cannot resolve {host}:{port}: {e}"),
            Self::Resolve {
                host,
                port,
                source: None,
            } => write!(f, "cannot resolve {host}:{port}: no addresses found"),
            Self::Bind { addr, source } => write!(f, "cannot bind {addr}: {source}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Logger(e) | Self::Runtime(e) | Self::Bind { source: e, .. } => Some(e),
            Self::Resolve { source, .. } => source
                .as_ref()
                .map(|e| e as &(dyn std::error::Error + 'static)),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Failure of a single request; hyper closes that connection without a response
#[derive(Debug)]
pub enum HandlerError {
    Body(Box<dyn std::error::Error + Send + Sync>),
    Validator(ValidatorError),
    Pool(PoolError),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(e) => write!(f, "failed to read request body: {e}"),
            Self::Validator(e) => write!(f, "validator failed: {e}"),
            Self::Pool(e) => write!(f, "worker failed: {e}"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Body(e) => Some(e.as_ref()),
            Self::Validator(e) => Some(e),
            Self::Pool(e) => Some(e),
        }
    }
}

impl From<ValidatorError> for HandlerError {
    fn from(e: ValidatorError) -> Self {
        Self::Validator(e)
    }
}

impl From<PoolError> for HandlerError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

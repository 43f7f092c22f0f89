//! Request handler module
//!
//! Turns one inbound request into one response. No state is shared between
//! requests apart from the read-only [`crate::config::AppState`].

pub mod validate;

// Re-export main entry point
pub use validate::handle_request;

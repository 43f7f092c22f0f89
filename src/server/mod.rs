// Server module entry point
// Listener binding, the accept loop, per-connection tasks and the worker pool

pub mod connection;
pub mod listener;
pub mod pool;

// `loop` is a keyword, so the file is mounted as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

#[cfg(test)]
mod tests;

pub use listener::bind;
pub use pool::{PoolError, WorkerPool};
pub use server_loop::{serve, serve_with_shutdown};

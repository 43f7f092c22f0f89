//! Validation worker pool
//!
//! A fixed number of permits guards the blocking thread pool. `submit` waits
//! for a permit in FIFO order without any queue limit, then runs the job on a
//! blocking thread while holding it. At most `size` jobs run at once.

use std::fmt;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::JoinError;

#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

#[derive(Debug)]
pub enum PoolError {
    /// The permit semaphore was closed
    Closed(AcquireError),
    /// The job panicked or the runtime shut down under it
    Join(JoinError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(e) => write!(f, "worker pool closed: {e}"),
            Self::Join(e) => write!(f, "worker job aborted: {e}"),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Closed(e) => Some(e),
            Self::Join(e) => Some(e),
        }
    }
}

impl WorkerPool {
    /// Pool running at most `size` jobs at a time
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    /// Queue `job` until a worker is free, run it, and return its result
    pub async fn submit<F, T>(&self, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(PoolError::Closed)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(PoolError::Join)
    }
}

use std::io;
use thiserror::Error;

/// Error type for thread pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A job was submitted after the pool began shutting down.
    #[error("submission on a stopped thread pool")]
    Stopped,

    /// The pool was asked to run with zero workers.
    #[error("thread pool needs at least one worker")]
    NoWorkers,

    /// A worker thread could not be created.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),

    /// The task panicked while running.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// The task was dropped before it could deliver a result.
    #[error("task result was never delivered")]
    Disconnected,
}

/// Result type alias for thread pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

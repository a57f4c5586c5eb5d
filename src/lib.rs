#![deny(missing_docs)]

//! A fixed-size worker thread pool with strict FIFO dispatch.
//!
//! Jobs submitted to the pool are queued in submission order and picked up
//! by long-lived worker threads. Typed submissions return a [`TaskHandle`]
//! that yields the job's result, or the panic it raised, once a worker has
//! run it. Shutdown drains every queued job before the workers are joined.

mod error;
mod handle;
/// Thread pool implementations and their configuration.
pub mod thread_pool;

pub use error::{PoolError, Result};
pub use handle::TaskHandle;
pub use thread_pool::{
    default_num_threads, NaiveThreadPool, PoolState, SharedQueueThreadPool, ThreadPool,
    ThreadPoolBuilder,
};

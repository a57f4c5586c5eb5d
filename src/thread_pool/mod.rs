use std::panic::{self, AssertUnwindSafe};

use crate::handle::{task_channel, TaskHandle};
use crate::Result;

/// A type-erased unit of work as stored in a pool's queue.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Returns the worker count used when none is configured: the detected
/// hardware parallelism, but never fewer than two.
pub fn default_num_threads() -> usize {
    num_cpus::get().max(2)
}

/// A thread pool for executing jobs concurrently.
///
/// Implementors manage a pool of worker threads and distribute
/// incoming jobs across them.
pub trait ThreadPool {
    /// Creates a new thread pool with the given number of threads.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created (e.g., zero threads, or
    /// a thread could not be spawned). No worker is left running in that case.
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Spawns a function into the thread pool.
    ///
    /// The function will be executed by one of the threads in the pool. A
    /// panic inside the function is contained; the pool keeps its threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Stopped`](crate::PoolError::Stopped) once shutdown
    /// has begun. The function is dropped without running.
    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;

    /// Submits a function whose result is wanted back.
    ///
    /// Arguments are bound by capturing them in the closure. The returned
    /// handle yields the function's return value, or its panic, once a
    /// worker has run it.
    fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (completer, handle) = task_channel();
        self.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task));
            // The caller may already have dropped its handle.
            let _ = completer.send(outcome);
        })?;
        Ok(handle)
    }

    /// Stops accepting jobs and runs everything already queued.
    ///
    /// The first call blocks until the worker threads have exited, except a
    /// worker it is called from, which cannot be joined. Later or concurrent
    /// calls only make sure the pool is closed and may return before the
    /// drain has finished.
    fn shutdown(&self);
}

mod builder;
mod naive;
mod queue;
mod shared_queue;

pub use self::builder::ThreadPoolBuilder;
pub use self::naive::NaiveThreadPool;
pub use self::queue::PoolState;
pub use self::shared_queue::SharedQueueThreadPool;

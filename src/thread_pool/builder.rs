use std::fmt;
use std::sync::Arc;

use super::SharedQueueThreadPool;
use crate::Result;

/// Callback run once on each worker thread before it takes any job.
pub(crate) type StartHandler = Arc<dyn Fn() + Send + Sync + 'static>;

const DEFAULT_THREAD_NAME: &str = "pool-worker";

/// Configures and starts a [`SharedQueueThreadPool`].
///
/// ```
/// use fifo_pool::{ThreadPool, ThreadPoolBuilder};
///
/// let pool = ThreadPoolBuilder::new()
///     .num_threads(4)
///     .thread_name("render")
///     .build()
///     .unwrap();
/// let sum = pool.submit(|| 2 + 3).unwrap();
/// assert_eq!(sum.get().unwrap(), 5);
/// ```
#[derive(Default)]
pub struct ThreadPoolBuilder {
    pub(super) num_threads: Option<usize>,
    pub(super) thread_name: Option<String>,
    pub(super) stack_size: Option<usize>,
    pub(super) start_handler: Option<StartHandler>,
}

impl ThreadPoolBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads.
    ///
    /// Defaults to [`default_num_threads`](super::default_num_threads).
    /// Zero is rejected by [`build`](Self::build).
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Sets the prefix of worker thread names. Workers are named
    /// `{prefix}-{index}`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = Some(prefix.into());
        self
    }

    /// Sets the stack size, in bytes, of each worker thread.
    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Sets a callback that every worker runs exactly once, on its own
    /// thread, before it starts taking jobs. Useful for setting up
    /// thread-local state.
    ///
    /// A panic in the callback is logged and the worker still serves jobs.
    pub fn on_worker_start<F>(mut self, start: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.start_handler = Some(Arc::new(start));
        self
    }

    /// Spawns the worker threads and returns the running pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::NoWorkers`](crate::PoolError::NoWorkers) for a zero
    /// worker count, [`PoolError::Spawn`](crate::PoolError::Spawn) if a
    /// thread could not be created. In the latter case the workers already
    /// started are shut down and joined first.
    pub fn build(self) -> Result<SharedQueueThreadPool> {
        SharedQueueThreadPool::start(self)
    }

    pub(super) fn thread_name_prefix(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(DEFAULT_THREAD_NAME)
    }
}

impl fmt::Debug for ThreadPoolBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolBuilder")
            .field("num_threads", &self.num_threads)
            .field("thread_name", &self.thread_name)
            .field("stack_size", &self.stack_size)
            .field("start_handler", &self.start_handler.is_some())
            .finish()
    }
}

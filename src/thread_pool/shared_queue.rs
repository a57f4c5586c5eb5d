use std::io;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error, trace, warn};

use super::builder::{StartHandler, ThreadPoolBuilder};
use super::queue::{PoolState, TaskQueue};
use super::{default_num_threads, Job, ThreadPool};
use crate::handle::panic_message;
use crate::{PoolError, Result};

/// A thread pool using a shared FIFO job queue.
///
/// A fixed set of workers pull jobs from one queue, oldest first. Jobs run
/// outside the queue lock, so a long job never blocks submitters or other
/// workers. A panicking job is contained and the worker moves on.
///
/// Dropping the pool shuts it down: queued jobs still run, then every
/// worker is joined. The exception is a pool whose last owner is dropped on
/// one of its own workers: that worker cannot join itself, so it is
/// detached and exits once the queue is drained, and the state stays
/// [`PoolState::Stopping`].
pub struct SharedQueueThreadPool {
    queue: Arc<TaskQueue>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_threads: usize,
}

impl SharedQueueThreadPool {
    /// Returns a builder for configuring a pool.
    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }

    pub(super) fn start(builder: ThreadPoolBuilder) -> Result<Self> {
        Self::start_with(builder, |spawner, body| spawner.spawn(body))
    }

    /// Starts the workers, creating each thread through `spawn`.
    fn start_with<S>(builder: ThreadPoolBuilder, mut spawn: S) -> Result<Self>
    where
        S: FnMut(thread::Builder, Job) -> io::Result<JoinHandle<()>>,
    {
        let num_threads = builder.num_threads.unwrap_or_else(default_num_threads);
        if num_threads == 0 {
            return Err(PoolError::NoWorkers);
        }

        let pool = SharedQueueThreadPool {
            queue: Arc::new(TaskQueue::new()),
            workers: Mutex::new(Vec::with_capacity(num_threads)),
            num_threads,
        };

        for id in 0..num_threads {
            let mut spawner =
                thread::Builder::new().name(format!("{}-{id}", builder.thread_name_prefix()));
            if let Some(size) = builder.stack_size {
                spawner = spawner.stack_size(size);
            }

            let queue = Arc::clone(&pool.queue);
            let start_handler = builder.start_handler.clone();
            let body: Job = Box::new(move || run_worker(id, &queue, start_handler));
            match spawn(spawner, body) {
                Ok(handle) => pool.workers.lock().unwrap().push(handle),
                Err(e) => {
                    error!("Failed to spawn worker {id}: {e}");
                    pool.shutdown();
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        debug!("Started thread pool with {num_threads} workers");
        Ok(pool)
    }

    /// Number of worker threads the pool was started with.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Number of jobs submitted but not yet picked up by a worker.
    pub fn queued_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.queue.state()
    }
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        ThreadPoolBuilder::new().num_threads(threads as usize).build()
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(job))
    }

    /// Closes the queue, lets the workers drain it and joins them.
    ///
    /// Calling it again is a no-op, and a concurrent second call returns
    /// without waiting for the first call's joins. If it is called from one
    /// of the pool's own workers, that worker is not joined; it is kept for
    /// a later shutdown or `Drop` to join, and the state stays
    /// [`PoolState::Stopping`] until then.
    fn shutdown(&self) {
        if self.queue.close() {
            debug!(
                "Shutting down thread pool, {} jobs left to drain",
                self.queue.len()
            );
        }

        let workers = mem::take(&mut *self.workers.lock().unwrap());
        if workers.is_empty() {
            return;
        }

        let current = thread::current().id();
        let mut skipped = Vec::new();
        for worker in workers {
            if worker.thread().id() == current {
                warn!(
                    "Thread pool shut down from its own worker {:?}, not joining it",
                    worker.thread().name()
                );
                skipped.push(worker);
                continue;
            }
            if worker.join().is_err() {
                error!("Worker thread terminated abnormally");
            }
        }

        if skipped.is_empty() {
            self.queue.mark_stopped();
            debug!("Thread pool stopped");
        } else {
            self.workers.lock().unwrap().extend(skipped);
        }
    }
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Body of a worker thread: run the start handler once, then take jobs
/// until the queue is closed and empty.
fn run_worker(id: usize, queue: &TaskQueue, start_handler: Option<StartHandler>) {
    if let Some(start) = start_handler {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| start())) {
            error!(
                "Worker {id} start handler panicked: {}",
                panic_message(&*payload)
            );
        }
    }
    debug!("Worker {id} ready");

    while let Some(job) = queue.pop_blocking() {
        trace!("Worker {id} executing job");
        // Catch panics so the worker loop continues
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!(
                "Worker {id} job panicked, continuing: {}",
                panic_message(&*payload)
            );
        }
    }

    debug!("Worker {id}: queue closed and drained, shutting down");
}

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use log::{error, warn};

use super::ThreadPool;
use crate::handle::panic_message;
use crate::{PoolError, Result};

/// A naive thread pool that spawns a new thread for every job.
///
/// This is the simplest possible "pool": it doesn't reuse threads at all
/// and gives no ordering guarantee between jobs. It still refuses jobs
/// after shutdown and joins every thread it started, apart from the one a
/// job calls `shutdown` from. Useful as a baseline for benchmarking against
/// real thread pools.
pub struct NaiveThreadPool {
    threads: Mutex<Threads>,
}

struct Threads {
    stopped: bool,
    handles: Vec<JoinHandle<()>>,
}

impl ThreadPool for NaiveThreadPool {
    fn new(_threads: u32) -> Result<Self> {
        Ok(NaiveThreadPool {
            threads: Mutex::new(Threads {
                stopped: false,
                handles: Vec::new(),
            }),
        })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut threads = self.threads.lock().unwrap();
        if threads.stopped {
            return Err(PoolError::Stopped);
        }
        threads.handles.retain(|handle| !handle.is_finished());

        let handle = thread::Builder::new().spawn(move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                error!("Job panicked: {}", panic_message(&*payload));
            }
        })?;
        threads.handles.push(handle);
        Ok(())
    }

    fn shutdown(&self) {
        let handles = {
            let mut threads = self.threads.lock().unwrap();
            threads.stopped = true;
            mem::take(&mut threads.handles)
        };
        let current = thread::current().id();
        for handle in handles {
            if handle.thread().id() == current {
                warn!("Naive pool shut down from one of its own jobs, not joining that thread");
                continue;
            }
            if handle.join().is_err() {
                error!("Job thread terminated abnormally");
            }
        }
    }
}

impl Drop for NaiveThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

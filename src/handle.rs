use std::any::Any;
use std::panic;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::{PoolError, Result};

/// The sending half of a task's result channel, owned by the job wrapper.
pub(crate) type Completer<T> = Sender<thread::Result<T>>;

/// Creates a one-shot result channel for a single task.
pub(crate) fn task_channel<T>() -> (Completer<T>, TaskHandle<T>) {
    let (tx, rx) = channel::bounded(1);
    (tx, TaskHandle { rx })
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

fn into_result<T>(outcome: thread::Result<T>) -> Result<T> {
    outcome.map_err(|payload| PoolError::TaskPanicked(panic_message(&*payload)))
}

/// A handle to the result of a submitted task.
///
/// The handle is fulfilled exactly once, by whichever worker runs the task,
/// and is consumed by reading it. Dropping the handle does not cancel the
/// task; its result is simply discarded.
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has run and returns its result.
    ///
    /// A panic inside the task is reported as [`PoolError::TaskPanicked`].
    pub fn get(self) -> Result<T> {
        match self.rx.recv() {
            Ok(outcome) => into_result(outcome),
            Err(_) => Err(PoolError::Disconnected),
        }
    }

    /// Blocks until the task has run and returns its result, resuming the
    /// task's panic on the calling thread if it panicked.
    pub fn join(self) -> Result<T> {
        match self.rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(PoolError::Disconnected),
        }
    }

    /// Waits at most `timeout` for the result.
    ///
    /// On expiry the handle is given back unconsumed so the caller can wait
    /// again. The task itself keeps running.
    pub fn get_timeout(self, timeout: Duration) -> std::result::Result<Result<T>, Self> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Ok(into_result(outcome)),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(PoolError::Disconnected)),
        }
    }

    /// Returns `true` if the result is ready to be read without blocking.
    pub fn is_finished(&self) -> bool {
        !self.rx.is_empty()
    }
}

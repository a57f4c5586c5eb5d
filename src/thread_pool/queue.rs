use std::sync::Mutex;

use crossbeam::channel::{self, Receiver, Sender};

use super::Job;
use crate::{PoolError, Result};

/// Lifecycle of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Accepting jobs; workers are looping.
    Running,
    /// No new jobs are accepted; workers are draining the queue.
    Stopping,
    /// Every worker has been joined and the queue is empty.
    Stopped,
}

/// State guarded by the queue lock. Dropping `sender` is the stop flag.
struct Gate {
    state: PoolState,
    sender: Option<Sender<Job>>,
}

/// An unbounded FIFO hand-off between submitters and workers.
///
/// Jobs travel over an MPMC channel whose only sender lives behind the
/// lock, so a push can never race past `close`. Receivers keep draining
/// buffered jobs after the sender is gone and only then report the end.
pub(crate) struct TaskQueue {
    gate: Mutex<Gate>,
    receiver: Receiver<Job>,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        TaskQueue {
            gate: Mutex::new(Gate {
                state: PoolState::Running,
                sender: Some(sender),
            }),
            receiver,
        }
    }

    /// Appends a job at the tail and wakes one parked worker.
    pub(crate) fn push(&self, job: Job) -> Result<()> {
        let gate = self.gate.lock().unwrap();
        match &gate.sender {
            // The queue owns a receiver, so the send cannot disconnect.
            Some(sender) => sender.send(job).map_err(|_| PoolError::Stopped),
            None => Err(PoolError::Stopped),
        }
    }

    /// Blocks until the oldest job can be taken. Returns `None` once the
    /// queue is closed and empty.
    pub(crate) fn pop_blocking(&self) -> Option<Job> {
        self.receiver.recv().ok()
    }

    /// Sets the stop flag and wakes every parked worker.
    ///
    /// Returns `false` if the queue was already closed.
    pub(crate) fn close(&self) -> bool {
        let mut gate = self.gate.lock().unwrap();
        if gate.state != PoolState::Running {
            return false;
        }
        gate.state = PoolState::Stopping;
        gate.sender = None;
        true
    }

    pub(crate) fn mark_stopped(&self) {
        self.gate.lock().unwrap().state = PoolState::Stopped;
    }

    pub(crate) fn state(&self) -> PoolState {
        self.gate.lock().unwrap().state
    }

    /// Number of jobs waiting to be dequeued.
    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn recording_job(log: &Arc<Mutex<Vec<u32>>>, n: u32) -> Job {
        let log = Arc::clone(log);
        Box::new(move || log.lock().unwrap().push(n))
    }

    #[test]
    fn pops_in_push_order() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for n in 1..=5 {
            queue.push(recording_job(&log, n)).unwrap();
        }
        assert_eq!(queue.len(), 5);
        for _ in 0..5 {
            (queue.pop_blocking().unwrap())();
        }
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn close_rejects_pushes_but_keeps_queued_jobs() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        queue.push(recording_job(&log, 1)).unwrap();
        queue.push(recording_job(&log, 2)).unwrap();

        assert!(queue.close());
        assert!(!queue.close());
        assert_eq!(queue.state(), PoolState::Stopping);
        assert!(matches!(
            queue.push(recording_job(&log, 3)),
            Err(PoolError::Stopped)
        ));

        while let Some(job) = queue.pop_blocking() {
            job();
        }
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
        assert_eq!(queue.len(), 0);

        queue.mark_stopped();
        assert_eq!(queue.state(), PoolState::Stopped);
        assert!(!queue.close());
    }

    #[test]
    fn parked_pop_wakes_on_push_and_on_close() {
        let queue = Arc::new(TaskQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut taken = 0;
                while let Some(job) = queue.pop_blocking() {
                    job();
                    taken += 1;
                }
                taken
            })
        };

        let log = Arc::new(Mutex::new(Vec::new()));
        queue.push(recording_job(&log, 10)).unwrap();
        queue.close();

        assert_eq!(consumer.join().unwrap(), 1);
        assert_eq!(*log.lock().unwrap(), vec![10]);
    }
}

//! Fixed-size worker pool for asynchronous indexing tasks.
//!
//! Jobs are dispatched over an unbounded crossbeam channel, so `submit`
//! never blocks the caller; ordering between submitted tasks is not
//! guaranteed. A panicking task is caught and logged at the task boundary
//! and the executor keeps serving.

use crossbeam_channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A bounded pool of concurrent executors created at startup and torn down
/// on drop. Dropping the pool closes the channel, drains already-queued
/// jobs, and joins every worker.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` executors (at least one).
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();

        let workers = (0..size.max(1))
            .map(|_| {
                let receiver: Receiver<Job> = receiver.clone();
                std::thread::spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        if catch_unwind(AssertUnwindSafe(job)).is_err() {
                            tracing::error!("Indexing task panicked; executor continues");
                        }
                    }
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Fire-and-forget dispatch of a job to an available executor. Jobs
    /// queue internally while all executors are busy.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(job)).is_err() {
                tracing::error!("Worker pool already shut down; task dropped");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain queued jobs and exit
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked during shutdown");
            }
        }
    }
}

//! Small fixed-size worker pool for fire-and-forget background jobs
//! (audio cues, speech synthesis, playback).
//!
//! Replaces ad hoc thread spawning per call: the thread count is fixed and
//! the queue is bounded, so repeated use cannot grow threads without limit.

use crossbeam_channel::{bounded, Sender};
use std::thread::JoinHandle;
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct TaskPool {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        let (job_tx, job_rx) = bounded::<Job>(queue_depth);

        let workers = (0..workers.max(1))
            .map(|_| {
                let rx = job_rx.clone();
                std::thread::spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    debug!("Task pool worker exiting");
                })
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            workers,
        }
    }

    /// Queue a job. Returns false (and drops the job) when the queue is full.
    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) -> bool {
        let Some(tx) = &self.job_tx else {
            return false;
        };
        match tx.try_send(Box::new(job)) {
            Ok(()) => true,
            Err(_) => {
                warn!("Task pool queue full, dropping job");
                false
            }
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain remaining jobs and exit.
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(2, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn jobs_run_on_worker_threads() {
        let pool = TaskPool::new(2, 8);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            assert!(pool.spawn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        // Dropping the pool joins workers after the queue drains.
        drop(pool);
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn full_queue_drops_jobs_instead_of_blocking() {
        let pool = TaskPool::new(1, 1);
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);

        // Occupy the single worker.
        pool.spawn(move || {
            let _ = gate_rx.recv();
        });

        // Fill the queue, then overflow it.
        let mut accepted = 0;
        for _ in 0..16 {
            if pool.spawn(|| {}) {
                accepted += 1;
            }
        }
        assert!(accepted < 16);

        drop(gate_tx);
    }
}

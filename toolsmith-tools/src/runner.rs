//! Strategies for running the sub-invocations of a batch

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// One deferred sub-invocation; yields its formatted result lines
pub type BatchJob = Box<dyn FnOnce() -> String + Send>;

/// Runs batch jobs and returns their results in job order
pub trait BatchRunner: Send + Sync {
    /// Run every job. The result at index `i` belongs to job `i`.
    fn run(&self, jobs: Vec<BatchJob>) -> Vec<String>;
}

/// Runs jobs one after another on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialRunner;

impl BatchRunner for SequentialRunner {
    fn run(&self, jobs: Vec<BatchJob>) -> Vec<String> {
        jobs.into_iter()
            .enumerate()
            .map(|(index, job)| run_job(index, job))
            .collect()
    }
}

/// Runs jobs on a bounded rayon thread pool
#[derive(Debug, Clone)]
pub struct ThreadedRunner {
    max_threads: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl ThreadedRunner {
    /// Use at most `max_threads` workers
    pub fn new(max_threads: usize) -> Self {
        let max_threads = max_threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .thread_name(|index| format!("toolsmith-batch-{index}"))
            .build()
            .inspect_err(|err| {
                warn!(error = %err, "Could not start batch thread pool; running jobs sequentially");
            })
            .ok()
            .map(Arc::new);
        Self { max_threads, pool }
    }

    /// Worker cap
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }
}

impl Default for ThreadedRunner {
    fn default() -> Self {
        Self::new(rayon::current_num_threads())
    }
}

impl BatchRunner for ThreadedRunner {
    fn run(&self, jobs: Vec<BatchJob>) -> Vec<String> {
        let Some(pool) = self.pool.as_ref().filter(|_| jobs.len() > 1) else {
            return SequentialRunner.run(jobs);
        };

        pool.install(|| {
            jobs.into_par_iter()
                .enumerate()
                .map(|(index, job)| run_job(index, job))
                .collect()
        })
    }
}

/// Run one job, turning a panic into an error line for that job alone
fn run_job(index: usize, job: BatchJob) -> String {
    catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(index, error = %message, "Batch job panicked");
        format!("#{index} (Unknown Tool) Error: Batch job panicked: {message}")
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

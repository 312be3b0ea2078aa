//! # Parallel Dispatch
//!
//! Runs a batch of [`ExecutionRequest`]s with at most `jobs` of them in flight
//! and returns the results in request order.
//!
//! Each request is assigned its index before any work starts, and every worker
//! writes its result into the slot for that index. Reading the slots back in
//! index order restores the canonical order, so the order in which external
//! processes happen to finish never shows up in the output.
//!
//! With `jobs == 1` requests run one after another on the calling thread.
//! With more jobs a dedicated rayon pool of exactly `jobs` threads is built
//! for the batch.
//!
//! A request that hits an environment fault becomes a failed result for that
//! repository only; its siblings still run.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::executor::{ExecutionRequest, ExecutionResult, Executor};

/// Bounded fan-out over the executor.
#[derive(Debug)]
pub struct Dispatcher {
    jobs: usize,
    announced: AtomicBool,
}

impl Dispatcher {
    /// Create a dispatcher with the given concurrency bound.
    pub fn new(jobs: usize) -> Result<Self> {
        if jobs == 0 {
            return Err(Error::InvalidJobs { value: jobs });
        }
        Ok(Self {
            jobs,
            announced: AtomicBool::new(false),
        })
    }

    /// A dispatcher that runs everything on the calling thread.
    pub fn sequential() -> Self {
        Self {
            jobs: 1,
            announced: AtomicBool::new(false),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Announce the parallelism on the diagnostic stream, once per dispatcher.
    fn announce(&self, diag: &mut dyn Write) -> Result<()> {
        if self.jobs > 1 && !self.announced.swap(true, Ordering::SeqCst) {
            writeln!(diag, "Using {} parallel jobs", self.jobs)?;
        }
        Ok(())
    }

    /// Execute all requests and return their results in request order.
    pub fn run(
        &self,
        executor: &Executor,
        requests: &[ExecutionRequest],
        diag: &mut dyn Write,
    ) -> Result<Vec<ExecutionResult>> {
        self.announce(diag)?;

        let slots: Mutex<Vec<Option<ExecutionResult>>> = Mutex::new(vec![None; requests.len()]);

        let run_one = |index: usize, request: &ExecutionRequest| {
            let result = executor.execute(request).unwrap_or_else(|e| {
                warn!("{}: {}", request.repository.name, e);
                ExecutionResult::from_fault(request.repository.clone(), &e)
            });
            let mut slots = slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            slots[index] = Some(result);
        };

        if self.jobs == 1 || requests.len() <= 1 {
            for (index, request) in requests.iter().enumerate() {
                run_one(index, request);
            }
        } else {
            debug!(
                "Dispatching {} requests on {} workers",
                requests.len(),
                self.jobs
            );
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .thread_name(|i| format!("mgit-worker-{}", i))
                .build()
                .map_err(|e| Error::ThreadPool {
                    message: e.to_string(),
                })?;

            pool.install(|| {
                requests
                    .par_iter()
                    .enumerate()
                    .for_each(|(index, request)| run_one(index, request));
            });
        }

        let slots = slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug_assert!(slots.iter().all(Option::is_some));
        Ok(slots.into_iter().flatten().collect())
    }
}

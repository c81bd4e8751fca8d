// src/imaging/pool.rs

//! Bounded transform pool and the completion relay.
//!
//! `submit` never blocks: the job is snapshotted, queued behind a semaphore
//! sized to the worker count, and run on a blocking thread. The outcome and
//! its handler land on an internal channel, and handlers only ever run when
//! the owner pumps [`TransformPool::relay_next`] or
//! [`TransformPool::relay_ready`]. That keeps every completion on the
//! owner's thread, one handler invocation per job, in completion order.
//!
//! Dropping the pool abandons completions nobody pumped; handlers are not
//! invoked with synthetic outcomes on teardown.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task;
use tracing::{debug, warn};

use crate::imaging::error::{TransformError, TransformResult};
use crate::imaging::executor;
use crate::imaging::job::{
    CompletedJob, CompletionHandler, TransformJob, TransformOptions, TransformOutput,
    TransformRequest,
};

pub struct TransformPool {
    semaphore: Arc<Semaphore>,
    worker_count: usize,
    in_flight: AtomicUsize,
    completions: UnboundedSender<CompletedJob>,
    inbox: UnboundedReceiver<CompletedJob>,
}

impl TransformPool {
    /// Creates a pool running at most `worker_count` transforms at once.
    /// Sizing is the caller's job; zero is bumped to one so the pool can
    /// always make progress.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (completions, inbox) = mpsc::unbounded_channel();
        Self {
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count,
            in_flight: AtomicUsize::new(0),
            completions,
            inbox,
        }
    }

    /// Queues one transform. The request is copied in full before this
    /// returns, so the caller may mutate or drop it immediately. `handler`
    /// fires exactly once with the outcome, from a later pump call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        request: &TransformRequest,
        handler: impl FnOnce(TransformResult<TransformOutput>) + Send + 'static,
    ) {
        let job = TransformJob::from_request(request);
        let handler: CompletionHandler = Box::new(handler);
        let semaphore = Arc::clone(&self.semaphore);
        let completions = self.completions.clone();

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Queued transform job ({} in flight)",
            self.in_flight.load(Ordering::SeqCst)
        );

        task::spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    // The permit stays held for the whole blocking call, so
                    // at most worker_count transforms run at once. A panic in
                    // the pipeline surfaces as a join error, not a lost job.
                    match task::spawn_blocking(move || executor::run_job(job)).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!("Transform task did not finish: {}", e);
                            Err(TransformError::worker(format!(
                                "transform task did not finish: {}",
                                e
                            )))
                        }
                    }
                }
                Err(e) => Err(TransformError::worker(format!(
                    "failed to acquire worker: {}",
                    e
                ))),
            };
            if completions.send(CompletedJob { outcome, handler }).is_err() {
                warn!("Completion dropped: pool went away before delivery");
            }
        });
    }

    /// Waits for the next completion and runs its handler here, on the
    /// calling thread. Returns `false` without waiting when nothing is in
    /// flight.
    pub async fn relay_next(&mut self) -> bool {
        if self.in_flight.load(Ordering::SeqCst) == 0 {
            return false;
        }
        match self.inbox.recv().await {
            Some(completed) => {
                completed.relay();
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Runs handlers for every completion already waiting, without blocking.
    /// Returns how many were relayed.
    pub fn relay_ready(&mut self) -> usize {
        let mut relayed = 0;
        while let Ok(completed) = self.inbox.try_recv() {
            completed.relay();
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            relayed += 1;
        }
        relayed
    }

    /// Jobs submitted whose handlers have not run yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}

/// Transforms `source` into `target` on the calling thread, skipping the
/// pool entirely. Same pipeline and error taxonomy as the async path.
pub fn resize_sync(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    options: &TransformOptions,
) -> TransformResult<()> {
    let request = TransformRequest::from_path(source.as_ref())
        .to(target.as_ref())
        .with(options.clone());
    executor::run_job(TransformJob::from_request(&request)).map(|_| ())
}

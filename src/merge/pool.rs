//! Bounded worker pool for the merge phase.
//!
//! A fixed number of scoped threads drain a queue of pre-computed batches.
//! Results come back through a join barrier and are returned in batch order,
//! so callers can reduce them sequentially. A single batch (or a single
//! worker) runs on the calling thread.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crossbeam_channel::unbounded;

use crate::error::MergeImportError;

/// Fixed-size pool of merge workers.
#[derive(Clone, Copy, Debug)]
pub struct WorkerPool {
    threads: usize,
}

impl WorkerPool {
    /// Create a pool with `threads` workers (at least one).
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// Configured worker count.
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Run `work` over every batch and return the results in batch order.
    ///
    /// With more than one worker every batch runs to completion before this
    /// returns; inline execution stops at the first failing batch. Either
    /// way the error of the lowest-indexed failing batch is returned.
    ///
    /// # Errors
    /// Propagates the first batch error, or
    /// [`MergeImportError::WorkerPanicked`] if `work` panicked.
    pub fn run<T, R, F>(&self, batches: Vec<Vec<T>>, work: F) -> Result<Vec<R>, MergeImportError>
    where
        T: Send,
        R: Send,
        F: Fn(Vec<T>) -> Result<R, MergeImportError> + Sync,
    {
        let workers = self.threads.min(batches.len());
        if workers <= 1 {
            return batches
                .into_iter()
                .enumerate()
                .map(|(index, batch)| run_guarded(&work, index, batch))
                .collect();
        }

        let total = batches.len();
        let (task_tx, task_rx) = unbounded::<(usize, Vec<T>)>();
        let (done_tx, done_rx) = unbounded::<(usize, Result<R, MergeImportError>)>();
        for task in batches.into_iter().enumerate() {
            // The receiver is alive until the scope below ends.
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let done_tx = done_tx.clone();
                let work = &work;
                scope.spawn(move || {
                    for (index, batch) in task_rx {
                        let _ = done_tx.send((index, run_guarded(work, index, batch)));
                    }
                });
            }
        });
        drop(done_tx);

        let mut slots: Vec<Option<Result<R, MergeImportError>>> =
            std::iter::repeat_with(|| None).take(total).collect();
        for (index, result) in done_rx {
            slots[index] = Some(result);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or(Err(MergeImportError::WorkerPanicked { batch: index }))
            })
            .collect()
    }
}

fn run_guarded<T, R, F>(work: &F, index: usize, batch: Vec<T>) -> Result<R, MergeImportError>
where
    F: Fn(Vec<T>) -> Result<R, MergeImportError>,
{
    catch_unwind(AssertUnwindSafe(|| work(batch)))
        .unwrap_or(Err(MergeImportError::WorkerPanicked { batch: index }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

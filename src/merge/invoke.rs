//! INVOKE step of the merge-import pipeline.
//!
//! Runs the [`MergeRunner`] over one batch of candidates. For each file the
//! merged content overwrites the origin copy unconditionally; conflicted
//! merges land with their markers so a human can resolve them in place.
//!
//! A failure to merge or to write the result aborts the batch. A half-written
//! origin tree is worse than an aborted run.

use std::path::Path;

use crate::error::MergeImportError;
use crate::model::{FileCandidate, ReconciliationState};

use super::runner::MergeRunner;

/// Per-batch merge driver.
pub struct MergeInvoker<'a> {
    runner: &'a dyn MergeRunner,
    scratch: &'a Path,
}

impl<'a> MergeInvoker<'a> {
    /// Create an invoker that hands `scratch` to every merge call.
    #[must_use]
    pub const fn new(runner: &'a dyn MergeRunner, scratch: &'a Path) -> Self {
        Self { runner, scratch }
    }

    /// Merge every candidate in `batch`, returning the batch-local state.
    ///
    /// Candidates whose baseline or destination copy disappeared since
    /// classification are skipped and not recorded.
    ///
    /// # Errors
    /// Propagates runner errors and failures writing merged content.
    pub fn run_batch(
        &self,
        batch: Vec<FileCandidate>,
    ) -> Result<ReconciliationState, MergeImportError> {
        let mut state = ReconciliationState::default();
        for candidate in batch {
            if !candidate.destination_path().exists() || !candidate.baseline_path().exists() {
                tracing::debug!(
                    path = %candidate.relative_path().display(),
                    "side vanished before merge, skipping"
                );
                continue;
            }

            let outcome = self.runner.merge(
                candidate.origin_path(),
                candidate.destination_path(),
                candidate.baseline_path(),
                self.scratch,
            )?;
            std::fs::write(candidate.origin_path(), &outcome.content)
                .map_err(|e| MergeImportError::io(candidate.origin_path(), e))?;

            tracing::debug!(
                path = %candidate.relative_path().display(),
                outcome = %outcome.code,
                bytes = outcome.content.len(),
                "merged"
            );
            state.record(candidate.relative_path(), outcome.code);
        }
        Ok(state)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

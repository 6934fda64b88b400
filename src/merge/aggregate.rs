//! AGGREGATE step: fold per-batch results into the run-wide state.

use crate::model::ReconciliationState;

/// Union every batch's visited / conflicted / trouble sets.
///
/// Batches are disjoint and outcomes are per file, so the result does not
/// depend on how candidates were partitioned or in which order batches are
/// folded.
#[must_use]
pub fn aggregate<I>(batches: I) -> ReconciliationState
where
    I: IntoIterator<Item = ReconciliationState>,
{
    batches
        .into_iter()
        .fold(ReconciliationState::default(), |mut acc, batch| {
            acc.absorb(batch);
            acc
        })
}

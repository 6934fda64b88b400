//! PARTITION step of the merge-import pipeline.
//!
//! Splits the sorted candidate list into contiguous batches for the worker
//! pool. Spawning a thread per handful of files costs more than it saves, so
//! every batch holds at least `min_batch_size` items; a workload smaller than
//! that runs as a single batch.
//!
//! # Example
//!
//! ```text
//! 12 candidates, 4 workers, min 5  → 2 batches: [6, 6]
//! 11 candidates, 2 workers, min 5  → 2 batches: [6, 5]
//!  4 candidates, 8 workers, min 5  → 1 batch:   [4]
//! 100 candidates, 4 workers, min 5 → 4 batches: [25, 25, 25, 25]
//! ```

/// Default smallest batch handed to a worker.
pub const DEFAULT_MIN_BATCH_SIZE: usize = 5;

/// Number of batches for `total` items.
///
/// Never more than `workers`, never so many that a batch would drop below
/// `min_batch_size`, and at least one when there is any work.
#[must_use]
pub fn batch_count(total: usize, workers: usize, min_batch_size: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let by_size = total / min_batch_size.max(1);
    by_size.clamp(1, workers.max(1))
}

/// Split `items` into order-preserving batches whose sizes differ by at most
/// one.
#[must_use]
pub fn partition<T>(items: Vec<T>, workers: usize, min_batch_size: usize) -> Vec<Vec<T>> {
    let total = items.len();
    let count = batch_count(total, workers, min_batch_size);
    if count == 0 {
        return Vec::new();
    }

    let base = total / count;
    let extra = total % count;
    let mut batches = Vec::with_capacity(count);
    let mut iter = items.into_iter();
    for i in 0..count {
        let size = base + usize::from(i < extra);
        batches.push(iter.by_ref().take(size).collect());
    }
    batches
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(batches: &[Vec<usize>]) -> Vec<usize> {
        batches.iter().map(Vec::len).collect()
    }

    #[test]
    fn empty_input_has_no_batches() {
        assert!(partition(Vec::<usize>::new(), 4, 5).is_empty());
        assert_eq!(batch_count(0, 4, 5), 0);
    }

    #[test]
    fn small_workload_is_single_batch() {
        let batches = partition((0..4).collect(), 8, 5);
        assert_eq!(sizes(&batches), vec![4]);
    }

    #[test]
    fn documented_examples() {
        assert_eq!(sizes(&partition((0..12).collect(), 4, 5)), vec![6, 6]);
        assert_eq!(sizes(&partition((0..11).collect(), 2, 5)), vec![6, 5]);
        assert_eq!(sizes(&partition((0..100).collect(), 4, 5)), vec![25; 4]);
    }

    #[test]
    fn single_worker_is_single_batch() {
        assert_eq!(sizes(&partition((0..50).collect(), 1, 5)), vec![50]);
    }

    #[test]
    fn zero_workers_and_zero_min_are_clamped() {
        assert_eq!(sizes(&partition((0..10).collect(), 0, 5)), vec![10]);
        assert_eq!(sizes(&partition((0..3).collect(), 8, 0)), vec![1, 1, 1]);
    }

    #[test]
    fn order_is_preserved_across_batches() {
        let batches = partition((0..23).collect(), 3, 5);
        let flat: Vec<usize> = batches.into_iter().flatten().collect();
        assert_eq!(flat, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn every_batch_meets_minimum_when_total_allows() {
        for total in 5..200 {
            for workers in 1..10 {
                let batches = partition((0..total).collect(), workers, 5);
                assert!(batches.len() <= workers);
                assert!(
                    batches.iter().all(|b| b.len() >= 5),
                    "total={total} workers={workers} sizes={:?}",
                    sizes(&batches)
                );
            }
        }
    }
}

//! Merge-import engine.
//!
//! Reconciles three working trees into the origin tree:
//!
//! - **origin**: the authoritative snapshot being imported.
//! - **baseline**: the last synchronized snapshot, used as merge ancestor.
//! - **destination**: the import target, which may carry local-only edits.
//!
//! The pipeline runs as strictly ordered phases:
//!
//! 1. **trace** (optional): dump matching files of all three trees.
//! 2. **classify**: walk the origin tree and select merge candidates.
//! 3. **partition**: split candidates into batches for the worker pool.
//! 4. **invoke**: run the [`MergeRunner`] per candidate, in parallel batches,
//!    writing merged content back into the origin tree.
//! 5. **aggregate**: union per-batch results after the join barrier.
//! 6. **sweep**: walk the destination tree, carrying destination-only files
//!    into origin and propagating upstream deletions into destination.
//!
//! # Error policy
//!
//! Read failures while classifying are logged and the file is skipped. I/O
//! failures while merging or sweeping abort the run.
//!
//! # Determinism
//!
//! Candidates are sorted by relative path before partitioning and all result
//! sets are ordered, so the outcome does not depend on the worker count.

pub mod aggregate;
pub mod classify;
pub mod compare;
pub mod invoke;
pub mod partition;
pub mod pool;
pub mod reconcile;
pub mod runner;
pub mod sink;
pub mod sweep;
pub mod trace;
mod walk;

pub use partition::DEFAULT_MIN_BATCH_SIZE;
pub use reconcile::{MergeImportOptions, MergeImportTool, ReconcileReport};
pub use runner::{CommandMergeRunner, MergeRunner};
pub use sink::{DiagnosticSink, TracingSink};
pub use sweep::SweepSummary;

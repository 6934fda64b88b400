//! merge-import library crate.
//!
//! Reconciles an origin tree, a baseline tree and a destination tree so that
//! destination-only edits and files survive a fresh import of origin. The
//! `merge-import` binary is a thin CLI over [`MergeImportTool`]; integration
//! tests and embedders use this crate directly.

pub mod config;
pub mod error;
pub mod merge;
pub mod model;

pub use error::MergeImportError;
pub use merge::{
    CommandMergeRunner, DiagnosticSink, MergeImportOptions, MergeImportTool, MergeRunner,
    ReconcileReport, SweepSummary, TracingSink,
};
pub use model::{FileCandidate, MergeCode, MergeOutcome, PathFilter, ReconciliationState};

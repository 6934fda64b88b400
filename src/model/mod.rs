//! merge-import data model: value types and the path filter.

pub mod filter;
pub mod types;

pub use filter::{PathFilter, validate_package_root};
pub use types::{FileCandidate, MergeCode, MergeOutcome, ReconciliationState};

//! Core value types for merge-import.
//!
//! Foundation types that flow through the classify → partition → invoke →
//! aggregate → sweep pipeline: the per-file [`FileCandidate`], the merge
//! capability's [`MergeOutcome`], and the run-wide [`ReconciliationState`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// FileCandidate
// ---------------------------------------------------------------------------

/// A file selected for three-way merging.
///
/// Created by the classifier and consumed exactly once by a merge worker.
/// Identity is the relative path; the three absolute paths are derived from
/// it and the tree roots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileCandidate {
    origin_path: PathBuf,
    relative_path: PathBuf,
    baseline_path: PathBuf,
    destination_path: PathBuf,
}

impl FileCandidate {
    /// Create a candidate from its four paths.
    #[must_use]
    pub const fn new(
        origin_path: PathBuf,
        relative_path: PathBuf,
        baseline_path: PathBuf,
        destination_path: PathBuf,
    ) -> Self {
        Self {
            origin_path,
            relative_path,
            baseline_path,
            destination_path,
        }
    }

    /// Absolute path of the origin-tree copy. Merged content lands here.
    #[must_use]
    pub fn origin_path(&self) -> &Path {
        &self.origin_path
    }

    /// Path relative to the tree roots.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Absolute path of the baseline-tree copy (the merge ancestor).
    #[must_use]
    pub fn baseline_path(&self) -> &Path {
        &self.baseline_path
    }

    /// Absolute path of the destination-tree copy.
    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }
}

// ---------------------------------------------------------------------------
// MergeCode / MergeOutcome
// ---------------------------------------------------------------------------

/// How a single three-way merge ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeCode {
    /// Clean merge.
    Success,
    /// Overlapping edits; content carries conflict markers.
    Conflict,
    /// The merge tool itself misbehaved for this file.
    Trouble,
}

impl fmt::Display for MergeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Conflict => write!(f, "conflict"),
            Self::Trouble => write!(f, "trouble"),
        }
    }
}

/// Result of one call into a [`crate::merge::MergeRunner`].
///
/// `content` is written back to the origin file regardless of `code`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged bytes (possibly with conflict markers).
    pub content: Vec<u8>,
    /// Outcome classification.
    pub code: MergeCode,
}

impl MergeOutcome {
    /// A clean merge producing `content`.
    #[must_use]
    pub fn success(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            code: MergeCode::Success,
        }
    }

    /// A conflicted merge whose `content` holds conflict markers.
    #[must_use]
    pub fn conflict(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            code: MergeCode::Conflict,
        }
    }

    /// A merge the tool could not complete.
    #[must_use]
    pub fn trouble(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            code: MergeCode::Trouble,
        }
    }
}

// ---------------------------------------------------------------------------
// ReconciliationState
// ---------------------------------------------------------------------------

/// Relative paths touched by the merge phase.
///
/// `conflicted` and `trouble` are disjoint subsets of `visited`. Sets are
/// ordered so that reporting is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationState {
    /// Every path handed to the merge capability.
    pub visited: BTreeSet<PathBuf>,
    /// Paths whose merge ended in [`MergeCode::Conflict`].
    pub conflicted: BTreeSet<PathBuf>,
    /// Paths whose merge ended in [`MergeCode::Trouble`].
    pub trouble: BTreeSet<PathBuf>,
}

impl ReconciliationState {
    /// Record one merge outcome for `path`.
    pub fn record(&mut self, path: &Path, code: MergeCode) {
        self.visited.insert(path.to_path_buf());
        match code {
            MergeCode::Success => {}
            MergeCode::Conflict => {
                self.conflicted.insert(path.to_path_buf());
            }
            MergeCode::Trouble => {
                self.trouble.insert(path.to_path_buf());
            }
        }
    }

    /// Fold another state into this one.
    pub fn absorb(&mut self, other: Self) {
        self.visited.extend(other.visited);
        self.conflicted.extend(other.conflicted);
        self.trouble.extend(other.trouble);
    }

    /// Returns `true` if the merge phase handled `path`.
    #[must_use]
    pub fn was_visited(&self, path: &Path) -> bool {
        self.visited.contains(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

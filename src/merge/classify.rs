//! CLASSIFY step of the merge-import pipeline.
//!
//! Walks the origin tree and selects the files that need a three-way merge.
//! A file is a candidate only when all of the following hold:
//!
//! - it is a regular file (symlinks pass through untouched);
//! - its path, rebased under the package root, matches the [`PathFilter`];
//! - the baseline and destination copies both exist;
//! - destination differs from baseline (there is a local edit to keep);
//! - destination differs from origin (the edit has not already landed).
//!
//! Content comparisons that fail with an I/O error skip the file with a
//! warning on the [`DiagnosticSink`]. A baseline or destination entry that
//! is not a regular file (a directory shadowing the origin file) counts as
//! unreadable. An unreadable file is never merged and never reported as
//! conflicted.

use std::path::Path;

use crate::error::MergeImportError;
use crate::model::{FileCandidate, PathFilter};

use super::compare::same_contents;
use super::sink::DiagnosticSink;
use super::walk::for_each_file;

/// Why a file did or did not become a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Needs a three-way merge.
    Candidate,
    /// Outside the package root or rejected by the glob filter.
    Filtered,
    /// Baseline or destination copy is missing.
    MissingSide,
    /// Destination equals baseline: no destination-side edit.
    DestinationUnchanged,
    /// Destination equals origin: the edit already landed upstream.
    AlreadyUpstream,
    /// A content comparison failed, or a side is not a regular file.
    Unreadable,
}

/// The three tree roots a run reconciles.
#[derive(Clone, Copy, Debug)]
pub struct Trees<'a> {
    /// Authoritative tree; receives merged content.
    pub origin: &'a Path,
    /// Common ancestor tree.
    pub baseline: &'a Path,
    /// Import target tree.
    pub destination: &'a Path,
}

/// Walk the origin tree and collect all merge candidates, sorted by
/// relative path.
///
/// # Errors
/// Returns [`MergeImportError::Io`] if the origin tree cannot be traversed.
/// Per-file read failures are warned on `sink`, not returned.
pub fn classify(
    trees: Trees<'_>,
    filter: &PathFilter,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<FileCandidate>, MergeImportError> {
    let mut candidates = Vec::new();
    for_each_file(trees.origin, |file, relative| {
        let baseline = trees.baseline.join(relative);
        let destination = trees.destination.join(relative);
        let verdict = classify_file(file, relative, &baseline, &destination, filter, sink);
        tracing::trace!(path = %relative.display(), ?verdict, "classified");
        if verdict == Verdict::Candidate {
            candidates.push(FileCandidate::new(
                file.to_path_buf(),
                relative.to_path_buf(),
                baseline,
                destination,
            ));
        }
        Ok(())
    })?;
    candidates.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
    Ok(candidates)
}

/// Decide whether one origin file is a merge candidate.
#[must_use]
pub fn classify_file(
    origin: &Path,
    relative: &Path,
    baseline: &Path,
    destination: &Path,
    filter: &PathFilter,
    sink: &dyn DiagnosticSink,
) -> Verdict {
    if !filter.accepts(relative) {
        return Verdict::Filtered;
    }
    if !destination.exists() || !baseline.exists() {
        return Verdict::MissingSide;
    }
    match compare_logged(destination, baseline, sink) {
        Some(true) => return Verdict::DestinationUnchanged,
        Some(false) => {}
        None => return Verdict::Unreadable,
    }
    match compare_logged(destination, origin, sink) {
        Some(true) => Verdict::AlreadyUpstream,
        Some(false) => Verdict::Candidate,
        None => Verdict::Unreadable,
    }
}

fn compare_logged(left: &Path, right: &Path, sink: &dyn DiagnosticSink) -> Option<bool> {
    match same_contents(left, right) {
        Ok(same) => Some(same),
        Err(e) => {
            sink.warn(&format!(
                "Cannot read {} or {}, will not attempt to merge: {e}",
                left.display(),
                right.display()
            ));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

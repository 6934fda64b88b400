//! Top-level merge-import orchestration.
//!
//! [`MergeImportTool`] wires the pipeline phases together. The ordering is
//! strict: the classifier walk completes before any merge starts, and every
//! merge batch has joined before the sweeper walks the destination tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use crate::error::MergeImportError;
use crate::model::PathFilter;

use super::aggregate::aggregate;
use super::classify::{Trees, classify};
use super::invoke::MergeInvoker;
use super::partition::{DEFAULT_MIN_BATCH_SIZE, partition};
use super::pool::WorkerPool;
use super::runner::MergeRunner;
use super::sink::DiagnosticSink;
use super::sweep::sweep;
use super::trace::trace_tree;

// ---------------------------------------------------------------------------
// MergeImportOptions
// ---------------------------------------------------------------------------

/// Caller-supplied tuning for one run.
#[derive(Clone, Debug)]
pub struct MergeImportOptions {
    /// Upper bound on merge workers.
    pub threads: usize,
    /// Smallest batch worth a worker of its own.
    pub min_batch_size: usize,
    /// Full-match regex selecting files to dump before merging.
    pub debug_pattern: Option<Regex>,
}

impl MergeImportOptions {
    /// Options with `threads` workers, the default minimum batch size and no
    /// debug pattern.
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            debug_pattern: None,
        }
    }

    /// Set the smallest batch handed to a worker. Floored at one.
    #[must_use]
    pub fn with_min_batch_size(mut self, min_batch_size: usize) -> Self {
        self.min_batch_size = min_batch_size.max(1);
        self
    }

    /// Set the debug pattern. The pattern must match the whole path.
    ///
    /// # Errors
    /// Returns [`MergeImportError::InvalidPattern`] if `pattern` is not a
    /// valid regular expression.
    pub fn with_debug_pattern(mut self, pattern: &str) -> Result<Self, MergeImportError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|e| MergeImportError::InvalidPattern {
            pattern: pattern.to_owned(),
            detail: e.to_string(),
        })?;
        self.debug_pattern = Some(regex);
        Ok(self)
    }
}

impl Default for MergeImportOptions {
    fn default() -> Self {
        let threads = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self::new(threads)
    }
}

// ---------------------------------------------------------------------------
// ReconcileReport
// ---------------------------------------------------------------------------

/// Everything a run changed or flagged, by relative path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Merged with conflict markers.
    pub conflicted: BTreeSet<PathBuf>,
    /// The merge tool misbehaved; content was still written.
    pub trouble: BTreeSet<PathBuf>,
    /// Every path handed to the merge tool.
    pub merged: BTreeSet<PathBuf>,
    /// Destination-only files copied into origin.
    pub added: BTreeSet<PathBuf>,
    /// Upstream deletions removed from destination.
    pub deleted: BTreeSet<PathBuf>,
}

impl ReconcileReport {
    /// `true` when nothing conflicted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicted.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MergeImportTool
// ---------------------------------------------------------------------------

/// The merge-import engine.
pub struct MergeImportTool {
    runner: Arc<dyn MergeRunner>,
    sink: Arc<dyn DiagnosticSink>,
    options: MergeImportOptions,
}

impl MergeImportTool {
    /// Build an engine that merges with `runner` and reports to `sink`.
    #[must_use]
    pub const fn new(
        runner: Arc<dyn MergeRunner>,
        sink: Arc<dyn DiagnosticSink>,
        options: MergeImportOptions,
    ) -> Self {
        Self {
            runner,
            sink,
            options,
        }
    }

    /// The options this engine was built with.
    #[must_use]
    pub const fn options(&self) -> &MergeImportOptions {
        &self.options
    }

    /// Reconcile the three trees into `origin` and return the conflicted
    /// relative paths, sorted.
    ///
    /// # Errors
    /// See [`MergeImportTool::reconcile_with_report`].
    pub fn reconcile(
        &self,
        origin: &Path,
        destination: &Path,
        baseline: &Path,
        scratch: &Path,
        filter: &PathFilter,
    ) -> Result<Vec<PathBuf>, MergeImportError> {
        let report = self.reconcile_with_report(origin, destination, baseline, scratch, filter)?;
        Ok(report.conflicted.into_iter().collect())
    }

    /// Reconcile the three trees into `origin` and return the full report.
    ///
    /// Merged content (conflict markers included) is written into `origin`,
    /// destination-only files are copied into `origin`, and files deleted
    /// upstream are removed from `destination`.
    ///
    /// # Errors
    /// - [`MergeImportError::InvalidTree`] if a tree root is not a directory
    ///   (raised before anything is touched).
    /// - [`MergeImportError::Io`] if a tree cannot be walked, or a merged
    ///   file cannot be written, or the sweep fails to copy or delete.
    /// - Errors from the [`MergeRunner`], and
    ///   [`MergeImportError::WorkerPanicked`].
    pub fn reconcile_with_report(
        &self,
        origin: &Path,
        destination: &Path,
        baseline: &Path,
        scratch: &Path,
        filter: &PathFilter,
    ) -> Result<ReconcileReport, MergeImportError> {
        require_dir("origin", origin)?;
        require_dir("baseline", baseline)?;
        require_dir("destination", destination)?;
        let trees = Trees {
            origin,
            baseline,
            destination,
        };

        if let Some(pattern) = &self.options.debug_pattern {
            trace_tree(pattern, origin, "origin", self.sink.as_ref());
            trace_tree(pattern, baseline, "baseline", self.sink.as_ref());
            trace_tree(pattern, destination, "destination", self.sink.as_ref());
        }

        let candidates = classify(trees, filter, self.sink.as_ref())?;
        let pool = WorkerPool::new(self.options.threads);
        tracing::info!("Using {} thread(s) for merging files", pool.threads());

        let batches = partition(candidates, pool.threads(), self.options.min_batch_size);
        tracing::debug!(batches = batches.len(), "partitioned merge candidates");

        let invoker = MergeInvoker::new(self.runner.as_ref(), scratch);
        let state = aggregate(pool.run(batches, |batch| invoker.run_batch(batch))?);
        let swept = sweep(trees, &state)?;

        for path in &state.conflicted {
            self.sink
                .warn(&format!("Merge error for path {}", path.display()));
        }
        for path in &state.trouble {
            self.sink.warn(&format!(
                "Merge tool reported trouble for path {}, skipping",
                path.display()
            ));
        }

        tracing::info!(
            merged = state.visited.len(),
            conflicted = state.conflicted.len(),
            trouble = state.trouble.len(),
            added = swept.added.len(),
            deleted = swept.deleted.len(),
            "merge-import finished"
        );

        Ok(ReconcileReport {
            conflicted: state.conflicted,
            trouble: state.trouble,
            merged: state.visited,
            added: swept.added,
            deleted: swept.deleted,
        })
    }
}

fn require_dir(name: &'static str, path: &Path) -> Result<(), MergeImportError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(MergeImportError::InvalidTree {
            name,
            path: path.to_path_buf(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

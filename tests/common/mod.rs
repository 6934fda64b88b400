//! Shared test helpers for merge-import integration tests.
//!
//! All tests use temp directories. Each test gets its own set of trees via
//! [`Trees::new`], and merges go through the in-memory [`FakeRunner`] unless
//! a test is exercising the command-line runner on purpose.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use merge_import::{
    DiagnosticSink, MergeImportError, MergeImportOptions, MergeImportTool, MergeOutcome,
    MergeRunner, PathFilter, ReconcileReport,
};
use tempfile::TempDir;

pub const ORIGIN: &str = "origin";
pub const BASELINE: &str = "baseline";
pub const DESTINATION: &str = "destination";

/// Origin, baseline, destination and scratch directories under one temp dir.
pub struct Trees {
    dir: TempDir,
}

impl Trees {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        for tree in [ORIGIN, BASELINE, DESTINATION, "scratch"] {
            std::fs::create_dir_all(dir.path().join(tree)).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self, tree: &str) -> PathBuf {
        self.dir.path().join(tree)
    }

    pub fn origin(&self) -> PathBuf {
        self.root(ORIGIN)
    }

    pub fn baseline(&self) -> PathBuf {
        self.root(BASELINE)
    }

    pub fn destination(&self) -> PathBuf {
        self.root(DESTINATION)
    }

    pub fn scratch(&self) -> PathBuf {
        self.root("scratch")
    }

    /// Write `content` to `rel` inside `tree`, creating parent directories.
    pub fn write(&self, tree: &str, rel: &str, content: &str) {
        let path = self.root(tree).join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Write the same relative path into all three trees.
    pub fn three(&self, rel: &str, origin: &str, baseline: &str, destination: &str) {
        self.write(ORIGIN, rel, origin);
        self.write(BASELINE, rel, baseline);
        self.write(DESTINATION, rel, destination);
    }

    pub fn read(&self, tree: &str, rel: &str) -> Option<String> {
        std::fs::read_to_string(self.root(tree).join(rel)).ok()
    }

    /// Every regular file in `tree` with its content, keyed by relative path.
    pub fn snapshot(&self, tree: &str) -> BTreeMap<String, String> {
        let root = self.root(tree);
        let mut files = BTreeMap::new();
        collect(&root, &root, &mut files);
        files
    }

    /// Run a reconcile with the default filter.
    pub fn reconcile(
        &self,
        runner: Arc<dyn MergeRunner>,
        sink: Arc<dyn DiagnosticSink>,
        options: MergeImportOptions,
    ) -> Result<ReconcileReport, MergeImportError> {
        self.reconcile_filtered(runner, sink, options, &PathFilter::all())
    }

    pub fn reconcile_filtered(
        &self,
        runner: Arc<dyn MergeRunner>,
        sink: Arc<dyn DiagnosticSink>,
        options: MergeImportOptions,
        filter: &PathFilter,
    ) -> Result<ReconcileReport, MergeImportError> {
        MergeImportTool::new(runner, sink, options).reconcile_with_report(
            &self.origin(),
            &self.destination(),
            &self.baseline(),
            &self.scratch(),
            filter,
        )
    }
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<String, String>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        let file_type = entry.file_type().unwrap();
        if file_type.is_dir() {
            collect(root, &path, files);
        } else if file_type.is_file() {
            let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
            files.insert(rel, std::fs::read_to_string(&path).unwrap());
        }
    }
}

/// In-memory merge capability.
///
/// Merged content is `"<mine>+<theirs>"`. The outcome code is driven by the
/// destination ("theirs") content: containing `CONFLICT` → conflict,
/// containing `TROUBLE` → trouble, anything else → success.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<PathBuf>>,
    fail_on: Option<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with an I/O error when asked to merge a path ending in `rel`.
    pub fn failing_on(rel: &str) -> Self {
        Self {
            fail_on: Some(rel.to_owned()),
            ..Self::default()
        }
    }

    /// The `mine` path of every merge call, sorted.
    pub fn calls(&self) -> Vec<PathBuf> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

impl MergeRunner for FakeRunner {
    fn merge(
        &self,
        mine: &Path,
        theirs: &Path,
        _baseline: &Path,
        _workdir: &Path,
    ) -> Result<MergeOutcome, MergeImportError> {
        self.calls.lock().unwrap().push(mine.to_path_buf());
        if let Some(rel) = &self.fail_on
            && mine.ends_with(rel)
        {
            return Err(MergeImportError::io(
                mine,
                std::io::Error::other("injected merge failure"),
            ));
        }
        let mine_text =
            std::fs::read_to_string(mine).map_err(|e| MergeImportError::io(mine, e))?;
        let theirs_text =
            std::fs::read_to_string(theirs).map_err(|e| MergeImportError::io(theirs, e))?;
        let content = format!("{mine_text}+{theirs_text}");
        Ok(if theirs_text.contains("CONFLICT") {
            MergeOutcome::conflict(content)
        } else if theirs_text.contains("TROUBLE") {
            MergeOutcome::trouble(content)
        } else {
            MergeOutcome::success(content)
        })
    }
}

/// Diagnostic sink that keeps every message.
#[derive(Default)]
pub struct RecordingSink {
    pub warnings: Mutex<Vec<String>>,
    pub verbose: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn traces(&self) -> Vec<String> {
        self.verbose.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_owned());
    }

    fn verbose(&self, message: &str) {
        self.verbose.lock().unwrap().push(message.to_owned());
    }
}

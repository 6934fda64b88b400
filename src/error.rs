//! Error types for merge-import.
//!
//! Defines [`MergeImportError`], the unified error type for every fallible
//! operation in the crate. Error messages are written for the operator
//! running the import: each variant says what went wrong and how to fix it.
//!
//! Per-file merge conflicts and merge-tool trouble are *not* errors. They are
//! ordinary outcomes reported through the returned path list and the
//! diagnostic sink.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// MergeImportError
// ---------------------------------------------------------------------------

/// Unified error type for merge-import operations.
#[derive(Debug)]
pub enum MergeImportError {
    /// An I/O error occurred while merging or sweeping a file.
    ///
    /// These abort the run. The origin tree may be left partially merged.
    Io {
        /// The file (or directory) being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A glob or debug pattern could not be compiled.
    InvalidPattern {
        /// The pattern as provided.
        pattern: String,
        /// Parser message.
        detail: String,
    },

    /// The package root is not a clean relative path.
    InvalidPackageRoot {
        /// The package root as provided.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// One of the three working trees is not an existing directory.
    InvalidTree {
        /// Which tree (`origin`, `baseline`, `destination`).
        name: &'static str,
        /// The path that was given.
        path: PathBuf,
    },

    /// A configuration file could not be loaded, parsed, or holds
    /// out-of-range values.
    InvalidConfig {
        /// Path to the configuration file, if one was involved.
        path: Option<PathBuf>,
        /// Human-readable description of the problem.
        detail: String,
    },

    /// The external merge command failed in a way that is not a conflict or
    /// trouble outcome.
    MergeTool {
        /// Command line summary.
        command: String,
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Trimmed stderr.
        stderr: String,
    },

    /// A merge worker thread panicked while processing a batch.
    WorkerPanicked {
        /// Index of the batch the worker was processing.
        batch: usize,
    },
}

impl MergeImportError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for configuration and validation failures, which are
    /// always raised before any tree is touched.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::InvalidPackageRoot { .. }
                | Self::InvalidTree { .. }
                | Self::InvalidConfig { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for MergeImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error on '{}': {source}\n  To fix: check file permissions and disk space. The origin tree may be partially merged; discard it before retrying.",
                    path.display()
                )
            }
            Self::InvalidPattern { pattern, detail } => {
                write!(
                    f,
                    "invalid pattern '{pattern}': {detail}\n  To fix: correct the glob or regular expression and retry."
                )
            }
            Self::InvalidPackageRoot { path, reason } => {
                write!(
                    f,
                    "invalid package root '{}': {reason}\n  Package roots must be relative paths without '..' components.",
                    path.display()
                )
            }
            Self::InvalidTree { name, path } => {
                write!(
                    f,
                    "{name} tree '{}' is not a directory\n  To fix: populate all three working trees before running the import.",
                    path.display()
                )
            }
            Self::InvalidConfig { path, detail } => {
                match path {
                    Some(p) => write!(f, "configuration error in '{}': {detail}", p.display())?,
                    None => write!(f, "configuration error: {detail}")?,
                }
                write!(f, "\n  To fix: correct the configuration value and retry.")
            }
            Self::MergeTool {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "merge tool failed: {command}")?;
                if let Some(code) = exit_code {
                    write!(f, " (exit {code})")?;
                }
                if !stderr.is_empty() {
                    write!(f, "\n  stderr: {stderr}")?;
                }
                write!(
                    f,
                    "\n  To fix: check that the merge tool is installed and accepts <mine> <baseline> <theirs>."
                )
            }
            Self::WorkerPanicked { batch } => {
                write!(
                    f,
                    "merge worker for batch {batch} panicked\n  To fix: rerun with --threads 1 to isolate the failing file."
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// std::error::Error
// ---------------------------------------------------------------------------

impl std::error::Error for MergeImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<crate::config::ConfigError> for MergeImportError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::InvalidConfig {
            path: err.path,
            detail: err.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

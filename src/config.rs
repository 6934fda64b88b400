//! merge-import configuration (`merge-import.toml`).
//!
//! Defines the typed configuration read by the `merge-import` binary: worker
//! count and batch sizing, the optional debug pattern, the external merge
//! command, and the glob filter. The library core never reads this file; the
//! binary turns it into [`crate::merge::MergeImportOptions`] and a
//! [`crate::model::PathFilter`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::merge::DEFAULT_MIN_BATCH_SIZE;

/// Default config file name looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "merge-import.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level merge-import configuration.
///
/// Missing fields use defaults. Missing file → all defaults (no error),
/// unless the caller asked for the file explicitly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Merge phase settings.
    #[serde(default)]
    pub merge: MergeConfig,

    /// Which files are merge candidates.
    #[serde(default)]
    pub filter: FilterConfig,
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Merge phase settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Worker threads for the merge phase. `None` → available parallelism.
    #[serde(default)]
    pub threads: Option<usize>,

    /// Smallest batch handed to a worker.
    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: usize,

    /// Regex over full file paths whose contents are dumped before merging.
    #[serde(default)]
    pub debug_pattern: Option<String>,

    /// Merge command prefix. Invoked as `<tool...> <mine> <baseline> <theirs>`.
    #[serde(default = "default_tool")]
    pub tool: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            threads: None,
            min_batch_size: default_min_batch_size(),
            debug_pattern: None,
            tool: default_tool(),
        }
    }
}

const fn default_min_batch_size() -> usize {
    DEFAULT_MIN_BATCH_SIZE
}

fn default_tool() -> Vec<String> {
    vec!["diff3".to_owned(), "-m".to_owned()]
}

impl MergeConfig {
    /// The worker count to use: the configured value, or the machine's
    /// available parallelism (1 if that cannot be determined).
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }
}

// ---------------------------------------------------------------------------
// FilterConfig
// ---------------------------------------------------------------------------

/// Glob filter settings.
///
/// ```toml
/// [filter]
/// package_root = "third_party/foo"
/// include = ["**"]
/// exclude = ["**/*.lock"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Directory (relative to each tree root) the globs are evaluated under.
    #[serde(default)]
    pub package_root: PathBuf,

    /// Patterns a path must match. Empty → every path.
    #[serde(default)]
    pub include: Vec<String>,

    /// Patterns that exclude an otherwise included path.
    #[serde(default)]
    pub exclude: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a merge-import configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl ImportConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist and `required` is false, returns all
    ///   defaults.
    /// - If the file exists but contains invalid TOML, unknown fields, or
    ///   out-of-range values, returns a [`ConfigError`].
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors, parse errors, or validation errors.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML, unknown fields, or values out of
    /// range.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: &str| {
            Err(ConfigError {
                path: None,
                message: message.to_owned(),
            })
        };
        if self.merge.threads == Some(0) {
            return fail("merge.threads must be at least 1");
        }
        if self.merge.min_batch_size == 0 {
            return fail("merge.min_batch_size must be at least 1");
        }
        if self.merge.tool.first().is_none_or(String::is_empty) {
            return fail("merge.tool must name a command");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

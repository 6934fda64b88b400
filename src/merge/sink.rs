//! Diagnostic sink for user-facing merge-import messages.
//!
//! The engine reports unreadable files, conflicted and trouble paths, and
//! debug traces through a [`DiagnosticSink`] passed in by the caller instead
//! of writing to a global console.

/// Receiver for user-facing diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Something the user should look at (conflicts, tool trouble, files
    /// skipped because they could not be read).
    fn warn(&self, message: &str);

    /// Detail shown only in verbose mode (debug traces).
    fn verbose(&self, message: &str);
}

/// Forwards diagnostics to `tracing`: `warn` at WARN, `verbose` at DEBUG.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "merge_import::console", "{message}");
    }

    fn verbose(&self, message: &str) {
        tracing::debug!(target: "merge_import::console", "{message}");
    }
}

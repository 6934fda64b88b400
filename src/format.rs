use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Result, bail};
use merge_import::ReconcileReport;

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per flagged path - for humans
    #[default]
    Text,
    /// JSON - machine-parseable
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => bail!("Invalid format '{s}'. Use: text or json"),
        }
    }
}

impl OutputFormat {
    /// Render a reconcile report in this format.
    pub fn render(self, report: &ReconcileReport) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(report)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {e}")),
            Self::Text => Ok(render_text(report)),
        }
    }
}

fn render_text(report: &ReconcileReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "merged {} file(s), {} conflict(s), {} trouble, {} added, {} deleted",
        report.merged.len(),
        report.conflicted.len(),
        report.trouble.len(),
        report.added.len(),
        report.deleted.len()
    );
    let sections = [
        ("conflict", &report.conflicted),
        ("trouble", &report.trouble),
        ("added", &report.added),
        ("deleted", &report.deleted),
    ];
    for (label, paths) in sections {
        for path in paths {
            let _ = writeln!(out, "{label}: {}", path.display());
        }
    }
    out
}

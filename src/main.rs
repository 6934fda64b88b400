use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use merge_import::config::{DEFAULT_CONFIG_FILE, ImportConfig};
use merge_import::{
    CommandMergeRunner, MergeImportError, MergeImportOptions, MergeImportTool, PathFilter,
    ReconcileReport, TracingSink,
};

mod format;
mod telemetry;

use format::OutputFormat;

/// Three-way merge-import of file trees
///
/// Reconciles a fresh ORIGIN snapshot with a DESTINATION tree that carries
/// local-only edits, using BASELINE (the last synchronized snapshot) as the
/// common ancestor. Merged content is written into ORIGIN:
///
///   - files edited in destination are three-way merged into origin
///   - files that exist only in destination are copied into origin
///   - files deleted upstream are removed from destination
///
/// Conflicted files keep their conflict markers in ORIGIN.
///
/// EXIT STATUS:
///
///   0  merged cleanly
///   1  at least one file conflicted
///   2  error (nothing should be trusted)
#[derive(Parser)]
#[command(name = "merge-import")]
#[command(version, about)]
struct Cli {
    /// Origin tree; receives the merged result
    #[arg(long, value_name = "DIR")]
    origin: PathBuf,

    /// Destination tree; may carry local-only edits
    #[arg(long, value_name = "DIR")]
    destination: PathBuf,

    /// Baseline tree; the common ancestor
    #[arg(long, value_name = "DIR")]
    baseline: PathBuf,

    /// Working directory for the merge tool [default: a fresh temp dir]
    #[arg(long, value_name = "DIR")]
    scratch: Option<PathBuf>,

    /// Directory the include/exclude globs are evaluated under
    #[arg(long, value_name = "PATH")]
    package_root: Option<PathBuf>,

    /// Only merge files matching this glob (repeatable)
    #[arg(long = "include", value_name = "GLOB")]
    include: Vec<String>,

    /// Never merge files matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Merge worker threads [default: available parallelism]
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Smallest batch handed to a worker
    #[arg(long, value_name = "N")]
    min_batch_size: Option<usize>,

    /// Dump files whose full path matches this regex before merging
    #[arg(long, value_name = "REGEX")]
    debug_pattern: Option<String>,

    /// Merge command word (repeat for each argument) [default: diff3 -m]
    #[arg(long = "tool", value_name = "ARG", allow_hyphen_values = true)]
    tool: Vec<String>,

    /// Config file [default: ./merge-import.toml if present]
    #[arg(long, value_name = "FILE", env = "MERGE_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Report format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    format: OutputFormat,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match run(cli) {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ReconcileReport> {
    let config = load_config(cli.config.as_deref())?;

    let threads = cli
        .threads
        .unwrap_or_else(|| config.merge.effective_threads());
    ensure!(threads > 0, "--threads must be at least 1");
    let min_batch_size = cli.min_batch_size.unwrap_or(config.merge.min_batch_size);
    ensure!(min_batch_size > 0, "--min-batch-size must be at least 1");

    let mut options = MergeImportOptions::new(threads).with_min_batch_size(min_batch_size);
    if let Some(pattern) = cli.debug_pattern.or(config.merge.debug_pattern) {
        options = options.with_debug_pattern(&pattern)?;
    }

    let package_root = cli.package_root.unwrap_or(config.filter.package_root);
    let include = prefer_cli(cli.include, config.filter.include);
    let exclude = prefer_cli(cli.exclude, config.filter.exclude);
    let filter = PathFilter::new(package_root, &include, &exclude)?;

    let runner = CommandMergeRunner::new(&prefer_cli(cli.tool, config.merge.tool))?;

    let temp_scratch;
    let scratch: &Path = match &cli.scratch {
        Some(dir) => dir,
        None => {
            temp_scratch = tempfile::Builder::new()
                .prefix("merge-import-")
                .tempdir()
                .context("creating scratch directory")?;
            temp_scratch.path()
        }
    };

    let tool = MergeImportTool::new(Arc::new(runner), Arc::new(TracingSink), options);
    let report = tool
        .reconcile_with_report(
            &cli.origin,
            &cli.destination,
            &cli.baseline,
            scratch,
            &filter,
        )
        .context("merge-import failed")?;

    print!("{}", cli.format.render(&report)?);
    Ok(report)
}

fn load_config(explicit: Option<&Path>) -> Result<ImportConfig> {
    let (path, required) = explicit.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.to_path_buf(), true),
    );
    ImportConfig::load(&path, required)
        .map_err(MergeImportError::from)
        .with_context(|| format!("loading {}", path.display()))
}

fn prefer_cli(from_cli: Vec<String>, from_config: Vec<String>) -> Vec<String> {
    if from_cli.is_empty() {
        from_config
    } else {
        from_cli
    }
}

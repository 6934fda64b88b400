//! Debug dump of tree contents before merging.
//!
//! When a debug pattern is configured, every file whose full path matches it
//! is reported through [`DiagnosticSink::verbose`] as
//! `MERGE_DEBUG <tree> <relative>: symlink` or
//! `MERGE_DEBUG <tree> <relative>:\n<content>`. Purely diagnostic: failures
//! are logged and never abort the run.

use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

use super::sink::DiagnosticSink;

/// Dump every file under `root` whose full path matches `pattern`.
pub fn trace_tree(pattern: &Regex, root: &Path, name: &str, sink: &dyn DiagnosticSink) {
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(tree = name, error = %e, "cannot walk tree for debug trace");
                continue;
            }
        };
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        if !pattern.is_match(&path.to_string_lossy()) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path).display();
        if file_type.is_symlink() {
            sink.verbose(&format!("MERGE_DEBUG {name} {relative}: symlink"));
            continue;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => sink.verbose(&format!("MERGE_DEBUG {name} {relative}:\n{content}")),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot read file for debug trace"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl DiagnosticSink for Recorder {
        fn warn(&self, message: &str) {
            self.0.lock().unwrap().push(format!("WARN {message}"));
        }

        fn verbose(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_owned());
        }
    }

    #[test]
    fn dumps_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/BUILD"), "rule()\n").unwrap();
        std::fs::write(dir.path().join("pkg/lib.rs"), "fn x() {}\n").unwrap();

        let sink = Recorder::default();
        let pattern = Regex::new("^(?:.*BUILD)$").unwrap();
        trace_tree(&pattern, dir.path(), "origin", &sink);

        let records = sink.0.into_inner().unwrap();
        assert_eq!(records, vec!["MERGE_DEBUG origin pkg/BUILD:\nrule()\n".to_owned()]);
    }

    #[cfg(unix)]
    #[test]
    fn reports_symlinks_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", dir.path().join("link")).unwrap();

        let sink = Recorder::default();
        let pattern = Regex::new(".*").unwrap();
        trace_tree(&pattern, dir.path(), "baseline", &sink);

        let records = sink.0.into_inner().unwrap();
        assert_eq!(records, vec!["MERGE_DEBUG baseline link: symlink".to_owned()]);
    }

    #[test]
    fn unreadable_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bin.dat"), [0xff, 0xfe, 0x00]).unwrap();

        let sink = Recorder::default();
        let pattern = Regex::new(".*").unwrap();
        trace_tree(&pattern, dir.path(), "destination", &sink);

        assert!(sink.0.into_inner().unwrap().is_empty());
    }
}

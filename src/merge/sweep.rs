//! SWEEP step of the merge-import pipeline.
//!
//! Walks the destination tree after the merge phase and handles the files
//! the merge phase did not visit:
//!
//! - absent from origin and baseline → destination-only file; copy it into
//!   the origin tree so it survives the import;
//! - absent from origin but present in baseline → deleted upstream; delete it
//!   from the destination tree;
//! - otherwise → leave it alone.
//!
//! Presence in origin is tested without following symlinks: a link (even a
//! dangling one) counts as present and is never written through. A copy
//! whose origin parent directory is reached through a symlink is skipped
//! with a warning, so the sweep never writes outside the origin tree.
//!
//! The sweep reads the merge phase's visited set and never mutates it.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MergeImportError;
use crate::model::ReconciliationState;

use super::classify::Trees;
use super::walk::for_each_file;

/// What the sweep changed, by relative path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Destination-only files copied into the origin tree.
    pub added: BTreeSet<PathBuf>,
    /// Files deleted from the destination tree because origin dropped them.
    pub deleted: BTreeSet<PathBuf>,
}

/// Propagate destination-only additions into origin and upstream deletions
/// into destination.
///
/// # Errors
/// Returns [`MergeImportError::Io`] if the destination tree cannot be walked
/// or a copy / delete fails.
pub fn sweep(
    trees: Trees<'_>,
    state: &ReconciliationState,
) -> Result<SweepSummary, MergeImportError> {
    let mut summary = SweepSummary::default();
    for_each_file(trees.destination, |file, relative| {
        if state.was_visited(relative) {
            return Ok(());
        }
        let origin = trees.origin.join(relative);
        if origin.symlink_metadata().is_ok() {
            return Ok(());
        }

        if trees.baseline.join(relative).exists() {
            std::fs::remove_file(file).map_err(|e| MergeImportError::io(file, e))?;
            tracing::debug!(
                path = %relative.display(),
                "deleted upstream, removed from destination"
            );
            summary.deleted.insert(relative.to_path_buf());
            return Ok(());
        }

        if let Some(link) = linked_ancestor(trees.origin, relative) {
            tracing::warn!(
                path = %relative.display(),
                link = %link.display(),
                "origin directory is a symlink, not copying destination-only file"
            );
            return Ok(());
        }
        if let Some(parent) = origin.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MergeImportError::io(parent, e))?;
        }
        copy_new(file, &origin).map_err(|e| MergeImportError::io(&origin, e))?;
        tracing::debug!(path = %relative.display(), "destination-only file kept");
        summary.added.insert(relative.to_path_buf());
        Ok(())
    })?;
    Ok(summary)
}

/// First directory between `root` and `relative`'s parent that is a symlink.
fn linked_ancestor(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut current = root.to_path_buf();
    let parent = relative.parent()?;
    for component in parent.components() {
        current.push(component);
        match current.symlink_metadata() {
            Ok(meta) if meta.file_type().is_symlink() => return Some(current),
            Ok(_) => {}
            // Missing from here down; create_dir_all makes real directories.
            Err(_) => return None,
        }
    }
    None
}

/// Copy `from` to a path that must not exist yet. Fails with
/// `AlreadyExists` instead of following a link planted at `to`.
fn copy_new(from: &Path, to: &Path) -> io::Result<()> {
    let mut source = File::open(from)?;
    let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;
    io::copy(&mut source, &mut target)?;
    target.set_permissions(source.metadata()?.permissions())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::model::MergeCode;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            for tree in ["origin", "baseline", "destination"] {
                std::fs::create_dir_all(dir.path().join(tree)).unwrap();
            }
            Self { dir }
        }

        fn root(&self, tree: &str) -> PathBuf {
            self.dir.path().join(tree)
        }

        fn put(&self, tree: &str, rel: &str, content: &str) {
            let path = self.root(tree).join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn run(&self, state: &ReconciliationState) -> SweepSummary {
            let origin = self.root("origin");
            let baseline = self.root("baseline");
            let destination = self.root("destination");
            sweep(
                Trees {
                    origin: &origin,
                    baseline: &baseline,
                    destination: &destination,
                },
                state,
            )
            .unwrap()
        }
    }

    #[test]
    fn destination_only_file_is_copied_to_origin() {
        let fx = Fixture::new();
        fx.put("destination", "nested/dir/b.txt", "local only");

        let summary = fx.run(&ReconciliationState::default());

        assert_eq!(
            std::fs::read_to_string(fx.root("origin").join("nested/dir/b.txt")).unwrap(),
            "local only"
        );
        assert!(fx.root("destination").join("nested/dir/b.txt").exists());
        assert_eq!(
            summary.added.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("nested/dir/b.txt")]
        );
        assert!(summary.deleted.is_empty());
    }

    #[test]
    fn upstream_deletion_is_propagated() {
        let fx = Fixture::new();
        fx.put("baseline", "c.txt", "old");
        fx.put("destination", "c.txt", "old");

        let summary = fx.run(&ReconciliationState::default());

        assert!(!fx.root("destination").join("c.txt").exists());
        assert!(!fx.root("origin").join("c.txt").exists());
        assert_eq!(
            summary.deleted.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("c.txt")]
        );
    }

    #[test]
    fn file_present_in_origin_is_untouched() {
        let fx = Fixture::new();
        fx.put("origin", "a.txt", "upstream");
        fx.put("destination", "a.txt", "local");

        let summary = fx.run(&ReconciliationState::default());

        assert_eq!(
            std::fs::read_to_string(fx.root("origin").join("a.txt")).unwrap(),
            "upstream"
        );
        assert_eq!(
            std::fs::read_to_string(fx.root("destination").join("a.txt")).unwrap(),
            "local"
        );
        assert_eq!(summary, SweepSummary::default());
    }

    #[test]
    fn visited_paths_are_skipped() {
        let fx = Fixture::new();
        fx.put("baseline", "gone.txt", "old");
        fx.put("destination", "gone.txt", "old");
        let mut state = ReconciliationState::default();
        state.record(Path::new("gone.txt"), MergeCode::Success);

        let summary = fx.run(&state);

        assert!(fx.root("destination").join("gone.txt").exists());
        assert_eq!(summary, SweepSummary::default());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_origin_symlink_is_not_written_through() {
        let fx = Fixture::new();
        let outside = fx.dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(
            outside.join("escaped.txt"),
            fx.root("origin").join("local.txt"),
        )
        .unwrap();
        fx.put("destination", "local.txt", "destination-only content");

        let summary = fx.run(&ReconciliationState::default());

        assert!(!outside.join("escaped.txt").exists());
        assert!(
            fx.root("origin")
                .join("local.txt")
                .symlink_metadata()
                .unwrap()
                .file_type()
                .is_symlink()
        );
        assert_eq!(summary, SweepSummary::default());
    }

    #[cfg(unix)]
    #[test]
    fn origin_directory_symlink_is_not_written_through() {
        let fx = Fixture::new();
        let outside = fx.dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, fx.root("origin").join("pkg")).unwrap();
        fx.put("destination", "pkg/new.txt", "local");

        let summary = fx.run(&ReconciliationState::default());

        assert!(!outside.join("new.txt").exists());
        assert!(summary.added.is_empty());
        assert!(fx.root("destination").join("pkg/new.txt").exists());
    }

    #[test]
    fn copy_refuses_existing_target() {
        let fx = Fixture::new();
        fx.put("destination", "a.txt", "new");
        fx.put("origin", "a.txt", "old");

        let err = copy_new(
            &fx.root("destination").join("a.txt"),
            &fx.root("origin").join("a.txt"),
        )
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(
            std::fs::read_to_string(fx.root("origin").join("a.txt")).unwrap(),
            "old"
        );
    }

    #[cfg(unix)]
    #[test]
    fn destination_symlinks_are_skipped() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink("elsewhere", fx.root("destination").join("link")).unwrap();

        let summary = fx.run(&ReconciliationState::default());

        assert!(fx.root("origin").join("link").symlink_metadata().is_err());
        assert_eq!(summary, SweepSummary::default());
    }
}

//! Tree traversal shared by the classify and sweep phases.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::MergeImportError;

/// Visit every regular file under `root` in file-name order.
///
/// Symlinks are never followed and never visited. `visit` receives the
/// absolute file path and the path relative to `root`. Traversal errors
/// abort the walk.
pub fn for_each_file<F>(root: &Path, mut visit: F) -> Result<(), MergeImportError>
where
    F: FnMut(&Path, &Path) -> Result<(), MergeImportError>,
{
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            MergeImportError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file = entry.path();
        let Ok(relative) = file.strip_prefix(root) else {
            continue;
        };
        visit(file, relative)?;
    }
    Ok(())
}

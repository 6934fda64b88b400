//! Glob filter over paths relative to a package root.
//!
//! Only files the filter accepts become merge candidates. Everything else is
//! left untouched by the merge phase, whatever its content.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::MergeImportError;

/// `*` and `?` never cross a `/`; `**` does.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude glob predicate rooted at a package directory.
///
/// A path matches when it lies under the package root, matches at least one
/// include pattern (or the include list is empty), and matches no exclude
/// pattern.
#[derive(Clone, Debug)]
pub struct PathFilter {
    package_root: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    /// Compile a filter.
    ///
    /// # Errors
    /// Returns [`MergeImportError::InvalidPackageRoot`] if `package_root` is
    /// absolute or escapes with `..`, and [`MergeImportError::InvalidPattern`]
    /// for any glob that fails to compile.
    pub fn new<S: AsRef<str>>(
        package_root: impl Into<PathBuf>,
        include: &[S],
        exclude: &[S],
    ) -> Result<Self, MergeImportError> {
        let package_root = package_root.into();
        validate_package_root(&package_root)?;
        let package_root: PathBuf = package_root
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        Ok(Self {
            package_root,
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
        })
    }

    /// A filter accepting every path under the tree root.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            package_root: PathBuf::new(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// The package root, relative to each tree root.
    #[must_use]
    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    /// Rebase a tree-relative path under the package root. `None` when the
    /// path lies outside it.
    #[must_use]
    pub fn rebase<'a>(&self, relative: &'a Path) -> Option<&'a Path> {
        relative.strip_prefix(&self.package_root).ok()
    }

    /// Test a path that is already relative to the package root.
    #[must_use]
    pub fn matches(&self, under_root: &Path) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|p| p.matches_path_with(under_root, MATCH_OPTIONS));
        included
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_path_with(under_root, MATCH_OPTIONS))
    }

    /// Rebase a tree-relative path and test it.
    #[must_use]
    pub fn accepts(&self, relative: &Path) -> bool {
        self.rebase(relative).is_some_and(|p| self.matches(p))
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::all()
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, MergeImportError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| MergeImportError::InvalidPattern {
                pattern: p.to_owned(),
                detail: e.to_string(),
            })
        })
        .collect()
}

/// Reject package roots that are absolute or step outside the tree.
///
/// # Errors
/// Returns [`MergeImportError::InvalidPackageRoot`] describing the offending
/// component.
pub fn validate_package_root(path: &Path) -> Result<(), MergeImportError> {
    for component in path.components() {
        let reason = match component {
            Component::Normal(_) | Component::CurDir => continue,
            Component::ParentDir => "contains '..'",
            Component::RootDir | Component::Prefix(_) => "must be relative",
        };
        return Err(MergeImportError::InvalidPackageRoot {
            path: path.to_path_buf(),
            reason: reason.to_owned(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

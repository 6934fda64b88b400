//! The merge capability and its command-line implementation.
//!
//! The engine never runs a merge tool directly. It calls a [`MergeRunner`],
//! which tests replace with an in-memory fake. [`CommandMergeRunner`] is the
//! production implementation: it shells out to a diff3-compatible command
//! (`diff3 -m` by default) and maps its exit status onto a [`MergeCode`].
//! The tool must follow diff3's convention: 0 clean, 1 conflicts, 2 trouble.

use std::path::Path;
use std::process::Command;

use crate::error::MergeImportError;
use crate::model::{MergeCode, MergeOutcome};

/// Three-way merge of one file.
pub trait MergeRunner: Send + Sync {
    /// Merge `theirs` into `mine` against the common ancestor `baseline`.
    ///
    /// `workdir` is a scratch directory the implementation may use freely.
    /// It is shared by concurrent calls.
    ///
    /// # Errors
    /// Returns an error when the merge could not be attempted at all. Content
    /// conflicts and tool trouble are outcomes, not errors.
    fn merge(
        &self,
        mine: &Path,
        theirs: &Path,
        baseline: &Path,
        workdir: &Path,
    ) -> Result<MergeOutcome, MergeImportError>;
}

/// Runs an external diff3-style command: `<program> <args...> <mine>
/// <baseline> <theirs>`, reading merged content from stdout.
///
/// Exit status 0 → [`MergeCode::Success`], 1 → [`MergeCode::Conflict`],
/// 2 → [`MergeCode::Trouble`]. Anything else is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandMergeRunner {
    program: String,
    args: Vec<String>,
}

impl CommandMergeRunner {
    /// Build a runner from a command prefix such as `["diff3", "-m"]`.
    ///
    /// # Errors
    /// Returns [`MergeImportError::InvalidConfig`] if `command` is empty.
    pub fn new<S: AsRef<str>>(command: &[S]) -> Result<Self, MergeImportError> {
        let Some((program, args)) = command.split_first() else {
            return Err(MergeImportError::InvalidConfig {
                path: None,
                detail: "merge tool command is empty".to_owned(),
            });
        };
        let program = program.as_ref();
        if program.is_empty() {
            return Err(MergeImportError::InvalidConfig {
                path: None,
                detail: "merge tool command is empty".to_owned(),
            });
        }
        Ok(Self {
            program: program.to_owned(),
            args: args.iter().map(|a| a.as_ref().to_owned()).collect(),
        })
    }

    /// `diff3 -m`.
    #[must_use]
    pub fn diff3() -> Self {
        Self {
            program: "diff3".to_owned(),
            args: vec!["-m".to_owned()],
        }
    }

    fn describe(&self) -> String {
        let mut command = self.program.clone();
        for arg in &self.args {
            command.push(' ');
            command.push_str(arg);
        }
        command.push_str(" <mine> <baseline> <theirs>");
        command
    }
}

impl Default for CommandMergeRunner {
    fn default() -> Self {
        Self::diff3()
    }
}

impl MergeRunner for CommandMergeRunner {
    fn merge(
        &self,
        mine: &Path,
        theirs: &Path,
        baseline: &Path,
        workdir: &Path,
    ) -> Result<MergeOutcome, MergeImportError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(mine)
            .arg(baseline)
            .arg(theirs)
            .current_dir(workdir)
            .output()
            .map_err(|e| MergeImportError::io(&self.program, e))?;

        let code = match output.status.code() {
            Some(0) => MergeCode::Success,
            Some(1) => MergeCode::Conflict,
            Some(2) => MergeCode::Trouble,
            code => {
                return Err(MergeImportError::MergeTool {
                    command: self.describe(),
                    exit_code: code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                });
            }
        };
        if code == MergeCode::Trouble {
            tracing::debug!(
                file = %mine.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "merge tool reported trouble"
            );
        }
        Ok(MergeOutcome {
            content: output.stdout,
            code,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

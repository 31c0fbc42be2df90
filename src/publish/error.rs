use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::state::Step;
use crate::git::VcsError;
use crate::naming::BranchNameError;

/// Reasons a publish run stops before producing a successful result
#[derive(Debug, Error)]
pub enum PublishError {
    /// The version-control executable cannot be run
    #[error("required executable is unavailable")]
    Environment {
        #[source]
        source: VcsError,
    },

    /// Clone or push could not reach or authenticate to the remote
    #[error("remote access failed during {step}")]
    RemoteAccess {
        step: Step,
        #[source]
        source: VcsError,
    },

    /// Destructive overwrite was not confirmed
    #[error("overwrite of '{branch}' was not confirmed; nothing was pushed")]
    Aborted { branch: String },

    /// The remote already has the branch with history we would not fast-forward
    #[error("remote rejected '{branch}'; it already exists with diverging history, choose another branch name")]
    PushConflict {
        branch: String,
        #[source]
        source: VcsError,
    },

    #[error("no remote given; pass --remote or set `remote` in the config file")]
    MissingRemote,

    #[error("source directory {} {reason}", .path.display())]
    Source { path: PathBuf, reason: String },

    #[error(transparent)]
    InvalidBranch(#[from] BranchNameError),

    /// Safe mode must never move the remote's default branch
    #[error("'{branch}' is the remote's default branch; safe-branch mode only creates new branches")]
    DefaultBranchTarget { branch: String },

    #[error("could not determine the remote's default branch")]
    NoDefaultBranch,

    #[error("{step} failed")]
    Git {
        step: Step,
        #[source]
        source: VcsError,
    },

    #[error("{step} failed")]
    Io {
        step: Step,
        #[source]
        source: io::Error,
    },
}

impl PublishError {
    /// Map a version-control failure at `step` onto the publish taxonomy
    pub fn from_vcs(step: Step, source: VcsError) -> Self {
        match source {
            VcsError::NotInstalled(_) => PublishError::Environment { source },
            VcsError::Remote { .. } => PublishError::RemoteAccess { step, source },
            VcsError::Rejected { branch, detail } => PublishError::PushConflict {
                branch: branch.clone(),
                source: VcsError::Rejected { branch, detail },
            },
            other => PublishError::Git {
                step,
                source: other,
            },
        }
    }

    pub fn io(step: Step) -> impl FnOnce(io::Error) -> Self {
        move |source| PublishError::Io { step, source }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, PublishError::Aborted { .. })
    }

    /// Step the run stopped at, when the error is tied to one
    pub fn step(&self) -> Option<Step> {
        match self {
            PublishError::Environment { .. } => Some(Step::Preflight),
            PublishError::RemoteAccess { step, .. }
            | PublishError::Git { step, .. }
            | PublishError::Io { step, .. } => Some(*step),
            PublishError::Aborted { .. } => Some(Step::Confirm),
            PublishError::PushConflict { .. } => Some(Step::Push),
            PublishError::DefaultBranchTarget { .. } => Some(Step::PrepareBranch),
            PublishError::NoDefaultBranch => Some(Step::DetectDefaultBranch),
            PublishError::MissingRemote
            | PublishError::Source { .. }
            | PublishError::InvalidBranch(_) => None,
        }
    }

    /// Branch the error is about, if it names one
    pub fn branch(&self) -> Option<&str> {
        match self {
            PublishError::Aborted { branch }
            | PublishError::PushConflict { branch, .. }
            | PublishError::DefaultBranchTarget { branch } => Some(branch.as_str()),
            _ => None,
        }
    }
}

/// A run that ended in a [`PublishError`], with the clone it left on disk
#[derive(Debug)]
pub struct RunFailure {
    pub error: PublishError,
    /// Ephemeral clone kept for inspection or because `keep_clone` was set
    pub clone_dir: Option<PathBuf>,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

impl From<PublishError> for RunFailure {
    fn from(error: PublishError) -> Self {
        Self {
            error,
            clone_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vcs_classifies() {
        let env = PublishError::from_vcs(Step::Preflight, VcsError::NotInstalled("git".into()));
        assert!(matches!(env, PublishError::Environment { .. }));

        let remote = PublishError::from_vcs(
            Step::Clone,
            VcsError::Remote {
                action: "clone",
                detail: "Could not resolve host".into(),
            },
        );
        assert!(matches!(remote, PublishError::RemoteAccess { step: Step::Clone, .. }));

        let conflict = PublishError::from_vcs(
            Step::Push,
            VcsError::Rejected {
                branch: "export-1".into(),
                detail: "fetch first".into(),
            },
        );
        assert_eq!(conflict.branch(), Some("export-1"));
        assert_eq!(conflict.step(), Some(Step::Push));

        let other = PublishError::from_vcs(
            Step::Commit,
            VcsError::Command {
                command: "git commit".into(),
                detail: "boom".into(),
            },
        );
        assert!(matches!(other, PublishError::Git { step: Step::Commit, .. }));
    }

    #[test]
    fn test_abort_is_not_a_failure_step() {
        let err = PublishError::Aborted {
            branch: "main".into(),
        };
        assert!(err.is_abort());
        assert_eq!(err.step(), Some(Step::Confirm));
        assert!(err.to_string().contains("main"));
    }
}

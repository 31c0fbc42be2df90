//! Version-control capability used by the publisher.
//!
//! The pipeline only talks to [`Vcs`]; [`GitCli`] is the production
//! implementation backed by the `git` executable and libgit2.

mod cli;
pub mod refs;

use std::io;
use std::path::Path;

use thiserror::Error;

pub use cli::GitCli;

/// Errors raised by version-control operations
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("`{0}` executable not found on PATH")]
    NotInstalled(String),

    #[error("git {action} failed: {detail}")]
    Remote { action: &'static str, detail: String },

    #[error("push of {branch} rejected: {detail}")]
    Rejected { branch: String, detail: String },

    #[error("{command} failed: {detail}")]
    Command { command: String, detail: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Git(#[from] git2::Error),
}

pub type Result<T> = std::result::Result<T, VcsError>;

/// Narrow set of repository operations the publishing pipeline needs
pub trait Vcs {
    /// Fail with [`VcsError::NotInstalled`] if the tool cannot be executed
    fn check_available(&self) -> Result<()>;

    /// Clone `remote` into `dest` (which must not exist yet)
    fn clone_repo(&self, remote: &str, dest: &Path) -> Result<()>;

    /// Branch named by the clone's `origin/HEAD`, if the remote advertised one
    fn remote_head(&self, repo: &Path) -> Result<Option<String>>;

    /// Whether `origin/<branch>` exists in the clone
    fn has_remote_branch(&self, repo: &Path, branch: &str) -> Result<bool>;

    /// Branch the clone's HEAD points at, even when it has no commits yet
    fn head_branch(&self, repo: &Path) -> Result<Option<String>>;

    /// Commit id of HEAD, or `None` for an unborn branch
    fn head_commit(&self, repo: &Path) -> Result<Option<String>>;

    /// Create `branch` from the current tip and switch to it
    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()>;

    /// Point HEAD at an unborn `branch`, dropping any local branch of that
    /// name. The next commit becomes a root commit; index and worktree stay.
    fn start_orphan(&self, repo: &Path, branch: &str) -> Result<()>;

    /// Stage every addition, modification and deletion, ignore rules included
    fn add_all(&self, repo: &Path) -> Result<()>;

    fn has_staged_changes(&self, repo: &Path) -> Result<bool>;

    /// Commit the index, even when it matches HEAD, and return the new commit id
    fn commit(&self, repo: &Path, message: &str) -> Result<String>;

    /// Push `branch` to `origin` without rewriting history
    fn push(&self, repo: &Path, branch: &str) -> Result<()>;

    /// Push `branch` to `origin`, replacing whatever the remote ref holds
    fn push_force(&self, repo: &Path, branch: &str) -> Result<()>;
}

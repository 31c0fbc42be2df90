//! Reference inspection through libgit2.

use std::path::Path;

use git2::{BranchType, ErrorCode, Repository};

use super::Result;

/// Open a (non-bare) working clone
pub fn open(path: &Path) -> Result<Repository> {
    Ok(Repository::open(path)?)
}

/// Read `refs/remotes/origin/HEAD` and return the branch it targets
pub fn remote_head(path: &Path) -> Result<Option<String>> {
    let repo = open(path)?;

    let head = match repo.find_reference("refs/remotes/origin/HEAD") {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // refs/remotes/origin/main -> main
    Ok(head
        .symbolic_target()
        .and_then(|target| target.strip_prefix("refs/remotes/origin/"))
        .map(str::to_string))
}

/// Check for a remote-tracking branch `origin/<branch>`
pub fn has_remote_branch(path: &Path, branch: &str) -> Result<bool> {
    let repo = open(path)?;
    let remote_name = format!("origin/{}", branch);
    Ok(repo.find_branch(&remote_name, BranchType::Remote).is_ok())
}

/// Check for a local branch `refs/heads/<branch>`
pub fn has_local_branch(path: &Path, branch: &str) -> Result<bool> {
    let repo = open(path)?;
    Ok(repo.find_branch(branch, BranchType::Local).is_ok())
}

/// Branch HEAD points to; works for unborn branches too
pub fn head_branch(path: &Path) -> Result<Option<String>> {
    let repo = open(path)?;
    let head = repo.find_reference("HEAD")?;
    Ok(head
        .symbolic_target()
        .and_then(|target| target.strip_prefix("refs/heads/"))
        .map(str::to_string))
}

/// Commit id HEAD resolves to, `None` while the branch is unborn
pub fn head_commit(path: &Path) -> Result<Option<String>> {
    let repo = open(path)?;
    match repo.head() {
        Ok(head) => Ok(head.target().map(|oid| oid.to_string())),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

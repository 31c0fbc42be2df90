//! Helpers for tests that need real repositories on disk.

use std::fs;
use std::path::Path;
use std::process::Command;

use git2::{ObjectType, Oid, Repository, RepositoryInitOptions, Signature, TreeWalkMode, TreeWalkResult};
use tempfile::TempDir;

use crate::git::GitCli;

/// GitCli with a fixed identity so commits work without a user git config
pub fn git() -> GitCli {
    GitCli::new().with_identity(Some((
        "Test User".to_string(),
        "test@test.com".to_string(),
    )))
}

/// Path of a local repository as a clone URL
pub fn url(dir: &TempDir) -> String {
    dir.path().display().to_string()
}

/// Create a working repository on `branch` with a single README.md commit
pub fn create_test_repo(branch: &str) -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = init_repo_at(dir.path(), branch);
    (dir, repo)
}

/// Initialize a working repository at `path` with a single README.md commit
pub fn init_repo_at(path: &Path, branch: &str) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(branch);
    let repo = Repository::init_opts(path, &opts).unwrap();

    {
        let sig = Signature::now("Test User", "test@test.com").unwrap();
        let tree_id = {
            let mut index = repo.index().unwrap();
            fs::write(path.join("README.md"), "# Test").unwrap();
            index.add_path(Path::new("README.md")).unwrap();
            index.write().unwrap();
            index.write_tree().unwrap()
        };
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
    }

    repo
}

/// Create a bare remote. With `Some(branch)` it holds one commit on that
/// branch and HEAD points at it; with `None` it is empty.
pub fn create_remote(branch: Option<&str>) -> TempDir {
    let bare_dir = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.bare(true).initial_head(branch.unwrap_or("main"));
    Repository::init_opts(bare_dir.path(), &opts).unwrap();

    if let Some(branch) = branch {
        let (work_dir, _repo) = create_test_repo(branch);
        let output = Command::new("git")
            .arg("-C")
            .arg(work_dir.path())
            .arg("push")
            .arg("--quiet")
            .arg(bare_dir.path())
            .arg(format!("HEAD:refs/heads/{}", branch))
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "seeding remote failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    bare_dir
}

/// Tip of `refs/heads/<branch>` in any repository (bare or `.git` dir)
pub fn branch_tip(repo_path: &Path, branch: &str) -> Option<Oid> {
    let repo = Repository::open(repo_path).unwrap();
    repo.find_reference(&format!("refs/heads/{}", branch))
        .ok()
        .and_then(|r| r.target())
}

/// Sorted file paths in the tree of `refs/heads/<branch>`
pub fn branch_files(repo_path: &Path, branch: &str) -> Vec<String> {
    let repo = Repository::open(repo_path).unwrap();
    let oid = branch_tip(repo_path, branch).expect("branch should exist");
    let tree = repo.find_commit(oid).unwrap().tree().unwrap();

    let mut files = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            files.push(format!("{}{}", root, entry.name().unwrap()));
        }
        TreeWalkResult::Ok
    })
    .unwrap();
    files.sort();
    files
}

/// Number of commits reachable from `refs/heads/<branch>`
pub fn commit_count(repo_path: &Path, branch: &str) -> usize {
    let repo = Repository::open(repo_path).unwrap();
    let oid = branch_tip(repo_path, branch).expect("branch should exist");
    let mut walk = repo.revwalk().unwrap();
    walk.push(oid).unwrap();
    walk.count()
}

/// Whether `ancestor` is reachable from the tip of `refs/heads/<branch>`
pub fn is_ancestor(repo_path: &Path, ancestor: Oid, branch: &str) -> bool {
    let repo = Repository::open(repo_path).unwrap();
    let tip = branch_tip(repo_path, branch).expect("branch should exist");
    tip == ancestor || repo.graph_descendant_of(tip, ancestor).unwrap()
}

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

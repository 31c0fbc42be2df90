use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{refs, Result, Vcs, VcsError};

/// [`Vcs`] backed by the `git` executable.
///
/// Porcelain operations (clone, checkout, commit, push) shell out so that the
/// user's credential helpers, SSH config and hooks apply. Reference queries go
/// through libgit2.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    identity: Option<(String, String)>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            identity: None,
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable instead of `git` from PATH
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Commit as `name <email>` regardless of the user's git config
    pub fn with_identity(mut self, identity: Option<(String, String)>) -> Self {
        self.identity = identity;
        self
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn spawn_error(&self, e: io::Error) -> VcsError {
        if e.kind() == io::ErrorKind::NotFound {
            VcsError::NotInstalled(self.program.display().to_string())
        } else {
            VcsError::Io(e)
        }
    }

    /// Run `git -C <repo> <args>` and return its output, failing on non-zero exit
    fn git_in<I, S>(&self, repo: &Path, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let output = self
            .command()
            .arg("-C")
            .arg(repo)
            .args(&args)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let rendered: Vec<String> = args
                .iter()
                .map(|a| AsRef::<OsStr>::as_ref(a).to_string_lossy().into_owned())
                .collect();
            return Err(VcsError::Command {
                command: format!("git {}", rendered.join(" ")),
                detail: stderr_of(&output),
            });
        }

        Ok(output)
    }

    fn push_with(&self, repo: &Path, branch: &str, force: bool) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("-C").arg(repo).arg("push").arg("--quiet");

        if force {
            cmd.arg("--force");
        }

        // Explicit refspec: never let push.default pick another ref
        cmd.arg("origin").arg(format!("{0}:refs/heads/{0}", branch));

        let output = cmd.output().map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let detail = stderr_of(&output);
            if is_rejection(&detail) {
                return Err(VcsError::Rejected {
                    branch: branch.to_string(),
                    detail,
                });
            }
            return Err(VcsError::Remote {
                action: "push",
                detail,
            });
        }

        Ok(())
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Non-fast-forward style rejections, as opposed to transport/auth failures
fn is_rejection(stderr: &str) -> bool {
    stderr.contains("[rejected]")
        || stderr.contains("non-fast-forward")
        || stderr.contains("fetch first")
}

impl Vcs for GitCli {
    fn check_available(&self) -> Result<()> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(VcsError::NotInstalled(self.program.display().to_string()));
        }

        Ok(())
    }

    fn clone_repo(&self, remote: &str, dest: &Path) -> Result<()> {
        let output = self
            .command()
            .arg("clone")
            .arg("--quiet")
            .arg(remote)
            .arg(dest)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(VcsError::Remote {
                action: "clone",
                detail: stderr_of(&output),
            });
        }

        Ok(())
    }

    fn remote_head(&self, repo: &Path) -> Result<Option<String>> {
        refs::remote_head(repo)
    }

    fn has_remote_branch(&self, repo: &Path, branch: &str) -> Result<bool> {
        refs::has_remote_branch(repo, branch)
    }

    fn head_branch(&self, repo: &Path) -> Result<Option<String>> {
        refs::head_branch(repo)
    }

    fn head_commit(&self, repo: &Path) -> Result<Option<String>> {
        refs::head_commit(repo)
    }

    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        if refs::head_commit(repo)?.is_none() {
            // Nothing to branch from yet: just point the unborn HEAD elsewhere
            let head_ref = format!("refs/heads/{}", branch);
            self.git_in(repo, ["symbolic-ref", "HEAD", head_ref.as_str()])?;
        } else {
            self.git_in(repo, ["checkout", "--quiet", "-b", branch])?;
        }
        Ok(())
    }

    fn start_orphan(&self, repo: &Path, branch: &str) -> Result<()> {
        let head_ref = format!("refs/heads/{}", branch);
        self.git_in(repo, ["symbolic-ref", "HEAD", head_ref.as_str()])?;
        if refs::has_local_branch(repo, branch)? {
            self.git_in(repo, ["update-ref", "-d", head_ref.as_str()])?;
        }
        Ok(())
    }

    fn add_all(&self, repo: &Path) -> Result<()> {
        // --force: .gitignore and excludes files must not drop source files
        self.git_in(repo, ["add", "--all", "--force", "--", "."])?;
        Ok(())
    }

    fn has_staged_changes(&self, repo: &Path) -> Result<bool> {
        let output = self.git_in(repo, ["status", "--porcelain"])?;
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<String> {
        let mut args: Vec<String> = Vec::new();
        if let Some((name, email)) = &self.identity {
            args.push("-c".to_string());
            args.push(format!("user.name={}", name));
            args.push("-c".to_string());
            args.push(format!("user.email={}", email));
        }
        args.extend(["commit", "--quiet", "--allow-empty", "-m", message].map(String::from));

        self.git_in(repo, &args)?;

        refs::head_commit(repo)?.ok_or_else(|| VcsError::Command {
            command: "git commit".to_string(),
            detail: "HEAD is unborn after commit".to_string(),
        })
    }

    fn push(&self, repo: &Path, branch: &str) -> Result<()> {
        self.push_with(repo, branch, false)
    }

    fn push_force(&self, repo: &Path, branch: &str) -> Result<()> {
        self.push_with(repo, branch, true)
    }
}

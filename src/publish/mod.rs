//! The publish pipeline.
//!
//! One run clones the remote into a fresh scratch directory, swaps the
//! clone's working tree for the source directory, commits, and pushes either
//! a new branch or a single parentless commit that force-replaces the default
//! branch:
//!
//! ```text
//! Init -> Cloned -> BranchPrepared -> ContentReplaced -> Committed -> Pushed -> Done
//! ```
//!
//! Nothing on the remote changes before the push, and in destructive mode
//! nothing past the confirmation gate runs without the exact token.

mod clock;
mod confirm;
mod content;
mod error;
mod result;
mod scratch;
mod state;

use std::path::{Path, PathBuf};

pub use clock::{Clock, FixedClock, SystemClock};
pub use confirm::{read_confirmation, Confirm, StdinConfirm, CONFIRM_TOKEN};
pub use content::{replace_content, ContentStats};
pub use error::{PublishError, RunFailure};
pub use result::{Outcome, PublishResult};
pub use scratch::ScratchArea;
pub use state::{RunState, Step};

use crate::git::Vcs;
use crate::naming::{commit_message, derive_branch_name, validate_branch_name};
use crate::output::Output;
use crate::types::{Config, PublishMode};

/// Caller-supplied parameters for a run, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub remote: Option<String>,
    pub source: PathBuf,
    pub branch: Option<String>,
    pub mode: PublishMode,
    pub keep_clone: bool,
}

/// Fully resolved, immutable parameters of one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub remote: String,
    /// Canonical source directory
    pub source: PathBuf,
    /// Target branch for safe mode (explicit or derived)
    pub branch: String,
    pub branch_explicit: bool,
    pub mode: PublishMode,
    /// Directory under which the ephemeral clone is created
    pub scratch_root: PathBuf,
    pub commit_message: String,
    /// Probe order for the default branch
    pub default_branches: Vec<String>,
    pub keep_clone: bool,
}

impl RunConfig {
    /// Apply config-file defaults and the clock to the caller's options
    pub fn resolve(opts: RunOptions, config: &Config, clock: &dyn Clock) -> Result<Self, PublishError> {
        let remote = opts
            .remote
            .or_else(|| config.remote.clone())
            .filter(|r| !r.trim().is_empty())
            .ok_or(PublishError::MissingRemote)?;

        let source = check_source(&opts.source)?;

        let now = clock.now();
        let (branch, branch_explicit) = match opts.branch {
            Some(name) => (name, true),
            None => (derive_branch_name(&config.branch_prefix, &now), false),
        };
        validate_branch_name(&branch)?;

        let scratch_root = config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            remote,
            source,
            branch,
            branch_explicit,
            mode: opts.mode,
            scratch_root,
            commit_message: commit_message(&config.commit_message, &now),
            default_branches: config.default_branches.clone(),
            keep_clone: opts.keep_clone || config.keep_clone,
        })
    }
}

fn check_source(path: &Path) -> Result<PathBuf, PublishError> {
    let source_error = |reason: &str| PublishError::Source {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !path.exists() {
        return Err(source_error("does not exist"));
    }
    if !path.is_dir() {
        return Err(source_error("is not a directory"));
    }

    let canonical = path
        .canonicalize()
        .map_err(|e| source_error(&format!("cannot be resolved: {}", e)))?;
    std::fs::read_dir(&canonical).map_err(|e| source_error(&format!("is not readable: {}", e)))?;

    Ok(canonical)
}

/// Tracks the run's state and logs every transition in verbose mode
struct Run<'a> {
    state: RunState,
    out: &'a Output,
}

impl<'a> Run<'a> {
    fn new(out: &'a Output) -> Self {
        Self {
            state: RunState::Init,
            out,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        self.out
            .verbose(&format!("state {:?} -> {:?}", self.state, next));
        self.state = next;
    }
}

/// Runs the publish pipeline against injected capabilities
pub struct Publisher<'a> {
    vcs: &'a dyn Vcs,
    confirm: &'a dyn Confirm,
    out: &'a Output,
}

impl<'a> Publisher<'a> {
    pub fn new(vcs: &'a dyn Vcs, confirm: &'a dyn Confirm, out: &'a Output) -> Self {
        Self { vcs, confirm, out }
    }

    /// Execute one run.
    ///
    /// The scratch clone is removed after success or abort unless
    /// `keep_clone` is set. After a failure past the clone step it is kept.
    /// A kept clone's location is reported on the result or the failure.
    pub fn publish(&self, config: &RunConfig) -> Result<PublishResult, RunFailure> {
        let mut run = Run::new(self.out);
        let mut scratch = None;

        let result = self.execute(config, &mut run, &mut scratch);

        match &result {
            Ok(_) => {}
            Err(e) if e.is_abort() => run.advance(RunState::Aborted),
            Err(_) => run.advance(RunState::Failed),
        }

        let kept = match scratch {
            Some(area) => self.dispose(area, config, &run),
            None => None,
        };

        match result {
            Ok(mut published) => {
                published.clone_dir = kept;
                Ok(published)
            }
            Err(error) => Err(RunFailure {
                error,
                clone_dir: kept,
            }),
        }
    }

    fn dispose(
        &self,
        area: ScratchArea,
        config: &RunConfig,
        run: &Run<'_>,
    ) -> Option<PathBuf> {
        // A failed clone leaves nothing worth inspecting
        let inspect = run.state == RunState::Failed && area.path().join(".git").exists();

        if config.keep_clone || inspect {
            let path = area.keep();
            if inspect {
                self.out
                    .warn(&format!("keeping clone for inspection: {}", path.display()));
            } else {
                self.out.verbose(&format!("kept clone at {}", path.display()));
            }
            return Some(path);
        }

        let path = area.path().to_path_buf();
        if let Err(e) = area.remove() {
            self.out.warn(&format!(
                "failed to remove scratch clone {}: {}",
                path.display(),
                e
            ));
            return Some(path);
        }
        None
    }

    fn execute(
        &self,
        config: &RunConfig,
        run: &mut Run<'_>,
        scratch: &mut Option<ScratchArea>,
    ) -> Result<PublishResult, PublishError> {
        self.out.verbose("checking for git");
        self.vcs
            .check_available()
            .map_err(|source| PublishError::Environment { source })?;

        let area = ScratchArea::create(&config.scratch_root).map_err(PublishError::io(Step::Clone))?;
        let clone = area.path().to_path_buf();
        *scratch = Some(area);

        self.out.status("Cloning", &config.remote);
        self.vcs
            .clone_repo(&config.remote, &clone)
            .map_err(|e| PublishError::from_vcs(Step::Clone, e))?;
        run.advance(RunState::Cloned);

        let default_branch = self.detect_default_branch(&clone, &config.default_branches)?;
        self.out
            .verbose(&format!("remote default branch is {}", default_branch));

        let target = self.resolve_target(config, &clone, &default_branch)?;

        if config.mode.is_destructive() {
            self.confirm_overwrite(config, &target)?;
        }

        // Destructive mode discards the existing ref's history
        let rewrites = config.mode.is_destructive()
            && self
                .vcs
                .has_remote_branch(&clone, &target)
                .map_err(|e| PublishError::from_vcs(Step::PrepareBranch, e))?;

        self.out.status("Preparing", &format!("branch {}", target));
        self.prepare_branch(config.mode, &clone, &target)
            .map_err(|e| PublishError::from_vcs(Step::PrepareBranch, e))?;
        run.advance(RunState::BranchPrepared);

        self.out.status("Copying", &config.source.display().to_string());
        let stats = replace_content(&config.source, &clone).map_err(PublishError::io(Step::ReplaceContent))?;
        self.out.verbose(&format!(
            "removed {} entries, copied {} files",
            stats.removed, stats.copied
        ));
        run.advance(RunState::ContentReplaced);

        let (commit, changed) = self.commit(config, &clone, rewrites)?;
        run.advance(RunState::Committed);

        let pushed = match &commit {
            Some(_) => {
                self.push(config.mode, &clone, &target)?;
                run.advance(RunState::Pushed);
                true
            }
            None => {
                self.out
                    .info("Nothing to push: neither the remote nor the source has content");
                false
            }
        };
        run.advance(RunState::Done);

        let (outcome, reason) = if changed {
            (Outcome::Published, format!("published {} to {}", target, config.remote))
        } else {
            (
                Outcome::Unchanged,
                format!("{} already matches the source; nothing new was committed", target),
            )
        };

        Ok(PublishResult {
            outcome,
            reason,
            branch: target,
            mode: config.mode,
            history_rewritten: pushed && rewrites,
            commit,
            default_branch: Some(default_branch),
            step: None,
            clone_dir: None,
        })
    }

    /// Default branch from `origin/HEAD`, then the probe list, then the
    /// clone's unborn HEAD (empty remote), then the first preference.
    fn detect_default_branch(&self, clone: &Path, preferred: &[String]) -> Result<String, PublishError> {
        let vcs_err = |e| PublishError::from_vcs(Step::DetectDefaultBranch, e);

        if let Some(branch) = self.vcs.remote_head(clone).map_err(vcs_err)? {
            return Ok(branch);
        }

        for name in preferred {
            if self.vcs.has_remote_branch(clone, name).map_err(vcs_err)? {
                return Ok(name.clone());
            }
        }

        if let Some(branch) = self.vcs.head_branch(clone).map_err(vcs_err)? {
            return Ok(branch);
        }

        preferred.first().cloned().ok_or(PublishError::NoDefaultBranch)
    }

    fn resolve_target(&self, config: &RunConfig, clone: &Path, default_branch: &str) -> Result<String, PublishError> {
        match config.mode {
            PublishMode::SafeBranch => {
                if config.branch == default_branch {
                    return Err(PublishError::DefaultBranchTarget {
                        branch: config.branch.clone(),
                    });
                }
                let exists = self
                    .vcs
                    .has_remote_branch(clone, &config.branch)
                    .map_err(|e| PublishError::from_vcs(Step::PrepareBranch, e))?;
                if exists {
                    self.out.warn(&format!(
                        "remote already has {}; the push only succeeds if it fast-forwards",
                        config.branch
                    ));
                }
                Ok(config.branch.clone())
            }
            PublishMode::DestructiveOverwrite => {
                if config.branch_explicit && config.branch != default_branch {
                    self.out.warn(&format!(
                        "ignoring --branch {}: overwrite always targets the default branch",
                        config.branch
                    ));
                }
                Ok(default_branch.to_string())
            }
        }
    }

    fn confirm_overwrite(&self, config: &RunConfig, target: &str) -> Result<(), PublishError> {
        self.out.warn(&format!(
            "this will overwrite {} on {} and discard its history",
            target, config.remote
        ));
        self.out.flush();

        let prompt = format!("Type {} to overwrite '{}': ", CONFIRM_TOKEN, target);
        let confirmed = self
            .confirm
            .confirm(&prompt, CONFIRM_TOKEN)
            .map_err(PublishError::io(Step::Confirm))?;

        if !confirmed {
            return Err(PublishError::Aborted {
                branch: target.to_string(),
            });
        }
        Ok(())
    }

    /// New branch from the clone's tip in safe mode; in destructive mode an
    /// unborn default branch, so the published commit has no parents
    fn prepare_branch(&self, mode: PublishMode, clone: &Path, target: &str) -> crate::git::Result<()> {
        match mode {
            PublishMode::SafeBranch => self.vcs.create_branch(clone, target),
            PublishMode::DestructiveOverwrite => self.vcs.start_orphan(clone, target),
        }
    }

    /// Stage everything and commit if anything changed.
    ///
    /// With `rewrites` a commit is always made, even for an empty source, so
    /// the forced push replaces the remote ref. Returns the branch tip (if
    /// any) and whether a commit was made.
    fn commit(
        &self,
        config: &RunConfig,
        clone: &Path,
        rewrites: bool,
    ) -> Result<(Option<String>, bool), PublishError> {
        let vcs_err = |e| PublishError::from_vcs(Step::Commit, e);

        self.vcs.add_all(clone).map_err(vcs_err)?;

        if !rewrites && !self.vcs.has_staged_changes(clone).map_err(vcs_err)? {
            self.out.status("Unchanged", "nothing to commit");
            let tip = self.vcs.head_commit(clone).map_err(vcs_err)?;
            return Ok((tip, false));
        }

        self.out.status("Committing", &config.commit_message);
        let commit = self.vcs.commit(clone, &config.commit_message).map_err(vcs_err)?;
        Ok((Some(commit), true))
    }

    fn push(&self, mode: PublishMode, clone: &Path, target: &str) -> Result<(), PublishError> {
        let pushed = match mode {
            PublishMode::SafeBranch => {
                self.out.status("Pushing", target);
                self.vcs.push(clone, target)
            }
            PublishMode::DestructiveOverwrite => {
                self.out.status("Force-pushing", target);
                self.vcs.push_force(clone, target)
            }
        };
        pushed.map_err(|e| PublishError::from_vcs(Step::Push, e))
    }
}

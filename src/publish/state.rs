use std::fmt;

use serde::Serialize;

/// Lifecycle of a single publish run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Init,
    Cloned,
    BranchPrepared,
    ContentReplaced,
    Committed,
    Pushed,
    Done,
    Aborted,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted | RunState::Failed)
    }

    /// Whether the pipeline may move from `self` to `next`.
    ///
    /// Aborts are only possible up to the confirmation gate, which sits in
    /// `Cloned`. `Committed -> Done` covers the push skipped for a repository
    /// that still has no commit.
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;

        match (self, next) {
            (Init, Cloned)
            | (Cloned, BranchPrepared)
            | (BranchPrepared, ContentReplaced)
            | (ContentReplaced, Committed)
            | (Committed, Pushed)
            | (Committed, Done)
            | (Pushed, Done) => true,
            (Init | Cloned, Aborted) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Pipeline step, used to say where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Preflight,
    Clone,
    DetectDefaultBranch,
    Confirm,
    PrepareBranch,
    ReplaceContent,
    Commit,
    Push,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Preflight => "preflight",
            Step::Clone => "clone",
            Step::DetectDefaultBranch => "default branch detection",
            Step::Confirm => "confirmation",
            Step::PrepareBranch => "branch preparation",
            Step::ReplaceContent => "content replacement",
            Step::Commit => "commit",
            Step::Push => "push",
        };
        f.write_str(name)
    }
}

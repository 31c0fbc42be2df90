use std::path::PathBuf;

use serde::Serialize;

use super::error::{PublishError, RunFailure};
use super::state::Step;
use super::RunConfig;
use crate::types::PublishMode;

/// Final classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// New content reached the remote
    Published,
    /// The run succeeded but there was nothing new to commit
    Unchanged,
    /// The user declined the destructive overwrite
    Aborted,
    Failed,
}

/// Outcome record; exactly one is produced per run
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub outcome: Outcome,
    /// Human-readable explanation
    pub reason: String,
    /// Branch that was (or would have been) written on the remote
    pub branch: String,
    pub mode: PublishMode,
    /// An existing remote ref was force-replaced by a parentless commit
    pub history_rewritten: bool,
    /// Tip of the published branch, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Step a failed or aborted run stopped at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    /// Ephemeral clone left on disk for the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_dir: Option<PathBuf>,
}

impl PublishResult {
    /// Fold a failed or aborted run into a result record
    pub fn from_error(config: &RunConfig, err: &PublishError) -> Self {
        let outcome = if err.is_abort() {
            Outcome::Aborted
        } else {
            Outcome::Failed
        };

        Self {
            outcome,
            reason: error_chain(err),
            branch: err.branch().unwrap_or(config.branch.as_str()).to_string(),
            mode: config.mode,
            history_rewritten: false,
            commit: None,
            default_branch: None,
            step: err.step(),
            clone_dir: None,
        }
    }

    /// Like [`PublishResult::from_error`], also reporting a kept clone
    pub fn from_failure(config: &RunConfig, failure: &RunFailure) -> Self {
        Self {
            clone_dir: failure.clone_dir.clone(),
            ..Self::from_error(config, &failure.error)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Published | Outcome::Unchanged)
    }

    /// Process exit status: 0 success, 2 aborted, 1 failed
    pub fn exit_code(&self) -> u8 {
        match self.outcome {
            Outcome::Published | Outcome::Unchanged => 0,
            Outcome::Aborted => 2,
            Outcome::Failed => 1,
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

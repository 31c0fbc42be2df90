use std::fmt;

use serde::{Deserialize, Serialize};

/// How the published content reaches the remote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishMode {
    /// Push a new branch; existing history is never rewritten
    #[default]
    SafeBranch,
    /// Force-push over the remote's default branch
    DestructiveOverwrite,
}

impl PublishMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishMode::SafeBranch => "safe-branch",
            PublishMode::DestructiveOverwrite => "destructive-overwrite",
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, PublishMode::DestructiveOverwrite)
    }
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

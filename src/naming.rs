//! Branch names and commit messages for a publish run.
//!
//! Derived names carry a second-resolution local timestamp, so two runs in
//! the same second with the same prefix produce the same name. With a fixed
//! clock the result is fully deterministic.

use chrono::{DateTime, Local};
use thiserror::Error;

/// Timestamp layout used in derived branch names
pub const BRANCH_TIMESTAMP: &str = "%Y%m%d-%H%M%S";

/// Timestamp layout appended to commit messages
pub const MESSAGE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BranchNameError {
    #[error("branch name is empty")]
    Empty,
    #[error("branch name '{0}' contains forbidden character {1:?}")]
    ForbiddenChar(String, char),
    #[error("branch name '{0}' contains forbidden sequence '{1}'")]
    ForbiddenSequence(String, &'static str),
    #[error("branch name '{0}' has an invalid component")]
    BadComponent(String),
}

/// Default branch name: `<prefix><YYYYmmdd-HHMMSS>`
pub fn derive_branch_name(prefix: &str, now: &DateTime<Local>) -> String {
    format!("{}{}", prefix, now.format(BRANCH_TIMESTAMP))
}

/// Commit message: `<stem> (<YYYY-mm-dd HH:MM:SS>)`
pub fn commit_message(stem: &str, now: &DateTime<Local>) -> String {
    format!("{} ({})", stem.trim(), now.format(MESSAGE_TIMESTAMP))
}

/// Check a branch name against the rules of `git check-ref-format --branch`
/// that matter for names typed on a command line.
pub fn validate_branch_name(name: &str) -> Result<(), BranchNameError> {
    if name.is_empty() {
        return Err(BranchNameError::Empty);
    }

    for c in name.chars() {
        if c.is_ascii_control() || matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\') {
            return Err(BranchNameError::ForbiddenChar(name.to_string(), c));
        }
    }

    for seq in ["..", "@{", "//"] {
        if name.contains(seq) {
            return Err(BranchNameError::ForbiddenSequence(name.to_string(), seq));
        }
    }

    if name == "@" || name.starts_with('-') || name.ends_with('.') || name.ends_with('/') {
        return Err(BranchNameError::BadComponent(name.to_string()));
    }

    let bad_component = name
        .split('/')
        .any(|part| part.is_empty() || part.starts_with('.') || part.ends_with(".lock"));
    if bad_component {
        return Err(BranchNameError::BadComponent(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 17, h, m, s).single().unwrap()
    }

    #[test]
    fn test_derive_branch_name() {
        assert_eq!(
            derive_branch_name("export-from-local-", &at(9, 5, 7)),
            "export-from-local-20261017-090507"
        );
    }

    #[test]
    fn test_same_second_collides() {
        let a = derive_branch_name("export-from-local-", &at(12, 0, 0));
        let b = derive_branch_name("export-from-local-", &at(12, 0, 0));
        let c = derive_branch_name("export-from-local-", &at(12, 0, 1));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_derived_names_are_valid() {
        let name = derive_branch_name("export-from-local-", &at(23, 59, 59));
        assert!(validate_branch_name(&name).is_ok());
    }

    #[test]
    fn test_commit_message() {
        assert_eq!(
            commit_message("Export from local workspace ", &at(14, 3, 9)),
            "Export from local workspace (2026-10-17 14:03:09)"
        );
    }

    #[test]
    fn test_valid_names() {
        for name in ["export-1", "feature/foo", "release_1.0", "v2.0.0-rc1", "a/b/c"] {
            assert!(validate_branch_name(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(validate_branch_name(""), Err(BranchNameError::Empty));
    }

    #[test]
    fn test_forbidden_chars() {
        assert!(matches!(
            validate_branch_name("my branch"),
            Err(BranchNameError::ForbiddenChar(_, ' '))
        ));
        assert!(matches!(
            validate_branch_name("branch:name"),
            Err(BranchNameError::ForbiddenChar(_, ':'))
        ));
        assert!(matches!(
            validate_branch_name("feature\\foo"),
            Err(BranchNameError::ForbiddenChar(_, '\\'))
        ));
    }

    #[test]
    fn test_forbidden_sequences() {
        assert!(matches!(
            validate_branch_name("a..b"),
            Err(BranchNameError::ForbiddenSequence(_, ".."))
        ));
        assert!(matches!(
            validate_branch_name("a@{1}"),
            Err(BranchNameError::ForbiddenSequence(_, "@{"))
        ));
        assert!(matches!(
            validate_branch_name("a//b"),
            Err(BranchNameError::ForbiddenSequence(_, "//"))
        ));
    }

    #[test]
    fn test_bad_components() {
        for name in ["-flag", "trailing.", "trailing/", "/leading", ".hidden", "a/.b", "x.lock", "@"] {
            assert!(
                matches!(validate_branch_name(name), Err(BranchNameError::BadComponent(_))),
                "{} should be rejected",
                name
            );
        }
    }
}

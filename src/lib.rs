//! Publish a local directory to a git remote.
//!
//! The library exposes the publish pipeline ([`publish::Publisher`]) behind
//! injectable capabilities for git ([`git::Vcs`]), confirmation and time, so
//! the `spiegel` binary and tests drive the same code.

pub mod commands;
pub mod git;
pub mod id;
pub mod naming;
pub mod output;
pub mod publish;
pub mod types;

#[cfg(test)]
mod testutil;

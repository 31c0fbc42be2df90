use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::git::GitCli;
use crate::output::Output;
use crate::publish::{
    Outcome, PublishResult, Publisher, RunConfig, RunOptions, StdinConfirm, SystemClock,
};
use crate::types::{Config, PublishMode};

/// Options for the publish command
pub struct PublishOptions {
    /// Directory whose contents become the branch content
    pub source: PathBuf,
    pub remote: Option<String>,
    pub branch: Option<String>,
    /// Force-push over the default branch instead of creating a new one
    pub overwrite_default: bool,
    pub keep_clone: bool,
    /// Explicit config file (default: `<source>/.spiegel.yaml`)
    pub config: Option<PathBuf>,
}

/// Publish a directory to a remote.
///
/// Aborting the overwrite prompt is not an error: the returned result carries
/// `Outcome::Aborted` and the caller maps it to the exit status.
pub fn publish(opts: PublishOptions, out: &Output) -> Result<PublishResult> {
    let config = Config::discover(opts.config.as_deref(), &opts.source)?;

    let mode = if opts.overwrite_default {
        PublishMode::DestructiveOverwrite
    } else {
        PublishMode::SafeBranch
    };

    let run_opts = RunOptions {
        remote: opts.remote,
        source: opts.source,
        branch: opts.branch,
        mode,
        keep_clone: opts.keep_clone,
    };
    let run = RunConfig::resolve(run_opts, &config, &SystemClock)?;

    out.verbose(&format!("mode: {}", run.mode));
    out.verbose(&format!("source: {}", run.source.display()));
    out.verbose(&format!("scratch root: {}", run.scratch_root.display()));

    let git = GitCli::new().with_identity(config.identity());
    let confirm = StdinConfirm;
    let publisher = Publisher::new(&git, &confirm, out);

    let result = match publisher.publish(&run) {
        Ok(result) => result,
        Err(failure) if failure.error.is_abort() => PublishResult::from_failure(&run, &failure),
        Err(failure) => {
            if out.is_json() {
                print_json(&PublishResult::from_failure(&run, &failure))?;
            }
            return Err(failure.error)
                .context(format!("publishing {} failed", run.source.display()));
        }
    };

    report(&result, out)?;
    Ok(result)
}

fn report(result: &PublishResult, out: &Output) -> Result<()> {
    if out.is_json() {
        return print_json(result);
    }

    match result.outcome {
        Outcome::Published => {
            if let Some(commit) = &result.commit {
                out.verbose(&format!("commit {}", commit));
            }
            out.success(&result.reason);
        }
        Outcome::Unchanged => out.success(&result.reason),
        Outcome::Aborted => out.status("Aborted", &result.reason),
        Outcome::Failed => out.warn(&result.reason),
    }

    if let Some(dir) = &result.clone_dir {
        out.info(&format!("Clone kept at {}", dir.display()));
    }

    Ok(())
}

fn print_json(result: &PublishResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::output::Output;
use crate::types::{Config, CONFIG_FILE};

/// Options for the init command
pub struct InitOptions {
    /// Directory to write the config into (default: current directory)
    pub path: Option<PathBuf>,
    /// Default remote to record
    pub remote: Option<String>,
    /// Overwrite an existing config file
    pub force: bool,
}

/// Write a default `.spiegel.yaml`
pub fn init(opts: InitOptions, out: &Output) -> Result<PathBuf> {
    let target = match opts.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    if !target.is_dir() {
        bail!("not a directory: {}", target.display());
    }

    let config_path = target.join(CONFIG_FILE);
    if config_path.exists() && !opts.force {
        bail!(
            "{} already exists\nUse --force to overwrite it",
            config_path.display()
        );
    }

    let config = Config {
        remote: opts.remote,
        ..Config::default()
    };
    config.save(&config_path)?;

    out.success(&format!("Wrote {}", config_path.display()));
    if config.remote.is_none() {
        out.info("");
        out.info("Set `remote` in the file or pass --remote when publishing:");
        out.info(&format!("  spiegel publish {} --remote <url>", target.display()));
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        let opts = InitOptions {
            path: Some(dir.path().to_path_buf()),
            remote: Some("git@example.org:site.git".to_string()),
            force: false,
        };

        let path = init(opts, &Output::quiet()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.remote.as_deref(), Some("git@example.org:site.git"));
        assert_eq!(config.branch_prefix, "export-from-local-");
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let opts = || InitOptions {
            path: Some(dir.path().to_path_buf()),
            remote: None,
            force: false,
        };

        init(opts(), &Output::quiet()).unwrap();
        let err = init(opts(), &Output::quiet()).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let forced = InitOptions {
            force: true,
            ..opts()
        };
        assert!(init(forced, &Output::quiet()).is_ok());
    }

    #[test]
    fn test_init_rejects_missing_dir() {
        let dir = TempDir::new().unwrap();
        let opts = InitOptions {
            path: Some(dir.path().join("missing")),
            remote: None,
            force: false,
        };
        assert!(init(opts, &Output::quiet()).is_err());
    }
}

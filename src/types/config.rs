use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name looked up in the source directory when no `--config` is given
pub const CONFIG_FILE: &str = ".spiegel.yaml";

fn default_branch_prefix() -> String {
    "export-from-local-".to_string()
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

fn default_commit_message() -> String {
    "Export from local workspace".to_string()
}

/// Publisher configuration (.spiegel.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Prefix for derived branch names
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,

    /// Probe order when the remote HEAD does not name a default branch
    #[serde(default = "default_branches")]
    pub default_branches: Vec<String>,

    /// Commit message stem; a timestamp is appended
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Root for ephemeral clones (system temp dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,

    /// Keep the ephemeral clone after a successful or aborted run
    #[serde(default)]
    pub keep_clone: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: None,
            branch_prefix: default_branch_prefix(),
            default_branches: default_branches(),
            commit_message: default_commit_message(),
            scratch_dir: None,
            keep_clone: false,
            author_name: None,
            author_email: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Config = serde_yml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the config for a run.
    ///
    /// An explicit path must load. The implicit `<source>/.spiegel.yaml` is
    /// optional, but once present it must load as well.
    pub fn discover(explicit: Option<&Path>, source: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let implicit = source.join(CONFIG_FILE);
                if implicit.is_file() {
                    Self::load(&implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save config to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yml::to_string(self).context("failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Commit identity override, if both halves are configured
    pub fn identity(&self) -> Option<(String, String)> {
        match (&self.author_name, &self.author_email) {
            (Some(name), Some(email)) => Some((name.clone(), email.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.branch_prefix, "export-from-local-");
        assert_eq!(config.default_branches, vec!["main", "master"]);
        assert!(config.remote.is_none());
        assert!(!config.keep_clone);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let parsed: Config = serde_yml::from_str("remote: git@example.org:site.git\n").unwrap();
        assert_eq!(parsed.remote.as_deref(), Some("git@example.org:site.git"));
        assert_eq!(parsed.commit_message, "Export from local workspace");
        assert_eq!(parsed.default_branches, vec!["main", "master"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = Config {
            remote: Some("https://example.org/site.git".to_string()),
            default_branches: vec!["trunk".to_string()],
            keep_clone: true,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_discover_missing_implicit_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_discover_malformed_implicit_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "default_branches: [unterminated").unwrap();
        let err = Config::discover(None, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config"), "{:#}", err);
    }

    #[test]
    fn test_discover_reads_implicit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "remote: /srv/site.git\n").unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.remote.as_deref(), Some("/srv/site.git"));
    }

    #[test]
    fn test_discover_malformed_explicit_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "default_branches: [unterminated").unwrap();
        assert!(Config::discover(Some(&path), dir.path()).is_err());
    }

    #[test]
    fn test_identity_requires_both() {
        let mut config = Config {
            author_name: Some("Publisher".to_string()),
            ..Config::default()
        };
        assert!(config.identity().is_none());

        config.author_email = Some("publisher@example.org".to_string());
        assert_eq!(
            config.identity(),
            Some(("Publisher".to_string(), "publisher@example.org".to_string()))
        );
    }
}

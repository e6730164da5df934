use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shamir::Scheme;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "TSHARE_CONFIG";

/// Defaults for the `tshare` command line
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Shares required to recover a secret (default: 3)
    pub default_threshold: usize,
    /// Shares dealt per secret (default: 5)
    pub default_shares: usize,
    /// Log level used when neither `RUST_LOG` nor `-v` is given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_threshold: 3,
            default_shares: 5,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Platform config file path
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "tshare", "tshare")
            .context("Failed to determine configuration directory")?;

        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Resolve the config path: an explicit path wins, otherwise the
    /// platform default.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config
            .scheme()
            .with_context(|| format!("Invalid defaults in config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        self.scheme().context("Refusing to save invalid defaults")?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// The configured defaults as validated threshold parameters
    pub fn scheme(&self) -> Result<Scheme> {
        Ok(Scheme::new(self.default_threshold, self.default_shares)?)
    }
}

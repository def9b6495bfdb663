//! Configuration management for gitmirror
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GITMIRROR_*)
//! 3. Config file (~/.config/gitmirror/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the directory under the work dir holding the working copies
const REPOS_DIR: &str = "repos";

/// Default delay between two synchronizations
const DEFAULT_UPDATE_DELAY: Duration = Duration::from_secs(3600);

/// Synchronization settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay between two synchronizations
    #[serde(with = "humantime_serde")]
    pub update_delay: Duration,

    /// Directory to store data in (defaults to the current directory)
    pub work_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            update_delay: DEFAULT_UPDATE_DELAY,
            work_dir: None,
        }
    }
}

/// git executable settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub path: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            path: "git".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Also write logs to this file
    pub file: Option<PathBuf>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Delay in seconds; negative values are rejected
    pub update_delay: Option<i64>,
    pub work_dir: Option<PathBuf>,
    pub git_path: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Synchronization configuration
    pub sync: SyncConfig,

    /// git configuration
    pub git: GitConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/gitmirror/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gitmirror").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GITMIRROR_UPDATE_DELAY: Delay between synchronizations, in seconds
    /// - GITMIRROR_WORK_DIR: Directory to store data in
    /// - GITMIRROR_GIT: Path to git executable
    /// - GITMIRROR_LOG_FILE: Log file
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(delay) = var("GITMIRROR_UPDATE_DELAY") {
            let secs = delay.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!(
                    "GITMIRROR_UPDATE_DELAY must be a number of seconds, got '{}'",
                    delay
                ))
            })?;
            self.sync.update_delay = delay_from_secs(secs)?;
        }

        if let Some(dir) = var("GITMIRROR_WORK_DIR") {
            self.sync.work_dir = Some(PathBuf::from(dir));
        }

        if let Some(path) = var("GITMIRROR_GIT") {
            self.git.path = path;
        }

        if let Some(file) = var("GITMIRROR_LOG_FILE") {
            self.log.file = Some(PathBuf::from(file));
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, cli: CliOverrides) -> Result<Self> {
        if let Some(secs) = cli.update_delay {
            self.sync.update_delay = delay_from_secs(secs)?;
        }

        if let Some(dir) = cli.work_dir {
            self.sync.work_dir = Some(dir);
        }

        if let Some(path) = cli.git_path {
            self.git.path = path;
        }

        if let Some(file) = cli.log_file {
            self.log.file = Some(file);
        }

        Ok(self)
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit
    /// `config_path` must exist.
    pub fn load_with_overrides(config_path: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        base.with_env_overrides()?.with_cli_overrides(cli)
    }

    /// Directory the working copies live in: `<work_dir>/repos`
    pub fn repos_dir(&self) -> Result<PathBuf> {
        let work_dir = match &self.sync.work_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        Ok(work_dir.join(REPOS_DIR))
    }
}

/// Turn a user-supplied number of seconds into a delay
pub fn delay_from_secs(secs: i64) -> Result<Duration> {
    u64::try_from(secs).map(Duration::from_secs).map_err(|_| {
        Error::Config(format!(
            "invalid update delay value - can not be negative. given: {}",
            secs
        ))
    })
}

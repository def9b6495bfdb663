//! Secrets management for gitmirror
//!
//! Secrets are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/gitmirror/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Token lookup priority:
//! 1. Token file given on the command line
//! 2. Environment variable (GITHUB_TOKEN)
//! 3. Secrets file (~/.config/gitmirror/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Environment variable holding the GitHub token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // Check if file is readable by group or others (mode & 0o077)
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/gitmirror/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gitmirror").join("secrets.toml"))
    }

    /// Get GitHub token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > secrets file
    pub fn github_token(&self) -> Option<String> {
        self.github_token_from(std::env::var(TOKEN_ENV).ok())
    }

    fn github_token_from(&self, env_token: Option<String>) -> Option<String> {
        if let Some(token) = env_token.map(|t| t.trim().to_string()) {
            if !token.is_empty() {
                debug!("Using GitHub token from {} environment variable", TOKEN_ENV);
                return Some(token);
            }
        }

        // Fall back to secrets file
        if let Some(ref token) = self.github.token {
            if !token.is_empty() {
                debug!("Using GitHub token from secrets file");
                return Some(token.clone());
            }
        }

        None
    }
}

/// Read a token from a plain text file, ignoring surrounding whitespace
pub fn read_token_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Config(format!(
                "provided token file {} does not exist",
                path.display()
            ))
        } else {
            Error::Config(format!(
                "failed to read token file {}: {}",
                path.display(),
                e
            ))
        }
    })?;

    let token = contents.trim();
    if token.is_empty() {
        return Err(Error::Config(format!(
            "token file {} is empty",
            path.display()
        )));
    }

    Ok(token.to_string())
}

/// Find the GitHub token to authenticate with
///
/// A token file, when given, wins over every other source and must be
/// readable.
pub fn resolve_github_token(token_file: Option<&Path>) -> Result<String> {
    if let Some(path) = token_file {
        debug!(path = %path.display(), "Using GitHub token from token file");
        return read_token_file(path);
    }

    Secrets::load()?.github_token().ok_or_else(|| {
        Error::Auth(format!(
            "GitHub token not found. Pass --token-file, set {} \
             or add token to ~/.config/gitmirror/secrets.toml",
            TOKEN_ENV
        ))
    })
}

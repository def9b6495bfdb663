//! Running the git executable as a subprocess

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// Captured result of one git invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// Raw stdout
    pub stdout: Vec<u8>,
    /// Raw stderr
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether git exited with status 0
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Something that can run git commands
///
/// A non-zero exit is not an error at this level; callers inspect the output
/// and classify it.
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run git with `args`, in `cwd` when given
    async fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs the system git binary
#[derive(Debug, Clone)]
pub struct GitCommand {
    git_path: String,
}

impl GitCommand {
    /// Create a runner for `git` found in PATH
    pub fn new() -> Self {
        Self {
            git_path: "git".to_string(),
        }
    }

    /// Set a custom path to the git executable
    pub fn with_git_path(mut self, path: impl Into<String>) -> Self {
        self.git_path = path.into();
        self
    }

    /// Path of the git executable this runner spawns
    pub fn git_path(&self) -> &str {
        &self.git_path
    }

    /// Check git is present and report its version
    pub async fn version(&self) -> Result<String> {
        let output = self.run(&["--version"], None).await?;
        if !output.success() {
            return Err(Error::GitNotFound(self.git_path.clone()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitRunner for GitCommand {
    async fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        debug!(git = %self.git_path, ?args, cwd = ?cwd, "Running git");

        let mut cmd = Command::new(&self.git_path);
        cmd.args(args)
            // Diagnostics must be in English for classification to work.
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = cwd {
            // Spawning in a missing directory also fails with NotFound.
            if !dir.is_dir() {
                return Err(Error::MissingDirectory(dir.to_path_buf()));
            }
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::GitNotFound(self.git_path.clone())
            } else {
                Error::Io(e)
            }
        })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

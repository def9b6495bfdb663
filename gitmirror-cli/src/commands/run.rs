//! Run command - Keep the local mirror in sync

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use gitmirror_core::{resolve_github_token, Config, CycleOutcome, Driver, GitCommand};
use gitmirror_github::GitHubSource;
use tracing::info;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Synchronize once and exit instead of polling
    #[arg(long)]
    pub once: bool,
}

impl RunArgs {
    /// Execute the run command
    ///
    /// Returns after one synchronization with `--once`, otherwise only on a
    /// fatal error or when interrupted.
    pub async fn execute(&self, config: &Config, token_file: Option<PathBuf>) -> anyhow::Result<()> {
        let token = resolve_github_token(token_file.as_deref())?;

        let git = GitCommand::new().with_git_path(&config.git.path);
        let version = git.version().await?;
        info!(%version, "Found git");

        let repos_dir = config.repos_dir()?;
        let source = GitHubSource::new(token)?;

        info!(
            repos_dir = %repos_dir.display(),
            delay = ?config.sync.update_delay,
            "Initializing github syncer"
        );
        let mut driver = Driver::new(source, git, repos_dir, config.sync.update_delay);
        let outcome = driver
            .initialize()
            .await
            .context("initial synchronization failed")?;

        if self.once {
            if let CycleOutcome::Completed(report) = outcome {
                info!(
                    added = ?report.added,
                    dropped = ?report.dropped,
                    "Synchronized once"
                );
            }
            return Ok(());
        }

        tokio::select! {
            result = driver.run() => result?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for interrupt")?;
                info!("Interrupted, exiting");
            }
        }

        Ok(())
    }
}

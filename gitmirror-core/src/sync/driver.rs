//! Fixed-cadence polling loop around the [`Reconciler`]

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, info_span, warn, Instrument};

use super::reconcile::{CycleReport, Reconciler, TrackedSet};
use crate::git::GitRunner;
use crate::source::RepositorySource;
use crate::{Error, Result};

/// Outcome of one polling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion
    Completed(CycleReport),
    /// A transient failure cut the cycle short; retried next time
    Skipped,
    /// An unexpected but non-fatal error cut the cycle short
    Aborted,
}

/// Drives reconciliation cycles on a fixed delay
///
/// The driver owns the tracked set; it starts empty and is only ever changed
/// by reconciliation.
#[derive(Debug)]
pub struct Driver<S, R> {
    source: S,
    git: R,
    repos_dir: PathBuf,
    delay: Duration,
    reconciler: Option<Reconciler>,
    tracked: TrackedSet,
    cycle: u64,
}

impl<S: RepositorySource, R: GitRunner> Driver<S, R> {
    /// Create a driver mirroring into `repos_dir`, polling every `delay`
    pub fn new(source: S, git: R, repos_dir: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            source,
            git,
            repos_dir: repos_dir.into(),
            delay,
            reconciler: None,
            tracked: TrackedSet::new(),
            cycle: 0,
        }
    }

    /// Repositories currently tracked
    pub fn tracked(&self) -> &TrackedSet {
        &self.tracked
    }

    /// Number of cycles started so far, the initial one included
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Prepare the repos directory and run the first reconciliation
    ///
    /// Network trouble at this point is logged and start-up carries on with
    /// whatever got tracked. Any other error is returned.
    pub async fn initialize(&mut self) -> Result<CycleOutcome> {
        if !self.repos_dir.exists() {
            info!(path = %self.repos_dir.display(), "Creating repos directory");
            std::fs::create_dir_all(&self.repos_dir)?;
        }

        let outcome = self.cycle().await;
        match outcome {
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Initial synchronization incomplete, continuing");
                Ok(CycleOutcome::Skipped)
            }
            other => other.map(CycleOutcome::Completed),
        }
    }

    /// Run one cycle, downgrading recoverable errors
    ///
    /// Only errors for which [`Error::is_fatal`] holds are returned.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        match self.cycle().await {
            Ok(report) => Ok(CycleOutcome::Completed(report)),
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Synchronization skipped, will retry next cycle");
                Ok(CycleOutcome::Skipped)
            }
            Err(e) if !e.is_fatal() => {
                error!(error = %e, "Synchronization aborted");
                Ok(CycleOutcome::Aborted)
            }
            Err(e) => Err(e),
        }
    }

    /// Sleep, reconcile, repeat; returns only on a fatal error
    pub async fn run(&mut self) -> Result<()> {
        info!(delay = ?self.delay, "Entering polling loop");
        loop {
            tokio::time::sleep(self.delay).await;
            self.run_cycle().await?;
        }
    }

    async fn cycle(&mut self) -> Result<CycleReport> {
        self.cycle += 1;
        let span = info_span!("cycle", n = self.cycle);

        async {
            let reconciler = match self.reconciler.clone() {
                Some(reconciler) => reconciler,
                None => {
                    let account_id = self.source.account_id().await?;
                    info!(account_id, "Resolved account");
                    let reconciler = Reconciler::new(self.repos_dir.clone(), account_id);
                    self.reconciler = Some(reconciler.clone());
                    reconciler
                }
            };

            let listing = self.source.list_repositories().await?;
            let report = reconciler
                .reconcile(&mut self.tracked, listing, &self.git)
                .await?;

            info!(
                tracked = self.tracked.len(),
                added = report.added.len() + report.already_present.len(),
                dropped = report.dropped.len(),
                refreshed = report.refreshed.len(),
                empty = report.empty_skipped.len(),
                "Synchronization complete"
            );

            Ok::<_, Error>(report)
        }
        .instrument(span)
        .await
    }
}

//! Diffing the remote listing against the tracked set

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::git::{GitError, GitRunner, LocalRepo};
use crate::source::RemoteRepository;
use crate::{Error, Result};

/// Repositories the mirror is currently responsible for
///
/// Keyed by [`LocalRepo::id`], so two handles with the same id are the same
/// entry whatever their name or path. Iteration is in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct TrackedSet {
    repos: BTreeMap<u64, LocalRepo>,
}

impl TrackedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `repo`, replacing any handle with the same id
    pub fn insert(&mut self, repo: LocalRepo) -> Option<LocalRepo> {
        self.repos.insert(repo.id(), repo)
    }

    /// Stop tracking the repository with `id`
    pub fn remove(&mut self, id: u64) -> Option<LocalRepo> {
        self.repos.remove(&id)
    }

    /// Whether a repository with `id` is tracked
    pub fn contains(&self, id: u64) -> bool {
        self.repos.contains_key(&id)
    }

    /// Ids of tracked repositories, ascending
    pub fn ids(&self) -> Vec<u64> {
        self.repos.keys().copied().collect()
    }

    /// Tracked repositories, ascending by id
    pub fn iter(&self) -> impl Iterator<Item = &LocalRepo> {
        self.repos.values()
    }

    /// Number of tracked repositories
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

/// What one reconciliation did, by repository name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Newly tracked repositories
    pub added: Vec<String>,
    /// Newly tracked repositories whose clone target already existed
    pub already_present: Vec<String>,
    /// Repositories no longer listed; their directories are kept
    pub dropped: Vec<String>,
    /// Repositories pulled successfully
    pub refreshed: Vec<String>,
    /// Repositories whose pull failed only because the remote is empty
    pub empty_skipped: Vec<String>,
}

/// Brings a [`TrackedSet`] in line with a listing snapshot
#[derive(Debug, Clone)]
pub struct Reconciler {
    repos_dir: PathBuf,
    account_id: u64,
}

impl Reconciler {
    /// Reconciler mirroring into `repos_dir` the repositories owned by
    /// `account_id`
    pub fn new(repos_dir: impl Into<PathBuf>, account_id: u64) -> Self {
        Self {
            repos_dir: repos_dir.into(),
            account_id,
        }
    }

    /// Account whose repositories are mirrored
    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    /// Handles for the listed repositories owned by the account
    ///
    /// Repositories of organizations or other users the account can see are
    /// left out.
    fn wanted(&self, listing: Vec<RemoteRepository>) -> BTreeMap<u64, LocalRepo> {
        listing
            .into_iter()
            .filter(|remote| {
                let owned = remote.owner_id == self.account_id;
                if !owned {
                    debug!(repo = %remote.name, owner_id = remote.owner_id, "Skipping repository not owned by account");
                }
                owned
            })
            .map(|remote| {
                let repo = LocalRepo::new(remote, &self.repos_dir);
                (repo.id(), repo)
            })
            .collect()
    }

    /// Run one reconciliation cycle
    ///
    /// Starts tracking new repositories (cloning them when needed), forgets
    /// repositories missing from the listing, then pulls every tracked
    /// repository one after the other. The first unexpected error aborts the
    /// rest of the cycle and is returned; whatever was done up to that point
    /// stays done.
    pub async fn reconcile(
        &self,
        tracked: &mut TrackedSet,
        listing: Vec<RemoteRepository>,
        git: &dyn GitRunner,
    ) -> Result<CycleReport> {
        let mut report = CycleReport::default();
        let mut wanted = self.wanted(listing);

        let gone: Vec<u64> = tracked
            .ids()
            .into_iter()
            .filter(|id| !wanted.contains_key(id))
            .collect();
        wanted.retain(|id, _| !tracked.contains(*id));

        for repo in wanted.into_values() {
            match repo.ensure_initialized(git).await {
                Ok(()) => {
                    info!(repo = %repo.name(), path = %repo.path().display(), "Tracking repository");
                    report.added.push(repo.name().to_string());
                }
                Err(Error::Git(GitError::AlreadyExists(msg))) => {
                    debug!(repo = %repo.name(), %msg, "Clone target already exists, tracking it anyway");
                    report.already_present.push(repo.name().to_string());
                }
                Err(e) => return Err(e),
            }
            tracked.insert(repo);
        }

        for id in gone {
            if let Some(repo) = tracked.remove(id) {
                info!(
                    repo = %repo.name(),
                    path = %repo.path().display(),
                    "Repository no longer listed, untracking (directory kept)"
                );
                report.dropped.push(repo.name().to_string());
            }
        }

        for repo in tracked.iter() {
            match repo.refresh(git).await {
                Ok(()) => report.refreshed.push(repo.name().to_string()),
                Err(Error::Git(err)) if err.is_unfetched_merge_ref() => {
                    if repo.branch_count(git).await? == 0 {
                        debug!(repo = %repo.name(), "Remote has no commits yet");
                        report.empty_skipped.push(repo.name().to_string());
                    } else {
                        return Err(Error::Git(err));
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}

//! A mirrored repository on local disk

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::classify::classify;
use super::runner::GitRunner;
use crate::source::RemoteRepository;
use crate::{Error, Result};

/// Name of the metadata directory marking a working copy
const GIT_DIR: &str = ".git";

/// Local working copy of one remote repository
///
/// Identity is the remote id, see [`LocalRepo::id`]. Name and path may drift
/// between listings without making it a different repository.
#[derive(Debug, Clone)]
pub struct LocalRepo {
    remote: RemoteRepository,
    path: PathBuf,
}

impl LocalRepo {
    /// Handle for `remote`, mirrored at `repos_dir/<name>`
    pub fn new(remote: RemoteRepository, repos_dir: &Path) -> Self {
        let path = repos_dir.join(&remote.name);
        Self { remote, path }
    }

    /// Identity key of the repository
    pub fn id(&self) -> u64 {
        self.remote.id
    }

    /// Repository name
    pub fn name(&self) -> &str {
        &self.remote.name
    }

    /// Path of the working copy
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `path` holds a git working copy
    pub fn is_working_copy(path: &Path) -> bool {
        path.join(GIT_DIR).exists()
    }

    /// Make sure the working copy exists, cloning it if the path is free
    ///
    /// An existing path must be a directory holding a working copy; anything
    /// else is a configuration problem and is never retried.
    pub async fn ensure_initialized(&self, git: &dyn GitRunner) -> Result<()> {
        if self.path.exists() {
            if !self.path.is_dir() {
                return Err(Error::NotADirectory(self.path.clone()));
            }
            if !Self::is_working_copy(&self.path) {
                return Err(Error::NotAWorkingCopy(self.path.clone()));
            }
            debug!(repo = %self.name(), path = %self.path.display(), "Working copy already present");
            return Ok(());
        }

        info!(repo = %self.name(), url = %self.remote.clone_url, "Cloning repository");

        let dest = self.path.to_string_lossy();
        let output = git
            .run(&["clone", self.remote.clone_url.as_str(), &*dest], None)
            .await?;

        if !output.success() {
            return Err(classify(&output.stderr).into());
        }

        Ok(())
    }

    /// Pull the latest changes into the working copy
    pub async fn refresh(&self, git: &dyn GitRunner) -> Result<()> {
        debug!(repo = %self.name(), "Pulling");

        let output = git.run(&["pull"], Some(&self.path)).await?;
        if !output.success() {
            return Err(classify(&output.stderr).into());
        }

        Ok(())
    }

    /// Number of local branches in the working copy
    pub async fn branch_count(&self, git: &dyn GitRunner) -> Result<usize> {
        let output = git.run(&["branch"], Some(&self.path)).await?;
        if !output.success() {
            return Err(classify(&output.stderr).into());
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitError;
    use crate::git::GitCommand;
    use crate::testing::{remote, Call, FakeGit};
    use tempfile::TempDir;

    #[test]
    fn test_path_derived_from_name() {
        let repo = LocalRepo::new(remote(7, "dotfiles"), Path::new("/srv/repos"));
        assert_eq!(repo.path(), Path::new("/srv/repos/dotfiles"));
        assert_eq!(repo.id(), 7);
        assert_eq!(repo.name(), "dotfiles");
    }

    #[test]
    fn test_identity_ignores_name_and_path() {
        let a = LocalRepo::new(remote(1, "old-name"), Path::new("/a"));
        let b = LocalRepo::new(remote(1, "new-name"), Path::new("/b"));
        assert_eq!(a.id(), b.id());
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_clone_when_missing() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::new();
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        repo.ensure_initialized(&git).await.unwrap();

        assert_eq!(git.calls(), vec![Call::new("clone", "alpha")]);
        assert!(LocalRepo::is_working_copy(repo.path()));
    }

    #[tokio::test]
    async fn test_existing_working_copy_is_not_recloned() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("alpha").join(".git")).unwrap();
        let git = FakeGit::new();
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        repo.ensure_initialized(&git).await.unwrap();

        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("alpha"), "not a directory").unwrap();
        let git = FakeGit::new();
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        let err = repo.ensure_initialized(&git).await.unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn test_plain_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("alpha")).unwrap();
        let git = FakeGit::new();
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        let err = repo.ensure_initialized(&git).await.unwrap_err();
        assert!(matches!(err, Error::NotAWorkingCopy(_)));
    }

    #[tokio::test]
    async fn test_clone_failure_is_classified() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::new();
        git.fail(
            "clone",
            "alpha",
            "Cloning into 'alpha'...\nfatal: unable to access 'https://github.com/someone/alpha.git/': Could not resolve host: github.com\n",
        );
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        let err = repo.ensure_initialized(&git).await.unwrap_err();
        assert!(matches!(err, Error::Git(GitError::ConnectionFailure(_))));
    }

    #[tokio::test]
    async fn test_refresh_pulls_in_working_copy() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::new();
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        repo.refresh(&git).await.unwrap();
        assert_eq!(git.calls(), vec![Call::new("pull", "alpha")]);

        git.fail("pull", "alpha", "fatal: early EOF\n");
        let err = repo.refresh(&git).await.unwrap_err();
        assert!(matches!(err, Error::Git(GitError::ConnectionFailure(_))));
    }

    #[tokio::test]
    async fn test_refresh_of_deleted_working_copy() {
        let tmp = TempDir::new().unwrap();
        let repo = LocalRepo::new(remote(1, "deleted"), tmp.path());

        let err = repo.refresh(&GitCommand::new()).await.unwrap_err();
        assert!(matches!(err, Error::MissingDirectory(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_branch_count() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::new();
        let repo = LocalRepo::new(remote(1, "alpha"), dir.path());

        git.set_branches("alpha", "");
        assert_eq!(repo.branch_count(&git).await.unwrap(), 0);

        git.set_branches("alpha", "  feature\n* main\n");
        assert_eq!(repo.branch_count(&git).await.unwrap(), 2);
    }
}

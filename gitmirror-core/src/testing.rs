//! In-memory fakes for the listing service and git

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::git::{CommandOutput, GitRunner};
use crate::source::{RemoteRepository, RepositorySource};
use crate::{Error, Result};

pub(crate) const ACCOUNT: u64 = 42;

pub(crate) fn remote(id: u64, name: &str) -> RemoteRepository {
    owned_by(id, name, ACCOUNT)
}

pub(crate) fn owned_by(id: u64, name: &str, owner_id: u64) -> RemoteRepository {
    RemoteRepository {
        id,
        name: name.to_string(),
        owner_id,
        clone_url: format!("https://github.com/someone/{}.git", name),
    }
}

/// A git invocation seen by [`FakeGit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub command: String,
    pub repo: String,
}

impl Call {
    pub(crate) fn new(command: &str, repo: &str) -> Self {
        Self {
            command: command.to_string(),
            repo: repo.to_string(),
        }
    }
}

/// Records git calls and answers them from a script
///
/// Clones succeed by creating `<dest>/.git`, like the real thing would.
#[derive(Debug, Default)]
pub(crate) struct FakeGit {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<(String, String), String>>,
    branches: Mutex<HashMap<String, String>>,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make `command` on `repo` fail with `stderr`
    pub(crate) fn fail(&self, command: &str, repo: &str, stderr: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((command.to_string(), repo.to_string()), stderr.to_string());
    }

    /// Stop failing `command` on `repo`
    pub(crate) fn heal(&self, command: &str, repo: &str) {
        self.failures
            .lock()
            .unwrap()
            .remove(&(command.to_string(), repo.to_string()));
    }

    /// Set the stdout of `git branch` for `repo`
    pub(crate) fn set_branches(&self, repo: &str, stdout: &str) {
        self.branches
            .lock()
            .unwrap()
            .insert(repo.to_string(), stdout.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_of(&self, command: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.command == command)
            .map(|c| c.repo)
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let command = args.first().copied().unwrap_or_default().to_string();
        let dest = match command.as_str() {
            "clone" => args.get(2).map(PathBuf::from),
            _ => cwd.map(Path::to_path_buf),
        };
        let repo = dest.as_deref().map(dir_name).unwrap_or_default();

        self.calls.lock().unwrap().push(Call {
            command: command.clone(),
            repo: repo.clone(),
        });

        if let Some(stderr) = self
            .failures
            .lock()
            .unwrap()
            .get(&(command.clone(), repo.clone()))
        {
            return Ok(CommandOutput {
                status: Some(128),
                stdout: Vec::new(),
                stderr: stderr.clone().into_bytes(),
            });
        }

        let stdout = match command.as_str() {
            "clone" => {
                if let Some(dest) = dest {
                    std::fs::create_dir_all(dest.join(".git"))?;
                }
                String::new()
            }
            "branch" => self
                .branches
                .lock()
                .unwrap()
                .get(&repo)
                .cloned()
                .unwrap_or_else(|| "* main\n".to_string()),
            _ => String::new(),
        };

        Ok(CommandOutput {
            status: Some(0),
            stdout: stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

/// A listing service serving whatever the test put in it
#[derive(Debug)]
pub(crate) struct FakeSource {
    repos: Mutex<Vec<RemoteRepository>>,
    outage: Mutex<Option<String>>,
}

impl FakeSource {
    pub(crate) fn new(repos: Vec<RemoteRepository>) -> Self {
        Self {
            repos: Mutex::new(repos),
            outage: Mutex::new(None),
        }
    }

    pub(crate) fn set(&self, repos: Vec<RemoteRepository>) {
        *self.repos.lock().unwrap() = repos;
    }

    /// Make every call fail with a network error until cleared
    pub(crate) fn set_outage(&self, message: Option<&str>) {
        *self.outage.lock().unwrap() = message.map(str::to_string);
    }

    fn check(&self) -> Result<()> {
        match self.outage.lock().unwrap().as_ref() {
            Some(message) => Err(Error::Network(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn account_id(&self) -> Result<u64> {
        self.check()?;
        Ok(ACCOUNT)
    }

    async fn list_repositories(&self) -> Result<Vec<RemoteRepository>> {
        self.check()?;
        Ok(self.repos.lock().unwrap().clone())
    }
}

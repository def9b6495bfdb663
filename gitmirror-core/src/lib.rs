//! gitmirror Core - reconciliation engine for gitmirror
//!
//! This crate keeps a directory of git working copies in line with the
//! repositories an account owns: it diffs the remote listing against the
//! tracked set, clones what is new, forgets what is gone and pulls the rest,
//! on a fixed cadence.

pub mod config;
pub mod error;
pub mod git;
pub mod secrets;
pub mod source;
pub mod sync;

#[cfg(test)]
mod testing;

pub use config::{CliOverrides, Config};
pub use error::{Error, Result};
pub use git::{classify, GitCommand, GitError, GitRunner, LocalRepo};
pub use secrets::{resolve_github_token, Secrets};
pub use source::{RemoteRepository, RepositorySource};
pub use sync::{CycleOutcome, CycleReport, Driver, Reconciler, TrackedSet};

//! git plumbing for gitmirror
//!
//! Everything goes through the git executable: [`GitRunner`] spawns it,
//! [`classify`] turns its diagnostics into a [`GitError`], and [`LocalRepo`]
//! builds the clone/pull operations on top of both.

mod classify;
mod local;
mod runner;

pub use classify::{classify, GitError};
pub use local::LocalRepo;
pub use runner::{CommandOutput, GitCommand, GitRunner};

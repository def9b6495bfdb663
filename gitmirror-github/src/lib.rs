//! gitmirror GitHub - GitHub integration for gitmirror
//!
//! This crate lists the repositories of the authenticated GitHub account so
//! the reconciler in `gitmirror-core` can mirror them.

mod client;
mod error;

pub use client::GitHubSource;
pub use error::{Error, Result};

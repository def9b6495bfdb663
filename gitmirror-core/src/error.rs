//! Error types for gitmirror

use std::path::PathBuf;

use thiserror::Error;

use crate::git::GitError;

/// Result type alias for gitmirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gitmirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The git executable could not be spawned
    #[error("git executable not found at '{0}'. Is git installed?")]
    GitNotFound(String),

    /// A repository path exists but is not a directory
    #[error("repo dir {} must be a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A repository directory exists but holds no working copy
    #[error("repo dir {} is not a git repository", .0.display())]
    NotAWorkingCopy(PathBuf),

    /// A git command was pointed at a directory that is gone
    #[error("working directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// A git command failed, classified from its diagnostics
    #[error(transparent)]
    Git(#[from] GitError),

    /// The listing service could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The listing service answered with an error
    #[error("Remote error: {0}")]
    Remote(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Whether the error is a transport problem worth retrying next cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Git(GitError::ConnectionFailure(_))
        )
    }

    /// Whether the error must stop the process
    ///
    /// Git failures and listing errors only cost the current cycle; broken
    /// local state, bad configuration and credentials do not fix themselves.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Io(_)
            | Error::Config(_)
            | Error::GitNotFound(_)
            | Error::NotADirectory(_)
            | Error::NotAWorkingCopy(_)
            | Error::Auth(_) => true,
            Error::MissingDirectory(_)
            | Error::Git(_)
            | Error::Network(_)
            | Error::Remote(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(Error::Network("timed out".to_string()).is_transient());
        assert!(Error::Git(GitError::ConnectionFailure("early EOF".to_string())).is_transient());
        assert!(!Error::Git(GitError::Generic("boom".to_string())).is_transient());
        assert!(!Error::Remote("Bad credentials".to_string()).is_transient());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::NotAWorkingCopy(PathBuf::from("/tmp/x")).is_fatal());
        assert!(Error::Config("negative delay".to_string()).is_fatal());
        assert!(!Error::Git(GitError::Generic("boom".to_string())).is_fatal());
        assert!(!Error::Network("timed out".to_string()).is_fatal());
    }

    #[test]
    fn test_missing_directory_is_not_fatal() {
        let err = Error::MissingDirectory(PathBuf::from("/srv/repos/gone"));
        assert!(!err.is_fatal());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "working directory /srv/repos/gone does not exist");
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::NotADirectory(PathBuf::from("/srv/repos/foo"));
        assert_eq!(err.to_string(), "repo dir /srv/repos/foo must be a directory");
    }
}

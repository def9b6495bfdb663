//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Whether the request never got a usable answer from GitHub
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Api(
                octocrab::Error::Hyper { .. }
                    | octocrab::Error::Service { .. }
                    | octocrab::Error::Http { .. }
            )
        )
    }
}

impl From<Error> for gitmirror_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Auth(msg) => gitmirror_core::Error::Auth(msg),
            Error::Api(octocrab::Error::GitHub { source, .. })
                if source.message.contains("Bad credentials") =>
            {
                gitmirror_core::Error::Auth("Invalid GitHub token".to_string())
            }
            err if err.is_network() => gitmirror_core::Error::Network(err.to_string()),
            err => gitmirror_core::Error::Remote(err.to_string()),
        }
    }
}

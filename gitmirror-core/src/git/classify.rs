//! Classification of git diagnostics into typed errors
//!
//! git only reports failures as text on stderr, so the wording below is tied
//! to the messages git prints under the `C` locale. All matching lives here.
//! Substrings are compared ignoring ASCII case since git capitalises some.

use thiserror::Error;

/// Prefix git puts in front of the line describing a fatal condition
const FATAL_PREFIX: &str = "fatal:";

/// Message used when stderr carries nothing usable
const UNKNOWN_ERROR: &str = "unknown error";

const NOT_A_REPOSITORY: [&str; 2] = [
    "not a git repository",
    "does not appear to be a git repository",
];
const ALREADY_EXISTS: &str = "already exists and is not an empty";
/// `git pull` in a repository whose remote has no commits yet
const UNFETCHED_MERGE_REF: &str = "configuration specifies to merge with";

const CONNECTION_FAILURES: [&str; 4] = [
    "unable to access",
    "could not read from remote repository",
    "unable to look up",
    "early EOF",
];

/// A failed git command, by kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GitError {
    /// The target is not (or does not point at) a git repository
    #[error("not a git repository: {0}")]
    NotARepository(String),

    /// Clone destination already exists and is not empty
    #[error("destination already exists: {0}")]
    AlreadyExists(String),

    /// The remote could not be reached
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// Anything else git reported
    #[error("git error: {0}")]
    Generic(String),
}

impl GitError {
    /// Whether a pull failed because the configured upstream ref was never
    /// fetched, which is what pulling an empty remote looks like
    pub fn is_unfetched_merge_ref(&self) -> bool {
        matches!(self, GitError::Generic(msg) if msg.contains(UNFETCHED_MERGE_REF))
    }
}

/// Map the stderr of a failed git command to a [`GitError`]
///
/// Never fails: undecodable bytes are replaced, and anything that does not
/// look like a known fatal condition ends up as [`GitError::Generic`].
pub fn classify(stderr: &[u8]) -> GitError {
    let text = String::from_utf8_lossy(stderr);

    let fatal = text
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with(FATAL_PREFIX));

    let Some(line) = fatal else {
        let raw = text.trim();
        return GitError::Generic(if raw.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            raw.to_string()
        });
    };

    let message = line[FATAL_PREFIX.len()..].trim().to_string();
    let lowered = line.to_ascii_lowercase();
    let mentions = |needle: &&str| lowered.contains(&needle.to_ascii_lowercase());

    if NOT_A_REPOSITORY.iter().any(mentions) {
        GitError::NotARepository(message)
    } else if mentions(&ALREADY_EXISTS) {
        GitError::AlreadyExists(message)
    } else if CONNECTION_FAILURES.iter().any(mentions) {
        GitError::ConnectionFailure(message)
    } else {
        GitError::Generic(message)
    }
}

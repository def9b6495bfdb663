//! The listing service the mirror reconciles against

use async_trait::async_trait;

use crate::Result;

/// One repository as reported by the remote listing
///
/// A fresh snapshot is fetched every cycle; nothing here is owned by the
/// mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    /// Stable unique id
    pub id: u64,
    /// Repository name, also the directory name of the mirror
    pub name: String,
    /// Id of the owning account
    pub owner_id: u64,
    /// URL passed to `git clone`
    pub clone_url: String,
}

/// Lists the repositories visible to one authenticated account
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Id of the account the source is authenticated as
    async fn account_id(&self) -> Result<u64>;

    /// Every repository visible to the account, owned or not
    async fn list_repositories(&self) -> Result<Vec<RemoteRepository>>;
}

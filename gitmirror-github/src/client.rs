//! GitHub API client using octocrab

use async_trait::async_trait;
use gitmirror_core::{RemoteRepository, RepositorySource};
use octocrab::models::Repository;
use octocrab::Octocrab;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{Error, Result};

/// Repositories requested per page, the maximum GitHub allows
const PER_PAGE: u8 = 100;

/// Lists the repositories of the account a personal token belongs to
pub struct GitHubSource {
    client: Octocrab,
    account_id: OnceCell<u64>,
}

impl GitHubSource {
    /// Create a new GitHub source authenticated with `token`
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!("Created GitHub client");

        Ok(Self {
            client,
            account_id: OnceCell::new(),
        })
    }

    /// Id of the authenticated user, fetched once
    pub async fn current_user_id(&self) -> Result<u64> {
        let id = self
            .account_id
            .get_or_try_init(|| async {
                let user = self.client.current().user().await?;
                info!(login = %user.login, id = user.id.0, "Authenticated with GitHub");
                Ok::<_, Error>(user.id.0)
            })
            .await?;

        Ok(*id)
    }

    /// List every repository the authenticated user can see
    ///
    /// Requests the first page of `/user/repos` and follows the `next` links
    /// from there.
    pub async fn list_all_repositories(&self) -> Result<Vec<RemoteRepository>> {
        debug!("Listing repositories with pagination");

        let first_page = self
            .client
            .current()
            .list_repos_for_authenticated_user()
            .per_page(PER_PAGE)
            .send()
            .await?;
        let repos = self.client.all_pages(first_page).await?;

        let all_repos: Vec<RemoteRepository> = repos.into_iter().filter_map(to_remote).collect();

        info!(count = all_repos.len(), "Fetched repositories");

        Ok(all_repos)
    }
}

/// Convert an octocrab repository, skipping ones that cannot be mirrored
fn to_remote(repo: Repository) -> Option<RemoteRepository> {
    let Some(owner) = repo.owner else {
        debug!(repo = %repo.name, "Skipping repository without owner");
        return None;
    };
    let Some(clone_url) = repo.clone_url else {
        debug!(repo = %repo.name, "Skipping repository without clone URL");
        return None;
    };

    Some(RemoteRepository {
        id: repo.id.0,
        name: repo.name,
        owner_id: owner.id.0,
        clone_url: clone_url.to_string(),
    })
}

#[async_trait]
impl RepositorySource for GitHubSource {
    async fn account_id(&self) -> gitmirror_core::Result<u64> {
        Ok(self.current_user_id().await?)
    }

    async fn list_repositories(&self) -> gitmirror_core::Result<Vec<RemoteRepository>> {
        Ok(self.list_all_repositories().await?)
    }
}

impl std::fmt::Debug for GitHubSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSource")
            .field("account_id", &self.account_id.get())
            .finish_non_exhaustive()
    }
}

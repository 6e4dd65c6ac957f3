//! Capabilities the changelog collectors need from GitHub.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::{
    changelog::types::Release,
    error::Result,
    forge::types::{
        ListedPullRequest, PullRequestsPageRequest, ReleasesPageRequest,
        RepositoryRef,
    },
    paginator::Page,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Fetch one page of releases with empty pull request lists.
    async fn fetch_releases_page(
        &self,
        req: ReleasesPageRequest,
    ) -> Result<Page<Release>>;

    /// Fetch one page of closed pull requests, most recently updated first.
    async fn fetch_pull_requests_page(
        &self,
        req: PullRequestsPageRequest,
    ) -> Result<Page<ListedPullRequest>>;

    /// Creation date of the repository.
    async fn fetch_repository_created_at(
        &self,
        repository: RepositoryRef,
    ) -> Result<DateTime<Utc>>;
}

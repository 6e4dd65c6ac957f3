use chrono::{DateTime, Utc};

use crate::{changelog::types::PullRequest, paginator::PageToken};

/// Identifies a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for one page of releases.
pub struct ReleasesPageRequest {
    pub repository: RepositoryRef,
    pub page: Option<PageToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for one page of merged pull requests, most recently updated first.
pub struct PullRequestsPageRequest {
    pub repository: RepositoryRef,
    /// Base branch the pull requests were merged into.
    pub base: String,
    /// Populate label names on each pull request.
    pub with_labels: bool,
    /// Populate changed file paths on each pull request.
    pub with_files: bool,
    pub page: Option<PageToken>,
}

/// A closed pull request as listed by the API. Unmerged ones never make a
/// changelog but their update date still bounds how far back paging goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListedPullRequest {
    Merged(PullRequest),
    Unmerged { number: u64, updated_at: DateTime<Utc> },
}

impl ListedPullRequest {
    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Merged(pr) => pr.updated_at,
            Self::Unmerged { updated_at, .. } => *updated_at,
        }
    }
}

impl From<PullRequest> for ListedPullRequest {
    fn from(pr: PullRequest) -> Self {
        Self::Merged(pr)
    }
}

//! Pull-Request Collector: pages through merged pull requests, most recently
//! updated first, and stops as soon as nothing further back can qualify.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    changelog::types::PullRequest,
    error::Result,
    forge::{
        traits::GithubApi,
        types::{ListedPullRequest, PullRequestsPageRequest, RepositoryRef},
    },
    paginator::{Page, PageOutcome, PageSource, PageToken, Paginator},
};

/// Optional filters applied to every fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestFilter {
    /// Keep a pull request when one of its labels is in this set. Empty keeps
    /// everything.
    pub labels: Vec<String>,
    /// Keep a pull request when one of its changed files is under this path.
    pub changed_files_prefix: Option<String>,
}

impl PullRequestFilter {
    pub fn matches(&self, pr: &PullRequest) -> bool {
        self.matches_labels(pr) && self.matches_files(pr)
    }

    fn matches_labels(&self, pr: &PullRequest) -> bool {
        self.labels.is_empty()
            || pr.labels.iter().any(|l| self.labels.contains(l))
    }

    fn matches_files(&self, pr: &PullRequest) -> bool {
        let Some(prefix) = &self.changed_files_prefix else {
            return true;
        };

        pr.files
            .iter()
            .any(|f| f.trim_start_matches("./").starts_with(prefix.as_str()))
    }
}

struct PullRequestPages<'a> {
    api: &'a dyn GithubApi,
    request: PullRequestsPageRequest,
}

#[async_trait]
impl PageSource for PullRequestPages<'_> {
    type Item = ListedPullRequest;

    async fn fetch_page(
        &self,
        token: Option<PageToken>,
    ) -> Result<Page<ListedPullRequest>> {
        let mut request = self.request.clone();
        request.page = token;
        self.api.fetch_pull_requests_page(request).await
    }
}

pub struct PullRequestCollector<'a> {
    api: &'a dyn GithubApi,
    repository: &'a RepositoryRef,
    base: &'a str,
    filter: PullRequestFilter,
    concurrency: usize,
}

impl<'a> PullRequestCollector<'a> {
    pub fn new(
        api: &'a dyn GithubApi,
        repository: &'a RepositoryRef,
        base: &'a str,
        filter: PullRequestFilter,
        concurrency: usize,
    ) -> Self {
        Self {
            api,
            repository,
            base,
            filter,
            concurrency,
        }
    }

    /// Qualifying pull requests merged after `start_date`, sorted ascending
    /// by merge date.
    pub async fn collect(
        &self,
        start_date: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>> {
        let source = PullRequestPages {
            api: self.api,
            request: PullRequestsPageRequest {
                repository: self.repository.clone(),
                base: self.base.to_string(),
                with_labels: !self.filter.labels.is_empty(),
                with_files: self.filter.changed_files_prefix.is_some(),
                page: None,
            },
        };

        let mut pull_requests = Paginator::new(&source)
            .concurrency(self.concurrency)
            .collect_until(|items| self.select(items, start_date))
            .await?;

        pull_requests.sort_by_key(|pr| pr.merged_at);

        debug!(
            "collected {} pull requests merged since {start_date}",
            pull_requests.len()
        );

        Ok(pull_requests)
    }

    /// Keep items merged after `start_date` that pass the filter. Once an
    /// item last updated before `start_date` shows up, no later page can
    /// hold a qualifying pull request. Termination ignores both the filter
    /// and whether the item was merged at all.
    fn select(
        &self,
        items: Vec<ListedPullRequest>,
        start_date: DateTime<Utc>,
    ) -> PageOutcome<PullRequest> {
        let mut keep = vec![];
        let mut stop = false;

        for item in items {
            let updated_at = item.updated_at();

            match item {
                ListedPullRequest::Merged(pr) if pr.merged_at > start_date => {
                    if self.filter.matches(&pr) {
                        keep.push(pr);
                    }
                }
                _ if updated_at < start_date => stop = true,
                _ => {}
            }
        }

        if stop {
            info!(
                "reached pull requests last updated before {start_date}: stopping"
            );
            return PageOutcome::stop(keep);
        }

        PageOutcome::keep(keep)
    }
}

//! Common test utilities for changelog tests.

use chrono::{DateTime, Utc};

use crate::{
    changelog::{
        ChangelogFetcher,
        types::{Author, PullRequest, Release, ReleaseKind},
    },
    config::ChangelogConfigParamsBuilder,
    forge::{traits::MockGithubApi, types::ListedPullRequest},
    paginator::Page,
};

pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn release(tag: &str, created_at: &str) -> Release {
    Release {
        name: None,
        tag_name: Some(tag.to_string()),
        created_at: ts(created_at),
        url: format!("https://github.com/biz/buz/releases/tag/{tag}"),
        kind: ReleaseKind::Published,
        pull_requests: vec![],
    }
}

/// Pull request last updated when it was merged.
pub fn pr(number: u64, merged_at: &str) -> PullRequest {
    pr_updated(number, merged_at, merged_at)
}

pub fn pr_updated(number: u64, merged_at: &str, updated_at: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Pull request {number}"),
        url: format!("https://github.com/biz/buz/pull/{number}"),
        author: Author {
            login: "octocat".to_string(),
            url: "https://github.com/octocat".to_string(),
        },
        merged_at: ts(merged_at),
        updated_at: ts(updated_at),
        labels: vec![],
        files: vec![],
    }
}

pub fn pr_labeled(number: u64, merged_at: &str, labels: &[&str]) -> PullRequest {
    PullRequest {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        ..pr(number, merged_at)
    }
}

pub fn pr_files(number: u64, merged_at: &str, files: &[&str]) -> PullRequest {
    PullRequest {
        files: files.iter().map(|f| f.to_string()).collect(),
        ..pr(number, merged_at)
    }
}

/// Listing entries for merged pull requests.
pub fn merged(prs: Vec<PullRequest>) -> Vec<ListedPullRequest> {
    prs.into_iter().map(ListedPullRequest::Merged).collect()
}

/// Final listing page holding only merged pull requests.
pub fn merged_page(prs: Vec<PullRequest>) -> Page<ListedPullRequest> {
    Page::last(merged(prs))
}

/// Builder preset for the `biz/buz` test repository.
pub fn test_config() -> ChangelogConfigParamsBuilder {
    let mut builder = ChangelogConfigParamsBuilder::default();
    builder.owner("biz").repo("buz");
    builder
}

/// Creates a fetcher over the provided mock. Set expectations on the mock
/// before calling this.
pub fn create_test_fetcher(
    mock: MockGithubApi,
    config: ChangelogConfigParamsBuilder,
) -> ChangelogFetcher {
    ChangelogFetcher::new(Box::new(mock), config.build().unwrap())
}

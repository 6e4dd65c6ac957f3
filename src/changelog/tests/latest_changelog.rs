//! Tests for incremental changelogs.
//!
//! Tests for:
//! - fetch_latest_changelog boundary resolution
//! - Duplicate release detection across runs
//! - Missing future release configuration

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::common::*;
use crate::{
    changelog::types::ReleaseKind, error::ChangelogError,
    forge::traits::MockGithubApi, paginator::Page,
};

#[tokio::test]
async fn collects_merges_since_latest_release() {
    let mut mock = MockGithubApi::new();

    mock.expect_fetch_releases_page().times(1).returning(|_| {
        Ok(Page::last(vec![
            release("v2", "2018-10-23T12:00:00Z"),
            release("v1", "2018-10-22T12:00:00Z"),
        ]))
    });

    mock.expect_fetch_repository_created_at().never();

    mock.expect_fetch_pull_requests_page().times(1).returning(|_| {
        Ok(merged_page(vec![
            pr(5, "2018-10-24T10:00:00Z"),
            pr(4, "2018-10-23T13:00:00Z"),
            pr(3, "2018-10-23T10:00:00Z"),
        ]))
    });

    let mut config = test_config();
    config.future_release("Version 3").future_release_tag("v3");

    let fetcher = create_test_fetcher(mock, config);

    let releases = fetcher.fetch_latest_changelog().await.unwrap();

    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].kind, ReleaseKind::Future);
    assert_eq!(releases[0].title(), Some("Version 3"));
    assert_eq!(releases[0].tag_name.as_deref(), Some("v3"));

    let numbers = releases[0]
        .pull_requests
        .iter()
        .map(|pr| pr.number)
        .collect::<Vec<u64>>();

    assert_eq!(numbers, vec![5, 4]);
}

#[tokio::test]
async fn falls_back_to_repository_creation_without_releases() {
    let mut mock = MockGithubApi::new();

    mock.expect_fetch_releases_page()
        .returning(|_| Ok(Page::last(vec![])));

    mock.expect_fetch_repository_created_at()
        .times(1)
        .returning(|_| Ok(ts("2018-10-20T12:00:00Z")));

    mock.expect_fetch_pull_requests_page().returning(|_| {
        Ok(merged_page(vec![
            pr(3, "2018-10-23T10:00:00Z"),
            pr(2, "2018-10-21T10:00:00Z"),
            pr(1, "2018-10-20T10:00:00Z"),
        ]))
    });

    let mut config = test_config();
    config.future_release("v1");

    let fetcher = create_test_fetcher(mock, config);

    let releases = fetcher.fetch_latest_changelog().await.unwrap();

    let numbers = releases[0]
        .pull_requests
        .iter()
        .map(|pr| pr.number)
        .collect::<Vec<u64>>();

    assert_eq!(numbers, vec![3, 2]);
}

#[tokio::test]
async fn second_run_after_publishing_is_a_duplicate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut mock = MockGithubApi::new();

    let release_calls = calls.clone();
    mock.expect_fetch_releases_page().returning(move |_| {
        // the first changelog gets published as v2 before the second run
        if release_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(Page::last(vec![release("v1", "2018-10-22T12:00:00Z")]))
        } else {
            Ok(Page::last(vec![
                release("v2", "2018-10-24T12:00:00Z"),
                release("v1", "2018-10-22T12:00:00Z"),
            ]))
        }
    });

    mock.expect_fetch_pull_requests_page()
        .times(1)
        .returning(|_| Ok(merged_page(vec![pr(2, "2018-10-23T10:00:00Z")])));

    let mut config = test_config();
    config.future_release("v2");

    let fetcher = create_test_fetcher(mock, config);

    let first = fetcher.fetch_latest_changelog().await.unwrap();
    assert_eq!(first[0].pull_requests.len(), 1);

    let second = fetcher.fetch_latest_changelog().await;

    assert!(matches!(
        second,
        Err(ChangelogError::DuplicateRelease { tag }) if tag == "v2"
    ));
    assert!(calls.load(Ordering::SeqCst) == 2);
}

#[tokio::test]
async fn latest_respects_release_tag_prefix() {
    let mut mock = MockGithubApi::new();

    mock.expect_fetch_releases_page().returning(|_| {
        Ok(Page::last(vec![
            release("lib-v5", "2018-10-23T12:00:00Z"),
            release("app-v1", "2018-10-21T12:00:00Z"),
        ]))
    });

    mock.expect_fetch_pull_requests_page().returning(|_| {
        Ok(merged_page(vec![
            pr(3, "2018-10-23T13:00:00Z"),
            pr(2, "2018-10-22T10:00:00Z"),
            pr(1, "2018-10-21T10:00:00Z"),
        ]))
    });

    let mut config = test_config();
    config.future_release("app-v2").release_tag_prefix("app-");

    let fetcher = create_test_fetcher(mock, config);

    let releases = fetcher.fetch_latest_changelog().await.unwrap();

    let numbers = releases[0]
        .pull_requests
        .iter()
        .map(|pr| pr.number)
        .collect::<Vec<u64>>();

    assert_eq!(numbers, vec![3, 2]);
}

#[test_log::test(tokio::test)]
async fn nothing_to_do_without_future_release() {
    let mut mock = MockGithubApi::new();

    mock.expect_fetch_releases_page().never();
    mock.expect_fetch_pull_requests_page().never();

    let fetcher = create_test_fetcher(mock, test_config());

    let releases = fetcher.fetch_latest_changelog().await.unwrap();

    assert!(releases.is_empty());
}

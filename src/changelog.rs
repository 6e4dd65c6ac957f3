//! Changelog assembly: collects releases and merged pull requests, then
//! correlates them into a newest-first list of releases.
use chrono::Utc;
use log::*;

use crate::{
    changelog::{
        correlator::correlate,
        pull_requests::{PullRequestCollector, PullRequestFilter},
        releases::ReleaseCollector,
        types::Release,
    },
    config::ChangelogConfig,
    error::Result,
    forge::traits::GithubApi,
};

pub mod correlator;
pub mod future_release;
pub mod pull_requests;
pub mod releases;
pub mod types;


/// Heading of the origin release of a repository that has no releases yet.
pub const UNRELEASED_TITLE: &str = "Unreleased";

/// Entry point for changelog generation against a single repository.
pub struct ChangelogFetcher {
    api: Box<dyn GithubApi>,
    config: ChangelogConfig,
}

impl ChangelogFetcher {
    pub fn new(api: Box<dyn GithubApi>, config: ChangelogConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    /// Full history. Pull requests merged after the last release go to the
    /// future release when one is configured and are left out otherwise.
    /// Without any release, the origin release collects every merge since
    /// the repository was created.
    pub async fn fetch_full_changelog(&self) -> Result<Vec<Release>> {
        let repository = &self.config.repository;

        info!(
            "generating full changelog for {}/{}",
            repository.owner, repository.repo
        );

        let created_at = self
            .api
            .fetch_repository_created_at(repository.clone())
            .await?;

        let repository_url = self.config.repository_url();
        let release_collector = self.release_collector();
        let pr_collector = self.pull_request_collector();

        let (mut releases, pull_requests) = tokio::try_join!(
            release_collector.collect_all(created_at, &repository_url),
            pr_collector.collect(created_at),
        )?;

        if let Some(future) = &self.config.future_release {
            let latest = releases.iter().rev().find(|r| !r.is_origin());
            future.ensure_new(latest)?;

            let now = Utc::now();
            let created_at = releases
                .last()
                .map(|r| r.created_at.max(now))
                .unwrap_or(now);

            releases.push(future.synthesize(created_at));
        }

        let unassigned = correlate(&mut releases, pull_requests);

        match releases.as_mut_slice() {
            [origin] if origin.is_origin() => {
                info!(
                    "no releases found: {} pull requests go to the origin release",
                    unassigned.len()
                );
                origin.name = Some(UNRELEASED_TITLE.to_string());
                origin.pull_requests.extend(unassigned.into_iter().rev());
            }
            _ if !unassigned.is_empty() => {
                info!(
                    "{} pull requests merged after the latest release were left out",
                    unassigned.len()
                );
            }
            _ => {}
        }

        releases.retain(|r| !r.is_origin() || !r.pull_requests.is_empty());
        releases.reverse();

        Ok(releases)
    }

    /// Only the future release, holding every pull request merged since the
    /// latest matching release (or since the repository was created).
    pub async fn fetch_latest_changelog(&self) -> Result<Vec<Release>> {
        let Some(future) = &self.config.future_release else {
            warn!("latest changelog requires a future release: nothing to do");
            return Ok(vec![]);
        };

        let repository = &self.config.repository;

        info!(
            "generating changelog for {} in {}/{}",
            future.tag, repository.owner, repository.repo
        );

        let latest = self.release_collector().collect_latest().await?;

        future.ensure_new(latest.as_ref())?;

        let boundary = match &latest {
            Some(release) => release.created_at,
            None => {
                info!("no releases found: collecting since repository creation");
                self.api
                    .fetch_repository_created_at(repository.clone())
                    .await?
            }
        };

        let pull_requests =
            self.pull_request_collector().collect(boundary).await?;

        let mut releases = vec![future.synthesize(Utc::now().max(boundary))];

        let unassigned = correlate(&mut releases, pull_requests);

        if !unassigned.is_empty() {
            warn!(
                "{} pull requests are dated in the future and were left out",
                unassigned.len()
            );
        }

        Ok(releases)
    }

    fn release_collector(&self) -> ReleaseCollector<'_> {
        ReleaseCollector::new(
            self.api.as_ref(),
            &self.config.repository,
            self.config.release_tag_prefix.as_deref(),
            self.config.remote.concurrency,
        )
    }

    fn pull_request_collector(&self) -> PullRequestCollector<'_> {
        PullRequestCollector::new(
            self.api.as_ref(),
            &self.config.repository,
            &self.config.base,
            PullRequestFilter {
                labels: self.config.labels.clone(),
                changed_files_prefix: self.config.changed_files_prefix.clone(),
            },
            self.config.remote.concurrency,
        )
    }
}

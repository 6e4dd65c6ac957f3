//! Release Collector: pages through repository releases and produces the
//! ascending sequence of correlation boundaries.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    changelog::types::Release,
    error::Result,
    forge::{
        traits::GithubApi,
        types::{ReleasesPageRequest, RepositoryRef},
    },
    paginator::{Page, PageOutcome, PageSource, PageToken, Paginator},
};

struct ReleasePages<'a> {
    api: &'a dyn GithubApi,
    repository: &'a RepositoryRef,
}

#[async_trait]
impl PageSource for ReleasePages<'_> {
    type Item = Release;

    async fn fetch_page(
        &self,
        token: Option<PageToken>,
    ) -> Result<Page<Release>> {
        self.api
            .fetch_releases_page(ReleasesPageRequest {
                repository: self.repository.clone(),
                page: token,
            })
            .await
    }
}

pub struct ReleaseCollector<'a> {
    api: &'a dyn GithubApi,
    repository: &'a RepositoryRef,
    tag_prefix: Option<&'a str>,
    concurrency: usize,
}

impl<'a> ReleaseCollector<'a> {
    pub fn new(
        api: &'a dyn GithubApi,
        repository: &'a RepositoryRef,
        tag_prefix: Option<&'a str>,
        concurrency: usize,
    ) -> Self {
        Self {
            api,
            repository,
            tag_prefix,
            concurrency,
        }
    }

    /// Every matching release, sorted ascending by creation date. When the
    /// repository has no matching release a single origin boundary dated
    /// `origin` is returned instead, so every pull request still has a
    /// candidate window.
    pub async fn collect_all(
        &self,
        origin: DateTime<Utc>,
        origin_url: &str,
    ) -> Result<Vec<Release>> {
        let source = self.source();

        let mut releases = Paginator::new(&source)
            .concurrency(self.concurrency)
            .collect_until(|items| PageOutcome::keep(self.matching(items)))
            .await?;

        if releases.is_empty() {
            info!(
                "no releases found for {}/{}: using repository creation date as origin",
                self.repository.owner, self.repository.repo
            );
            return Ok(vec![Release::origin(origin, origin_url)]);
        }

        // stable: releases sharing a date keep source order
        releases.sort_by_key(|r| r.created_at);

        debug!("collected {} releases", releases.len());

        Ok(releases)
    }

    /// Most recent matching release. Releases arrive newest first, so paging
    /// stops at the first page containing a match.
    pub async fn collect_latest(&self) -> Result<Option<Release>> {
        let source = self.source();

        let found = Paginator::new(&source)
            .concurrency(1)
            .collect_until(|items| {
                let matching = self.matching(items);

                if matching.is_empty() {
                    PageOutcome::keep(matching)
                } else {
                    PageOutcome::stop(matching)
                }
            })
            .await?;

        let latest = found.into_iter().fold(None, |latest: Option<Release>, r| {
            match latest {
                Some(l) if l.created_at >= r.created_at => Some(l),
                _ => Some(r),
            }
        });

        if let Some(release) = &latest {
            info!(
                "latest release: {} ({})",
                release.title().unwrap_or_default(),
                release.created_at
            );
        }

        Ok(latest)
    }

    fn source(&self) -> ReleasePages<'a> {
        ReleasePages {
            api: self.api,
            repository: self.repository,
        }
    }

    fn matching(&self, items: Vec<Release>) -> Vec<Release> {
        let Some(prefix) = self.tag_prefix else {
            return items;
        };

        items
            .into_iter()
            .filter(|r| {
                r.tag_name.as_deref().is_some_and(|t| t.starts_with(prefix))
            })
            .collect()
    }
}

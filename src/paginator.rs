//! Page-fetch loop shared by every paginated collection.
//!
//! Sources are either cursor based (GraphQL), where every request depends on
//! the cursor of the previous response and pages are therefore fetched one
//! after the other, or page-number based (REST). A numbered source that
//! reports its last page number on the first response has its remaining pages
//! fetched with bounded parallelism and reassembled in page order.
use async_trait::async_trait;
use futures_util::{Stream, StreamExt, TryStreamExt, stream};
use log::*;
use std::{ops::RangeInclusive, pin::pin};

use crate::error::{ChangelogError, Result};

/// Maximum number of page requests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Identifies a page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// Opaque cursor returned by the previous page.
    Cursor(String),
    /// One-based page number.
    Number(u32),
}

/// A single page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token of the following page, `None` once the source is exhausted.
    pub next: Option<PageToken>,
    /// Number of the last page, when a numbered source knows it upfront.
    pub last_page: Option<u32>,
}

impl<T> Page<T> {
    /// Page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next: None,
            last_page: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Same page with every item converted.
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
            last_page: self.last_page,
        }
    }

    /// Numbers of the pages still to fetch when they are all known.
    fn remaining_numbered(&self) -> Option<RangeInclusive<u32>> {
        match (&self.next, self.last_page) {
            (Some(PageToken::Number(next)), Some(last)) if *next <= last => {
                Some(*next..=last)
            }
            _ => None,
        }
    }
}

/// Anything that can hand out pages given a token. `None` requests the first
/// page.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(
        &self,
        token: Option<PageToken>,
    ) -> Result<Page<Self::Item>>;
}

/// What to keep from a page and whether paging should stop after it.
#[derive(Debug)]
pub struct PageOutcome<U> {
    pub keep: Vec<U>,
    pub stop: bool,
}

impl<U> PageOutcome<U> {
    pub fn keep(keep: Vec<U>) -> Self {
        Self { keep, stop: false }
    }

    pub fn stop(keep: Vec<U>) -> Self {
        Self { keep, stop: true }
    }
}

/// Drives a [`PageSource`] until it is exhausted or the caller asks to stop.
pub struct Paginator<'a, S> {
    source: &'a S,
    concurrency: usize,
}

impl<'a, S: PageSource> Paginator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Bound on parallel requests for numbered sources. `1` forces
    /// sequential fetching.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sequential stream of pages, ending after the page that reports no
    /// successor. The first error ends the stream.
    pub fn pages(&self) -> impl Stream<Item = Result<Page<S::Item>>> + 'a {
        let source = self.source;

        // None: exhausted, Some(None): first page, Some(Some(t)): page at t
        stream::try_unfold(
            Some(None),
            move |state: Option<Option<PageToken>>| async move {
                let Some(token) = state else {
                    return Ok::<_, ChangelogError>(None);
                };

                debug!("fetching page: {:?}", token);

                let page = source.fetch_page(token).await?;
                let next = page.next.clone().map(Some);

                Ok(Some((page, next)))
            },
        )
    }

    /// Fetches every page and returns all items in page order.
    pub async fn collect_all(&self) -> Result<Vec<S::Item>> {
        self.collect_until(PageOutcome::keep).await
    }

    /// Fetches pages in order, passing the items of each page through
    /// `handler` before accumulating what it keeps. Paging stops when the
    /// source is exhausted or the handler reports `stop`.
    pub async fn collect_until<U, H>(&self, mut handler: H) -> Result<Vec<U>>
    where
        H: FnMut(Vec<S::Item>) -> PageOutcome<U>,
    {
        let mut collected = vec![];
        let mut pages = pin!(self.pages());

        while let Some(page) = pages.try_next().await? {
            let remaining = page.remaining_numbered();
            let outcome = handler(page.items);

            collected.extend(outcome.keep);

            if outcome.stop {
                debug!("page handler requested stop");
                return Ok(collected);
            }

            if let Some(range) = remaining
                && self.concurrency > 1
            {
                return self.collect_range(range, handler, collected).await;
            }
        }

        Ok(collected)
    }

    async fn collect_range<U, H>(
        &self,
        range: RangeInclusive<u32>,
        mut handler: H,
        mut collected: Vec<U>,
    ) -> Result<Vec<U>>
    where
        H: FnMut(Vec<S::Item>) -> PageOutcome<U>,
    {
        debug!(
            "fetching pages {}..={} with concurrency {}",
            range.start(),
            range.end(),
            self.concurrency
        );

        let source = self.source;

        // buffered keeps results in page order regardless of completion order
        let mut pages = pin!(
            stream::iter(range)
                .map(|n| source.fetch_page(Some(PageToken::Number(n))))
                .buffered(self.concurrency)
        );

        while let Some(page) = pages.try_next().await? {
            let outcome = handler(page.items);

            collected.extend(outcome.keep);

            if outcome.stop {
                debug!("page handler requested stop");
                break;
            }
        }

        Ok(collected)
    }
}

//! Implements GithubApi over the GitHub REST API
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt, stream};
use log::*;
use regex::Regex;
use reqwest::{
    Client, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK},
};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

use crate::{
    changelog::types::{Author, PullRequest, Release, ReleaseKind},
    error::{ChangelogError, Result},
    forge::{
        config::{RemoteConfig, USER_AGENT},
        rest::types::{
            RestFile, RestPullRequest, RestRelease, RestRepository,
        },
        traits::GithubApi,
        types::{
            ListedPullRequest, PullRequestsPageRequest, ReleasesPageRequest,
            RepositoryRef,
        },
        util::parse_timestamp,
    },
    paginator::{Page, PageToken},
};

mod types;

static LAST_PAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[^>]*[&?]page=([0-9]+)[^>]*>;\s*rel="last""#).unwrap()
});

/// GitHub client using the REST API. Collections are page-number paginated
/// and the last page number is read from the `Link` response header, which
/// lets the paginator fetch the remaining pages concurrently.
pub struct GithubRest {
    client: Client,
    base_url: Url,
    page_size: u8,
    concurrency: usize,
}

impl GithubRest {
    /// Create REST client with token authentication.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.append(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let token = config.token.expose_secret();

        if !token.is_empty() {
            let mut token_value =
                HeaderValue::from_str(format!("token {}", token).as_str())?;
            token_value.set_sensitive(true);
            headers.append(AUTHORIZATION, token_value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(&format!("{}/", config.api_base_url()))?;

        Ok(Self {
            client,
            base_url,
            page_size: config.page_size,
            concurrency: config.concurrency.max(1),
        })
    }

    fn repo_url(&self, repository: &RepositoryRef, path: &str) -> Result<Url> {
        let path = if path.is_empty() {
            format!("repos/{}/{}", repository.owner, repository.repo)
        } else {
            format!("repos/{}/{}/{}", repository.owner, repository.repo, path)
        };

        Ok(self.base_url.join(&path)?)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        mut url: Url,
        page: u32,
    ) -> Result<Page<T>> {
        url.query_pairs_mut()
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string());

        debug!("requesting {url}");

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;

        let link = response
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        let items: Vec<T> = response.json().await?;
        let last_page = parse_last_page(link.as_deref());

        Ok(Page {
            items,
            next: next_page(page, last_page),
            last_page,
        })
    }

    /// Every changed file of a pull request, following the file list pages.
    async fn fetch_files(
        &self,
        repository: &RepositoryRef,
        number: u64,
    ) -> Result<Vec<String>> {
        let mut files = vec![];
        let mut page_number = 1;

        loop {
            let url =
                self.repo_url(repository, &format!("pulls/{number}/files"))?;
            let page: Page<RestFile> = self.get_page(url, page_number).await?;

            files.extend(page.items.into_iter().map(|f| f.filename));

            match page.next {
                Some(PageToken::Number(next)) => page_number = next,
                _ => break,
            }
        }

        Ok(files)
    }
}

/// Number of the last page from a `Link` header. A missing header means the
/// response is the only page. A header announcing more pages without a
/// readable `rel="last"` entry is treated the same way.
pub fn parse_last_page(link: Option<&str>) -> Option<u32> {
    let link = link?;

    let last = LAST_PAGE_REGEX
        .captures(link)
        .and_then(|captures| captures[1].parse::<u32>().ok());

    if last.is_none() && link.contains(r#"rel="next""#) {
        warn!("unable to read last page from link header: treating as a single page: {link}");
    }

    last
}

fn next_page(page: u32, last_page: Option<u32>) -> Option<PageToken> {
    match last_page {
        Some(last) if page < last => Some(PageToken::Number(page + 1)),
        _ => None,
    }
}

fn page_number(token: Option<PageToken>) -> Result<u32> {
    match token {
        None => Ok(1),
        Some(PageToken::Number(n)) => Ok(n),
        Some(PageToken::Cursor(cursor)) => Err(ChangelogError::upstream(
            format!("rest pagination requires a page number, got cursor {cursor}"),
        )),
    }
}

fn to_release(release: RestRelease) -> Result<Release> {
    Ok(Release {
        name: release.name,
        tag_name: Some(release.tag_name),
        created_at: parse_timestamp(&release.created_at)?,
        url: release.html_url,
        kind: ReleaseKind::Published,
        pull_requests: vec![],
    })
}

fn to_pull_request(
    pr: RestPullRequest,
    with_labels: bool,
) -> Result<ListedPullRequest> {
    let updated_at = parse_timestamp(&pr.updated_at)?;

    let Some(merged_at) = pr.merged_at else {
        return Ok(ListedPullRequest::Unmerged {
            number: pr.number,
            updated_at,
        });
    };

    let author = pr
        .user
        .map(|u| Author {
            login: u.login,
            url: u.html_url,
        })
        .unwrap_or_default();

    let labels = if with_labels {
        pr.labels.into_iter().map(|l| l.name).collect()
    } else {
        vec![]
    };

    Ok(ListedPullRequest::Merged(PullRequest {
        number: pr.number,
        title: pr.title,
        url: pr.html_url,
        author,
        merged_at: parse_timestamp(&merged_at)?,
        updated_at,
        labels,
        files: vec![],
    }))
}

#[async_trait]
impl GithubApi for GithubRest {
    async fn fetch_releases_page(
        &self,
        req: ReleasesPageRequest,
    ) -> Result<Page<Release>> {
        let page_number = page_number(req.page)?;
        let url = self.repo_url(&req.repository, "releases")?;

        let page: Page<RestRelease> = self.get_page(url, page_number).await?;

        let items = page
            .items
            .into_iter()
            .map(to_release)
            .collect::<Result<Vec<Release>>>()?;

        Ok(Page {
            items,
            next: page.next,
            last_page: page.last_page,
        })
    }

    async fn fetch_pull_requests_page(
        &self,
        req: PullRequestsPageRequest,
    ) -> Result<Page<ListedPullRequest>> {
        let page_number = page_number(req.page)?;
        let mut url = self.repo_url(&req.repository, "pulls")?;

        url.query_pairs_mut()
            .append_pair("state", "closed")
            .append_pair("base", &req.base)
            .append_pair("sort", "updated")
            .append_pair("direction", "desc");

        let page: Page<RestPullRequest> =
            self.get_page(url, page_number).await?;

        let mut items = page
            .items
            .into_iter()
            .map(|pr| to_pull_request(pr, req.with_labels))
            .collect::<Result<Vec<ListedPullRequest>>>()?;

        if req.with_files {
            let mut merged = items
                .iter_mut()
                .filter_map(|item| match item {
                    ListedPullRequest::Merged(pr) => Some(pr),
                    ListedPullRequest::Unmerged { .. } => None,
                })
                .collect::<Vec<&mut PullRequest>>();

            let numbers =
                merged.iter().map(|pr| pr.number).collect::<Vec<u64>>();

            let files = stream::iter(numbers)
                .map(|number| self.fetch_files(&req.repository, number))
                .buffered(self.concurrency)
                .try_collect::<Vec<Vec<String>>>()
                .await?;

            for (pr, files) in merged.iter_mut().zip(files) {
                pr.files = files;
            }
        }

        Ok(Page {
            items,
            next: page.next,
            last_page: page.last_page,
        })
    }

    async fn fetch_repository_created_at(
        &self,
        repository: RepositoryRef,
    ) -> Result<DateTime<Utc>> {
        let url = self.repo_url(&repository, "")?;
        let response = self.client.get(url).send().await?;
        let repo: RestRepository = response.error_for_status()?.json().await?;

        parse_timestamp(&repo.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::rest::types::{RestLabel, RestUser};

    #[test]
    fn parses_last_page_from_link_header() {
        let link = r#"<https://api.github.com/repositories/1/releases?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/releases?per_page=100&page=7>; rel="last""#;

        assert_eq!(parse_last_page(Some(link)), Some(7));
    }

    #[test]
    fn parses_last_page_when_page_is_not_the_last_parameter() {
        let link = r#"<foo&page=2&per_page=100>; rel="last""#;

        assert_eq!(parse_last_page(Some(link)), Some(2));
    }

    #[test]
    fn missing_or_malformed_link_header_means_single_page() {
        assert_eq!(parse_last_page(None), None);
        assert_eq!(parse_last_page(Some("garbage")), None);
        assert_eq!(
            parse_last_page(Some(r#"<https://x?page=two>; rel="next""#)),
            None
        );
        // the final page only links back
        assert_eq!(
            parse_last_page(Some(r#"<https://x?page=1>; rel="first""#)),
            None
        );
    }

    #[test]
    fn next_page_stops_at_last_page() {
        assert_eq!(next_page(1, Some(3)), Some(PageToken::Number(2)));
        assert_eq!(next_page(3, Some(3)), None);
        assert_eq!(next_page(1, None), None);
    }

    #[test]
    fn page_number_defaults_to_first_page() {
        assert_eq!(page_number(None).unwrap(), 1);
        assert_eq!(page_number(Some(PageToken::Number(4))).unwrap(), 4);
        assert!(page_number(Some(PageToken::Cursor("abc".into()))).is_err());
    }

    #[test]
    fn closed_unmerged_pull_requests_keep_their_update_date() {
        let pr = RestPullRequest {
            number: 3,
            title: "abandoned".into(),
            html_url: "".into(),
            merged_at: None,
            updated_at: "2018-10-22T12:00:00Z".into(),
            user: None,
            labels: vec![],
        };

        assert_eq!(
            to_pull_request(pr, false).unwrap(),
            ListedPullRequest::Unmerged {
                number: 3,
                updated_at: parse_timestamp("2018-10-22T12:00:00Z").unwrap(),
            }
        );
    }

    #[test]
    fn labels_are_only_kept_when_requested() {
        let make = || RestPullRequest {
            number: 4,
            title: "feature".into(),
            html_url: "https://github.com/biz/buz/pull/4".into(),
            merged_at: Some("2018-10-22T10:00:00Z".into()),
            updated_at: "2018-10-22T11:00:00Z".into(),
            user: Some(RestUser {
                login: "octocat".into(),
                html_url: "https://github.com/octocat".into(),
            }),
            labels: vec![RestLabel { name: "fizz".into() }],
        };

        let ListedPullRequest::Merged(with) = to_pull_request(make(), true).unwrap()
        else {
            panic!("expected a merged pull request");
        };
        assert_eq!(with.labels, vec!["fizz".to_string()]);
        assert_eq!(with.author.login, "octocat");

        let ListedPullRequest::Merged(without) =
            to_pull_request(make(), false).unwrap()
        else {
            panic!("expected a merged pull request");
        };
        assert!(without.labels.is_empty());
    }

    #[test]
    fn builds_repository_urls() {
        let rest = GithubRest::new(RemoteConfig::default()).unwrap();
        let repository = RepositoryRef::new("biz", "buz");

        assert_eq!(
            rest.repo_url(&repository, "releases").unwrap().as_str(),
            "https://api.github.com/repos/biz/buz/releases"
        );
        assert_eq!(
            rest.repo_url(&repository, "").unwrap().as_str(),
            "https://api.github.com/repos/biz/buz"
        );
    }
}

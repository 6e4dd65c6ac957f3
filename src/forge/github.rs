//! Implements GithubApi over the GitHub GraphQL API
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use graphql_client::{GraphQLQuery, Response};
use log::*;
use octocrab::Octocrab;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    changelog::types::{Author, PullRequest, Release, ReleaseKind},
    error::{ChangelogError, Result},
    forge::{
        config::RemoteConfig,
        github::graphql::{
            PageInfo, PullRequestFilesQuery, PullRequestFilesQueryVars,
            PullRequestNode, PullRequestsQuery, PullRequestsQueryVars,
            ReleaseNode, ReleasesQuery, ReleasesQueryVars, RepositoryQuery,
            RepositoryQueryVars,
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

pub mod graphql;

/// GitHub client using Octocrab's GraphQL endpoint. Every collection is
/// cursor paginated.
pub struct Github {
    instance: Octocrab,
    page_size: u8,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_base_url())?
            .build()?;

        Ok(Self {
            instance,
            page_size: config.page_size,
        })
    }

    async fn query<Q>(&self, variables: Q::Variables) -> Result<Q::ResponseData>
    where
        Q: GraphQLQuery,
        Q::Variables: Serialize + Send + Sync,
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        debug!("sending graphql query: {}", body.operation_name);

        let response: Response<Q::ResponseData> =
            self.instance.graphql(&body).await?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages = errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<String>>()
                .join("; ");

            return Err(ChangelogError::upstream(format!(
                "{} failed: {messages}",
                body.operation_name
            )));
        }

        response.data.ok_or_else(|| {
            ChangelogError::upstream(format!(
                "{} returned no data",
                body.operation_name
            ))
        })
    }

    /// Files of a pull request past the first page, starting after `cursor`.
    async fn fetch_remaining_files(
        &self,
        repository: &RepositoryRef,
        number: u64,
        cursor: String,
    ) -> Result<Vec<String>> {
        let mut files = vec![];
        let mut cursor = Some(cursor);

        while let Some(after) = cursor {
            debug!("fetching more files of pull request #{number}");

            let vars = PullRequestFilesQueryVars {
                owner: repository.owner.clone(),
                repo: repository.repo.clone(),
                number,
                cursor: Some(after),
            };

            let data = self.query::<PullRequestFilesQuery>(vars).await?;
            let connection = data.repository.pull_request.files;

            files.extend(connection.nodes.into_iter().map(|n| n.path));
            cursor = next_cursor(connection.page_info);
        }

        Ok(files)
    }
}

fn cursor(token: Option<PageToken>) -> Result<Option<String>> {
    match token {
        None => Ok(None),
        Some(PageToken::Cursor(cursor)) => Ok(Some(cursor)),
        Some(PageToken::Number(n)) => Err(ChangelogError::upstream(format!(
            "graphql pagination requires a cursor, got page number {n}"
        ))),
    }
}

fn next_cursor(page_info: PageInfo) -> Option<String> {
    if !page_info.has_next_page {
        return None;
    }

    page_info.end_cursor
}

fn next_token(page_info: PageInfo) -> Option<PageToken> {
    next_cursor(page_info).map(PageToken::Cursor)
}

fn to_release(node: ReleaseNode) -> Result<Release> {
    // the tagged commit date bounds the release, not the publication date
    let created_at = match node.tag_commit {
        Some(commit) => parse_timestamp(&commit.committed_date)?,
        None => parse_timestamp(&node.created_at)?,
    };

    Ok(Release {
        name: node.name,
        tag_name: Some(node.tag_name),
        created_at,
        url: node.url,
        kind: ReleaseKind::Published,
        pull_requests: vec![],
    })
}

fn to_pull_request(node: PullRequestNode) -> Result<ListedPullRequest> {
    let updated_at = parse_timestamp(&node.updated_at)?;

    let Some(merged_at) = node.merged_at else {
        return Ok(ListedPullRequest::Unmerged {
            number: node.number,
            updated_at,
        });
    };

    let author = node
        .author
        .map(|a| Author {
            login: a.login,
            url: a.url,
        })
        .unwrap_or_default();

    Ok(ListedPullRequest::Merged(PullRequest {
        number: node.number,
        title: node.title,
        url: node.url,
        author,
        merged_at: parse_timestamp(&merged_at)?,
        updated_at,
        labels: node
            .labels
            .map(|l| l.nodes.into_iter().map(|n| n.name).collect())
            .unwrap_or_default(),
        files: node
            .files
            .map(|f| f.nodes.into_iter().map(|n| n.path).collect())
            .unwrap_or_default(),
    }))
}

#[async_trait]
impl GithubApi for Github {
    async fn fetch_releases_page(
        &self,
        req: ReleasesPageRequest,
    ) -> Result<Page<Release>> {
        let vars = ReleasesQueryVars {
            owner: req.repository.owner,
            repo: req.repository.repo,
            first: self.page_size,
            cursor: cursor(req.page)?,
        };

        let data = self.query::<ReleasesQuery>(vars).await?;
        let connection = data.repository.releases;

        let items = connection
            .nodes
            .into_iter()
            .map(to_release)
            .collect::<Result<Vec<Release>>>()?;

        Ok(Page {
            items,
            next: next_token(connection.page_info),
            last_page: None,
        })
    }

    async fn fetch_pull_requests_page(
        &self,
        req: PullRequestsPageRequest,
    ) -> Result<Page<ListedPullRequest>> {
        let vars = PullRequestsQueryVars {
            owner: req.repository.owner.clone(),
            repo: req.repository.repo.clone(),
            base: req.base,
            first: self.page_size,
            cursor: cursor(req.page)?,
            with_labels: req.with_labels,
            with_files: req.with_files,
        };

        let data = self.query::<PullRequestsQuery>(vars).await?;
        let connection = data.repository.pull_requests;

        let mut items = vec![];

        for node in connection.nodes {
            let more_files = node
                .files
                .as_ref()
                .and_then(|f| next_cursor(f.page_info.clone()));

            let mut item = to_pull_request(node)?;

            if let (ListedPullRequest::Merged(pr), Some(cursor)) =
                (&mut item, more_files)
            {
                let files = self
                    .fetch_remaining_files(&req.repository, pr.number, cursor)
                    .await?;
                pr.files.extend(files);
            }

            items.push(item);
        }

        Ok(Page {
            items,
            next: next_token(connection.page_info),
            last_page: None,
        })
    }

    async fn fetch_repository_created_at(
        &self,
        repository: RepositoryRef,
    ) -> Result<DateTime<Utc>> {
        let vars = RepositoryQueryVars {
            owner: repository.owner,
            repo: repository.repo,
        };

        let data = self.query::<RepositoryQuery>(vars).await?;

        parse_timestamp(&data.repository.created_at)
    }
}

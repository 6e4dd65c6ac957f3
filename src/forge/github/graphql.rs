use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

// Releases ///////////////////////////////////////////////////////////////////

const RELEASES_QUERY: &str = r#"
query GetReleases($owner: String!, $repo: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    releases(first: $first, after: $cursor, orderBy: { field: CREATED_AT, direction: DESC }) {
      nodes {
        name
        tagName
        url
        createdAt
        tagCommit {
          committedDate
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
pub struct ReleasesQueryVars {
    pub owner: String,
    pub repo: String,
    pub first: u8,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTagCommit {
    pub committed_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNode {
    pub name: Option<String>,
    pub tag_name: String,
    pub url: String,
    pub created_at: String,
    pub tag_commit: Option<ReleaseTagCommit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConnection {
    pub nodes: Vec<ReleaseNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct ReleasesRepository {
    pub releases: ReleaseConnection,
}

#[derive(Debug, Deserialize)]
pub struct ReleasesResponse {
    pub repository: ReleasesRepository,
}

pub struct ReleasesQuery {}

impl GraphQLQuery for ReleasesQuery {
    type ResponseData = ReleasesResponse;
    type Variables = ReleasesQueryVars;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: RELEASES_QUERY,
            operation_name: "GetReleases",
        }
    }
}

// Pull requests //////////////////////////////////////////////////////////////

// labels and files are only selected when the matching flag is set
const PULL_REQUESTS_QUERY: &str = r#"
query GetPullRequests(
  $owner: String!
  $repo: String!
  $base: String!
  $first: Int!
  $cursor: String
  $withLabels: Boolean!
  $withFiles: Boolean!
) {
  repository(owner: $owner, name: $repo) {
    pullRequests(
      first: $first
      after: $cursor
      baseRefName: $base
      states: [MERGED]
      orderBy: { field: UPDATED_AT, direction: DESC }
    ) {
      nodes {
        number
        title
        url
        mergedAt
        updatedAt
        author {
          login
          url
        }
        labels(first: 100) @include(if: $withLabels) {
          nodes {
            name
          }
        }
        files(first: 100) @include(if: $withFiles) {
          nodes {
            path
          }
          pageInfo {
            endCursor
            hasNextPage
          }
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestsQueryVars {
    pub owner: String,
    pub repo: String,
    pub base: String,
    pub first: u8,
    pub cursor: Option<String>,
    pub with_labels: bool,
    pub with_files: bool,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestAuthor {
    pub login: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LabelNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LabelConnection {
    pub nodes: Vec<LabelNode>,
}

#[derive(Debug, Deserialize)]
pub struct FileNode {
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConnection {
    pub nodes: Vec<FileNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub merged_at: Option<String>,
    pub updated_at: String,
    /// `None` for deleted accounts.
    pub author: Option<PullRequestAuthor>,
    pub labels: Option<LabelConnection>,
    pub files: Option<FileConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestConnection {
    pub nodes: Vec<PullRequestNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestsRepository {
    pub pull_requests: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestsResponse {
    pub repository: PullRequestsRepository,
}

pub struct PullRequestsQuery {}

impl GraphQLQuery for PullRequestsQuery {
    type ResponseData = PullRequestsResponse;
    type Variables = PullRequestsQueryVars;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PULL_REQUESTS_QUERY,
            operation_name: "GetPullRequests",
        }
    }
}

// Pull request files /////////////////////////////////////////////////////////

// follow-up pages for pull requests changing more than 100 files
const PULL_REQUEST_FILES_QUERY: &str = r#"
query GetPullRequestFiles($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      files(first: 100, after: $cursor) {
        nodes {
          path
        }
        pageInfo {
          endCursor
          hasNextPage
        }
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
pub struct PullRequestFilesQueryVars {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestFilesNode {
    pub files: FileConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestFilesRepository {
    pub pull_request: PullRequestFilesNode,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestFilesResponse {
    pub repository: PullRequestFilesRepository,
}

pub struct PullRequestFilesQuery {}

impl GraphQLQuery for PullRequestFilesQuery {
    type ResponseData = PullRequestFilesResponse;
    type Variables = PullRequestFilesQueryVars;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PULL_REQUEST_FILES_QUERY,
            operation_name: "GetPullRequestFiles",
        }
    }
}

// Repository /////////////////////////////////////////////////////////////////

const REPOSITORY_QUERY: &str = r#"
query GetRepository($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    createdAt
  }
}"#;

#[derive(Debug, Serialize)]
pub struct RepositoryQueryVars {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryResponse {
    pub repository: RepositoryNode,
}

pub struct RepositoryQuery {}

impl GraphQLQuery for RepositoryQuery {
    type ResponseData = RepositoryResponse;
    type Variables = RepositoryQueryVars;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: REPOSITORY_QUERY,
            operation_name: "GetRepository",
        }
    }
}

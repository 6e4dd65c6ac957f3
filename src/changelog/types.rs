use chrono::{DateTime, Utc};
use serde::Serialize;

/// Author of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Author {
    pub login: String,
    pub url: String,
}

/// A merged pull request as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub author: Author,
    /// Correlation key used to assign the pull request to a release.
    pub merged_at: DateTime<Utc>,
    /// Only used to decide when paging through pull requests can stop.
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
    /// Label names. Only populated when label filtering is requested.
    pub labels: Vec<String>,
    /// Changed file paths. Only populated when path filtering is requested.
    #[serde(skip)]
    pub files: Vec<String>,
}

/// Distinguishes real releases from entries the fetcher synthesizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    /// Published release retrieved from the repository.
    #[default]
    Published,
    /// Placeholder at the repository creation date, used as the correlation
    /// origin when no release exists.
    Origin,
    /// Not-yet-tagged release that absorbs pending pull requests.
    Future,
}

/// A release together with the pull requests merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub name: Option<String>,
    pub tag_name: Option<String>,
    /// Upper bound of the correlation window of this release.
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub kind: ReleaseKind,
    /// Populated by the correlator, newest first.
    pub pull_requests: Vec<PullRequest>,
}

impl Release {
    /// Origin boundary placed at the repository creation date.
    pub fn origin(created_at: DateTime<Utc>, url: impl Into<String>) -> Self {
        Self {
            name: None,
            tag_name: None,
            created_at,
            url: url.into(),
            kind: ReleaseKind::Origin,
            pull_requests: vec![],
        }
    }

    /// Display title: the release name, falling back to the tag name.
    pub fn title(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.tag_name.as_deref())
    }

    pub fn is_origin(&self) -> bool {
        matches!(self.kind, ReleaseKind::Origin)
    }
}

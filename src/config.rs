//! Resolved configuration for a changelog run.
//!
//! [`ChangelogConfigParams`] is the raw input assembled by the CLI (or any
//! other caller). Building it validates the input once and derives every
//! computed value, producing an immutable [`ChangelogConfig`].
use derive_builder::Builder;
use secrecy::SecretString;

use crate::{
    changelog::future_release::FutureRelease,
    error::{ChangelogError, Result},
    forge::{
        config::{
            ApiKind, DEFAULT_HOST, DEFAULT_PAGE_SIZE, DEFAULT_SCHEME,
            RemoteConfig,
        },
        types::RepositoryRef,
    },
    paginator::DEFAULT_CONCURRENCY,
};

/// Default base branch pull requests are merged into.
pub const DEFAULT_BASE_BRANCH: &str = "master";

#[derive(Debug, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct ChangelogConfigParams {
    /// Owner of the repository.
    pub owner: String,
    /// Name of the repository.
    pub repo: String,
    /// Base branch of the repository.
    #[builder(default = "DEFAULT_BASE_BRANCH.to_string()")]
    pub base: String,
    /// Labels to filter pull requests by. Empty keeps every pull request.
    #[builder(default)]
    pub labels: Vec<String>,
    /// Only releases whose tag starts with this prefix are considered.
    #[builder(setter(into, strip_option), default)]
    pub release_tag_prefix: Option<String>,
    /// Only pull requests changing a file under this path are kept.
    #[builder(setter(into, strip_option), default)]
    pub changed_files_prefix: Option<String>,
    /// Name of the next, not yet tagged, release.
    #[builder(setter(into, strip_option), default)]
    pub future_release: Option<String>,
    /// Tag of the next release when it differs from its name.
    #[builder(setter(into, strip_option), default)]
    pub future_release_tag: Option<String>,
    /// Access token for the GitHub API.
    #[builder(default = "SecretString::from(String::new())")]
    pub token: SecretString,
    #[builder(default)]
    pub api: ApiKind,
    #[builder(default = "DEFAULT_HOST.to_string()")]
    pub host: String,
    #[builder(default = "DEFAULT_SCHEME.to_string()")]
    pub scheme: String,
    /// Maximum concurrent page requests for page-number pagination.
    #[builder(default = "DEFAULT_CONCURRENCY")]
    pub concurrency: usize,
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    pub page_size: u8,
}

impl ChangelogConfigParamsBuilder {
    pub fn build(&self) -> Result<ChangelogConfig> {
        let params = self._build().map_err(|e| {
            ChangelogError::invalid_config(format!(
                "Failed to build changelog config: {}",
                e
            ))
        })?;
        ChangelogConfig::new(params)
    }
}

#[derive(Debug, Clone)]
pub struct ChangelogConfig {
    pub repository: RepositoryRef,
    pub base: String,
    /// Trimmed, de-duplicated labels. Empty disables label filtering.
    pub labels: Vec<String>,
    pub release_tag_prefix: Option<String>,
    /// Normalized path prefix. `None` disables path filtering.
    pub changed_files_prefix: Option<String>,
    pub future_release: Option<FutureRelease>,
    pub api: ApiKind,
    pub remote: RemoteConfig,
}

impl ChangelogConfig {
    pub fn builder() -> ChangelogConfigParamsBuilder {
        ChangelogConfigParamsBuilder::default()
    }

    pub fn new(params: ChangelogConfigParams) -> Result<Self> {
        let owner = params.owner.trim().to_string();
        let repo = params.repo.trim().to_string();

        if owner.is_empty() || repo.is_empty() {
            return Err(ChangelogError::invalid_config(
                "repository owner and name are required",
            ));
        }

        if params.base.trim().is_empty() {
            return Err(ChangelogError::invalid_config(
                "base branch must not be empty",
            ));
        }

        if params.page_size == 0 || params.page_size > DEFAULT_PAGE_SIZE {
            return Err(ChangelogError::invalid_config(format!(
                "page size must be between 1 and {DEFAULT_PAGE_SIZE}"
            )));
        }

        if params.concurrency == 0 {
            return Err(ChangelogError::invalid_config(
                "concurrency must be at least 1",
            ));
        }

        let remote = RemoteConfig {
            host: params.host,
            scheme: params.scheme,
            token: params.token,
            page_size: params.page_size,
            concurrency: params.concurrency,
        };

        let future_release = params.future_release.as_deref().map(|name| {
            let tag = resolve_future_release_tag(
                name,
                params.future_release_tag.as_deref(),
            );

            FutureRelease {
                name: name.to_string(),
                url: format!(
                    "{}/{owner}/{repo}/releases/tag/{tag}",
                    remote.web_base_url()
                ),
                tag,
            }
        });

        Ok(Self {
            repository: RepositoryRef::new(owner, repo),
            base: params.base.trim().to_string(),
            labels: resolve_effective_labels(&params.labels),
            release_tag_prefix: params
                .release_tag_prefix
                .filter(|p| !p.is_empty()),
            changed_files_prefix: params
                .changed_files_prefix
                .as_deref()
                .and_then(normalize_path_prefix),
            future_release,
            api: params.api,
            remote,
        })
    }

    /// Web URL of the repository.
    pub fn repository_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.remote.web_base_url(),
            self.repository.owner,
            self.repository.repo
        )
    }
}

/// Tag of the future release: the explicit tag, or the release name.
pub fn resolve_future_release_tag(
    future_release: &str,
    future_release_tag: Option<&str>,
) -> String {
    future_release_tag
        .filter(|t| !t.is_empty())
        .unwrap_or(future_release)
        .to_string()
}

/// Labels actually used for filtering, in first-seen order.
pub fn resolve_effective_labels(labels: &[String]) -> Vec<String> {
    let mut effective: Vec<String> = vec![];

    for label in labels.iter().map(|l| l.trim()) {
        if !label.is_empty() && !effective.iter().any(|l| l == label) {
            effective.push(label.to_string());
        }
    }

    effective
}

/// Strip leading `./` and `/` from a path prefix. An empty or root prefix
/// matches everything and therefore disables filtering.
pub fn normalize_path_prefix(prefix: &str) -> Option<String> {
    let mut prefix = prefix.trim();

    while let Some(stripped) = prefix.strip_prefix("./") {
        prefix = stripped;
    }

    let prefix = prefix.trim_start_matches('/');

    if prefix.is_empty() || prefix == "." {
        return None;
    }

    Some(prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let config = ChangelogConfig::builder()
            .owner("biz")
            .repo("buz")
            .build()
            .unwrap();

        assert_eq!(config.repository, RepositoryRef::new("biz", "buz"));
        assert_eq!(config.base, "master");
        assert!(config.labels.is_empty());
        assert!(config.release_tag_prefix.is_none());
        assert!(config.changed_files_prefix.is_none());
        assert!(config.future_release.is_none());
        assert_eq!(config.api, ApiKind::Graphql);
        assert_eq!(config.remote.concurrency, 20);
        assert_eq!(config.remote.page_size, 100);
        assert_eq!(config.repository_url(), "https://github.com/biz/buz");
    }

    #[test]
    fn sets_all_defined_fields() {
        let config = ChangelogConfig::builder()
            .owner("biz")
            .repo("buz")
            .base("foo")
            .future_release("bar")
            .future_release_tag("baz")
            .release_tag_prefix("v")
            .changed_files_prefix("./packages/foobar/")
            .labels(vec!["fizz".to_string()])
            .api(ApiKind::Rest)
            .build()
            .unwrap();

        let future = config.future_release.unwrap();
        assert_eq!(config.base, "foo");
        assert_eq!(future.name, "bar");
        assert_eq!(future.tag, "baz");
        assert_eq!(future.url, "https://github.com/biz/buz/releases/tag/baz");
        assert_eq!(config.release_tag_prefix.as_deref(), Some("v"));
        assert_eq!(
            config.changed_files_prefix.as_deref(),
            Some("packages/foobar/")
        );
        assert_eq!(config.labels, vec!["fizz".to_string()]);
        assert_eq!(config.api, ApiKind::Rest);
    }

    #[test]
    fn future_release_tag_defaults_to_release_name() {
        let config = ChangelogConfig::builder()
            .owner("biz")
            .repo("buz")
            .future_release("foo")
            .build()
            .unwrap();

        assert_eq!(config.future_release.unwrap().tag, "foo");
        assert_eq!(resolve_future_release_tag("v2", Some("")), "v2");
    }

    #[test]
    fn rejects_missing_repository() {
        let result = ChangelogConfig::builder().owner("biz").repo(" ").build();
        assert!(matches!(result, Err(ChangelogError::InvalidConfig(_))));

        let result = ChangelogConfig::builder().repo("buz").build();
        assert!(matches!(result, Err(ChangelogError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_out_of_range_paging() {
        let result = ChangelogConfig::builder()
            .owner("biz")
            .repo("buz")
            .page_size(0u8)
            .build();
        assert!(matches!(result, Err(ChangelogError::InvalidConfig(_))));

        let result = ChangelogConfig::builder()
            .owner("biz")
            .repo("buz")
            .concurrency(0usize)
            .build();
        assert!(matches!(result, Err(ChangelogError::InvalidConfig(_))));
    }

    #[test]
    fn effective_labels_are_trimmed_and_unique() {
        let labels = vec![
            " fizz".to_string(),
            "fuzz".to_string(),
            "fizz".to_string(),
            "".to_string(),
        ];

        assert_eq!(
            resolve_effective_labels(&labels),
            vec!["fizz".to_string(), "fuzz".to_string()]
        );
    }

    #[test]
    fn normalizes_path_prefixes() {
        assert_eq!(
            normalize_path_prefix("./packages/foobar/").as_deref(),
            Some("packages/foobar/")
        );
        assert_eq!(
            normalize_path_prefix("/packages").as_deref(),
            Some("packages")
        );
        assert_eq!(normalize_path_prefix("./"), None);
        assert_eq!(normalize_path_prefix("."), None);
        assert_eq!(normalize_path_prefix(""), None);
    }
}

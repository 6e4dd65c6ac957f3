//! Configuration for GitHub API connections.
use secrecy::SecretString;

/// Default GitHub host.
pub const DEFAULT_HOST: &str = "github.com";
/// Default URL scheme.
pub const DEFAULT_SCHEME: &str = "https";
/// Default (and maximum) page size accepted by the GitHub API.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// User agent sent with every REST request.
pub const USER_AGENT: &str = "github-changelog";

/// Transport used to talk to GitHub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiKind {
    /// GraphQL API, cursor paginated.
    #[default]
    Graphql,
    /// REST API, page-number paginated.
    Rest,
}

/// Remote API connection configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Items requested per page.
    pub page_size: u8,
    /// Maximum number of concurrent requests for numbered pages.
    pub concurrency: usize,
}

impl RemoteConfig {
    /// Base URL of the API, e.g. `https://api.github.com`.
    pub fn api_base_url(&self) -> String {
        format!("{}://api.{}", self.scheme, self.host)
    }

    /// Base URL of the web interface, e.g. `https://github.com`.
    pub fn web_base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            token: SecretString::from("".to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: crate::paginator::DEFAULT_CONCURRENCY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remote_config_urls() {
        let remote = RemoteConfig::default();
        assert_eq!(remote.api_base_url(), "https://api.github.com");
        assert_eq!(remote.web_base_url(), "https://github.com");
        assert_eq!(remote.page_size, 100);
    }
}

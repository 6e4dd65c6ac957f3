//! Error types for changelog generation.

use thiserror::Error;

/// Main error type for changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Upstream API errors
    #[error("Upstream request failed: {0}")]
    UpstreamRequest(String),

    #[error("API authentication failed: {0}")]
    Authentication(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error(
        "Release {tag} already exists: there is nothing new to generate a changelog for"
    )]
    DuplicateRelease { tag: String },

    // Git errors
    #[error("Invalid git remote URL: {0}")]
    InvalidRemoteUrl(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Parsing errors
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Datetime parse error: {0}")]
    ChronoParseError(#[from] chrono::ParseError),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ChangelogError
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create an upstream request error with context
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamRequest(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a duplicate release error
    pub fn duplicate_release(tag: impl Into<String>) -> Self {
        Self::DuplicateRelease { tag: tag.into() }
    }

    /// Whether this error only signals that there is nothing new to release.
    pub fn is_duplicate_release(&self) -> bool {
        matches!(self, Self::DuplicateRelease { .. })
    }
}

impl From<std::io::Error> for ChangelogError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<reqwest::Error> for ChangelogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(401) | Some(403) => Self::Authentication(err.to_string()),
            Some(429) => Self::RateLimitExceeded,
            _ => Self::UpstreamRequest(err.to_string()),
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for ChangelogError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Authentication(format!("Invalid header value: {}", err))
    }
}

impl From<octocrab::Error> for ChangelogError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            octocrab::Error::GitHub { source, .. }
                if source.status_code.as_u16() == 401 =>
            {
                Self::Authentication(source.message.clone())
            }
            _ => Self::UpstreamRequest(format!("GitHub API error: {}", err)),
        }
    }
}

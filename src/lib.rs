pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod forge;
pub mod formatter;
pub mod paginator;

pub use changelog::{
    ChangelogFetcher,
    types::{Author, PullRequest, Release, ReleaseKind},
};
pub use config::ChangelogConfig;
pub use error::{ChangelogError, Result};

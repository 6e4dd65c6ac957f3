//! Factory for creating GithubApi implementations based on configuration.

use log::*;

use crate::{
    error::Result,
    forge::{
        config::{ApiKind, RemoteConfig},
        github::Github,
        rest::GithubRest,
        traits::GithubApi,
    },
};

/// Factory for creating GithubApi implementations.
pub struct ForgeFactory;

impl ForgeFactory {
    /// Create the client for the requested transport.
    pub fn create(
        kind: ApiKind,
        config: RemoteConfig,
    ) -> Result<Box<dyn GithubApi>> {
        debug!("creating {:?} client for {}", kind, config.host);

        match kind {
            ApiKind::Graphql => Self::create_graphql(config),
            ApiKind::Rest => Self::create_rest(config),
        }
    }

    fn create_graphql(config: RemoteConfig) -> Result<Box<dyn GithubApi>> {
        Ok(Box::new(Github::new(config)?))
    }

    fn create_rest(config: RemoteConfig) -> Result<Box<dyn GithubApi>> {
        Ok(Box::new(GithubRest::new(config)?))
    }
}

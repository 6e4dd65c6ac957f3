//! GitHub API access behind the [`traits::GithubApi`] capability trait.
//!
//! Two transports implement it: GraphQL with cursor pagination (default) and
//! REST with page-number pagination.

/// Connection settings for the GitHub API.
pub mod config;

/// Builds the configured [`traits::GithubApi`] implementation.
pub mod factory;

/// GraphQL client implementation.
pub mod github;

/// REST client implementation.
pub mod rest;

/// Capability trait consumed by the changelog collectors.
pub mod traits;

/// Request types shared by every implementation.
pub mod types;

/// Small helpers shared by the implementations.
pub mod util;

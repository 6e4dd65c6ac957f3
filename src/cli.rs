//! CLI argument parsing and repository discovery.
use clap::Parser;
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::{
    env,
    path::{Component, Path},
};

use crate::{
    config::{ChangelogConfig, ChangelogConfigParamsBuilder, DEFAULT_BASE_BRANCH},
    error::{ChangelogError, Result},
    forge::{config::ApiKind, types::RepositoryRef},
};

/// Generate a markdown changelog from GitHub releases and merged pull
/// requests.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(short, long)]
    /// Owner of the repository. Inferred from the origin remote when omitted.
    pub owner: Option<String>,

    #[arg(short, long)]
    /// Name of the repository. Inferred from the origin remote when omitted.
    pub repo: Option<String>,

    #[arg(short, long, default_value = DEFAULT_BASE_BRANCH)]
    /// Base branch pull requests are merged into.
    pub base_branch: String,

    #[arg(short, long)]
    /// Name of the upcoming release.
    pub future_release: Option<String>,

    #[arg(short = 't', long)]
    /// Tag of the upcoming release. Defaults to the future release name.
    pub future_release_tag: Option<String>,

    #[arg(short, long, value_delimiter = ',')]
    /// Comma separated labels. Only pull requests with one of them are kept.
    pub labels: Vec<String>,

    #[arg(long)]
    /// Only consider releases whose tag starts with this prefix.
    pub release_tag_prefix: Option<String>,

    #[arg(long, conflicts_with = "changed_files_from_cwd")]
    /// Only keep pull requests changing files under this path.
    pub changed_files_prefix: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Use the current directory, relative to the repository root, as the
    /// changed files prefix.
    pub changed_files_from_cwd: bool,

    #[arg(long, default_value_t = false, requires = "future_release")]
    /// Only generate the changelog of the future release.
    pub latest: bool,

    #[arg(long, default_value_t = false)]
    /// Use the REST API instead of GraphQL.
    pub rest: bool,

    #[arg(long, default_value = "")]
    /// GitHub access token. Falls back to GITHUB_TOKEN env var.
    pub token: String,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Resolve the changelog configuration. `cwd` is used to discover the git
    /// repository when owner, repo or the changed files prefix must be
    /// inferred.
    pub fn config(&self, cwd: &Path) -> Result<ChangelogConfig> {
        let (owner, repo) = match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => (owner.clone(), repo.clone()),
            (owner, repo) => {
                let inferred = infer_repository(cwd)?;
                (
                    owner.clone().unwrap_or(inferred.owner),
                    repo.clone().unwrap_or(inferred.repo),
                )
            }
        };

        let mut builder = ChangelogConfigParamsBuilder::default();

        builder
            .owner(owner)
            .repo(repo)
            .base(self.base_branch.clone())
            .labels(self.labels.clone())
            .token(resolve_token(&self.token, env::var("GITHUB_TOKEN").ok())?)
            .api(if self.rest {
                ApiKind::Rest
            } else {
                ApiKind::Graphql
            });

        if let Some(prefix) = &self.release_tag_prefix {
            builder.release_tag_prefix(prefix.clone());
        }

        if let Some(prefix) = &self.changed_files_prefix {
            builder.changed_files_prefix(prefix.clone());
        }

        if self.changed_files_from_cwd
            && let Some(prefix) = changed_files_prefix_from(cwd)?
        {
            builder.changed_files_prefix(prefix);
        }

        if let Some(name) = &self.future_release {
            builder.future_release(name.clone());
        }

        if let Some(tag) = &self.future_release_tag {
            builder.future_release_tag(tag.clone());
        }

        builder.build()
    }
}

/// Token from the flag, falling back to the environment.
fn resolve_token(flag: &str, env_token: Option<String>) -> Result<SecretString> {
    let mut token = flag.to_string();

    if token.is_empty()
        && let Some(env_var_token) = env_token
    {
        token = env_var_token;
    }

    if token.is_empty() {
        return Err(ChangelogError::InvalidArgs(
            "must set github token".to_string(),
        ));
    }

    Ok(SecretString::from(token))
}

/// Owner and name of the repository the `origin` remote of the git
/// repository containing `path` points to.
pub fn infer_repository(path: &Path) -> Result<RepositoryRef> {
    let repository = git2::Repository::discover(path)?;
    let remote = repository.find_remote("origin")?;

    let url = remote.url().ok_or_else(|| {
        ChangelogError::InvalidRemoteUrl("origin url is not valid utf-8".into())
    })?;

    let parsed = GitUrl::parse(url)?;

    let owner = parsed.owner.ok_or_else(|| {
        ChangelogError::InvalidRemoteUrl(format!(
            "unable to parse owner from {url}"
        ))
    })?;

    Ok(RepositoryRef::new(owner, parsed.name))
}

fn changed_files_prefix_from(cwd: &Path) -> Result<Option<String>> {
    let repository = git2::Repository::discover(cwd)?;

    let workdir = repository.workdir().ok_or_else(|| {
        ChangelogError::InvalidArgs(
            "changed files from cwd requires a non-bare repository".into(),
        )
    })?;

    resolve_changed_files_prefix(workdir, cwd)
}

/// `cwd` relative to `repo_root`, with forward slashes and a trailing
/// slash. `None` at the repository root.
pub fn resolve_changed_files_prefix(
    repo_root: &Path,
    cwd: &Path,
) -> Result<Option<String>> {
    let repo_root = repo_root.canonicalize()?;
    let cwd = cwd.canonicalize()?;

    let relative = cwd.strip_prefix(&repo_root).map_err(|_| {
        ChangelogError::InvalidArgs(format!(
            "{} is not inside {}",
            cwd.display(),
            repo_root.display()
        ))
    })?;

    let parts = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<String>>();

    if parts.is_empty() {
        return Ok(None);
    }

    Ok(Some(format!("{}/", parts.join("/"))))
}

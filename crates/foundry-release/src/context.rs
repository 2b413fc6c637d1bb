//! Building a [`RunConfig`] from flags, action inputs, the config file, the
//! event payload and defaults.
//!
//! Precedence, highest first:
//!
//! - manifest and commit log: flag, action input, config file, default
//! - version file: flag, config file, `version.txt`
//! - token: see [`crate::auth::resolve_token`]
//! - owner and repo: flag, event payload, `GITHUB_REPOSITORY`
//! - committer: flag, config file, event payload
//! - API and server URLs: flag, config file, `GITHUB_API_URL` /
//!   `GITHUB_SERVER_URL`, default
//! - timeouts: flag, config file, default (30s for HTTP, none for git)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use foundry_release_config::Config;
use foundry_release_environment::{
    EventPayload, action_input, action_input_bool, github_api_url, github_repository,
    github_server_url, load_event_payload_from_env,
};
use foundry_release_git::GitIdentity;
use foundry_release_github::{DEFAULT_TIMEOUT_SECS, GITHUB_API, GITHUB_SERVER, Repository};

use crate::auth::resolve_token;
use crate::error::ReleaseError;
use crate::types::RunConfig;

pub const DEFAULT_MANIFEST: &str = "system.json";
pub const DEFAULT_VERSION_FILE: &str = "version.txt";

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub manifest: Option<String>,
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub committer_email: Option<String>,
    pub committer_name: Option<String>,
    pub version_file: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub commit_log: Option<bool>,
    pub api_base: Option<String>,
    pub server_url: Option<String>,
    pub http_timeout: Option<Duration>,
    pub git_timeout: Option<Duration>,
}

/// Resolve the run configuration against the current process environment
pub fn resolve_run_config(overrides: &RunOverrides, config: &Config) -> Result<RunConfig> {
    let payload = load_event_payload_from_env()?.unwrap_or_default();

    let workdir = match &overrides.workdir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to determine current directory")?,
    };

    let repository = resolve_repository(overrides, &payload)?;

    let manifest = overrides
        .manifest
        .clone()
        .or_else(|| action_input("manifestFileName"))
        .or_else(|| config.manifest().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

    let version_file = overrides
        .version_file
        .clone()
        .or_else(|| config.version_file().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_VERSION_FILE));

    let commit_log = match overrides.commit_log {
        Some(on) => on,
        None => action_input_bool("includeCommitLog")?
            .or(config.commit_log())
            .unwrap_or(false),
    };

    let api_base = overrides
        .api_base
        .clone()
        .or_else(|| config.api_base().map(str::to_string))
        .or_else(github_api_url)
        .unwrap_or_else(|| GITHUB_API.to_string());

    let server_url = overrides
        .server_url
        .clone()
        .or_else(|| config.server_url().map(str::to_string))
        .or_else(github_server_url)
        .unwrap_or_else(|| GITHUB_SERVER.to_string());

    Ok(RunConfig {
        repository,
        manifest,
        version_file,
        workdir,
        token: resolve_token(overrides.token.as_deref()).map(|(token, _)| token),
        committer: resolve_committer(overrides, config, &payload),
        commit_log,
        api_base,
        server_url,
        http_timeout: overrides
            .http_timeout
            .or(config.http_timeout())
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        git_timeout: overrides.git_timeout.or(config.git_timeout()),
    })
}

/// Owner and repo from flags, the event payload or `GITHUB_REPOSITORY`.
///
/// Each half falls back independently, so `--repo` alone can rename the
/// repository inside the payload's owner.
pub fn resolve_repository(overrides: &RunOverrides, payload: &EventPayload) -> Result<Repository> {
    let ambient = payload
        .repository()
        .map(|(owner, name)| Repository::new(owner, name))
        .or_else(|| github_repository().as_deref().and_then(Repository::parse));

    let owner = overrides
        .owner
        .clone()
        .or_else(|| ambient.as_ref().map(|r| r.owner.clone()));
    let name = overrides
        .repo
        .clone()
        .or_else(|| ambient.as_ref().map(|r| r.name.clone()));

    match (owner, name) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            Ok(Repository::new(owner, name))
        }
        _ => Err(ReleaseError::MissingRepository.into()),
    }
}

fn resolve_committer(
    overrides: &RunOverrides,
    config: &Config,
    payload: &EventPayload,
) -> Option<GitIdentity> {
    let from_payload = payload.committer();
    let email = overrides
        .committer_email
        .clone()
        .or_else(|| config.committer_email().map(str::to_string))
        .or_else(|| from_payload.map(|(email, _)| email.to_string()))?;
    let name = overrides
        .committer_name
        .clone()
        .or_else(|| config.committer_name().map(str::to_string))
        .or_else(|| from_payload.map(|(_, name)| name.to_string()))?;
    Some(GitIdentity::new(email, name))
}

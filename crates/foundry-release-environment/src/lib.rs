//! CI environment detection and GitHub Actions context for foundry-release.
//!
//! Reads what a GitHub Actions runner hands to a step: the event payload
//! (`GITHUB_EVENT_PATH`), action inputs (`INPUT_*`), repository and server
//! variables, and the step output file (`GITHUB_OUTPUT`). It also renders
//! workflow commands such as `::error::` so failures show up as annotations.
//!
//! # Example
//!
//! ```
//! use foundry_release_environment::{CiEnvironment, detect_environment, error_command};
//!
//! if detect_environment() == CiEnvironment::GitHubActions {
//!     println!("{}", error_command("release failed"));
//! }
//! ```

use std::env;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const GITHUB_EVENT_PATH_ENV: &str = "GITHUB_EVENT_PATH";
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";
pub const GITHUB_SERVER_URL_ENV: &str = "GITHUB_SERVER_URL";
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Heredoc delimiter for multi-line step outputs
const OUTPUT_DELIMITER: &str = "FOUNDRY_RELEASE_EOF";

/// Detected CI environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CiEnvironment {
    /// GitHub Actions
    GitHubActions,
    /// GitLab CI
    GitLabCI,
    /// Some other system that sets `CI`
    Generic,
    /// No CI detected (local)
    #[default]
    Local,
}

impl fmt::Display for CiEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CiEnvironment::GitHubActions => write!(f, "GitHub Actions"),
            CiEnvironment::GitLabCI => write!(f, "GitLab CI"),
            CiEnvironment::Generic => write!(f, "CI"),
            CiEnvironment::Local => write!(f, "Local"),
        }
    }
}

/// Detect the current CI environment
pub fn detect_environment() -> CiEnvironment {
    if env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
        return CiEnvironment::GitHubActions;
    }

    if env::var("GITLAB_CI").is_ok() {
        return CiEnvironment::GitLabCI;
    }

    if env::var("CI").is_ok_and(|v| !v.is_empty() && v != "false") {
        return CiEnvironment::Generic;
    }

    CiEnvironment::Local
}

/// Subset of a webhook event payload the release run reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub repository: Option<PayloadRepository>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadRepository {
    pub name: String,
    pub owner: PayloadOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadCommit {
    pub committer: Committer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Committer {
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

impl EventPayload {
    /// `(owner, repo)` from `repository`
    pub fn repository(&self) -> Option<(&str, &str)> {
        self.repository
            .as_ref()
            .map(|r| (r.owner.login.as_str(), r.name.as_str()))
    }

    /// `(email, username)` of the head commit's committer; `username`
    /// falls back to the display name when the account is not linked
    pub fn committer(&self) -> Option<(&str, &str)> {
        let committer = &self.head_commit.as_ref()?.committer;
        let email = committer.email.as_deref()?;
        let name = committer
            .username
            .as_deref()
            .or(committer.name.as_deref())?;
        Some((email, name))
    }
}

/// Parse an event payload file
pub fn load_event_payload(path: &Path) -> Result<EventPayload> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse event payload: {}", path.display()))
}

/// Load the payload named by `GITHUB_EVENT_PATH`, if the variable is set
pub fn load_event_payload_from_env() -> Result<Option<EventPayload>> {
    match non_empty_var(GITHUB_EVENT_PATH_ENV) {
        Some(path) => load_event_payload(&PathBuf::from(path)).map(Some),
        None => Ok(None),
    }
}

/// Value of action input `name` (`INPUT_<NAME>`), trimmed; `None` when unset
/// or blank
pub fn action_input(name: &str) -> Option<String> {
    non_empty_var(&input_env_name(name))
}

/// Boolean action input; accepts the YAML 1.2 core schema spellings
pub fn action_input_bool(name: &str) -> Result<Option<bool>> {
    let Some(raw) = action_input(name) else {
        return Ok(None);
    };
    match raw.as_str() {
        "true" | "True" | "TRUE" => Ok(Some(true)),
        "false" | "False" | "FALSE" => Ok(Some(false)),
        _ => bail!("input `{name}` must be a boolean (true or false), got `{raw}`"),
    }
}

fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// `GITHUB_REPOSITORY` (`owner/repo`)
pub fn github_repository() -> Option<String> {
    non_empty_var(GITHUB_REPOSITORY_ENV)
}

/// `GITHUB_SERVER_URL`
pub fn github_server_url() -> Option<String> {
    non_empty_var(GITHUB_SERVER_URL_ENV)
}

/// `GITHUB_API_URL`
pub fn github_api_url() -> Option<String> {
    non_empty_var(GITHUB_API_URL_ENV)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Escape a workflow command message
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `::error::<message>`
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// `::warning::<message>`
pub fn warning_command(message: &str) -> String {
    format!("::warning::{}", escape_data(message))
}

/// Append a step output to the file named by `GITHUB_OUTPUT`.
///
/// Returns `false` without writing when the variable is not set.
pub fn set_output(name: &str, value: &str) -> Result<bool> {
    let Some(path) = non_empty_var(GITHUB_OUTPUT_ENV) else {
        return Ok(false);
    };
    append_output(Path::new(&path), name, value)?;
    Ok(true)
}

/// Append `name=value` (or a heredoc block for multi-line values) to `path`
pub fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let entry = if value.contains('\n') || value.contains('\r') {
        if value.contains(OUTPUT_DELIMITER) {
            bail!("output `{name}` contains the reserved delimiter {OUTPUT_DELIMITER}");
        }
        format!("{name}<<{OUTPUT_DELIMITER}\n{value}\n{OUTPUT_DELIMITER}\n")
    } else {
        format!("{name}={value}\n")
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open step output file: {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("failed to write step output: {}", path.display()))?;
    Ok(())
}

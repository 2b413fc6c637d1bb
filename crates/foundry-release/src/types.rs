use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use foundry_release_git::GitIdentity;
use foundry_release_github::Repository;
use serde::{Deserialize, Serialize};

use crate::error::ReleaseError;

/// The two manifest names Foundry VTT recognizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManifestFileName {
    #[default]
    #[serde(rename = "system.json")]
    System,
    #[serde(rename = "module.json")]
    Module,
}

impl ManifestFileName {
    pub fn parse(name: &str) -> Result<Self, ReleaseError> {
        match name {
            "system.json" => Ok(Self::System),
            "module.json" => Ok(Self::Module),
            other => Err(ReleaseError::InvalidManifestName(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system.json",
            Self::Module => "module.json",
        }
    }
}

impl FromStr for ManifestFileName {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ManifestFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A release version without the leading `v`.
///
/// Built from the raw contents of the version file: surrounding whitespace
/// and one leading `v` are stripped; what remains must be non-empty and
/// contain no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    pub fn parse(raw: &str) -> Result<Self, ReleaseError> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if bare.is_empty() {
            return Err(ReleaseError::EmptyVersion);
        }
        if bare.contains(char::is_whitespace) {
            return Err(ReleaseError::InvalidVersion(bare.to_string()));
        }
        Ok(Self(bare.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Git tag and release name: `v<version>`
    pub fn tag(&self) -> String {
        format!("v{}", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Version {
    type Error = ReleaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.0
    }
}

/// Stages of a release run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Template,
    Release,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Template => "template",
            Stage::Release => "release",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Everything a run needs, resolved once at startup.
///
/// `manifest` is kept as given so the validate stage can reject it; `token`
/// and `committer` are optional because `plan` and `template` run without
/// them.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repository: Repository,
    pub manifest: String,
    pub version_file: PathBuf,
    pub workdir: PathBuf,
    pub token: Option<String>,
    pub committer: Option<GitIdentity>,
    pub commit_log: bool,
    pub api_base: String,
    pub server_url: String,
    pub http_timeout: Duration,
    pub git_timeout: Option<Duration>,
}

impl RunConfig {
    /// Manifest path inside the working directory
    pub fn manifest_path(&self) -> PathBuf {
        self.workdir.join(&self.manifest)
    }

    /// Version file path; relative paths are taken from the working directory
    pub fn version_path(&self) -> PathBuf {
        resolve_in(&self.workdir, &self.version_file)
    }

    /// `<repo>.zip`
    pub fn zip_name(&self) -> String {
        format!("{}.zip", self.repository.name)
    }
}

fn resolve_in(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

/// Download locations embedded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseUrls {
    pub download_url: String,
    pub manifest_url: String,
}

/// What a run would do, computed without touching anything
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePlan {
    pub repository: String,
    pub manifest: ManifestFileName,
    pub version: Version,
    pub tag: String,
    pub zip_name: String,
    #[serde(flatten)]
    pub urls: ReleaseUrls,
}

/// Outcome of the template stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateReport {
    #[serde(flatten)]
    pub plan: ReleasePlan,
    pub manifest_path: PathBuf,
    /// False when the manifest held no placeholders
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub url: String,
}

/// Summary of a finished release run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseReceipt {
    pub repository: String,
    pub version: Version,
    pub tag: String,
    pub release_id: u64,
    pub release_url: String,
    #[serde(flatten)]
    pub urls: ReleaseUrls,
    /// Commits embedded in the release body; absent when the log was off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_count: Option<usize>,
    /// The API linked a further page of commits that the log leaves out
    #[serde(default)]
    pub commit_log_truncated: bool,
    /// False when the templated manifest matched `HEAD` already
    pub committed: bool,
    pub assets: Vec<UploadedAsset>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

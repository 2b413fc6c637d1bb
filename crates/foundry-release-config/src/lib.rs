//! Configuration file handling for foundry-release.
//!
//! Settings live in a `.foundry-release.toml` file at the repository root
//! (or any parent of the working directory). A file passed explicitly is
//! layered over it. Every key is optional; unset keys fall through to
//! action inputs and built-in defaults in the caller.
//!
//! # Example
//!
//! ```
//! use foundry_release_config::resolve_config;
//! use std::path::Path;
//!
//! let (config, _source) = resolve_config(Path::new("."), None).expect("load config");
//! if let Some(manifest) = config.manifest() {
//!     println!("Manifest: {manifest}");
//! }
//! ```
//!
//! ```toml
//! [release]
//! manifest = "module.json"
//! version_file = "version.txt"
//! commit_log = true
//!
//! [github]
//! api_base = "https://api.github.com"
//! server_url = "https://github.com"
//! timeout = "30s"
//!
//! [git]
//! timeout = "2m"
//! committer_email = "release-bot@example.com"
//! committer_name = "release-bot"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const CONFIG_FILE: &str = ".foundry-release.toml";

/// Get the config file path for a directory
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Complete foundry-release configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    release: ReleaseSection,
    #[serde(default)]
    github: GitHubSection,
    #[serde(default)]
    git: GitSection,
}

impl Config {
    /// Manifest file name
    pub fn manifest(&self) -> Option<&str> {
        self.release.manifest.as_deref()
    }

    /// Version file, relative to the working directory
    pub fn version_file(&self) -> Option<&Path> {
        self.release.version_file.as_deref()
    }

    /// Whether to embed the commit log in the release body
    pub fn commit_log(&self) -> Option<bool> {
        self.release.commit_log
    }

    /// REST API base URL
    pub fn api_base(&self) -> Option<&str> {
        self.github.api_base.as_deref()
    }

    /// Web server URL used for download links
    pub fn server_url(&self) -> Option<&str> {
        self.github.server_url.as_deref()
    }

    /// HTTP request timeout
    pub fn http_timeout(&self) -> Option<Duration> {
        self.github.timeout
    }

    /// Per-invocation timeout for git subprocesses
    pub fn git_timeout(&self) -> Option<Duration> {
        self.git.timeout
    }

    /// Committer email override
    pub fn committer_email(&self) -> Option<&str> {
        self.git.committer_email.as_deref()
    }

    /// Committer name override
    pub fn committer_name(&self) -> Option<&str> {
        self.git.committer_name.as_deref()
    }

    /// Merge this config with another (other takes precedence)
    pub fn merge(&self, other: &Config) -> Config {
        Config {
            release: ReleaseSection {
                manifest: pick(&other.release.manifest, &self.release.manifest),
                version_file: pick(&other.release.version_file, &self.release.version_file),
                commit_log: other.release.commit_log.or(self.release.commit_log),
            },
            github: GitHubSection {
                api_base: pick(&other.github.api_base, &self.github.api_base),
                server_url: pick(&other.github.server_url, &self.github.server_url),
                timeout: other.github.timeout.or(self.github.timeout),
            },
            git: GitSection {
                timeout: other.git.timeout.or(self.git.timeout),
                committer_email: pick(&other.git.committer_email, &self.git.committer_email),
                committer_name: pick(&other.git.committer_name, &self.git.committer_name),
            },
        }
    }
}

fn pick<T: Clone>(preferred: &Option<T>, fallback: &Option<T>) -> Option<T> {
    preferred.as_ref().or(fallback.as_ref()).cloned()
}

/// `[release]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ReleaseSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manifest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commit_log: Option<bool>,
}

/// `[github]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct GitHubSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server_url: Option<String>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    timeout: Option<Duration>,
}

/// `[git]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct GitSection {
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    committer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    committer_name: Option<String>,
}

/// Load configuration from a specific file path
pub fn load_config_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Find configuration file by walking up the directory tree
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let config_file = current.join(CONFIG_FILE);
        if config_file.is_file() {
            return Some(config_file);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolve the config in effect for `workdir`.
///
/// The nearest `.foundry-release.toml` above `workdir` is the base. An
/// explicit path must exist and its keys win over the base. Returns the
/// config together with the most specific file it came from.
pub fn resolve_config(
    workdir: &Path,
    explicit: Option<&Path>,
) -> Result<(Config, Option<PathBuf>)> {
    let discovered = match find_config(workdir) {
        Some(path) => Some((load_config_from_file(&path)?, path)),
        None => None,
    };

    let Some(path) = explicit else {
        return Ok(match discovered {
            Some((config, path)) => (config, Some(path)),
            None => (Config::default(), None),
        });
    };

    if !path.is_file() {
        anyhow::bail!("config file not found: {}", path.display());
    }
    let overlay = load_config_from_file(path)?;
    let base = discovered.map(|(config, _)| config).unwrap_or_default();
    Ok((base.merge(&overlay), Some(path.to_path_buf())))
}

//! # foundry-release
//!
//! Release automation for Foundry VTT systems and modules on GitHub.
//!
//! One run takes a repository whose manifest (`system.json` or
//! `module.json`) carries `{{VERSION}}`, `{{DOWNLOAD_URL}}` and
//! `{{MANIFEST_URL}}` placeholders, fills them in from `version.txt`,
//! creates a draft release tagged `v<version>`, commits the result,
//! archives `HEAD` into `<repo>.zip` and uploads the archive and the
//! manifest as release assets.
//!
//! ## Pipeline
//!
//! The stages are **validate → template → release → publish**, forward only:
//!
//! 1. [`engine::plan`] validates the manifest name and reads the version;
//!    nothing is written.
//! 2. [`engine::run_template`] additionally templates the manifest in place.
//! 3. [`engine::run_release`] runs every stage and returns a
//!    [`types::ReleaseReceipt`].
//!
//! Failures carry an [`error::StageFailed`] context naming the stage, and
//! classified causes are [`error::ReleaseError`] values.
//!
//! ## Example
//!
//! ```ignore
//! use foundry_release::context::{RunOverrides, resolve_run_config};
//! use foundry_release::engine;
//! use foundry_release_config::Config;
//!
//! let cfg = resolve_run_config(&RunOverrides::default(), &Config::default())?;
//! let plan = engine::plan(&cfg)?;
//! println!("{} -> {}", plan.tag, plan.urls.download_url);
//! ```

/// Token resolution: `--token` → `INPUT_ACTIONTOKEN` → `GITHUB_TOKEN` →
/// `GH_TOKEN`.
pub mod auth;

/// Commit log and release body rendering.
pub mod changelog;

/// Building a [`types::RunConfig`] from flags, inputs, config and payload.
pub mod context;

/// Stage orchestration: plan, template, release.
pub mod engine;

/// Classified errors and stage tagging.
pub mod error;

/// Placeholder substitution and release URLs.
pub mod manifest;

/// Domain types: manifest names, versions, run config, receipts.
pub mod types;

/// Version file reading.
pub mod version;

/// Configuration file (`.foundry-release.toml`) loading and merging.
/// Re-exported from foundry-release-config microcrate.
pub use foundry_release_config as config;

/// CI detection, event payload, action inputs and step outputs.
/// Re-exported from foundry-release-environment microcrate.
pub use foundry_release_environment as environment;

/// Git operations.
/// Re-exported from foundry-release-git microcrate.
pub use foundry_release_git as git;

/// GitHub REST client.
/// Re-exported from foundry-release-github microcrate.
pub use foundry_release_github as github;

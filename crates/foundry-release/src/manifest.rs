//! Manifest placeholder substitution.
//!
//! A manifest may carry three tokens, each replaced at every occurrence:
//!
//! | token | replaced with |
//! |-------|---------------|
//! | `{{VERSION}}` | the bare version |
//! | `{{DOWNLOAD_URL}}` | `<server>/<owner>/<repo>/releases/download/v<version>/<repo>.zip` |
//! | `{{MANIFEST_URL}}` | `<server>/<owner>/<repo>/releases/download/v<version>/<manifest>` |

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use foundry_release_github::{Repository, release_download_url};

use crate::types::{ManifestFileName, ReleaseUrls, Version};

pub const VERSION_TOKEN: &str = "{{VERSION}}";
pub const DOWNLOAD_URL_TOKEN: &str = "{{DOWNLOAD_URL}}";
pub const MANIFEST_URL_TOKEN: &str = "{{MANIFEST_URL}}";

/// Compute the download and manifest URLs for a release
pub fn release_urls(
    server_url: &str,
    repo: &Repository,
    version: &Version,
    manifest: ManifestFileName,
) -> ReleaseUrls {
    let tag = version.tag();
    ReleaseUrls {
        download_url: release_download_url(server_url, repo, &tag, &format!("{}.zip", repo.name)),
        manifest_url: release_download_url(server_url, repo, &tag, manifest.as_str()),
    }
}

/// Substitute every placeholder in `template`
pub fn render(template: &str, version: &Version, urls: &ReleaseUrls) -> String {
    template
        .replace(DOWNLOAD_URL_TOKEN, &urls.download_url)
        .replace(MANIFEST_URL_TOKEN, &urls.manifest_url)
        .replace(VERSION_TOKEN, version.as_str())
}

/// Whether any placeholder is still present
pub fn has_placeholders(text: &str) -> bool {
    [VERSION_TOKEN, DOWNLOAD_URL_TOKEN, MANIFEST_URL_TOKEN]
        .iter()
        .any(|token| text.contains(token))
}

/// Render the manifest at `path` in place. Returns whether the content
/// changed; an unchanged manifest is not rewritten.
pub fn template_file(path: &Path, version: &Version, urls: &ReleaseUrls) -> Result<bool> {
    let original = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;

    let rendered = render(&original, version, urls);
    if rendered == original {
        return Ok(false);
    }

    fs::write(path, rendered)
        .with_context(|| format!("failed to write manifest: {}", path.display()))?;
    Ok(true)
}

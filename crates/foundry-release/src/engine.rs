use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use foundry_release_git::{CommitOutcome, Git, GitIdentity};
use foundry_release_github::{COMMITS_PAGE_SIZE, GitHubClient, NewRelease, Release, Repository};

use crate::changelog::{release_body, render_commit_log};
use crate::error::{ReleaseError, StageFailed};
use crate::manifest::{release_urls, template_file};
use crate::types::{
    ManifestFileName, ReleasePlan, ReleaseReceipt, RunConfig, Stage, TemplateReport,
    UploadedAsset, Version,
};
use crate::version::read_version;

pub const ZIP_CONTENT_TYPE: &str = "application/zip";
pub const MANIFEST_CONTENT_TYPE: &str = "application/json";

pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Compute tag, URLs and archive name without writing anything or calling
/// the API.
pub fn plan(cfg: &RunConfig) -> Result<ReleasePlan> {
    let manifest = validate_manifest(cfg)?;
    let version = read_version(&cfg.version_path()).context(StageFailed(Stage::Template))?;
    Ok(build_plan(cfg, manifest, version))
}

/// Validate and template the manifest in place; nothing else.
pub fn run_template(cfg: &RunConfig, reporter: &mut dyn Reporter) -> Result<TemplateReport> {
    let manifest = validate_manifest(cfg)?;
    template_stage(cfg, manifest, reporter).context(StageFailed(Stage::Template))
}

/// Run every stage: validate, template, create the draft release, then
/// commit, archive and upload.
///
/// Stages run strictly in order and the first failure stops the run. Work
/// already done (the templated manifest, a created release) is left in
/// place.
pub fn run_release(cfg: &RunConfig, reporter: &mut dyn Reporter) -> Result<ReleaseReceipt> {
    let started_at = Utc::now();

    let manifest = validate_manifest(cfg)?;
    let token = cfg
        .token
        .as_deref()
        .ok_or(ReleaseError::MissingToken)
        .context(StageFailed(Stage::Validate))?;
    let committer = cfg
        .committer
        .as_ref()
        .ok_or(ReleaseError::MissingCommitter)
        .context(StageFailed(Stage::Validate))?;

    let templated = template_stage(cfg, manifest, reporter).context(StageFailed(Stage::Template))?;
    let plan = templated.plan;

    let client = GitHubClient::with_timeout(&cfg.api_base, token, cfg.http_timeout)
        .context(StageFailed(Stage::Release))?;
    let created = release_stage(cfg, &client, &plan.version, reporter)
        .context(StageFailed(Stage::Release))?;

    let published = publish_stage(
        cfg,
        &client,
        &created.release,
        manifest,
        &plan.version,
        committer,
        reporter,
    )
    .context(StageFailed(Stage::Publish))?;

    reporter.info(&format!("release {} created: {}", plan.tag, created.release.html_url));

    Ok(ReleaseReceipt {
        repository: plan.repository,
        version: plan.version,
        tag: plan.tag,
        release_id: created.release.id,
        release_url: created.release.html_url,
        urls: plan.urls,
        commit_count: created.commit_count,
        commit_log_truncated: created.truncated,
        committed: published.committed,
        assets: published.assets,
        started_at,
        finished_at: Utc::now(),
    })
}

fn validate_manifest(cfg: &RunConfig) -> Result<ManifestFileName> {
    ManifestFileName::parse(&cfg.manifest).context(StageFailed(Stage::Validate))
}

fn build_plan(cfg: &RunConfig, manifest: ManifestFileName, version: Version) -> ReleasePlan {
    ReleasePlan {
        repository: cfg.repository.to_string(),
        manifest,
        tag: version.tag(),
        zip_name: cfg.zip_name(),
        urls: release_urls(&cfg.server_url, &cfg.repository, &version, manifest),
        version,
    }
}

fn template_stage(
    cfg: &RunConfig,
    manifest: ManifestFileName,
    reporter: &mut dyn Reporter,
) -> Result<TemplateReport> {
    let version_path = cfg.version_path();
    let version = read_version(&version_path)?;
    reporter.info(&format!(
        "version {version} read from {}",
        version_path.display()
    ));

    let plan = build_plan(cfg, manifest, version);
    let manifest_path = cfg.manifest_path();
    let changed = template_file(&manifest_path, &plan.version, &plan.urls)?;
    if changed {
        reporter.info(&format!("templated {}", manifest_path.display()));
    } else {
        reporter.info(&format!(
            "{} has no placeholders; left unchanged",
            manifest_path.display()
        ));
    }

    Ok(TemplateReport {
        plan,
        manifest_path,
        changed,
    })
}

struct CreatedRelease {
    release: Release,
    commit_count: Option<usize>,
    truncated: bool,
}

fn release_stage(
    cfg: &RunConfig,
    client: &GitHubClient,
    version: &Version,
    reporter: &mut dyn Reporter,
) -> Result<CreatedRelease> {
    let tag = version.tag();

    let (log, commit_count, truncated) = if cfg.commit_log {
        let (log, count, truncated) = collect_commit_log(client, &cfg.repository, reporter)?;
        (Some(log), Some(count), truncated)
    } else {
        (None, None, false)
    };

    let body = release_body(&tag, log.as_deref());
    reporter.info(&format!("creating draft release {tag} on {}...", cfg.repository));
    let release = client.create_release(&cfg.repository, &NewRelease::draft(&tag, &tag, &body))?;

    Ok(CreatedRelease {
        release,
        commit_count,
        truncated,
    })
}

/// Render the commits since the latest release. Only the first page of the
/// listing is read, so at most [`COMMITS_PAGE_SIZE`] commits are included;
/// the log counts as truncated when the API links a further page.
fn collect_commit_log(
    client: &GitHubClient,
    repo: &Repository,
    reporter: &mut dyn Reporter,
) -> Result<(String, usize, bool)> {
    reporter.info("looking up latest release...");
    let latest = client
        .latest_release(repo)?
        .ok_or_else(|| ReleaseError::NoPriorRelease {
            repository: repo.to_string(),
        })?;

    reporter.info(&format!(
        "collecting commits since {} ({})",
        latest.tag_name,
        latest.created_at.to_rfc3339()
    ));
    let page = client.list_commits_since(repo, latest.created_at, COMMITS_PAGE_SIZE)?;

    let truncated = page.has_next_page;
    if truncated {
        reporter.warn(&format!(
            "commit log is capped at {COMMITS_PAGE_SIZE} commits; older commits since {} are not listed",
            latest.tag_name
        ));
    }

    Ok((render_commit_log(&page.commits), page.commits.len(), truncated))
}

struct Published {
    committed: bool,
    assets: Vec<UploadedAsset>,
}

fn publish_stage(
    cfg: &RunConfig,
    client: &GitHubClient,
    release: &Release,
    manifest: ManifestFileName,
    version: &Version,
    committer: &GitIdentity,
    reporter: &mut dyn Reporter,
) -> Result<Published> {
    let git = Git::new(&cfg.workdir).with_timeout(cfg.git_timeout);

    reporter.info(&format!(
        "configuring git identity {} <{}>",
        committer.name, committer.email
    ));
    git.configure_identity(committer)?;

    let committed = match git.commit_all(&format!("Release {version}"))? {
        CommitOutcome::Committed => {
            reporter.info(&format!("committed release {version}"));
            true
        }
        CommitOutcome::NothingToCommit => {
            reporter.info("no tracked changes to commit; archiving HEAD as is");
            false
        }
    };

    let zip_name = cfg.zip_name();
    reporter.info(&format!("archiving HEAD to {zip_name}..."));
    git.archive_head(Path::new(&zip_name))?;

    let assets = vec![
        upload(
            client,
            release,
            &cfg.workdir.join(&zip_name),
            &zip_name,
            ZIP_CONTENT_TYPE,
            reporter,
        )?,
        upload(
            client,
            release,
            &cfg.manifest_path(),
            manifest.as_str(),
            MANIFEST_CONTENT_TYPE,
            reporter,
        )?,
    ];

    Ok(Published { committed, assets })
}

fn upload(
    client: &GitHubClient,
    release: &Release,
    path: &Path,
    name: &str,
    content_type: &str,
    reporter: &mut dyn Reporter,
) -> Result<UploadedAsset> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let size = data.len() as u64;

    reporter.info(&format!("uploading {name} ({size} bytes)..."));
    let asset = client.upload_asset(release, name, content_type, data)?;

    Ok(UploadedAsset {
        name: asset.name,
        content_type: content_type.to_string(),
        size,
        url: asset.browser_download_url,
    })
}

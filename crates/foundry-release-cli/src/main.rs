use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use foundry_release::auth::resolve_token;
use foundry_release::config::{Config, resolve_config};
use foundry_release::context::{RunOverrides, resolve_repository, resolve_run_config};
use foundry_release::engine::{self, Reporter};
use foundry_release::environment::{
    self as ci, CiEnvironment, detect_environment, error_command, load_event_payload_from_env,
    warning_command,
};
use foundry_release::error::is_config_error;
use foundry_release::git;
use foundry_release::types::{ReleasePlan, ReleaseReceipt, TemplateReport};

/// Exit code for invocation problems (bad manifest name, no token, no repository)
const CONFIG_ERROR_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "foundry-release", version)]
#[command(about = "Template, release and publish Foundry VTT systems and modules on GitHub")]
struct Cli {
    /// Manifest file name: system.json or module.json (default: system.json)
    #[arg(long)]
    manifest: Option<String>,

    /// GitHub token (default: actionToken input, GITHUB_TOKEN, GH_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Repository owner (default: from the event payload or GITHUB_REPOSITORY)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (default: from the event payload or GITHUB_REPOSITORY)
    #[arg(long)]
    repo: Option<String>,

    /// Committer email for the release commit
    #[arg(long)]
    committer_email: Option<String>,

    /// Committer name for the release commit
    #[arg(long)]
    committer_name: Option<String>,

    /// File holding the version number (default: version.txt)
    #[arg(long)]
    version_file: Option<PathBuf>,

    /// Repository checkout to work in (default: current directory)
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Put the commits since the latest release into the release body;
    /// `--commit-log=false` turns it off over inputs and config
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    commit_log: Option<bool>,

    /// GitHub REST API base URL (default: https://api.github.com)
    #[arg(long)]
    api_base: Option<String>,

    /// GitHub web URL used in download links (default: https://github.com)
    #[arg(long)]
    server_url: Option<String>,

    /// HTTP request timeout (e.g. 30s, 2m)
    #[arg(long)]
    timeout: Option<String>,

    /// Timeout for each git command (e.g. 2m); unlimited if unset
    #[arg(long)]
    git_timeout: Option<String>,

    /// Config file layered over the nearest .foundry-release.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Print the tag, URLs and archive name without changing anything.
    Plan,
    /// Fill in the manifest placeholders and stop.
    Template,
    /// Template, create the draft release, commit, archive and upload (default).
    Publish,
    /// Print environment, repository, token and git diagnostics.
    Doctor,
}

struct CliReporter {
    environment: CiEnvironment,
    json: bool,
}

impl CliReporter {
    /// Emit a workflow command. Commands belong on stdout, except in JSON
    /// mode where stdout carries the result document.
    fn annotate(&self, line: &str) {
        if self.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn in_actions(&self) -> bool {
        self.environment == CiEnvironment::GitHubActions
    }
}

impl Reporter for CliReporter {
    fn info(&mut self, msg: &str) {
        eprintln!("[info] {msg}");
    }

    fn warn(&mut self, msg: &str) {
        if self.in_actions() {
            self.annotate(&warning_command(msg));
        } else {
            eprintln!("[warn] {msg}");
        }
    }

    fn error(&mut self, msg: &str) {
        if self.in_actions() {
            self.annotate(&error_command(msg));
        } else {
            eprintln!("[error] {msg}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut reporter = CliReporter {
        environment: detect_environment(),
        json: cli.json,
    };

    match run(&cli, &mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            reporter.error(&format!("{err:#}"));
            if is_config_error(&err) {
                ExitCode::from(CONFIG_ERROR_EXIT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli, reporter: &mut CliReporter) -> Result<()> {
    let workdir = match &cli.workdir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to determine current directory")?,
    };
    let (config, config_path) = resolve_config(&workdir, cli.config.as_deref())?;
    let overrides = build_overrides(cli, workdir)?;

    match cli.cmd.unwrap_or(Commands::Publish) {
        Commands::Plan => {
            let cfg = resolve_run_config(&overrides, &config)?;
            let plan = engine::plan(&cfg)?;
            if cli.json {
                print_json(&plan)?;
            } else {
                print_plan(&plan);
            }
        }
        Commands::Template => {
            let cfg = resolve_run_config(&overrides, &config)?;
            let report = engine::run_template(&cfg, reporter)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_template(&report);
            }
        }
        Commands::Publish => {
            let cfg = resolve_run_config(&overrides, &config)?;
            let receipt = engine::run_release(&cfg, reporter)?;
            write_step_outputs(&receipt, reporter)?;
            if cli.json {
                print_json(&receipt)?;
            } else {
                print_receipt(&receipt);
            }
        }
        Commands::Doctor => {
            run_doctor(cli, &overrides, &config, config_path.as_deref(), reporter)?;
        }
    }

    Ok(())
}

fn build_overrides(cli: &Cli, workdir: PathBuf) -> Result<RunOverrides> {
    Ok(RunOverrides {
        manifest: cli.manifest.clone(),
        token: cli.token.clone(),
        owner: cli.owner.clone(),
        repo: cli.repo.clone(),
        committer_email: cli.committer_email.clone(),
        committer_name: cli.committer_name.clone(),
        version_file: cli.version_file.clone(),
        workdir: Some(workdir),
        commit_log: cli.commit_log,
        api_base: cli.api_base.clone(),
        server_url: cli.server_url.clone(),
        http_timeout: cli.timeout.as_deref().map(parse_duration).transpose()?,
        git_timeout: cli.git_timeout.as_deref().map(parse_duration).transpose()?,
    })
}

fn parse_duration(s: &str) -> Result<Duration> {
    humantime::parse_duration(s).with_context(|| format!("invalid duration: {s}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_plan(plan: &ReleasePlan) {
    println!("repository: {}", plan.repository);
    println!("manifest: {}", plan.manifest);
    println!("version: {}", plan.version);
    println!("tag: {}", plan.tag);
    println!("zip: {}", plan.zip_name);
    println!("download_url: {}", plan.urls.download_url);
    println!("manifest_url: {}", plan.urls.manifest_url);
}

fn print_template(report: &TemplateReport) {
    print_plan(&report.plan);
    println!();
    let status = if report.changed { "templated" } else { "unchanged" };
    println!("{}: {status}", report.manifest_path.display());
}

fn print_receipt(receipt: &ReleaseReceipt) {
    println!("**** Version {} Release Created!", receipt.tag);
    println!("**** URLs Embedded in Manifest:");
    println!("** Download URL: {}", receipt.urls.download_url);
    println!("** Manifest URL: {}", receipt.urls.manifest_url);
}

/// Append the receipt's key values to `GITHUB_OUTPUT` when running as a step
fn write_step_outputs(receipt: &ReleaseReceipt, reporter: &mut dyn Reporter) -> Result<()> {
    let outputs = [
        ("version", receipt.version.to_string()),
        ("tag", receipt.tag.clone()),
        ("release_id", receipt.release_id.to_string()),
        ("download_url", receipt.urls.download_url.clone()),
        ("manifest_url", receipt.urls.manifest_url.clone()),
    ];

    for (name, value) in &outputs {
        if !ci::set_output(name, value)? {
            return Ok(());
        }
    }
    reporter.info("step outputs written to GITHUB_OUTPUT");
    Ok(())
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    environment: String,
    workdir: PathBuf,
    config_file: Option<PathBuf>,
    repository: Option<String>,
    manifest: String,
    token_detected: bool,
    token_source: Option<String>,
    git: Option<String>,
    git_bin: Option<PathBuf>,
    git_repo: bool,
    head: Option<String>,
}

fn run_doctor(
    cli: &Cli,
    overrides: &RunOverrides,
    config: &Config,
    config_path: Option<&Path>,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let payload = load_event_payload_from_env()?.unwrap_or_default();
    let repository = resolve_repository(overrides, &payload).ok();
    if repository.is_none() {
        reporter.warn("repository owner and name are unknown; pass --owner and --repo");
    }

    let token = resolve_token(overrides.token.as_deref());
    if token.is_none() {
        reporter.warn("no GitHub token found");
    }

    let git_version = git::git_version();
    if git_version.is_none() {
        reporter.warn("unable to run git --version");
    }

    let workdir = overrides.workdir.clone().unwrap_or_default();
    let git_repo = git::is_git_repo(&workdir);
    let head = if git_repo {
        git::Git::new(&workdir).head_commit().ok()
    } else {
        reporter.warn("workdir is not inside a git working tree");
        None
    };

    // Same precedence as a real run, without requiring a repository.
    let manifest = overrides
        .manifest
        .clone()
        .or_else(|| ci::action_input("manifestFileName"))
        .or_else(|| config.manifest().map(str::to_string))
        .unwrap_or_else(|| foundry_release::context::DEFAULT_MANIFEST.to_string());

    let report = DoctorReport {
        environment: detect_environment().to_string(),
        workdir,
        config_file: config_path.map(Path::to_path_buf),
        repository: repository.map(|r| r.to_string()),
        manifest,
        token_detected: token.is_some(),
        token_source: token.map(|(_, source)| source.to_string()),
        git: git_version,
        git_bin: git::git_binary(),
        git_repo,
        head,
    };

    if cli.json {
        return print_json(&report);
    }

    println!("environment: {}", report.environment);
    println!("workdir: {}", report.workdir.display());
    match &report.config_file {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: <none>"),
    }
    println!(
        "repository: {}",
        report.repository.as_deref().unwrap_or("<unknown>")
    );
    println!("manifest: {}", report.manifest);
    match &report.token_source {
        Some(source) => println!("token_detected: true ({source})"),
        None => println!("token_detected: false"),
    }
    if let Some(git) = &report.git {
        println!("git: {git}");
    }
    if let Some(bin) = &report.git_bin {
        println!("git_bin: {}", bin.display());
    }
    println!("git_repo: {}", report.git_repo);
    if let Some(head) = &report.head {
        println!("head: {head}");
    }

    Ok(())
}

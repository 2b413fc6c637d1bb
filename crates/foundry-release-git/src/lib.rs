//! Git operations for foundry-release.
//!
//! The release run needs three things from git: a committer identity, a
//! commit of the templated manifest and a zip archive of `HEAD`. The
//! `doctor` diagnostics add the binary path, repository detection and the
//! current commit hash. Commands that must succeed go through
//! [`foundry_release_process::run_checked`], so a nonzero exit surfaces as a
//! [`foundry_release_process::CommandFailed`] error.
//!
//! The `git` binary can be swapped with `FOUNDRY_RELEASE_GIT_BIN`.
//!
//! # Example
//!
//! ```no_run
//! use foundry_release_git::{Git, GitIdentity};
//! use std::path::Path;
//!
//! let git = Git::new(Path::new("."));
//! git.configure_identity(&GitIdentity::new("dev@example.com", "dev"))?;
//! git.commit_all("Release 1.0.0")?;
//! git.archive_head(Path::new("widget.zip"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use foundry_release_process::{CommandResult, run_checked, run_command_with_timeout};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the git executable
pub const GIT_BIN_ENV: &str = "FOUNDRY_RELEASE_GIT_BIN";

/// Committer identity written to the repository's local git config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    pub email: String,
    pub name: String,
}

impl GitIdentity {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// What [`Git::commit_all`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// A git working tree plus the timeout applied to each command
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
    timeout: Option<Duration>,
}

impl Git {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            timeout: None,
        }
    }

    /// Kill any git command that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, args: &[&str]) -> Result<CommandResult> {
        run_checked(&git_program(), args, &self.root, self.timeout)
    }

    /// Set `user.email` and `user.name` in the repository config
    pub fn configure_identity(&self, identity: &GitIdentity) -> Result<()> {
        self.run(&["config", "user.email", &identity.email])
            .context("failed to set git user.email")?;
        self.run(&["config", "user.name", &identity.name])
            .context("failed to set git user.name")?;
        Ok(())
    }

    /// Whether tracked files differ from `HEAD` (staged or not)
    pub fn has_tracked_changes(&self) -> Result<bool> {
        let result = run_command_with_timeout(
            &git_program(),
            &["diff", "--quiet", "HEAD"],
            &self.root,
            self.timeout,
        )?;

        // `git diff --quiet` exits 1 when there are differences.
        match (result.timed_out, result.exit_code) {
            (false, Some(0)) => Ok(false),
            (false, Some(1)) => Ok(true),
            _ => Err(anyhow::Error::new(result.failure()))
                .context("failed to check for tracked changes"),
        }
    }

    /// Commit every modified tracked file (`git commit -am <message>`)
    pub fn commit_all(&self, message: &str) -> Result<CommitOutcome> {
        if !self.has_tracked_changes()? {
            return Ok(CommitOutcome::NothingToCommit);
        }

        self.run(&["commit", "-am", message])
            .context("failed to commit release changes")?;
        Ok(CommitOutcome::Committed)
    }

    /// Write a zip archive of `HEAD` to `output`
    pub fn archive_head(&self, output: &Path) -> Result<()> {
        let output_arg = output
            .to_str()
            .with_context(|| format!("archive path is not valid UTF-8: {}", output.display()))?;
        self.run(&["archive", "--format=zip", "-o", output_arg, "HEAD"])
            .context("failed to archive HEAD")?;

        let archive = if output.is_absolute() {
            output.to_path_buf()
        } else {
            self.root.join(output)
        };
        if !archive.is_file() {
            bail!("git archive reported success but {} was not created", archive.display());
        }
        Ok(())
    }

    /// Current commit hash
    pub fn head_commit(&self) -> Result<String> {
        let result = self
            .run(&["rev-parse", "HEAD"])
            .context("failed to resolve HEAD")?;
        Ok(result.stdout_trimmed().to_string())
    }
}

/// Check if `path` is inside a git working tree
pub fn is_git_repo(path: &Path) -> bool {
    run_command_with_timeout(
        &git_program(),
        &["rev-parse", "--is-inside-work-tree"],
        path,
        None,
    )
    .map(|r| r.success)
    .unwrap_or(false)
}

/// Resolved path of the git executable in use, honoring
/// `FOUNDRY_RELEASE_GIT_BIN`
pub fn git_binary() -> Option<PathBuf> {
    foundry_release_process::which(&git_program())
}

/// `git --version`, if git can be run at all
pub fn git_version() -> Option<String> {
    foundry_release_process::run_command(&git_program(), &["--version"])
        .ok()
        .filter(|r| r.success)
        .map(|r| r.stdout_trimmed().to_string())
}

fn git_program() -> String {
    env::var(GIT_BIN_ENV).unwrap_or_else(|_| "git".to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::process::Command;

    use foundry_release_process::CommandFailed;
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;

    fn init_git_repo(dir: &Path) {
        for args in [
            vec!["init"],
            vec!["config", "user.email", "test@example.com"],
            vec!["config", "user.name", "Test User"],
            vec!["config", "commit.gpgsign", "false"],
        ] {
            Command::new("git")
                .args(&args)
                .current_dir(dir)
                .output()
                .expect("git setup");
        }
    }

    fn commit_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("write");
        Command::new("git")
            .args(["add", name])
            .current_dir(dir)
            .output()
            .expect("git add");
        Command::new("git")
            .args(["commit", "-m", "seed"])
            .current_dir(dir)
            .output()
            .expect("git commit");
    }

    fn read_config(dir: &Path, key: &str) -> String {
        let out = Command::new("git")
            .args(["config", key])
            .current_dir(dir)
            .output()
            .expect("git config");
        String::from_utf8_lossy(&out.stdout).trim().to_string()
    }

    #[test]
    #[serial]
    fn configure_identity_writes_local_config() {
        let td = tempdir().expect("tempdir");
        init_git_repo(td.path());

        let git = Git::new(td.path());
        git.configure_identity(&GitIdentity::new("ci@acme.dev", "acme-bot"))
            .expect("identity");

        assert_eq!(read_config(td.path(), "user.email"), "ci@acme.dev");
        assert_eq!(read_config(td.path(), "user.name"), "acme-bot");
    }

    #[test]
    #[serial]
    fn commit_all_commits_modified_tracked_files() {
        let td = tempdir().expect("tempdir");
        init_git_repo(td.path());
        commit_file(td.path(), "system.json", "{\"version\":\"{{VERSION}}\"}");
        let git = Git::new(td.path());
        let before = git.head_commit().expect("head");

        fs::write(td.path().join("system.json"), "{\"version\":\"1.0.0\"}").expect("write");
        assert!(git.has_tracked_changes().expect("diff"));

        let outcome = git.commit_all("Release 1.0.0").expect("commit");
        assert_eq!(outcome, CommitOutcome::Committed);

        let after = git.head_commit().expect("head");
        assert_ne!(before, after);
        assert!(!git.has_tracked_changes().expect("diff"));
    }

    #[test]
    #[serial]
    fn commit_all_skips_clean_tree() {
        let td = tempdir().expect("tempdir");
        init_git_repo(td.path());
        commit_file(td.path(), "system.json", "{}");

        let git = Git::new(td.path());
        let outcome = git.commit_all("Release 1.0.0").expect("commit");
        assert_eq!(outcome, CommitOutcome::NothingToCommit);
    }

    #[test]
    #[serial]
    fn archive_head_writes_zip() {
        let td = tempdir().expect("tempdir");
        init_git_repo(td.path());
        commit_file(td.path(), "system.json", "{}");

        let git = Git::new(td.path());
        git.archive_head(Path::new("widget.zip")).expect("archive");

        let bytes = fs::read(td.path().join("widget.zip")).expect("read zip");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    #[serial]
    fn head_commit_fails_without_commits() {
        let td = tempdir().expect("tempdir");
        init_git_repo(td.path());

        let err = Git::new(td.path()).head_commit().expect_err("no HEAD yet");
        assert!(err.downcast_ref::<CommandFailed>().is_some());
    }

    #[test]
    #[serial]
    fn is_git_repo_detects_repo() {
        let td = tempdir().expect("tempdir");
        assert!(!is_git_repo(td.path()));
        init_git_repo(td.path());
        assert!(is_git_repo(td.path()));
    }

    #[test]
    fn identity_serializes() {
        let json = serde_json::to_string(&GitIdentity::new("a@b.c", "a")).expect("json");
        assert_eq!(json, r#"{"email":"a@b.c","name":"a"}"#);
    }

    #[cfg(unix)]
    mod fake {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        const SCRIPT: &str = "#!/usr/bin/env sh\n\
if [ -n \"$FAKE_GIT_LOG\" ]; then\n  echo \"$*\" >>\"$FAKE_GIT_LOG\"\nfi\n\
if [ \"$FAKE_GIT_MODE\" = \"fail\" ]; then\n  echo 'fatal: mock failure' >&2\n  exit 128\nfi\n\
if [ \"$1\" = \"diff\" ] && [ \"$FAKE_GIT_MODE\" = \"dirty\" ]; then\n  exit 1\nfi\n\
exit 0\n";

        fn write_fake_git(dir: &Path) -> PathBuf {
            let path = dir.join("git");
            fs::write(&path, SCRIPT).expect("write fake git");
            let mut perms = fs::metadata(&path).expect("meta").permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).expect("chmod");
            path
        }

        fn with_fake_git<R>(mode: &str, f: impl FnOnce(&Path, &Path) -> R) -> R {
            let td = tempdir().expect("tempdir");
            let fake = write_fake_git(td.path());
            let log = td.path().join("git.log");
            temp_env::with_vars(
                [
                    (GIT_BIN_ENV, Some(fake.to_str().expect("utf8"))),
                    ("FAKE_GIT_MODE", Some(mode)),
                    ("FAKE_GIT_LOG", Some(log.to_str().expect("utf8"))),
                ],
                || f(td.path(), &log),
            )
        }

        #[test]
        #[serial]
        fn dirty_tree_is_committed_with_release_message() {
            with_fake_git("dirty", |root, log| {
                let git = Git::new(root);
                git.configure_identity(&GitIdentity::new("ci@acme.dev", "acme-bot"))
                    .expect("identity");
                let outcome = git.commit_all("Release 2.0.0").expect("commit");
                assert_eq!(outcome, CommitOutcome::Committed);

                let calls = fs::read_to_string(log).expect("log");
                let calls: Vec<&str> = calls.lines().collect();
                assert_eq!(
                    calls,
                    vec![
                        "config user.email ci@acme.dev",
                        "config user.name acme-bot",
                        "diff --quiet HEAD",
                        "commit -am Release 2.0.0",
                    ]
                );
            });
        }

        #[test]
        #[serial]
        fn failing_git_is_a_command_failure() {
            with_fake_git("fail", |root, _| {
                let err = Git::new(root)
                    .configure_identity(&GitIdentity::new("a@b.c", "a"))
                    .expect_err("must fail");
                let failed = err.downcast_ref::<CommandFailed>().expect("typed");
                assert_eq!(failed.exit_code, Some(128));
                assert!(failed.stderr.contains("mock failure"));
                assert!(format!("{err:#}").contains("failed to set git user.email"));
            });
        }

        #[test]
        #[serial]
        fn diff_failure_is_not_mistaken_for_changes() {
            with_fake_git("fail", |root, _| {
                let err = Git::new(root).has_tracked_changes().expect_err("must fail");
                assert!(err.downcast_ref::<CommandFailed>().is_some());
            });
        }

        #[test]
        #[serial]
        fn git_binary_follows_override() {
            with_fake_git("clean", |root, _| {
                let bin = git_binary().expect("resolved");
                assert_eq!(
                    fs::canonicalize(bin).expect("canonical"),
                    fs::canonicalize(root.join("git")).expect("canonical")
                );
            });
        }

        #[test]
        #[serial]
        fn archive_without_output_file_is_an_error() {
            with_fake_git("clean", |root, _| {
                let err = Git::new(root)
                    .archive_head(Path::new("widget.zip"))
                    .expect_err("fake git writes nothing");
                assert!(err.to_string().contains("was not created"));
            });
        }
    }
}

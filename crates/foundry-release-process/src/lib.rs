//! Process execution for foundry-release.
//!
//! Every external tool the release run touches (today only `git`) goes
//! through this crate. Output is captured, the exit status is recorded, and
//! [`CommandResult::ok`] turns a nonzero exit into a [`CommandFailed`] error
//! that callers can downcast.
//!
//! # Example
//!
//! ```ignore
//! use foundry_release_process::run_command;
//!
//! let result = run_command("git", &["--version"]).expect("run");
//! result.ok().expect("git available");
//! assert!(result.stdout.starts_with("git version"));
//! ```

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Interval between exit polls while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Program that was executed
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code (if available)
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Whether the command was killed after exceeding its timeout
    pub timed_out: bool,
    /// Duration of execution
    pub duration_ms: u64,
}

/// A command ran but did not exit successfully.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{}` {}: {}", command_line(.program, .args), exit_description(.exit_code, .timed_out), .stderr.trim())]
pub struct CommandFailed {
    pub program: String,
    pub args: Vec<String>,
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub timed_out: bool,
}

fn command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

fn exit_description(exit_code: &Option<i32>, timed_out: &bool) -> String {
    match (*timed_out, *exit_code) {
        (true, _) => "timed out".to_string(),
        (false, Some(code)) => format!("exited with code {code}"),
        (false, None) => "was terminated by a signal".to_string(),
    }
}

impl CommandResult {
    /// Check if the command succeeded
    pub fn ok(&self) -> std::result::Result<&Self, CommandFailed> {
        if self.success {
            Ok(self)
        } else {
            Err(self.failure())
        }
    }

    /// Describe this result as a failure, regardless of its exit status
    pub fn failure(&self) -> CommandFailed {
        CommandFailed {
            program: self.program.clone(),
            args: self.args.clone(),
            exit_code: self.exit_code,
            stderr: self.stderr.clone(),
            timed_out: self.timed_out,
        }
    }

    /// Create a result from a process output
    pub fn from_output(program: &str, args: &[&str], output: &Output, duration: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            timed_out: false,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Trimmed standard output
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Run a command and capture its output
pub fn run_command(program: &str, args: &[&str]) -> Result<CommandResult> {
    let start = Instant::now();

    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run command: {} {:?}", program, args))?;

    Ok(CommandResult::from_output(program, args, &output, start.elapsed()))
}

/// Run a command in `dir`, killing it if it outlives `timeout`.
///
/// A killed command reports `success == false`, `timed_out == true` and has
/// the timeout appended to its stderr.
pub fn run_command_with_timeout(
    program: &str,
    args: &[&str],
    dir: &Path,
    timeout: Option<Duration>,
) -> Result<CommandResult> {
    let start = Instant::now();
    let mut command = Command::new(program);
    command.args(args).current_dir(dir);

    let Some(timeout) = timeout else {
        let output = command.output().with_context(|| {
            format!(
                "failed to run command: {} {:?} in {}",
                program,
                args,
                dir.display()
            )
        })?;
        return Ok(CommandResult::from_output(program, args, &output, start.elapsed()));
    };

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn command: {} {:?}", program, args))?;

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = start + timeout;
    let (exit_code, timed_out) = wait_until(&mut child, deadline)?;

    let stdout = join_drain(stdout_reader);
    let mut stderr = join_drain(stderr_reader);
    if timed_out {
        stderr.push_str(&format!(
            "\ncommand timed out after {}",
            humantime::format_duration(timeout)
        ));
    }

    Ok(CommandResult {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        success: !timed_out && exit_code == Some(0),
        exit_code,
        stdout,
        stderr,
        timed_out,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Run a command in `dir` and fail with [`CommandFailed`] on a nonzero exit.
pub fn run_checked(
    program: &str,
    args: &[&str],
    dir: &Path,
    timeout: Option<Duration>,
) -> Result<CommandResult> {
    let result = run_command_with_timeout(program, args, dir, timeout)?;
    result.ok()?;
    Ok(result)
}

fn wait_until(child: &mut Child, deadline: Instant) -> Result<(Option<i32>, bool)> {
    loop {
        if let Some(status) = child.try_wait().context("failed to poll command")? {
            return Ok((status.code(), false));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let status = child.wait().context("failed to reap timed out command")?;
            return Ok((status.code(), true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .unwrap_or_default()
}

/// Full path of `program`, searching `PATH` unless it already names a file
pub fn which(program: &str) -> Option<std::path::PathBuf> {
    which::which(program).ok()
}

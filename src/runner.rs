//! External command execution. Every command is a strict
//! suspend-until-complete point: output is inherited so the subprocess's
//! own diagnostics reach the user, and a non-zero exit is fatal.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

/// A subprocess exited with a non-zero status. Carried as a typed error
/// so `main` can propagate the command's own exit code.
#[derive(Debug, Error)]
#[error("`{program}` exited with status {code}")]
pub struct CommandFailed {
    pub program: String,
    pub code: i32,
}

/// Run a command in `dir`, inheriting stdio (shows output in real-time).
pub fn run_in(dir: &Path, cmd: &str, args: &[&str]) -> Result<()> {
    run_in_with_env(dir, cmd, args, &[])
}

/// Run a command in `dir` with extra environment variables set.
pub fn run_in_with_env(dir: &Path, cmd: &str, args: &[&str], envs: &[(&str, String)]) -> Result<()> {
    log::info!("running: {} {}", cmd, args.join(" "));

    let status = Command::new(cmd)
        .args(args)
        .current_dir(dir)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandFailed {
            program: cmd.to_string(),
            code: status.code().unwrap_or(1),
        }
        .into())
    }
}

/// Check if a command exists on PATH.
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

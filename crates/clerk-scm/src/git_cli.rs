use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use clerk_core::http_retry::truncate_for_error;
use tracing::{debug, info};

pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, Clone)]
/// Runs git against a local clone that the service is allowed to push from.
pub struct GitCli {
    repo_dir: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        let remote = remote.into();
        let remote = match remote.trim() {
            "" => DEFAULT_REMOTE.to_string(),
            value => value.to_string(),
        };
        Self {
            repo_dir: repo_dir.into(),
            remote,
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Reverts `commit` on top of the remote tip of `branch` and pushes it.
    pub async fn revert_and_push(&self, commit: &str, branch: &str) -> Result<()> {
        let commit = commit.trim();
        let branch = branch.trim();
        if commit.is_empty() || commit.starts_with('-') {
            bail!("invalid commit '{commit}'");
        }
        if branch.is_empty() || branch.starts_with('-') {
            bail!("invalid branch '{branch}'");
        }
        let remote_branch = format!("{}/{branch}", self.remote);

        self.run(&["fetch", self.remote.as_str()]).await?;
        self.run(&["checkout", branch]).await?;
        self.run(&["reset", "--hard", remote_branch.as_str()]).await?;
        self.run(&["revert", "--no-edit", commit]).await?;
        self.run(&["push", self.remote.as_str(), branch]).await?;
        info!(commit, branch, remote = self.remote.as_str(), "pushed revert");
        Ok(())
    }

    /// Runs one git command in the clone and returns its trimmed stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let rendered = args.join(" ");
        debug!(repo = %self.repo_dir.display(), "git {rendered}");
        let mut command = tokio::process::Command::new("git");
        command.args(args);
        command.current_dir(&self.repo_dir);
        command.env("GIT_TERMINAL_PROMPT", "0");
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        let output = command.output().await.with_context(|| {
            format!(
                "failed to execute git {rendered} in {}",
                self.repo_dir.display()
            )
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            bail!(
                "git {rendered} failed with exit code {}: {}",
                output.status.code().unwrap_or(1),
                truncate_for_error(&stderr, 400)
            );
        }
        Ok(stdout)
    }
}

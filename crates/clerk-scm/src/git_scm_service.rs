use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clerk_core::ScmService;
use tracing::info;

use crate::git_cli::GitCli;
use crate::github_branch_lock::GitHubBranchLockClient;

/// `ScmService` that reverts through a local clone and locks through GitHub.
///
/// Either half may be left unconfigured; the matching operation then fails.
#[derive(Clone, Default)]
pub struct GitScmService {
    git: Option<GitCli>,
    github: Option<GitHubBranchLockClient>,
}

impl GitScmService {
    pub fn new(git: Option<GitCli>, github: Option<GitHubBranchLockClient>) -> Self {
        Self { git, github }
    }
}

#[async_trait]
impl ScmService for GitScmService {
    async fn revert_commit(&self, commit: &str, branch: &str) -> Result<()> {
        let Some(git) = &self.git else {
            bail!("cannot revert commit {commit}: no git repository configured");
        };
        info!(commit, branch, "reverting commit");
        git.revert_and_push(commit, branch)
            .await
            .with_context(|| format!("failed to revert {commit} on {branch}"))
    }

    async fn lock_branch(&self, branch: &str) -> Result<()> {
        let Some(github) = &self.github else {
            bail!("cannot lock branch {branch}: no github repository configured");
        };
        info!(branch, repo = github.repo().as_slug(), "locking branch");
        github.lock_branch(branch).await
    }
}

//! Source-control remediation: reverts through the git CLI and branch locks
//! through the GitHub REST API.

pub mod git_cli;
pub mod git_scm_service;
pub mod github_branch_lock;

pub use git_cli::GitCli;
pub use git_scm_service::GitScmService;
pub use github_branch_lock::{GitHubBranchLockClient, GitHubConfig, RepoRef};

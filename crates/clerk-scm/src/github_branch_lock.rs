use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clerk_core::http_retry::{ensure_success, send_with_retry};
use clerk_core::RetrySettings;
use serde_json::json;
use tracing::info;

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid github repository '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid github repository '{raw}', expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub repository: String,
    pub token: String,
    pub request_timeout_ms: u64,
    pub retry: RetrySettings,
}

#[derive(Clone)]
/// Locks branches through the branch protection endpoint.
pub struct GitHubBranchLockClient {
    http: reqwest::Client,
    api_base: String,
    repo: RepoRef,
    retry: RetrySettings,
}

impl GitHubBranchLockClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let repo = RepoRef::parse(&config.repository)?;
        if config.token.trim().is_empty() {
            bail!("github token must not be empty");
        }
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("build-clerk"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", config.token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            repo,
            retry: RetrySettings::new(config.retry.max_attempts, config.retry.base_delay_ms),
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// URL of the protection resource; the branch is a single escaped segment.
    pub fn protection_url(&self, branch: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .with_context(|| format!("invalid github api base '{}'", self.api_base))?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("github api base '{}' cannot be a base", self.api_base))?
            .pop_if_empty()
            .extend([
                "repos",
                self.repo.owner.as_str(),
                self.repo.name.as_str(),
                "branches",
                branch,
                "protection",
            ]);
        Ok(url)
    }

    /// Marks the branch read-only, replacing any existing protection rules.
    pub async fn lock_branch(&self, branch: &str) -> Result<()> {
        let branch = branch.trim();
        if branch.is_empty() {
            bail!("cannot lock an empty branch name");
        }
        let url = self.protection_url(branch)?;
        let payload = json!({
            "required_status_checks": null,
            "enforce_admins": null,
            "required_pull_request_reviews": null,
            "restrictions": null,
            "lock_branch": true,
        });
        let response = send_with_retry("github api", "branch protection", self.retry, || {
            self.http.put(url.clone()).json(&payload)
        })
        .await?;
        ensure_success("github api", "branch protection", response).await?;
        info!(repo = self.repo.as_slug(), branch, "locked branch");
        Ok(())
    }
}

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clerk_core::http_retry::{ensure_success, send_with_retry, truncate_for_error};
use clerk_core::{BuildReport, BuildRunnerService, RetrySettings};
use tracing::{debug, info};

const CRUMB_PATH: &str = "crumbIssuer/api/xml?xpath=concat(//crumbRequestField,\":\",//crumb)";

#[derive(Debug, Clone)]
pub struct JenkinsConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub request_timeout_ms: u64,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// CSRF protection header issued by Jenkins.
pub struct JenkinsCrumb {
    pub field: String,
    pub value: String,
}

impl JenkinsCrumb {
    /// Parses the `field:value` body returned by the crumb issuer.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, value) = raw.trim().split_once(':')?;
        let field = field.trim();
        let value = value.trim();
        if field.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[derive(Clone)]
/// `BuildRunnerService` that enqueues a new build of the reported job.
pub struct JenkinsBuildRunner {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
    retry: RetrySettings,
}

impl JenkinsBuildRunner {
    pub fn new(config: JenkinsConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            bail!("jenkins base url must not be empty");
        }
        let credentials = match (config.username, config.api_token) {
            (Some(username), Some(token))
                if !username.trim().is_empty() && !token.trim().is_empty() =>
            {
                Some((username.trim().to_string(), token.trim().to_string()))
            }
            _ => None,
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create jenkins client")?;
        Ok(Self {
            http,
            base_url,
            credentials,
            retry: RetrySettings::new(config.retry.max_attempts, config.retry.base_delay_ms),
        })
    }

    pub fn job_build_url(&self, job_path: &str) -> String {
        let job_path = job_path.trim().trim_end_matches('/');
        if job_path.starts_with("http://") || job_path.starts_with("https://") {
            return format!("{job_path}/build");
        }
        format!("{}/{}/build", self.base_url, job_path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((username, token)) => request.basic_auth(username, Some(token)),
            None => request,
        }
    }

    /// `None` when the server has CSRF protection disabled.
    pub async fn fetch_crumb(&self) -> Result<Option<JenkinsCrumb>> {
        let url = format!("{}/{CRUMB_PATH}", self.base_url);
        let response = send_with_retry("jenkins", "crumb", self.retry, || {
            self.authorize(self.http.get(&url))
        })
        .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("jenkins crumb issuer not available");
            return Ok(None);
        }
        let response = ensure_success("jenkins", "crumb", response).await?;
        let body = response
            .text()
            .await
            .context("failed to read jenkins crumb")?;
        let crumb = JenkinsCrumb::parse(&body);
        if crumb.is_none() {
            bail!(
                "jenkins returned malformed crumb: {}",
                truncate_for_error(&body, 200)
            );
        }
        Ok(crumb)
    }

    pub async fn enqueue_build(&self, job_path: &str) -> Result<()> {
        if job_path.trim().is_empty() {
            bail!("cannot trigger build without a job path");
        }
        let crumb = self.fetch_crumb().await?;
        let url = self.job_build_url(job_path);
        let response = send_with_retry("jenkins", "build", self.retry, || {
            let request = self.authorize(self.http.post(&url));
            match &crumb {
                Some(crumb) => request.header(crumb.field.as_str(), crumb.value.as_str()),
                None => request,
            }
        })
        .await?;
        ensure_success("jenkins", "build", response).await?;
        info!(url = url.as_str(), "enqueued jenkins build");
        Ok(())
    }
}

#[async_trait]
impl BuildRunnerService for JenkinsBuildRunner {
    async fn rebuild(&self, report: &BuildReport) -> Result<()> {
        info!(build = %report, "triggering rebuild");
        self.enqueue_build(&report.url)
            .await
            .with_context(|| format!("failed to trigger rebuild of {}", report.name))
    }
}

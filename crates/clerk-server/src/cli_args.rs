use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clerk_actions::RemedialFailurePolicy;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliRemedialFailurePolicy {
    BestEffort,
    ReportFailure,
}

impl From<CliRemedialFailurePolicy> for RemedialFailurePolicy {
    fn from(value: CliRemedialFailurePolicy) -> Self {
        match value {
            CliRemedialFailurePolicy::BestEffort => Self::BestEffort,
            CliRemedialFailurePolicy::ReportFailure => Self::ReportFailure,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "clerk",
    about = "Watches CI build reports and offers remedial actions in Slack",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "CLERK_BIND",
        default_value = "0.0.0.0:9090",
        help = "Socket address the webhook listener binds to"
    )]
    pub bind: SocketAddr,

    #[arg(
        long = "branch-filter",
        env = "CLERK_BRANCH_FILTER",
        help = "Only build reports and merges for this branch are processed"
    )]
    pub branch_filter: Option<String>,

    #[arg(
        long = "rules-file",
        env = "CLERK_RULES_FILE",
        help = "TOML file with analysis rules; built-in defaults are used when omitted"
    )]
    pub rules_file: Option<PathBuf>,

    #[arg(
        long = "notify-channel",
        env = "CLERK_NOTIFY_CHANNEL",
        default_value = "#builds",
        help = "Channel used when an analysis does not name one"
    )]
    pub notify_channel: String,

    #[arg(
        long = "merge-channel",
        env = "CLERK_MERGE_CHANNEL",
        help = "Channel announcing merged pull requests; merges are only recorded when omitted"
    )]
    pub merge_channel: Option<String>,

    #[arg(
        long = "failure-policy",
        env = "CLERK_FAILURE_POLICY",
        value_enum,
        default_value = "best-effort",
        help = "How a failed remedial action is rendered back to the user"
    )]
    pub failure_policy: CliRemedialFailurePolicy,

    #[arg(
        long = "slack-api-base",
        env = "CLERK_SLACK_API_BASE",
        default_value = "https://slack.com/api",
        help = "Base URL for Slack Web API calls"
    )]
    pub slack_api_base: String,

    #[arg(
        long = "slack-bot-token",
        env = "CLERK_SLACK_BOT_TOKEN",
        hide_env_values = true,
        help = "Slack bot token used to post and update messages"
    )]
    pub slack_bot_token: String,

    #[arg(
        long = "slack-signing-secret",
        env = "CLERK_SLACK_SIGNING_SECRET",
        hide_env_values = true,
        help = "Slack signing secret; action callbacks are verified when set"
    )]
    pub slack_signing_secret: Option<String>,

    #[arg(
        long = "slack-max-skew-seconds",
        env = "CLERK_SLACK_MAX_SKEW_SECONDS",
        default_value_t = 300,
        help = "Maximum age of a signed Slack request; 0 disables the check"
    )]
    pub slack_max_skew_seconds: u64,

    #[arg(
        long = "jenkins-base-url",
        env = "CLERK_JENKINS_BASE_URL",
        default_value = "http://localhost:8080",
        help = "Jenkins root URL that job paths are resolved against"
    )]
    pub jenkins_base_url: String,

    #[arg(
        long = "jenkins-username",
        env = "CLERK_JENKINS_USERNAME",
        help = "Jenkins user for basic auth"
    )]
    pub jenkins_username: Option<String>,

    #[arg(
        long = "jenkins-api-token",
        env = "CLERK_JENKINS_API_TOKEN",
        hide_env_values = true,
        help = "Jenkins API token for basic auth"
    )]
    pub jenkins_api_token: Option<String>,

    #[arg(
        long = "git-repo-dir",
        env = "CLERK_GIT_REPO_DIR",
        help = "Local clone used to push reverts; reverts fail when omitted"
    )]
    pub git_repo_dir: Option<PathBuf>,

    #[arg(
        long = "git-remote",
        env = "CLERK_GIT_REMOTE",
        default_value = "origin",
        help = "Remote reverts are fetched from and pushed to"
    )]
    pub git_remote: String,

    #[arg(
        long = "github-api-base",
        env = "CLERK_GITHUB_API_BASE",
        default_value = "https://api.github.com",
        help = "Base URL for GitHub REST calls"
    )]
    pub github_api_base: String,

    #[arg(
        long = "github-repo",
        env = "CLERK_GITHUB_REPO",
        help = "Repository in owner/repo format whose branches may be locked"
    )]
    pub github_repo: Option<String>,

    #[arg(
        long = "github-token",
        env = "CLERK_GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token with administration rights on the repository"
    )]
    pub github_token: Option<String>,

    #[arg(
        long = "request-timeout-ms",
        env = "CLERK_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout for outbound HTTP requests"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "CLERK_RETRY_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = parse_positive_usize,
        help = "Attempts per outbound request including the first"
    )]
    pub retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "CLERK_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base delay for exponential retry backoff"
    )]
    pub retry_base_delay_ms: u64,
}

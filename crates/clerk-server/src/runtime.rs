use std::sync::Arc;

use anyhow::{Context, Result};
use clerk_actions::{
    ActionExecutor, BuildEventConfig, BuildEventService, PendingActionRegistry,
    PendingActionService, PullRequestEventService, RemedialFailurePolicy,
};
use clerk_analysis::{AnalysisRules, RuleBasedAnalysisEngine};
use clerk_core::{InMemoryBuildReportStore, NotificationService, RetrySettings};
use clerk_jenkins::{JenkinsBuildRunner, JenkinsConfig};
use clerk_scm::{GitCli, GitHubBranchLockClient, GitHubConfig, GitScmService};
use clerk_slack::{SlackApiClient, SlackApiConfig, SlackNotificationService};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli_args::Cli;
use crate::server::{serve, ClerkServerState};
use crate::slack_signature::SlackSigningConfig;

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn load_rules(cli: &Cli) -> Result<AnalysisRules> {
    match cli.rules_file.as_deref() {
        Some(path) => {
            let rules = AnalysisRules::load(path)?;
            info!(path = %path.display(), "loaded analysis rules");
            Ok(rules)
        }
        None => Ok(AnalysisRules::default()),
    }
}

fn build_scm_service(cli: &Cli, retry: RetrySettings) -> Result<GitScmService> {
    let git = cli
        .git_repo_dir
        .as_ref()
        .map(|dir| GitCli::new(dir.clone(), cli.git_remote.clone()));
    if git.is_none() {
        warn!("no git repository configured; revert actions will fail");
    }

    let github = match (
        non_blank(cli.github_repo.as_deref()),
        non_blank(cli.github_token.as_deref()),
    ) {
        (Some(repository), Some(token)) => Some(
            GitHubBranchLockClient::new(GitHubConfig {
                api_base: cli.github_api_base.clone(),
                repository,
                token,
                request_timeout_ms: cli.request_timeout_ms,
                retry,
            })
            .context("failed to configure github branch locking")?,
        ),
        (Some(_), None) => {
            warn!("github repository configured without a token; lock actions will fail");
            None
        }
        _ => None,
    };
    Ok(GitScmService::new(git, github))
}

/// Wires the collaborators and services described by `cli`.
pub fn build_server_state(cli: &Cli) -> Result<Arc<ClerkServerState>> {
    let retry = RetrySettings::new(cli.retry_max_attempts, cli.retry_base_delay_ms);
    let rules = load_rules(cli)?;

    let slack = SlackApiClient::new(SlackApiConfig {
        api_base: cli.slack_api_base.clone(),
        bot_token: cli.slack_bot_token.clone(),
        request_timeout_ms: cli.request_timeout_ms,
        retry,
    })
    .context("failed to configure slack client")?;
    let notifier: Arc<dyn NotificationService> = Arc::new(SlackNotificationService::new(slack));

    let build_runner = Arc::new(
        JenkinsBuildRunner::new(JenkinsConfig {
            base_url: cli.jenkins_base_url.clone(),
            username: non_blank(cli.jenkins_username.as_deref()),
            api_token: non_blank(cli.jenkins_api_token.as_deref()),
            request_timeout_ms: cli.request_timeout_ms,
            retry,
        })
        .context("failed to configure jenkins build runner")?,
    );
    let scm = Arc::new(build_scm_service(cli, retry)?);

    let store = Arc::new(InMemoryBuildReportStore::new());
    let engine = Arc::new(RuleBasedAnalysisEngine::new(store.clone(), rules));
    let registry = Arc::new(PendingActionRegistry::new());

    let build_events = BuildEventService::new(
        BuildEventConfig {
            branch_filter: cli.branch_filter.clone(),
            default_channel: cli.notify_channel.trim().to_string(),
        },
        store.clone(),
        engine,
        registry.clone(),
        notifier.clone(),
    );
    let pull_requests = PullRequestEventService::new(
        store,
        notifier.clone(),
        cli.merge_channel.clone(),
        cli.branch_filter.clone(),
    );
    let failure_policy = RemedialFailurePolicy::from(cli.failure_policy);
    let executor = ActionExecutor::new(scm, build_runner, notifier.clone());
    let actions = PendingActionService::new(registry, executor, notifier, failure_policy);

    let slack_signing = non_blank(cli.slack_signing_secret.as_deref()).map(|signing_secret| {
        SlackSigningConfig {
            signing_secret,
            max_skew_seconds: cli.slack_max_skew_seconds,
        }
    });
    if slack_signing.is_none() {
        warn!("no slack signing secret configured; action callbacks are not verified");
    }

    Ok(Arc::new(ClerkServerState {
        build_events,
        pull_requests,
        actions,
        slack_signing,
    }))
}

pub async fn run(cli: Cli) -> Result<()> {
    let state = build_server_state(&cli)?;
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind clerk server to {}", cli.bind))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve clerk server address")?;
    info!(
        addr = %local_addr,
        branch_filter = cli.branch_filter.as_deref().unwrap_or("*"),
        failure_policy = state.actions.failure_policy().as_str(),
        "clerk server listening"
    );
    serve(listener, state).await
}

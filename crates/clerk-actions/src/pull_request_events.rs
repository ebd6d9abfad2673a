use std::sync::Arc;

use anyhow::{Context, Result};
use clerk_core::{Color, NotificationService, PullRequestEventStore, PullRequestMergedEvent};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug)]
pub enum PullRequestDispatch {
    Filtered,
    Dispatched(JoinHandle<()>),
}

#[derive(Clone)]
/// Records merged pull requests and optionally announces them.
pub struct PullRequestEventService {
    store: Arc<dyn PullRequestEventStore>,
    notifier: Arc<dyn NotificationService>,
    merge_channel: Option<String>,
    branch_filter: Option<String>,
}

impl PullRequestEventService {
    pub fn new(
        store: Arc<dyn PullRequestEventStore>,
        notifier: Arc<dyn NotificationService>,
        merge_channel: Option<String>,
        branch_filter: Option<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            merge_channel: non_blank(merge_channel),
            branch_filter: branch_filter.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn check_pull_request(&self, event: PullRequestMergedEvent) -> PullRequestDispatch {
        if let Some(filter) = self.branch_filter.as_deref() {
            if event.target_branch != filter {
                info!(
                    pull_request = event.number,
                    target_branch = event.target_branch.as_str(),
                    filter,
                    "ignoring merged pull request because target branch does not match filter"
                );
                return PullRequestDispatch::Filtered;
            }
        }

        let service = self.clone();
        PullRequestDispatch::Dispatched(tokio::spawn(async move {
            if let Err(error) = service.process(&event).await {
                error!(event = ?event, "error handling merged pull request: {error:#}");
            }
        }))
    }

    async fn process(&self, event: &PullRequestMergedEvent) -> Result<()> {
        self.store
            .record_merge(event)
            .await
            .with_context(|| format!("failed to record pull request #{}", event.number))?;
        info!(pull_request = event.number, "recorded merged pull request");

        if let Some(channel) = self.merge_channel.as_deref() {
            self.notifier
                .notify_text(channel, &event.describe(), Color::Green)
                .await
                .with_context(|| {
                    format!("failed to announce pull request #{} on {channel}", event.number)
                })?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

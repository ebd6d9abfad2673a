use std::sync::Arc;

use anyhow::{Context, Result};
use clerk_core::{BuildRunnerService, NotificationService, PendingAction, ScmService};
use tracing::info;

#[derive(Clone)]
/// Dispatches a pending action to the collaborator that performs it.
pub struct ActionExecutor {
    scm: Arc<dyn ScmService>,
    build_runner: Arc<dyn BuildRunnerService>,
    notifier: Arc<dyn NotificationService>,
}

impl ActionExecutor {
    pub fn new(
        scm: Arc<dyn ScmService>,
        build_runner: Arc<dyn BuildRunnerService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            scm,
            build_runner,
            notifier,
        }
    }

    /// `triggering_channel` receives text actions that name no channel of their own.
    pub async fn execute(&self, triggering_channel: &str, action: &PendingAction) -> Result<()> {
        info!(
            action = action.name(),
            exclusive = action.exclusive(),
            "executing pending action: {}",
            action.describe()
        );
        match action {
            PendingAction::RevertCommit(revert) => self
                .scm
                .revert_commit(&revert.commit, &revert.branch)
                .await
                .with_context(|| {
                    format!(
                        "failed to revert commit {} on branch {}",
                        revert.commit, revert.branch
                    )
                }),
            PendingAction::RebuildBranch(rebuild) => self
                .build_runner
                .rebuild(&rebuild.report)
                .await
                .with_context(|| format!("failed to rebuild {}", rebuild.report)),
            PendingAction::LockBranch(lock) => self
                .scm
                .lock_branch(&lock.branch)
                .await
                .with_context(|| format!("failed to lock branch {}", lock.branch)),
            PendingAction::ShowText(text) => {
                let channel = text
                    .channel_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .unwrap_or(triggering_channel);
                self.notifier
                    .notify_text(channel, &text.body, text.color)
                    .await
                    .with_context(|| format!("failed to show text '{}' on {channel}", text.name))
            }
        }
    }
}

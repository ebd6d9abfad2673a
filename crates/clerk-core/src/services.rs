//! Collaborator contracts the pending-action runtime calls out to.

use anyhow::Result;
use async_trait::async_trait;

use crate::analysis::Analysis;
use crate::build_report::BuildReport;
use crate::notification::UpdatedNotificationMessage;
use crate::pending_action::Color;

#[async_trait]
/// Trait contract for chat delivery.
pub trait NotificationService: Send + Sync {
    async fn notify_text(&self, channel: &str, message: &str, color: Color) -> Result<()>;

    /// Posts an analysis with one interactive button group per proposed action.
    async fn notify_analysis(&self, channel: &str, analysis: &Analysis, color: Color)
        -> Result<()>;

    async fn update_message(&self, message: &UpdatedNotificationMessage) -> Result<()>;
}

#[async_trait]
/// Trait contract for source-control remediation.
pub trait ScmService: Send + Sync {
    async fn revert_commit(&self, commit: &str, branch: &str) -> Result<()>;
    async fn lock_branch(&self, branch: &str) -> Result<()>;
}

#[async_trait]
/// Trait contract for re-triggering builds.
pub trait BuildRunnerService: Send + Sync {
    async fn rebuild(&self, report: &BuildReport) -> Result<()>;
}

#[async_trait]
/// Trait contract for turning a build report into an `Analysis`.
pub trait AnalysisEngine: Send + Sync {
    async fn analyse_build(&self, report: &BuildReport) -> Result<Analysis>;
}

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clerk_core::{
    Analysis, AnalysisEngine, BuildReport, BuildReportStore, BuildStatus, Color, LockBranchAction,
    PendingAction, RebuildBranchAction, RevertCommitAction, ShowTextAction,
};
use tracing::debug;

use crate::rules::AnalysisRules;

pub const LAST_GOOD_ACTION_NAME: &str = "last_good";

/// Proposes remedial actions from the branch history held in the store.
pub struct RuleBasedAnalysisEngine {
    store: Arc<dyn BuildReportStore>,
    rules: AnalysisRules,
}

impl RuleBasedAnalysisEngine {
    pub fn new(store: Arc<dyn BuildReportStore>, rules: AnalysisRules) -> Self {
        Self { store, rules }
    }

    async fn analyse_failure(&self, report: &BuildReport, analysis: &mut Analysis) -> Result<()> {
        let branch = report.branch();
        let commit = report.commit();
        analysis.log(format!(
            "Build #{} of {} {} on branch {branch} at commit {}",
            report.number(),
            report.name,
            describe_status(report.status()),
            short_commit(commit)
        ));

        let consecutive = self
            .store
            .count_consecutive_failures_on_branch(branch)
            .await
            .context("failed to count consecutive failures")?;
        analysis.log(format!(
            "Branch {branch} has failed {consecutive} time(s) in a row"
        ));

        let mut commit_failures = 0;
        for status in [BuildStatus::Failed, BuildStatus::Unstable] {
            commit_failures += self
                .store
                .count_status_for_commit_on_branch(commit, branch, status)
                .await
                .context("failed to count commit failures")?;
        }

        let ever_succeeded = self
            .store
            .has_ever_succeeded(commit)
            .await
            .context("failed to check commit history")?;
        if !ever_succeeded {
            let last_passing = self
                .store
                .last_passing_commit_for_branch(branch)
                .await
                .context("failed to find last passing build")?;
            if let Some(last_passing) = last_passing.filter(|passing| passing.commit() != commit) {
                analysis.log(format!(
                    "Commit {} has never passed; branch {branch} last passed at commit {} in build #{}",
                    short_commit(commit),
                    short_commit(last_passing.commit()),
                    last_passing.number()
                ));
                analysis.recommend(PendingAction::RevertCommit(RevertCommitAction::new(
                    commit, branch,
                )))?;
                analysis.recommend(PendingAction::ShowText(ShowTextAction::new(
                    LAST_GOOD_ACTION_NAME,
                    "Last good commit",
                    format!(
                        "Last passing build of {branch} was #{} at commit {}",
                        last_passing.number(),
                        last_passing.commit()
                    ),
                    Color::Green,
                )))?;
            }
        }

        if commit_failures <= self.rules.max_rebuilds_per_commit {
            analysis.recommend(PendingAction::RebuildBranch(RebuildBranchAction::new(
                report.clone(),
            )))?;
        } else {
            analysis.log(format!(
                "Commit {} has failed {commit_failures} times, not proposing another rebuild",
                short_commit(commit)
            ));
        }

        if self.rules.lock_enabled() && consecutive >= self.rules.lock_threshold {
            analysis.recommend(PendingAction::LockBranch(LockBranchAction::new(branch)))?;
        }

        analysis.notify(self.rules.channel.clone(), Color::Red);
        Ok(())
    }

    async fn analyse_success(&self, report: &BuildReport, analysis: &mut Analysis) -> Result<()> {
        if !self.rules.notify_recovery {
            return Ok(());
        }
        let branch = report.branch();
        let previous = self
            .store
            .list(Some(branch))
            .await
            .context("failed to list branch history")?
            .into_iter()
            .rfind(|candidate| candidate.number() < report.number());
        let Some(previous) = previous.filter(|previous| previous.status().is_failure()) else {
            return Ok(());
        };

        analysis.log(format!(
            "Branch {branch} recovered in build #{} of {} after build #{} {}",
            report.number(),
            report.name,
            previous.number(),
            describe_status(previous.status())
        ));
        analysis.notify(self.rules.channel.clone(), Color::Green);
        Ok(())
    }
}

#[async_trait]
impl AnalysisEngine for RuleBasedAnalysisEngine {
    async fn analyse_build(&self, report: &BuildReport) -> Result<Analysis> {
        let mut analysis = Analysis::new(report.name.clone(), report.branch());
        match report.status() {
            status if status.is_failure() => self.analyse_failure(report, &mut analysis).await?,
            BuildStatus::Success => self.analyse_success(report, &mut analysis).await?,
            _ => {}
        }
        debug!(
            build = %report,
            actions = ?analysis.action_set().action_names(),
            notify = analysis.notification().is_some(),
            "analysed build"
        );
        Ok(analysis)
    }
}

fn describe_status(status: BuildStatus) -> &'static str {
    match status {
        BuildStatus::Success => "succeeded",
        BuildStatus::Failed => "failed",
        BuildStatus::Unstable => "was unstable",
        BuildStatus::Aborted => "was aborted",
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}

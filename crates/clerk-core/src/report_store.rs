//! Build report store abstractions and in-memory backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::build_report::{BuildReport, BuildStatus};
use crate::pull_request::PullRequestMergedEvent;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, BuildReportStoreError>;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum BuildReportStoreError {
    #[error("build #{number} not found on branch '{branch}'")]
    BuildNotFound { branch: String, number: u64 },
}

/// A stored report with the time it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBuildReport {
    pub report: BuildReport,
    pub recorded_at: DateTime<Utc>,
}

/// Stores build reports and answers the history queries rules rely on.
#[async_trait]
pub trait BuildReportStore: Send + Sync {
    async fn save(&self, report: &BuildReport) -> StoreResult<()>;
    async fn has_ever_succeeded(&self, commit: &str) -> StoreResult<bool>;
    async fn last_passing_commit_for_branch(&self, branch: &str)
        -> StoreResult<Option<BuildReport>>;
    async fn count_status_for_commit_on_branch(
        &self,
        commit: &str,
        branch: &str,
        status: BuildStatus,
    ) -> StoreResult<usize>;
    async fn count_consecutive_failures_on_branch(&self, branch: &str) -> StoreResult<usize>;
    async fn fetch_last(&self, branch: Option<&str>) -> StoreResult<Option<BuildReport>>;
    async fn fetch_build_status(&self, branch: &str, number: u64) -> StoreResult<BuildStatus>;

    /// Reports sorted in ascending order by build number.
    async fn list(&self, branch: Option<&str>) -> StoreResult<Vec<BuildReport>>;

    /// Reports received within `[start, end]`, ascending by build number.
    async fn fetch_between(
        &self,
        branch: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<BuildReport>>;

    /// Any report on `branch` with a build number above `number`; not
    /// necessarily the next consecutive build.
    async fn find_higher_build(&self, branch: &str, number: u64)
        -> StoreResult<Option<BuildReport>>;
}

/// Records merged pull requests.
#[async_trait]
pub trait PullRequestEventStore: Send + Sync {
    async fn record_merge(&self, event: &PullRequestMergedEvent) -> StoreResult<()>;
    async fn list_merges(&self, branch: Option<&str>) -> StoreResult<Vec<PullRequestMergedEvent>>;
}

/// In-memory implementation; history is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryBuildReportStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    reports: Vec<RecordedBuildReport>,
    merges: Vec<PullRequestMergedEvent>,
}

impl StoreInner {
    fn on_branch<'a>(
        &'a self,
        branch: Option<&'a str>,
    ) -> impl Iterator<Item = &'a RecordedBuildReport> + 'a {
        self.reports
            .iter()
            .filter(move |recorded| branch.is_none_or(|branch| recorded.report.branch() == branch))
    }

    fn sorted_on_branch(&self, branch: Option<&str>) -> Vec<BuildReport> {
        let mut reports = self
            .on_branch(branch)
            .map(|recorded| recorded.report.clone())
            .collect::<Vec<_>>();
        reports.sort_by_key(BuildReport::number);
        reports
    }
}

impl InMemoryBuildReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BuildReportStore for InMemoryBuildReportStore {
    async fn save(&self, report: &BuildReport) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.reports.push(RecordedBuildReport {
            report: report.clone(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    async fn has_ever_succeeded(&self, commit: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.reports.iter().any(|recorded| {
            recorded.report.commit() == commit && recorded.report.status() == BuildStatus::Success
        }))
    }

    async fn last_passing_commit_for_branch(
        &self,
        branch: &str,
    ) -> StoreResult<Option<BuildReport>> {
        let inner = self.inner.read().await;
        Ok(inner
            .on_branch(Some(branch))
            .filter(|recorded| recorded.report.status() == BuildStatus::Success)
            .max_by_key(|recorded| recorded.report.number())
            .map(|recorded| recorded.report.clone()))
    }

    async fn count_status_for_commit_on_branch(
        &self,
        commit: &str,
        branch: &str,
        status: BuildStatus,
    ) -> StoreResult<usize> {
        let inner = self.inner.read().await;
        Ok(inner
            .on_branch(Some(branch))
            .filter(|recorded| {
                recorded.report.commit() == commit && recorded.report.status() == status
            })
            .count())
    }

    async fn count_consecutive_failures_on_branch(&self, branch: &str) -> StoreResult<usize> {
        let inner = self.inner.read().await;
        let reports = inner.sorted_on_branch(Some(branch));
        Ok(reports
            .iter()
            .rev()
            .take_while(|report| report.status().is_failure())
            .count())
    }

    async fn fetch_last(&self, branch: Option<&str>) -> StoreResult<Option<BuildReport>> {
        let inner = self.inner.read().await;
        let last = match branch {
            Some(_) => inner
                .on_branch(branch)
                .max_by_key(|recorded| recorded.report.number()),
            None => inner.reports.last(),
        };
        Ok(last.map(|recorded| recorded.report.clone()))
    }

    async fn fetch_build_status(&self, branch: &str, number: u64) -> StoreResult<BuildStatus> {
        let inner = self.inner.read().await;
        inner
            .on_branch(Some(branch))
            .filter(|recorded| recorded.report.number() == number)
            .last()
            .map(|recorded| recorded.report.status())
            .ok_or_else(|| BuildReportStoreError::BuildNotFound {
                branch: branch.to_string(),
                number,
            })
    }

    async fn list(&self, branch: Option<&str>) -> StoreResult<Vec<BuildReport>> {
        let inner = self.inner.read().await;
        Ok(inner.sorted_on_branch(branch))
    }

    async fn fetch_between(
        &self,
        branch: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<BuildReport>> {
        let inner = self.inner.read().await;
        let mut reports = inner
            .on_branch(branch)
            .filter(|recorded| recorded.recorded_at >= start && recorded.recorded_at <= end)
            .map(|recorded| recorded.report.clone())
            .collect::<Vec<_>>();
        reports.sort_by_key(BuildReport::number);
        Ok(reports)
    }

    async fn find_higher_build(
        &self,
        branch: &str,
        number: u64,
    ) -> StoreResult<Option<BuildReport>> {
        let inner = self.inner.read().await;
        let found = inner
            .on_branch(Some(branch))
            .find(|recorded| recorded.report.number() > number)
            .map(|recorded| recorded.report.clone());
        Ok(found)
    }
}

#[async_trait]
impl PullRequestEventStore for InMemoryBuildReportStore {
    async fn record_merge(&self, event: &PullRequestMergedEvent) -> StoreResult<()> {
        self.inner.write().await.merges.push(event.clone());
        Ok(())
    }

    async fn list_merges(&self, branch: Option<&str>) -> StoreResult<Vec<PullRequestMergedEvent>> {
        let inner = self.inner.read().await;
        Ok(inner
            .merges
            .iter()
            .filter(|event| branch.is_none_or(|branch| event.target_branch == branch))
            .cloned()
            .collect())
    }
}

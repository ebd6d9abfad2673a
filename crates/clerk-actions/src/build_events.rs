//! Records build reports, analyses them and offers the proposed actions.

use std::sync::Arc;

use anyhow::{Context, Result};
use clerk_core::{AnalysisEngine, BuildReport, BuildReportStore, NotificationService};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::registry::PendingActionRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEventConfig {
    /// Only reports for exactly this branch are processed when set and non-blank.
    pub branch_filter: Option<String>,
    /// Used when an analysis asks for a notification without naming a channel.
    pub default_channel: String,
}

impl BuildEventConfig {
    fn active_branch_filter(&self) -> Option<&str> {
        self.branch_filter
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug)]
pub enum BuildReportDispatch {
    Filtered,
    Dispatched(JoinHandle<()>),
}

#[derive(Clone)]
pub struct BuildEventService {
    config: BuildEventConfig,
    store: Arc<dyn BuildReportStore>,
    engine: Arc<dyn AnalysisEngine>,
    registry: Arc<PendingActionRegistry>,
    notifier: Arc<dyn NotificationService>,
}

impl BuildEventService {
    pub fn new(
        config: BuildEventConfig,
        store: Arc<dyn BuildReportStore>,
        engine: Arc<dyn AnalysisEngine>,
        registry: Arc<PendingActionRegistry>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            config,
            store,
            engine,
            registry,
            notifier,
        }
    }

    /// Returns immediately; recording and analysis run on a spawned task.
    pub fn check_build_report(&self, report: BuildReport) -> BuildReportDispatch {
        if let Some(filter) = self.config.active_branch_filter() {
            if report.branch() != filter {
                info!(
                    branch = report.branch(),
                    filter,
                    "ignoring build {report} because branch does not match filter"
                );
                return BuildReportDispatch::Filtered;
            }
        }

        let service = self.clone();
        BuildReportDispatch::Dispatched(tokio::spawn(async move {
            if let Err(error) = service.process(&report).await {
                error!(report = ?report, "error handling build report: {error:#}");
            }
        }))
    }

    async fn process(&self, report: &BuildReport) -> Result<()> {
        self.store
            .save(report)
            .await
            .with_context(|| format!("failed to record build {report}"))?;
        let analysis = self
            .engine
            .analyse_build(report)
            .await
            .with_context(|| format!("failed to analyse build {report}"))?;

        if !analysis.is_empty() {
            self.registry.enqueue(analysis.action_set().clone());
        }
        let Some(target) = analysis.notification().cloned() else {
            debug!(build = %report, "analysis requested no notification");
            return Ok(());
        };

        let channel = if target.channel.trim().is_empty() {
            self.config.default_channel.as_str()
        } else {
            target.channel.as_str()
        };
        self.notifier
            .notify_analysis(channel, &analysis, target.color)
            .await
            .with_context(|| format!("failed to notify analysis of build {report} on {channel}"))
    }
}

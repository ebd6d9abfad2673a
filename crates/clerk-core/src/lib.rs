//! Domain model and collaborator contracts shared across clerk crates.
//!
//! Holds build reports, analyses, the closed pending-action catalog, chat
//! message layouts, the Slack interactive-message wire types, and the async
//! service traits the runtime crates implement.

pub mod analysis;
pub mod build_report;
pub mod http_retry;
pub mod notification;
pub mod pending_action;
pub mod pull_request;
pub mod report_store;
pub mod services;
pub mod slack_event;

pub use analysis::{Analysis, AnalysisEvent, NotificationTarget};
pub use build_report::{BuildDetails, BuildReport, BuildStatus, Scm};
pub use http_retry::RetrySettings;
pub use notification::{MessageAction, MessageAttachment, UpdatedNotificationMessage};
pub use pending_action::{
    Color, LockBranchAction, PendingAction, PendingActionError, PendingActionSet,
    RebuildBranchAction, RevertCommitAction, ShowTextAction,
};
pub use pull_request::PullRequestMergedEvent;
pub use report_store::{
    BuildReportStore, BuildReportStoreError, InMemoryBuildReportStore, PullRequestEventStore,
    RecordedBuildReport, StoreResult,
};
pub use services::{AnalysisEngine, BuildRunnerService, NotificationService, ScmService};
pub use slack_event::{
    ActionTriggeredEvent, SlackChannel, SlackMessageAction, SlackMessageAttachment,
    SlackOriginalMessage, SlackUser,
};

//! Pending-action runtime: offers, resolution of user selections, message
//! re-rendering, and the build/pull-request event orchestrators.

pub mod build_events;
pub mod executor;
pub mod pull_request_events;
pub mod registry;
pub mod rendering;
pub mod resolution;

pub use build_events::{BuildEventConfig, BuildEventService, BuildReportDispatch};
pub use executor::ActionExecutor;
pub use pull_request_events::{PullRequestDispatch, PullRequestEventService};
pub use registry::PendingActionRegistry;
pub use rendering::{compose_attachments, SelectedAction};
pub use resolution::{
    DiscardReason, PendingActionService, RemedialFailurePolicy, ResolutionOutcome,
};

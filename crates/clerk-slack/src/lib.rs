//! Slack Web API delivery for build notifications.

mod rendering;
pub mod slack_api_client;
pub mod slack_notification_service;

pub use rendering::{analysis_attachments, analysis_summary, DISMISS_VALUE};
pub use slack_api_client::{SlackApiClient, SlackApiConfig, SlackPostedMessage};
pub use slack_notification_service::SlackNotificationService;

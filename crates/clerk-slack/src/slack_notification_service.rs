use anyhow::Result;
use async_trait::async_trait;
use clerk_core::{Analysis, Color, MessageAttachment, NotificationService, UpdatedNotificationMessage};
use tracing::info;

use crate::rendering::{analysis_attachments, analysis_summary};
use crate::slack_api_client::SlackApiClient;

/// `NotificationService` backed by the Slack Web API.
#[derive(Clone)]
pub struct SlackNotificationService {
    client: SlackApiClient,
}

impl SlackNotificationService {
    pub fn new(client: SlackApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationService for SlackNotificationService {
    async fn notify_text(&self, channel: &str, message: &str, color: Color) -> Result<()> {
        let attachment = MessageAttachment {
            text: Some(message.to_string()),
            fallback: Some(message.to_string()),
            color: Some(color.hex_code().to_string()),
            ..MessageAttachment::default()
        };
        let posted = self.client.post_message(channel, "", &[attachment]).await?;
        info!(channel = posted.channel.as_str(), ts = posted.ts.as_str(), "posted text notification");
        Ok(())
    }

    async fn notify_analysis(&self, channel: &str, analysis: &Analysis, color: Color) -> Result<()> {
        let attachments = analysis_attachments(analysis, color);
        let posted = self
            .client
            .post_message(channel, &analysis_summary(analysis), &attachments)
            .await?;
        info!(
            channel = posted.channel.as_str(),
            ts = posted.ts.as_str(),
            offer_id = analysis.action_set().id(),
            actions = analysis.action_set().len(),
            "posted analysis notification"
        );
        Ok(())
    }

    async fn update_message(&self, message: &UpdatedNotificationMessage) -> Result<()> {
        self.client
            .update_message(
                &message.channel,
                &message.message_id,
                &message.text,
                &message.attachments,
            )
            .await?;
        info!(
            channel = message.channel.as_str(),
            ts = message.message_id.as_str(),
            attachments = message.attachments.len(),
            "updated notification message"
        );
        Ok(())
    }
}

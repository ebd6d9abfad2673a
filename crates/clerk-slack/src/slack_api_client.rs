//! Slack Web API client for posting and updating notifications.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clerk_core::http_retry::{ensure_success, send_with_retry};
use clerk_core::{MessageAttachment, RetrySettings};
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Clone, Deserialize)]
struct SlackChatMessageResponse {
    ok: bool,
    ts: Option<String>,
    channel: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackPostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Clone)]
pub struct SlackApiConfig {
    pub api_base: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
    pub retry: RetrySettings,
}

#[derive(Clone)]
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    retry: RetrySettings,
}

impl SlackApiClient {
    pub fn new(config: SlackApiConfig) -> Result<Self> {
        let bot_token = config.bot_token.trim().to_string();
        if bot_token.is_empty() {
            bail!("slack bot token must not be empty");
        }
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("build-clerk"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create slack api client")?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token,
            retry: RetrySettings::new(config.retry.max_attempts, config.retry.base_delay_ms),
        })
    }

    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        attachments: &[MessageAttachment],
    ) -> Result<SlackPostedMessage> {
        let payload = json!({
            "channel": channel,
            "text": text,
            "attachments": attachments,
        });
        let response = self.call("chat.postMessage", &payload).await?;
        Ok(SlackPostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts: response
                .ts
                .ok_or_else(|| anyhow!("slack chat.postMessage response missing ts"))?,
        })
    }

    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
        attachments: &[MessageAttachment],
    ) -> Result<SlackPostedMessage> {
        let payload = json!({
            "channel": channel,
            "ts": ts,
            "text": text,
            "attachments": attachments,
        });
        let response = self.call("chat.update", &payload).await?;
        Ok(SlackPostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts: response.ts.unwrap_or_else(|| ts.to_string()),
        })
    }

    async fn call(&self, method: &str, payload: &Value) -> Result<SlackChatMessageResponse> {
        let url = format!("{}/{method}", self.api_base);
        let response = send_with_retry("slack api", method, self.retry, || {
            self.http
                .post(&url)
                .bearer_auth(&self.bot_token)
                .json(payload)
        })
        .await?;
        let response = ensure_success("slack api", method, response).await?;
        let parsed = response
            .json::<SlackChatMessageResponse>()
            .await
            .with_context(|| format!("failed to decode slack {method}"))?;
        if !parsed.ok {
            bail!(
                "slack {method} failed: {}",
                parsed
                    .error
                    .as_deref()
                    .unwrap_or("unknown error")
            );
        }
        Ok(parsed)
    }
}

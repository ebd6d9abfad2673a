//! Retry helpers shared by the outbound HTTP clients.

use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const RETRY_ATTEMPT_HEADER: &str = "x-clerk-retry-attempt";
const MAX_RETRY_DELAY_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetrySettings {
    pub fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay_ms.max(1),
        }
    }
}

pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get("retry-after")?.to_str().ok()?;
    let seconds = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

pub fn retry_delay(base_delay_ms: u64, attempt: usize, retry_after: Option<Duration>) -> Duration {
    if let Some(delay) = retry_after {
        return delay.max(Duration::from_millis(base_delay_ms));
    }
    let exponent = attempt.saturating_sub(1).min(10) as u32;
    let scaled = base_delay_ms.saturating_mul(2_u64.saturating_pow(exponent));
    Duration::from_millis(scaled.min(MAX_RETRY_DELAY_MS))
}

pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

pub fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Sends the request built by `builder`, retrying rate limits, server errors
/// and transport failures. The final response is returned whatever its status.
pub async fn send_with_retry<F>(
    service: &str,
    operation: &str,
    settings: RetrySettings,
    mut builder: F,
) -> Result<reqwest::Response>
where
    F: FnMut() -> reqwest::RequestBuilder,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 0_usize;
    loop {
        attempt = attempt.saturating_add(1);
        let response = builder()
            .header(RETRY_ATTEMPT_HEADER, attempt.saturating_sub(1).to_string())
            .send()
            .await;
        match response {
            Ok(response) => {
                let status = response.status();
                if attempt < max_attempts && is_retryable_status(status.as_u16()) {
                    let retry_after = parse_retry_after(response.headers());
                    tracing::debug!(
                        service,
                        operation,
                        attempt,
                        status = status.as_u16(),
                        "retrying request"
                    );
                    tokio::time::sleep(retry_delay(settings.base_delay_ms, attempt, retry_after))
                        .await;
                    continue;
                }
                return Ok(response);
            }
            Err(error) => {
                if attempt < max_attempts && is_retryable_transport_error(&error) {
                    tokio::time::sleep(retry_delay(settings.base_delay_ms, attempt, None)).await;
                    continue;
                }
                return Err(error).with_context(|| format!("{service} {operation} request failed"));
            }
        }
    }
}

/// Fails with the status and a truncated body unless the response succeeded.
pub async fn ensure_success(
    service: &str,
    operation: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!(
        "{service} {operation} failed with status {}: {}",
        status.as_u16(),
        truncate_for_error(&body, 800)
    );
}

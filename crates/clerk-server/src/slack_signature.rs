//! Verification of Slack's `v0` request signatures.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SLACK_SIGNATURE_HEADER: &str = "x-slack-signature";
pub const SLACK_TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const DEFAULT_MAX_SKEW_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
pub struct SlackSigningConfig {
    pub signing_secret: String,
    /// `0` disables the timestamp check.
    pub max_skew_seconds: u64,
}

impl SlackSigningConfig {
    pub fn verify(&self, body: &str, signature: Option<&str>, timestamp: Option<&str>) -> Result<()> {
        let signature = signature
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("missing {SLACK_SIGNATURE_HEADER} header"))?;
        let timestamp = timestamp
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("missing {SLACK_TIMESTAMP_HEADER} header"))?;
        validate_timestamp_skew(timestamp, current_unix_timestamp_ms(), self.max_skew_seconds)?;
        verify_slack_v0_signature(body, signature, timestamp, &self.signing_secret)
    }
}

pub fn verify_slack_v0_signature(
    payload: &str,
    signature: &str,
    timestamp: &str,
    secret: &str,
) -> Result<()> {
    let Some(digest_hex) = signature.strip_prefix("v0=") else {
        bail!("slack signature must use v0=<hex> format");
    };
    let signature_bytes = decode_hex(digest_hex)?;
    let signed_payload = format!("v0:{timestamp}:{payload}");
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .context("failed to initialize slack HMAC verifier")?;
    mac.update(signed_payload.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| anyhow!("slack signature verification failed"))
}

fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("signature digest cannot be empty");
    }
    if !trimmed.len().is_multiple_of(2) {
        bail!("signature digest must have an even number of hex characters");
    }
    trimmed
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let hex = std::str::from_utf8(pair).context("invalid utf-8 in digest")?;
            u8::from_str_radix(hex, 16)
                .with_context(|| format!("invalid hex byte '{hex}' in signature digest"))
        })
        .collect()
}

fn validate_timestamp_skew(timestamp: &str, now_unix_ms: u64, max_skew_seconds: u64) -> Result<()> {
    let timestamp_seconds = timestamp
        .parse::<u64>()
        .with_context(|| format!("invalid slack request timestamp '{timestamp}'"))?;
    if max_skew_seconds == 0 {
        return Ok(());
    }
    let skew = (now_unix_ms / 1_000).abs_diff(timestamp_seconds);
    if skew > max_skew_seconds {
        bail!("slack request timestamp skew {skew}s exceeds max {max_skew_seconds}s");
    }
    Ok(())
}

pub(crate) fn current_unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or_default()
}

/// Produces the header value Slack would send; used by tests and tooling.
pub fn sign_slack_v0(payload: &str, timestamp: &str, secret: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .context("failed to initialize slack HMAC signer")?;
    mac.update(format!("v0:{timestamp}:{payload}").as_bytes());
    let digest = mac.finalize().into_bytes();
    let hex = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    Ok(format!("v0={hex}"))
}

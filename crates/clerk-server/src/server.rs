//! Webhook routes for build reports, merged pull requests and Slack button
//! callbacks.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use clerk_actions::{BuildEventService, PendingActionService, PullRequestEventService};
use clerk_core::{ActionTriggeredEvent, BuildReport, PullRequestMergedEvent};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::slack_signature::{SlackSigningConfig, SLACK_SIGNATURE_HEADER, SLACK_TIMESTAMP_HEADER};

pub const HOME_ENDPOINT: &str = "/";
pub const HEALTH_ENDPOINT: &str = "/health";
pub const BUILDS_ENDPOINT: &str = "/builds";
pub const PULL_REQUEST_MERGED_ENDPOINT: &str = "/pull-requests/merged";
pub const ACTIONS_ENDPOINT: &str = "/actions";
const ACTION_PAYLOAD_FIELD: &str = "payload";

const HOME_PAGE: &str = "<!doctype html>
<html>
<head><title>Build Clerk</title></head>
<body>
<h1>Build Clerk</h1>
<p>Watches CI build reports and offers remedial actions in Slack.</p>
<ul>
<li><code>POST /builds</code> build report JSON</li>
<li><code>POST /pull-requests/merged</code> merged pull request JSON</li>
<li><code>POST /actions</code> Slack interactive message callbacks</li>
<li><code>GET /health</code> liveness probe</li>
</ul>
</body>
</html>
";

#[derive(Clone)]
pub struct ClerkServerState {
    pub build_events: BuildEventService,
    pub pull_requests: PullRequestEventService,
    pub actions: PendingActionService,
    /// Action callbacks are accepted unsigned when `None`.
    pub slack_signing: Option<SlackSigningConfig>,
}

pub fn build_clerk_router(state: Arc<ClerkServerState>) -> Router {
    Router::new()
        .route(HOME_ENDPOINT, get(handle_home))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .route(BUILDS_ENDPOINT, post(handle_build_report))
        .route(PULL_REQUEST_MERGED_ENDPOINT, post(handle_pull_request_merged))
        .route(ACTIONS_ENDPOINT, post(handle_action_triggered))
        .with_state(state)
}

/// Serves until ctrl-c.
pub async fn serve(listener: TcpListener, state: Arc<ClerkServerState>) -> Result<()> {
    let app = build_clerk_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("clerk server exited unexpectedly")
}

async fn handle_home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn handle_health() -> &'static str {
    "ok"
}

async fn handle_build_report(State(state): State<Arc<ClerkServerState>>, body: String) -> Response {
    let report = match serde_json::from_str::<BuildReport>(&body) {
        Ok(report) => report,
        Err(error) => {
            warn!("cannot parse build report: {error}");
            return (StatusCode::BAD_REQUEST, "Cannot parse build report").into_response();
        }
    };
    debug!(report = %report, "received build report");
    let _ = state.build_events.check_build_report(report);
    StatusCode::OK.into_response()
}

async fn handle_pull_request_merged(
    State(state): State<Arc<ClerkServerState>>,
    body: String,
) -> Response {
    let event = match serde_json::from_str::<PullRequestMergedEvent>(&body) {
        Ok(event) => event,
        Err(error) => {
            warn!("cannot parse merged pull request webhook: {error}");
            return (StatusCode::BAD_REQUEST, "Cannot parse webhook").into_response();
        }
    };
    debug!(pull_request = event.number, "received merged pull request");
    let _ = state.pull_requests.check_pull_request(event);
    StatusCode::OK.into_response()
}

async fn handle_action_triggered(
    State(state): State<Arc<ClerkServerState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Some(signing) = state.slack_signing.as_ref() {
        let signature = header_value(&headers, SLACK_SIGNATURE_HEADER);
        let timestamp = header_value(&headers, SLACK_TIMESTAMP_HEADER);
        if let Err(error) = signing.verify(&body, signature, timestamp) {
            warn!("rejecting slack action callback: {error:#}");
            return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
        }
    }

    let event = match parse_action_payload(&body) {
        Ok(event) => event,
        Err(error) => {
            warn!("cannot parse action: {error:#}");
            return (StatusCode::BAD_REQUEST, "Cannot parse action").into_response();
        }
    };
    debug!(
        callback_id = event.callback_id.as_deref().unwrap_or_default(),
        user = event.user.id.as_str(),
        "received action trigger"
    );
    let _ = state.actions.handle_async(event);
    StatusCode::OK.into_response()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Extracts the JSON event from the form-encoded `payload` field.
pub fn parse_action_payload(body: &str) -> Result<ActionTriggeredEvent> {
    let payload = url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == ACTION_PAYLOAD_FIELD)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| anyhow!("missing '{ACTION_PAYLOAD_FIELD}' form field"))?;
    serde_json::from_str(&payload).context("invalid action payload json")
}

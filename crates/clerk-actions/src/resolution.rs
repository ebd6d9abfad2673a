//! Resolves user-trigger events against outstanding offers.

use std::sync::Arc;

use anyhow::{Context, Result};
use clerk_core::{
    ActionTriggeredEvent, NotificationService, PendingAction, PendingActionSet,
    SlackMessageAction, UpdatedNotificationMessage,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::executor::ActionExecutor;
use crate::registry::PendingActionRegistry;
use crate::rendering::{
    compose_attachments, dismissed_outcome_text, failed_outcome_text, selected_outcome_text,
    SelectedAction,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// How a failed remedial action is reported back to the user.
pub enum RemedialFailurePolicy {
    /// Log the failure and render the selection as if it succeeded.
    #[default]
    BestEffort,
    /// Render the failure and put a claimed exclusive offer back.
    ReportFailure,
}

impl RemedialFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestEffort => "best-effort",
            Self::ReportFailure => "report-failure",
        }
    }
}

impl std::fmt::Display for RemedialFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    MissingCallbackId,
    NoSelections,
    UnknownOffer,
    /// Another event claimed the offer first; the message is left to it.
    AlreadyResolved,
}

/// Which exclusive selection of the current event holds the offer.
#[derive(Debug, Default)]
struct OfferClaim {
    claimant: Option<String>,
    exclusive_succeeded: bool,
    lost: bool,
}

impl OfferClaim {
    fn held(&self) -> bool {
        self.claimant.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Discarded(DiscardReason),
    Resolved {
        selected: Vec<SelectedAction>,
        /// `None` when the original message carried no timestamp.
        update: Option<UpdatedNotificationMessage>,
    },
}

#[derive(Clone)]
/// Completes pending actions selected from chat.
pub struct PendingActionService {
    registry: Arc<PendingActionRegistry>,
    executor: ActionExecutor,
    notifier: Arc<dyn NotificationService>,
    failure_policy: RemedialFailurePolicy,
}

impl PendingActionService {
    pub fn new(
        registry: Arc<PendingActionRegistry>,
        executor: ActionExecutor,
        notifier: Arc<dyn NotificationService>,
        failure_policy: RemedialFailurePolicy,
    ) -> Self {
        Self {
            registry,
            executor,
            notifier,
            failure_policy,
        }
    }

    pub fn registry(&self) -> &Arc<PendingActionRegistry> {
        &self.registry
    }

    pub fn failure_policy(&self) -> RemedialFailurePolicy {
        self.failure_policy
    }

    pub fn enqueue(&self, set: PendingActionSet) {
        self.registry.enqueue(set);
    }

    /// Resolves the event on its own task; failures are logged, never returned.
    pub fn handle_async(&self, event: ActionTriggeredEvent) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(error) = service.handle(&event).await {
                error!(
                    callback_id = event.callback_id.as_deref().unwrap_or_default(),
                    "failed to handle action trigger: {error:#}"
                );
            }
        })
    }

    pub async fn handle(&self, event: &ActionTriggeredEvent) -> Result<ResolutionOutcome> {
        let Some(offer_id) = event.offer_id() else {
            warn!("discarding action trigger without callback id");
            return Ok(ResolutionOutcome::Discarded(DiscardReason::MissingCallbackId));
        };
        info!(callback_id = offer_id, "handling action trigger");

        let selections = event.selections();
        if selections.is_empty() {
            warn!(callback_id = offer_id, "no actions found in action trigger");
            return Ok(ResolutionOutcome::Discarded(DiscardReason::NoSelections));
        }

        let Some(snapshot) = self.registry.lookup(offer_id) else {
            warn!(callback_id = offer_id, "no pending action set found");
            return Ok(ResolutionOutcome::Discarded(DiscardReason::UnknownOffer));
        };
        debug!(
            callback_id = offer_id,
            actions = snapshot.len(),
            "found pending action set"
        );

        let mut claim = OfferClaim::default();
        let mut selected = Vec::with_capacity(selections.len());
        for selection in selections {
            let Some(action) = snapshot.find(&selection.name) else {
                warn!(
                    callback_id = offer_id,
                    action = selection.name.as_str(),
                    "no such action in pending action set"
                );
                continue;
            };
            if let Some(resolved) = self
                .resolve_selection(event, &snapshot, selection, action, &mut claim)
                .await
            {
                selected.push(resolved);
            }
        }

        if selected.is_empty() && claim.lost {
            warn!(
                callback_id = offer_id,
                "offer already resolved by another event; leaving message untouched"
            );
            return Ok(ResolutionOutcome::Discarded(DiscardReason::AlreadyResolved));
        }

        let original_attachments = event
            .original_message
            .attachments
            .as_deref()
            .unwrap_or_default();
        let attachments = compose_attachments(original_attachments, &selected);

        let Some(message_id) = event.original_message.ts.clone() else {
            warn!(
                callback_id = offer_id,
                "cannot update original message without a message timestamp"
            );
            return Ok(ResolutionOutcome::Resolved {
                selected,
                update: None,
            });
        };
        let update = UpdatedNotificationMessage {
            message_id,
            channel: event.channel.id.clone(),
            text: event.original_message.text.clone(),
            attachments,
        };
        self.notifier
            .update_message(&update)
            .await
            .with_context(|| format!("failed to update message for offer {offer_id}"))?;

        Ok(ResolutionOutcome::Resolved {
            selected,
            update: Some(update),
        })
    }

    async fn resolve_selection(
        &self,
        event: &ActionTriggeredEvent,
        snapshot: &Arc<PendingActionSet>,
        selection: &SlackMessageAction,
        action: &PendingAction,
        claim: &mut OfferClaim,
    ) -> Option<SelectedAction> {
        let offer_id = snapshot.id();
        let user_id = event.user.id.as_str();

        if selection.value.as_deref() != Some(action.name()) {
            info!(
                callback_id = offer_id,
                action = action.name(),
                value = selection.value.as_deref().unwrap_or_default(),
                "discarding pending action"
            );
            return Some(SelectedAction {
                action_name: action.name().to_string(),
                exclusive: action.exclusive(),
                outcome_text: dismissed_outcome_text(user_id, action.title()),
            });
        }

        if action.exclusive() {
            if !claim.held() {
                if !self.registry.retire(offer_id) {
                    warn!(
                        callback_id = offer_id,
                        action = action.name(),
                        "pending action set already resolved by another event"
                    );
                    claim.lost = true;
                    return None;
                }
                claim.claimant = Some(action.name().to_string());
            }
        } else if !claim.held() && !self.registry.contains(offer_id) {
            warn!(
                callback_id = offer_id,
                action = action.name(),
                "pending action set no longer registered"
            );
            claim.lost = true;
            return None;
        }

        match self.executor.execute(&event.channel.name, action).await {
            Ok(()) => {
                if action.exclusive() {
                    claim.exclusive_succeeded = true;
                }
                Some(SelectedAction {
                    action_name: action.name().to_string(),
                    exclusive: action.exclusive(),
                    outcome_text: selected_outcome_text(user_id, action.title()),
                })
            }
            Err(error) => {
                error!(
                    callback_id = offer_id,
                    action = action.name(),
                    policy = self.failure_policy.as_str(),
                    "pending action failed: {error:#}"
                );
                match self.failure_policy {
                    RemedialFailurePolicy::BestEffort => Some(SelectedAction {
                        action_name: action.name().to_string(),
                        exclusive: action.exclusive(),
                        outcome_text: selected_outcome_text(user_id, action.title()),
                    }),
                    RemedialFailurePolicy::ReportFailure => {
                        // Only the claimant gives the offer back, and only while
                        // no exclusive action of this event has gone through.
                        let is_claimant = claim.claimant.as_deref() == Some(action.name());
                        if action.exclusive() && is_claimant && !claim.exclusive_succeeded {
                            self.registry.restore(Arc::clone(snapshot));
                            claim.claimant = None;
                        }
                        Some(SelectedAction {
                            action_name: action.name().to_string(),
                            exclusive: false,
                            outcome_text: failed_outcome_text(
                                user_id,
                                action.title(),
                                &format!("{error:#}"),
                            ),
                        })
                    }
                }
            }
        }
    }
}

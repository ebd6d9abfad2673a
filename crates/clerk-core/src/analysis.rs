use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pending_action::{Color, PendingAction, PendingActionError, PendingActionSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A timestamped line in an analysis log.
pub struct AnalysisEvent {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub channel: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of evaluating one build report against the rules.
pub struct Analysis {
    name: String,
    branch: String,
    events: Vec<AnalysisEvent>,
    action_set: PendingActionSet,
    notification: Option<NotificationTarget>,
}

impl Analysis {
    pub fn new(name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: branch.into(),
            events: Vec::new(),
            action_set: PendingActionSet::new(),
            notification: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn events(&self) -> &[AnalysisEvent] {
        &self.events
    }

    pub fn action_set(&self) -> &PendingActionSet {
        &self.action_set
    }

    pub fn notification(&self) -> Option<&NotificationTarget> {
        self.notification.as_ref()
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.events.push(AnalysisEvent {
            timestamp: Utc::now(),
            message: message.into(),
        });
    }

    pub fn recommend(&mut self, action: PendingAction) -> Result<(), PendingActionError> {
        self.log(format!("Recommended action: {}", action.describe()));
        self.action_set.add(action)
    }

    pub fn notify(&mut self, channel: impl Into<String>, color: Color) {
        self.notification = Some(NotificationTarget {
            channel: channel.into(),
            color,
        });
    }

    /// True when no action was proposed.
    pub fn is_empty(&self) -> bool {
        self.action_set.is_empty()
    }

    /// The event log rendered one line per event.
    pub fn describe(&self) -> String {
        self.events
            .iter()
            .map(|event| event.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

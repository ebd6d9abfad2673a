//! Slack interactive-message payloads delivered when a user clicks a button.

use serde::{Deserialize, Serialize};

use crate::notification::{MessageAction, MessageAttachment, BUTTON_ACTION_TYPE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A button, either as rendered in a message or as selected by a user.
///
/// Selections only carry `name`, `type` and `value`.
pub struct SlackMessageAction {
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl SlackMessageAction {
    pub fn to_message_action(&self) -> MessageAction {
        MessageAction {
            name: self.name.clone(),
            text: self.text.clone().unwrap_or_else(|| self.name.clone()),
            value: self.value.clone().unwrap_or_default(),
            action_type: self
                .action_type
                .clone()
                .unwrap_or_else(|| BUTTON_ACTION_TYPE.to_string()),
            style: self.style.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackMessageAttachment {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub callback_id: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<SlackMessageAction>>,
}

impl SlackMessageAttachment {
    pub fn has_actions(&self) -> bool {
        self.actions
            .as_ref()
            .is_some_and(|actions| !actions.is_empty())
    }

    pub fn to_message_attachment(&self, actions: Vec<MessageAction>) -> MessageAttachment {
        MessageAttachment {
            text: self.text.clone(),
            title: self.title.clone(),
            fallback: self.fallback.clone(),
            color: self.color.clone(),
            callback_id: self.callback_id.clone(),
            actions,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackOriginalMessage {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Option<Vec<SlackMessageAttachment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Inbound user-trigger event; `callback_id` is the offer id.
pub struct ActionTriggeredEvent {
    #[serde(default)]
    pub callback_id: Option<String>,
    pub channel: SlackChannel,
    pub user: SlackUser,
    #[serde(default)]
    pub actions: Option<Vec<SlackMessageAction>>,
    #[serde(default)]
    pub original_message: SlackOriginalMessage,
}

impl ActionTriggeredEvent {
    /// The offer id as sent, if present and non-blank.
    pub fn offer_id(&self) -> Option<&str> {
        self.callback_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn selections(&self) -> &[SlackMessageAction] {
        self.actions.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ActionTriggeredEvent;

    #[test]
    fn unit_action_triggered_event_parses_interactive_message_payload() {
        let event: ActionTriggeredEvent = serde_json::from_value(json!({
            "type": "interactive_message",
            "callback_id": "offer-1",
            "team": { "id": "T1", "domain": "example" },
            "channel": { "id": "C1", "name": "builds" },
            "user": { "id": "U1", "name": "alice" },
            "action_ts": "1.5",
            "message_ts": "1.2",
            "actions": [{ "name": "rebuild", "type": "button", "value": "rebuild" }],
            "original_message": {
                "type": "message",
                "text": "Build failed",
                "ts": "1.2",
                "attachments": [
                    { "id": 1, "text": "log" },
                    {
                        "id": 2,
                        "callback_id": "offer-1",
                        "text": "Would you like to rebuild branch main?",
                        "actions": [
                            { "id": "1", "name": "rebuild", "text": "Rebuild branch", "type": "button", "value": "rebuild", "style": "primary" },
                            { "id": "2", "name": "rebuild", "text": "Dismiss", "type": "button", "value": "dismiss" }
                        ]
                    }
                ]
            }
        }))
        .expect("parse event");

        assert_eq!(event.offer_id(), Some("offer-1"));
        assert_eq!(event.channel.name, "builds");
        assert_eq!(event.selections().len(), 1);
        assert_eq!(event.selections()[0].value.as_deref(), Some("rebuild"));
        assert_eq!(event.original_message.ts.as_deref(), Some("1.2"));
        let attachments = event.original_message.attachments.expect("attachments");
        assert!(!attachments[0].has_actions());
        assert!(attachments[1].has_actions());
        let rendered = attachments[1].actions.as_ref().expect("actions")[0].to_message_action();
        assert_eq!(rendered.text, "Rebuild branch");
        assert_eq!(rendered.style.as_deref(), Some("primary"));
    }

    #[test]
    fn regression_blank_callback_id_is_treated_as_missing() {
        let event: ActionTriggeredEvent = serde_json::from_value(json!({
            "callback_id": "  ",
            "channel": { "id": "C1" },
            "user": { "id": "U1" }
        }))
        .expect("parse event");
        assert_eq!(event.offer_id(), None);
        assert!(event.selections().is_empty());
        assert!(event.original_message.ts.is_none());
    }

    #[test]
    fn regression_callback_id_is_not_trimmed_for_lookup() {
        let event: ActionTriggeredEvent = serde_json::from_value(json!({
            "callback_id": " offer-1 ",
            "channel": { "id": "C1" },
            "user": { "id": "U1" }
        }))
        .expect("parse event");
        assert_eq!(event.offer_id(), Some(" offer-1 "));
    }
}

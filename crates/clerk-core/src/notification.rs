use serde::{Deserialize, Serialize};

pub const BUTTON_ACTION_TYPE: &str = "button";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A selectable button inside a message attachment.
pub struct MessageAction {
    pub name: String,
    pub text: String,
    pub value: String,
    #[serde(rename = "type", default = "default_action_type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

fn default_action_type() -> String {
    BUTTON_ACTION_TYPE.to_string()
}

impl MessageAction {
    pub fn button(
        name: impl Into<String>,
        text: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            value: value.into(),
            action_type: default_action_type(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// One attachment block of a chat message.
pub struct MessageAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<MessageAction>,
}

impl MessageAttachment {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Replacement content for a previously posted message.
pub struct UpdatedNotificationMessage {
    pub message_id: String,
    pub channel: String,
    pub text: String,
    pub attachments: Vec<MessageAttachment>,
}

use clerk_core::{Analysis, Color, MessageAction, MessageAttachment};

pub const DISMISS_VALUE: &str = "dismiss";
const DISMISS_TEXT: &str = "Dismiss";
const PRIMARY_STYLE: &str = "primary";

pub fn analysis_summary(analysis: &Analysis) -> String {
    format!("{} on branch {}", analysis.name(), analysis.branch())
}

/// The log attachment followed by one button group per proposed action.
///
/// Each group carries the offer id as `callback_id`; both buttons share the
/// action name and differ only in value.
pub fn analysis_attachments(analysis: &Analysis, color: Color) -> Vec<MessageAttachment> {
    let mut attachments = Vec::with_capacity(analysis.action_set().len() + 1);
    let log = analysis.describe();
    if !log.is_empty() {
        attachments.push(MessageAttachment {
            text: Some(log.clone()),
            fallback: Some(log),
            color: Some(color.hex_code().to_string()),
            ..MessageAttachment::default()
        });
    }

    let offer_id = analysis.action_set().id();
    attachments.extend(analysis.action_set().actions().iter().map(|action| {
        let prompt = format!("Would you like to {}?", action.describe());
        MessageAttachment {
            text: Some(prompt.clone()),
            fallback: Some(prompt),
            color: Some(color.hex_code().to_string()),
            callback_id: Some(offer_id.to_string()),
            actions: vec![
                MessageAction::button(action.name(), action.title(), action.name())
                    .with_style(PRIMARY_STYLE),
                MessageAction::button(action.name(), DISMISS_TEXT, DISMISS_VALUE),
            ],
            ..MessageAttachment::default()
        }
    }));
    attachments
}

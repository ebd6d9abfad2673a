//! Recomputes a posted message's attachments after selections resolve.

use clerk_core::{MessageAction, MessageAttachment, SlackMessageAction, SlackMessageAttachment};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A resolved selection, rendered in place of its buttons.
pub struct SelectedAction {
    pub action_name: String,
    pub exclusive: bool,
    pub outcome_text: String,
}

pub(crate) fn selected_outcome_text(user_id: &str, title: &str) -> String {
    format!(":white_check_mark: <@{user_id}> selected '{title}'")
}

pub(crate) fn dismissed_outcome_text(user_id: &str, title: &str) -> String {
    format!(":-1: <@{user_id}> dismissed suggested action: '{title}'")
}

pub(crate) fn failed_outcome_text(user_id: &str, title: &str, error: &str) -> String {
    format!(":warning: <@{user_id}> selected '{title}' but it failed: {error}")
}

/// Builds the replacement attachment list.
///
/// Informational attachments pass through; an exclusive selection drops every
/// attachment carrying buttons; otherwise attachments holding a selected
/// button are dropped and the rest lose any selected buttons. One outcome
/// attachment per selection is appended in resolution order.
pub fn compose_attachments(
    original: &[SlackMessageAttachment],
    selected: &[SelectedAction],
) -> Vec<MessageAttachment> {
    let any_exclusive = selected.iter().any(|action| action.exclusive);

    let mut attachments = original
        .iter()
        .filter_map(|attachment| {
            let actions = match attachment.actions.as_deref() {
                Some(actions) if !actions.is_empty() => actions,
                _ => return Some(attachment.to_message_attachment(Vec::new())),
            };
            if any_exclusive || is_attachment_action_selected(actions, selected) {
                return None;
            }
            Some(attachment.to_message_attachment(filter_unselected_actions(actions, selected)))
        })
        .collect::<Vec<_>>();

    attachments.extend(
        selected
            .iter()
            .map(|action| MessageAttachment::text_only(action.outcome_text.clone())),
    );
    attachments
}

fn is_selected(name: &str, selected: &[SelectedAction]) -> bool {
    selected.iter().any(|action| action.action_name == name)
}

fn is_attachment_action_selected(
    actions: &[SlackMessageAction],
    selected: &[SelectedAction],
) -> bool {
    actions
        .iter()
        .any(|action| is_selected(&action.name, selected))
}

fn filter_unselected_actions(
    actions: &[SlackMessageAction],
    selected: &[SelectedAction],
) -> Vec<MessageAction> {
    actions
        .iter()
        .filter(|action| !is_selected(&action.name, selected))
        .map(SlackMessageAction::to_message_action)
        .collect()
}

#[cfg(test)]
mod tests {
    use clerk_core::{MessageAttachment, SlackMessageAction, SlackMessageAttachment};

    use super::{compose_attachments, dismissed_outcome_text, selected_outcome_text, SelectedAction};

    fn button(name: &str, value: &str) -> SlackMessageAction {
        SlackMessageAction {
            name: name.to_string(),
            text: Some(name.to_string()),
            value: Some(value.to_string()),
            action_type: Some("button".to_string()),
            style: None,
        }
    }

    fn menu_attachment(text: &str, actions: Vec<SlackMessageAction>) -> SlackMessageAttachment {
        SlackMessageAttachment {
            text: Some(text.to_string()),
            callback_id: Some("X".to_string()),
            actions: Some(actions),
            ..SlackMessageAttachment::default()
        }
    }

    fn info_attachment(text: &str) -> SlackMessageAttachment {
        SlackMessageAttachment {
            text: Some(text.to_string()),
            ..SlackMessageAttachment::default()
        }
    }

    fn selection(name: &str, exclusive: bool) -> SelectedAction {
        SelectedAction {
            action_name: name.to_string(),
            exclusive,
            outcome_text: selected_outcome_text("U1", name),
        }
    }

    fn original() -> Vec<SlackMessageAttachment> {
        vec![
            info_attachment("build log"),
            menu_attachment("rebuild?", vec![button("rebuild", "rebuild"), button("rebuild", "dismiss")]),
            menu_attachment("info?", vec![button("info", "info")]),
        ]
    }

    #[test]
    fn unit_no_selection_keeps_layout() {
        let composed = compose_attachments(&original(), &[]);
        assert_eq!(composed.len(), 3);
        assert_eq!(composed[1].actions.len(), 2);
        assert_eq!(composed[2].actions[0].name, "info");
    }

    #[test]
    fn functional_exclusive_selection_drops_every_menu_attachment() {
        let composed = compose_attachments(&original(), &[selection("rebuild", true)]);
        assert_eq!(
            composed,
            vec![
                MessageAttachment::text_only("build log"),
                MessageAttachment::text_only(selected_outcome_text("U1", "rebuild")),
            ]
        );
    }

    #[test]
    fn functional_non_exclusive_selection_keeps_other_menus_live() {
        let composed = compose_attachments(&original(), &[selection("info", false)]);
        assert_eq!(composed.len(), 3);
        assert_eq!(composed[0].text.as_deref(), Some("build log"));
        assert_eq!(composed[1].text.as_deref(), Some("rebuild?"));
        assert_eq!(composed[1].actions.len(), 2);
        assert_eq!(
            composed[2].text.as_deref(),
            Some(selected_outcome_text("U1", "info").as_str())
        );
        assert!(composed[2].actions.is_empty());
    }

    #[test]
    fn regression_shared_attachment_loses_only_selected_buttons_elsewhere() {
        let attachments = vec![
            menu_attachment("a?", vec![button("a", "a")]),
            menu_attachment("mixed", vec![button("b", "b"), button("c", "c")]),
        ];
        let selected = vec![SelectedAction {
            action_name: "a".to_string(),
            exclusive: false,
            outcome_text: dismissed_outcome_text("U1", "A"),
        }];
        let composed = compose_attachments(&attachments, &selected);
        assert_eq!(composed.len(), 2);
        assert_eq!(composed[0].text.as_deref(), Some("mixed"));
        let names = composed[0]
            .actions
            .iter()
            .map(|action| action.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn unit_outcomes_append_in_resolution_order() {
        let selected = vec![selection("info", false), selection("rebuild", false)];
        let composed = compose_attachments(&original(), &selected);
        let texts = composed
            .iter()
            .map(|attachment| attachment.text.clone().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(
            texts,
            vec![
                "build log".to_string(),
                selected_outcome_text("U1", "info"),
                selected_outcome_text("U1", "rebuild"),
            ]
        );
    }

    #[test]
    fn regression_compose_is_deterministic_for_identical_inputs() {
        let selected = vec![selection("info", false)];
        assert_eq!(
            compose_attachments(&original(), &selected),
            compose_attachments(&original(), &selected)
        );
    }

    #[test]
    fn regression_empty_action_list_is_treated_as_informational() {
        let attachments = vec![SlackMessageAttachment {
            text: Some("empty".to_string()),
            actions: Some(Vec::new()),
            ..SlackMessageAttachment::default()
        }];
        let composed = compose_attachments(&attachments, &[selection("rebuild", true)]);
        assert_eq!(composed[0], MessageAttachment::text_only("empty"));
    }
}

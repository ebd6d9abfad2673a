//! Closed catalog of remedial actions offered to a human after an analysis.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::build_report::BuildReport;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `Color` values for chat attachments.
pub enum Color {
    #[default]
    Black,
    Green,
    Amber,
    Red,
    Grey,
}

impl Color {
    pub fn hex_code(&self) -> &'static str {
        match self {
            Self::Black => "#000000",
            Self::Green => "#36a64f",
            Self::Amber => "#ffbf00",
            Self::Red => "#ff0000",
            Self::Grey => "#808080",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevertCommitAction {
    pub commit: String,
    pub branch: String,
    pub exclusive: bool,
}

impl RevertCommitAction {
    pub fn new(commit: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            branch: branch.into(),
            exclusive: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebuildBranchAction {
    pub report: BuildReport,
    pub exclusive: bool,
}

impl RebuildBranchAction {
    pub fn new(report: BuildReport) -> Self {
        Self {
            report,
            exclusive: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockBranchAction {
    pub branch: String,
    pub exclusive: bool,
}

impl LockBranchAction {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            exclusive: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Informational action: executing it posts `body` to a channel.
///
/// Unlike the other variants the name is caller-chosen, so several text
/// actions can be offered side by side.
pub struct ShowTextAction {
    pub name: String,
    pub title: String,
    pub body: String,
    pub color: Color,
    pub channel_name: Option<String>,
    pub exclusive: bool,
}

impl ShowTextAction {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        color: Color,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            body: body.into(),
            color,
            channel_name: None,
            exclusive: false,
        }
    }

    pub fn with_channel(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = Some(channel_name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Enumerates supported `PendingAction` values.
pub enum PendingAction {
    RevertCommit(RevertCommitAction),
    RebuildBranch(RebuildBranchAction),
    LockBranch(LockBranchAction),
    ShowText(ShowTextAction),
}

impl PendingAction {
    /// Stable identifier, unique within one action set.
    pub fn name(&self) -> &str {
        match self {
            Self::RevertCommit(_) => "revert",
            Self::RebuildBranch(_) => "rebuild",
            Self::LockBranch(_) => "lock",
            Self::ShowText(action) => &action.name,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::RevertCommit(_) => "Revert commit",
            Self::RebuildBranch(_) => "Rebuild branch",
            Self::LockBranch(_) => "Lock branch",
            Self::ShowText(action) => &action.title,
        }
    }

    /// Lowercase so it reads inside a sentence ("Would you like to ...?").
    pub fn describe(&self) -> String {
        match self {
            Self::RevertCommit(action) => format!(
                "revert commit {} from branch {}",
                short_commit(&action.commit),
                action.branch
            ),
            Self::RebuildBranch(action) => {
                format!("rebuild branch {}", action.report.branch())
            }
            Self::LockBranch(action) => format!("lock branch {}", action.branch),
            Self::ShowText(action) => format!("see {}", action.title.to_lowercase()),
        }
    }

    /// Selecting an exclusive action invalidates every other action in its set.
    pub fn exclusive(&self) -> bool {
        match self {
            Self::RevertCommit(action) => action.exclusive,
            Self::RebuildBranch(action) => action.exclusive,
            Self::LockBranch(action) => action.exclusive,
            Self::ShowText(action) => action.exclusive,
        }
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PendingActionError {
    #[error("action '{name}' is already present in pending action set {set_id}")]
    DuplicateActionName { set_id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An offer: a uniquely identified, ordered menu of pending actions.
pub struct PendingActionSet {
    id: String,
    actions: Vec<PendingAction>,
}

impl Default for PendingActionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingActionSet {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            actions: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn actions(&self) -> &[PendingAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&PendingAction> {
        self.actions.iter().find(|action| action.name() == name)
    }

    pub fn add(&mut self, action: PendingAction) -> Result<(), PendingActionError> {
        if self.find(action.name()).is_some() {
            return Err(PendingActionError::DuplicateActionName {
                set_id: self.id.clone(),
                name: action.name().to_string(),
            });
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(PendingAction::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Color, LockBranchAction, PendingAction, PendingActionError, PendingActionSet,
        RevertCommitAction, ShowTextAction,
    };

    #[test]
    fn unit_pending_action_exposes_catalog_names_and_descriptions() {
        let revert = PendingAction::RevertCommit(RevertCommitAction::new(
            "0123456789abcdef",
            "main",
        ));
        assert_eq!(revert.name(), "revert");
        assert_eq!(revert.title(), "Revert commit");
        assert_eq!(revert.describe(), "revert commit 01234567 from branch main");
        assert!(revert.exclusive());

        let lock = PendingAction::LockBranch(LockBranchAction::new("main"));
        assert_eq!(lock.name(), "lock");
        assert_eq!(lock.describe(), "lock branch main");

        let text = PendingAction::ShowText(ShowTextAction::new(
            "last_good",
            "Last good commit",
            "abc",
            Color::Green,
        ));
        assert_eq!(text.name(), "last_good");
        assert_eq!(text.describe(), "see last good commit");
        assert!(!text.exclusive());
    }

    #[test]
    fn unit_pending_action_set_generates_distinct_ids() {
        let first = PendingActionSet::new();
        let second = PendingActionSet::new();
        assert_ne!(first.id(), second.id());
        assert!(first.is_empty());
    }

    #[test]
    fn regression_pending_action_set_rejects_duplicate_names() {
        let mut set = PendingActionSet::with_id("offer-1");
        set.add(PendingAction::LockBranch(LockBranchAction::new("main")))
            .expect("first lock");
        let error = set
            .add(PendingAction::LockBranch(LockBranchAction::new("release")))
            .expect_err("duplicate lock");
        assert_eq!(
            error,
            PendingActionError::DuplicateActionName {
                set_id: "offer-1".to_string(),
                name: "lock".to_string(),
            }
        );
        assert_eq!(set.action_names(), vec!["lock"]);
    }

    #[test]
    fn unit_color_hex_codes() {
        assert_eq!(Color::default().hex_code(), "#000000");
        assert_eq!(Color::Red.hex_code(), "#ff0000");
    }
}

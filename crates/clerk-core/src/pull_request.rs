use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Source-control notification that a pull request was merged.
pub struct PullRequestMergedEvent {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub merged_by: Option<String>,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(default)]
    pub merge_commit: Option<String>,
}

impl PullRequestMergedEvent {
    pub fn describe(&self) -> String {
        let mut line = format!("Pull request #{}", self.number);
        if let Some(title) = self.title.as_deref().filter(|value| !value.trim().is_empty()) {
            line.push_str(&format!(" '{}'", title.trim()));
        }
        line.push_str(&format!(
            " merged from {} into {}",
            self.source_branch, self.target_branch
        ));
        if let Some(merged_by) = self.merged_by.as_deref() {
            line.push_str(&format!(" by {merged_by}"));
        }
        line
    }
}

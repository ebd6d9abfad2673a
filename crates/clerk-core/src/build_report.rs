use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Enumerates supported `BuildStatus` values.
pub enum BuildStatus {
    Success,
    Failed,
    Unstable,
    Aborted,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Unstable => "UNSTABLE",
            Self::Aborted => "ABORTED",
        }
    }

    /// Failed and unstable builds both count against a branch.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Unstable)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scm {
    pub branch: String,
    pub commit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildDetails {
    pub number: u64,
    pub status: BuildStatus,
    pub scm: Scm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A single CI build result as posted by the build system.
///
/// `url` is the job path relative to the build server root (for example
/// `job/service/`); it is what a rebuild is triggered against.
pub struct BuildReport {
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub build: BuildDetails,
}

impl BuildReport {
    pub fn branch(&self) -> &str {
        &self.build.scm.branch
    }

    pub fn commit(&self) -> &str {
        &self.build.scm.commit
    }

    pub fn number(&self) -> u64 {
        self.build.number
    }

    pub fn status(&self) -> BuildStatus {
        self.build.status
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} [branch={} commit={} status={}]",
            self.name,
            self.build.number,
            self.build.scm.branch,
            self.build.scm.commit,
            self.build.status
        )
    }
}

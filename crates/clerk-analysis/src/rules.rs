use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL: &str = "#builds";
pub const DEFAULT_LOCK_THRESHOLD: usize = 3;
pub const DEFAULT_MAX_REBUILDS_PER_COMMIT: usize = 1;

/// Thresholds deciding which remedial actions an analysis proposes.
///
/// Loaded from TOML; every key is optional:
///
/// ```toml
/// channel = "#builds"
/// lock-threshold = 3
/// max-rebuilds-per-commit = 1
/// notify-recovery = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalysisRules {
    pub channel: String,
    /// Consecutive branch failures before locking is proposed; `0` disables.
    pub lock_threshold: usize,
    pub max_rebuilds_per_commit: usize,
    pub notify_recovery: bool,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            lock_threshold: DEFAULT_LOCK_THRESHOLD,
            max_rebuilds_per_commit: DEFAULT_MAX_REBUILDS_PER_COMMIT,
            notify_recovery: true,
        }
    }
}

impl AnalysisRules {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis rules {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid analysis rules {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let rules: Self = toml::from_str(contents)?;
        if rules.channel.trim().is_empty() {
            anyhow::bail!("channel must not be empty");
        }
        Ok(rules)
    }

    pub fn lock_enabled(&self) -> bool {
        self.lock_threshold > 0
    }
}

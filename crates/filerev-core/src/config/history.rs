//! Version-history behavior configuration.

use serde::{Deserialize, Serialize};

/// Settings governing diff presentation and the tombstone recovery window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of unchanged context lines shown around each change in a hunk.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    /// How long a soft-deleted version remains recoverable before purge.
    #[serde(default = "default_retention_days")]
    pub tombstone_retention_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            tombstone_retention_days: default_retention_days(),
        }
    }
}

fn default_context_lines() -> usize {
    3
}

fn default_retention_days() -> u32 {
    30
}

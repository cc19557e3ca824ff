//! The closed set of reasons a version record can exist.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a version was recorded.
///
/// Modeled as a closed enumeration (backed by the `change_type` Postgres
/// enum) so that invalid change kinds cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "change_type", rename_all = "kebab-case")]
pub enum ChangeType {
    /// Ordinary content edit.
    Edit,
    /// File was renamed (content may be unchanged).
    Rename,
    /// Content was restored from an earlier version.
    Restore,
    /// Automatic snapshot of the live content taken just before a restore.
    PreRestore,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Rename => write!(f, "rename"),
            Self::Restore => write!(f, "restore"),
            Self::PreRestore => write!(f, "pre-restore"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ChangeType::PreRestore).expect("serialize");
        assert_eq!(json, "\"pre-restore\"");
        let parsed: ChangeType = serde_json::from_str("\"restore\"").expect("deserialize");
        assert_eq!(parsed, ChangeType::Restore);
    }
}

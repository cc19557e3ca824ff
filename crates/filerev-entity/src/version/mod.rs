//! Version-history domain entities.

pub mod change;
pub mod model;
pub mod snapshot;

pub use change::ChangeType;
pub use model::{Version, VersionContent, VersionSummary};
pub use snapshot::{content_hash, count_lines, VersionDraft};

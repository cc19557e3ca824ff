//! # filerev-diff
//!
//! Pure line-level diff engine. Computes an edit script between two text
//! blobs using exact LCS dynamic programming below a cell budget and a
//! set-membership fallback above it, groups the script into hunks with
//! bounded context, and derives aggregate change statistics.
//!
//! Everything in this crate is a side-effect-free function over its
//! inputs; calls are safe to run concurrently from any worker thread.

pub mod engine;
pub mod hunk;
pub mod line;
pub mod report;
pub mod stats;

pub use engine::{MAX_LCS_CELLS, diff_lines};
pub use hunk::{Hunk, group_hunks};
pub use line::{DiffLine, LineKind};
pub use report::{DiffReport, diff_report};
pub use stats::line_delta;

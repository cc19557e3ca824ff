//! Full diff assembly: edit script, hunks, and aggregate totals.

use serde::{Deserialize, Serialize};

use crate::engine::{MAX_LCS_CELLS, lcs_diff, set_diff, split_lines};
use crate::hunk::{Hunk, group_hunks};
use crate::line::LineKind;

/// A complete diff between two text blobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    /// The grouped hunks, in document order.
    pub hunks: Vec<Hunk>,
    /// Total number of added lines.
    pub total_added: usize,
    /// Total number of removed lines.
    pub total_removed: usize,
    /// Number of lines counted as modified: `min(added, removed)`.
    pub total_modified: usize,
}

/// Diff two text blobs and group the result into hunks.
///
/// Below the LCS cell budget this is the exact diff; above it, the
/// set-membership fallback produces a single whole-file hunk (or none at
/// all when the two line sets are identical).
pub fn diff_report(old: &str, new: &str, context_size: usize) -> DiffReport {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let hunks = if old_lines.len() * new_lines.len() > MAX_LCS_CELLS {
        let lines = set_diff(&old_lines, &new_lines);
        if lines.is_empty() {
            Vec::new()
        } else {
            vec![Hunk {
                old_start: 1,
                old_count: old_lines.len(),
                new_start: 1,
                new_count: new_lines.len(),
                lines,
            }]
        }
    } else {
        group_hunks(lcs_diff(&old_lines, &new_lines), context_size)
    };

    let mut total_added = 0;
    let mut total_removed = 0;
    for line in hunks.iter().flat_map(|h| &h.lines) {
        match line.kind {
            LineKind::Add => total_added += 1,
            LineKind::Remove => total_removed += 1,
            LineKind::Context => {}
        }
    }

    DiffReport {
        hunks,
        total_added,
        total_removed,
        total_modified: total_added.min(total_removed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::DiffLine;

    #[test]
    fn test_concrete_scenario_totals() {
        let report = diff_report("a\nb\nc", "a\nx\nc", 3);
        assert_eq!(report.hunks.len(), 1);
        assert_eq!(report.total_added, 1);
        assert_eq!(report.total_removed, 1);
        assert_eq!(report.total_modified, 1);
        assert_eq!(
            report.hunks[0].lines,
            vec![
                DiffLine::context("a", 1, 1),
                DiffLine::remove("b", 2),
                DiffLine::add("x", 2),
                DiffLine::context("c", 3, 3),
            ]
        );
    }

    #[test]
    fn test_identical_inputs_have_empty_report() {
        let report = diff_report("same\ntext", "same\ntext", 3);
        assert!(report.hunks.is_empty());
        assert_eq!(report.total_added, 0);
        assert_eq!(report.total_removed, 0);
        assert_eq!(report.total_modified, 0);
    }

    #[test]
    fn test_pure_addition_has_zero_modified() {
        let report = diff_report("a", "a\nb\nc", 3);
        assert_eq!(report.total_added, 2);
        assert_eq!(report.total_removed, 0);
        assert_eq!(report.total_modified, 0);
    }

    #[test]
    fn test_symmetry_of_totals() {
        let a = "one\ntwo\nthree";
        let b = "one\n2\n3\nfour";
        let forward = diff_report(a, b, 3);
        let backward = diff_report(b, a, 3);
        assert_eq!(forward.total_added, backward.total_removed);
        assert_eq!(forward.total_removed, backward.total_added);
    }

    #[test]
    fn test_fallback_produces_single_whole_file_hunk() {
        let old: String = (0..4000)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let new: String = (0..3000)
            .map(|i| format!("row-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let report = diff_report(&old, &new, 3);
        assert_eq!(report.hunks.len(), 1);
        assert_eq!(report.hunks[0].old_start, 1);
        assert_eq!(report.hunks[0].old_count, 4000);
        assert_eq!(report.hunks[0].new_count, 3000);
        assert_eq!(report.total_added, 3000);
        assert_eq!(report.total_removed, 4000);
        assert!(
            report.hunks[0]
                .lines
                .iter()
                .all(|l| l.kind != LineKind::Context)
        );
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let report = diff_report("a", "b", 3);
        let json = serde_json::to_value(&report).expect("serialize");
        let line = &json["hunks"][0]["lines"][0];
        assert_eq!(line["type"], "remove");
        assert_eq!(line["old_line"], 1);
        assert!(line.get("new_line").is_none());
    }
}

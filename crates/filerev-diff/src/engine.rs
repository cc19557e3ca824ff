//! Edit-script computation: exact LCS below the cell budget, set-membership
//! fallback above it.

use tracing::debug;

use crate::line::{DiffLine, LineKind};

/// Upper bound on the LCS table size (`m * n` cells). Above this the engine
/// switches to the set-membership fallback so a single diff call never
/// allocates more than roughly 4 bytes per cell.
pub const MAX_LCS_CELLS: usize = 10_000_000;

/// Split content into lines the way the edit script counts them.
///
/// An empty string yields one empty line, so two empty inputs diff as a
/// single context line rather than as nothing at all.
pub(crate) fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Compute the flat edit script between two text blobs.
///
/// Below [`MAX_LCS_CELLS`] this is the exact LCS diff; above it, the
/// fallback reports lines absent from the other side with no context lines
/// and no interleaved ordering.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    if old_lines.len() * new_lines.len() > MAX_LCS_CELLS {
        set_diff(&old_lines, &new_lines)
    } else {
        lcs_diff(&old_lines, &new_lines)
    }
}

/// Exact diff via longest-common-subsequence dynamic programming.
///
/// Builds the `(m+1) x (n+1)` score table, then backtracks from `(m, n)`.
/// On equal scores the backtrack prefers emitting an `add`; this tie-break
/// is part of the output contract and must not change.
pub(crate) fn lcs_diff(old_lines: &[&str], new_lines: &[&str]) -> Vec<DiffLine> {
    let m = old_lines.len();
    let n = new_lines.len();

    // Flat (m+1) x (n+1) table, row-major.
    let width = n + 1;
    let mut dp = vec![0u32; (m + 1) * width];

    for i in 1..=m {
        for j in 1..=n {
            dp[i * width + j] = if old_lines[i - 1] == new_lines[j - 1] {
                dp[(i - 1) * width + (j - 1)] + 1
            } else {
                dp[(i - 1) * width + j].max(dp[i * width + (j - 1)])
            };
        }
    }

    let mut lines = Vec::new();
    let mut i = m;
    let mut j = n;

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_lines[i - 1] == new_lines[j - 1] {
            lines.push(DiffLine::context(old_lines[i - 1], i, j));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i * width + (j - 1)] >= dp[(i - 1) * width + j]) {
            lines.push(DiffLine::add(new_lines[j - 1], j));
            j -= 1;
        } else {
            lines.push(DiffLine::remove(old_lines[i - 1], i));
            i -= 1;
        }
    }

    lines.reverse();
    lines
}

/// O(m+n) fallback for inputs exceeding the LCS cell budget.
///
/// A line present in old but absent anywhere in new is a removal; a line
/// present in new but absent anywhere in old is an addition. Lines common
/// to both sides are omitted entirely. This trades positional precision
/// for bounded memory on pathological inputs.
pub(crate) fn set_diff(old_lines: &[&str], new_lines: &[&str]) -> Vec<DiffLine> {
    use std::collections::HashSet;

    debug!(
        old_lines = old_lines.len(),
        new_lines = new_lines.len(),
        "diff input exceeds LCS cell budget, using set-membership fallback"
    );

    let old_set: HashSet<&str> = old_lines.iter().copied().collect();
    let new_set: HashSet<&str> = new_lines.iter().copied().collect();

    let mut lines = Vec::new();

    for (i, line) in old_lines.iter().enumerate() {
        if !new_set.contains(line) {
            lines.push(DiffLine::remove(*line, i + 1));
        }
    }

    for (i, line) in new_lines.iter().enumerate() {
        if !old_set.contains(line) {
            lines.push(DiffLine::add(*line, i + 1));
        }
    }

    lines
}

/// Whether a pair of inputs would take the fallback path.
pub(crate) fn exceeds_cell_budget(old: &str, new: &str) -> bool {
    split_lines(old).len() * split_lines(new).len() > MAX_LCS_CELLS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lines: &[DiffLine]) -> Vec<LineKind> {
        lines.iter().map(|l| l.kind).collect()
    }

    /// Reapply an exact edit script to check it reconstructs the new text.
    fn apply(lines: &[DiffLine]) -> String {
        lines
            .iter()
            .filter(|l| l.kind != LineKind::Remove)
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Recover the old text from an exact edit script.
    fn revert(lines: &[DiffLine]) -> String {
        lines
            .iter()
            .filter(|l| l.kind != LineKind::Add)
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_single_line_replacement() {
        let lines = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!(
            lines,
            vec![
                DiffLine::context("a", 1, 1),
                DiffLine::remove("b", 2),
                DiffLine::add("x", 2),
                DiffLine::context("c", 3, 3),
            ]
        );
    }

    #[test]
    fn test_identical_inputs_are_all_context() {
        let lines = diff_lines("a\nb", "a\nb");
        assert_eq!(
            kinds(&lines),
            vec![LineKind::Context, LineKind::Context]
        );
    }

    #[test]
    fn test_empty_inputs_diff_as_one_empty_context_line() {
        let lines = diff_lines("", "");
        assert_eq!(lines, vec![DiffLine::context("", 1, 1)]);
    }

    #[test]
    fn test_pure_insertion() {
        let lines = diff_lines("a\nc", "a\nb\nc");
        assert_eq!(
            lines,
            vec![
                DiffLine::context("a", 1, 1),
                DiffLine::add("b", 2),
                DiffLine::context("c", 2, 3),
            ]
        );
    }

    #[test]
    fn test_pure_deletion() {
        let lines = diff_lines("a\nb\nc", "a\nc");
        assert_eq!(
            lines,
            vec![
                DiffLine::context("a", 1, 1),
                DiffLine::remove("b", 2),
                DiffLine::context("c", 3, 2),
            ]
        );
    }

    #[test]
    fn test_replacement_emits_remove_before_add() {
        // The prefer-add tie-break during backtracking puts the removal
        // first in the forward-ordered script.
        let lines = diff_lines("old", "new");
        assert_eq!(
            lines,
            vec![DiffLine::remove("old", 1), DiffLine::add("new", 1)]
        );
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let cases = [
            ("a\nb\nc", "a\nx\nc"),
            ("", "hello\nworld"),
            ("one\ntwo\nthree\nfour", "zero\ntwo\nfour\nfive"),
            ("same", "same"),
            ("x\ny\nz", ""),
            ("dup\ndup\ndup", "dup\ndup"),
        ];
        for (old, new) in cases {
            let lines = diff_lines(old, new);
            assert_eq!(apply(&lines), new, "apply failed for {old:?} -> {new:?}");
            assert_eq!(revert(&lines), old, "revert failed for {old:?} -> {new:?}");
        }
    }

    #[test]
    fn test_symmetry_of_add_and_remove_totals() {
        let a = "fn main() {\n    println!(\"hi\");\n}\n";
        let b = "fn main() {\n    let x = 1;\n    println!(\"{x}\");\n}\n";
        let forward = diff_lines(a, b);
        let backward = diff_lines(b, a);
        let added = forward.iter().filter(|l| l.kind == LineKind::Add).count();
        let removed_back = backward
            .iter()
            .filter(|l| l.kind == LineKind::Remove)
            .count();
        assert_eq!(added, removed_back);
    }

    #[test]
    fn test_fallback_reports_only_membership_changes() {
        // 4000 x 3000 lines = 12M cells, over the budget.
        let old: String = (0..4000)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let new: String = (1..3001)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(exceeds_cell_budget(&old, &new));

        let lines = diff_lines(&old, &new);
        assert!(lines.iter().all(|l| l.kind != LineKind::Context));
        // line-0 dropped, line-3001..=3999 dropped, nothing added.
        assert_eq!(
            lines.iter().filter(|l| l.kind == LineKind::Remove).count(),
            1000
        );
        assert_eq!(lines.iter().filter(|l| l.kind == LineKind::Add).count(), 0);
    }

    #[test]
    fn test_fallback_is_empty_for_set_identical_inputs() {
        let old: String = (0..4000)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        // Same line set, reversed order.
        let new: String = (0..4000)
            .rev()
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(exceeds_cell_budget(&old, &new));
        assert!(diff_lines(&old, &new).is_empty());
    }
}

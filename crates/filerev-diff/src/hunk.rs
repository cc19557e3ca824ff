//! Grouping of flat edit scripts into hunks with bounded context.

use serde::{Deserialize, Serialize};

use crate::line::{DiffLine, LineKind};

/// A contiguous block of a diff: changed lines plus bounded surrounding
/// context, matching conventional patch-file presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// 1-based first line of the hunk in the old text.
    pub old_start: usize,
    /// Number of old-side lines the hunk spans (context + removals).
    pub old_count: usize,
    /// 1-based first line of the hunk in the new text.
    pub new_start: usize,
    /// Number of new-side lines the hunk spans (context + additions).
    pub new_count: usize,
    /// The hunk's lines, in script order.
    pub lines: Vec<DiffLine>,
}

/// Group a flat edit script into hunks.
///
/// Up to `context_size` context lines are buffered ahead of each hunk; a
/// hunk closes once `2 * context_size` consecutive context lines have
/// accumulated at its tail. An all-context script produces no hunks.
pub fn group_hunks(lines: Vec<DiffLine>, context_size: usize) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    let mut context_buffer: Vec<DiffLine> = Vec::new();

    for line in lines {
        if line.kind != LineKind::Context {
            match &mut current {
                Some(hunk) => hunk.lines.push(line),
                None => {
                    let mut hunk = Hunk {
                        old_start: hunk_start(line.old_line, context_size),
                        old_count: 0,
                        new_start: hunk_start(line.new_line, context_size),
                        new_count: 0,
                        lines: std::mem::take(&mut context_buffer),
                    };
                    hunk.lines.push(line);
                    current = Some(hunk);
                }
            }
        } else if let Some(hunk) = &mut current {
            hunk.lines.push(line);

            let trailing = hunk
                .lines
                .iter()
                .rev()
                .take_while(|l| l.kind == LineKind::Context)
                .count();
            if trailing >= context_size * 2 {
                if let Some(hunk) = current.take() {
                    hunks.push(finish(hunk));
                }
                context_buffer.clear();
            }
        } else {
            context_buffer.push(line);
            if context_buffer.len() > context_size {
                context_buffer.remove(0);
            }
        }
    }

    if let Some(hunk) = current {
        hunks.push(finish(hunk));
    }

    hunks
}

/// First line of a hunk: `context_size` lines before the change, floored at 1.
fn hunk_start(line_number: Option<usize>, context_size: usize) -> usize {
    line_number
        .unwrap_or(0)
        .saturating_sub(context_size)
        .max(1)
}

/// Derive the hunk's per-side line counts from its member lines.
fn finish(mut hunk: Hunk) -> Hunk {
    let mut old_count = 0;
    let mut new_count = 0;
    for line in &hunk.lines {
        match line.kind {
            LineKind::Context => {
                old_count += 1;
                new_count += 1;
            }
            LineKind::Remove => old_count += 1,
            LineKind::Add => new_count += 1,
        }
    }
    hunk.old_count = old_count;
    hunk.new_count = new_count;
    hunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff_lines;

    fn join(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_all_context_produces_no_hunks() {
        let lines = diff_lines("a\nb\nc", "a\nb\nc");
        assert!(group_hunks(lines, 3).is_empty());
    }

    #[test]
    fn test_single_change_hunk_shape() {
        let lines = diff_lines("a\nb\nc", "a\nx\nc");
        let hunks = group_hunks(lines, 3);
        assert_eq!(hunks.len(), 1);

        let hunk = &hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.old_count, 3);
        assert_eq!(hunk.new_count, 3);
        assert_eq!(
            hunk.lines,
            vec![
                DiffLine::context("a", 1, 1),
                DiffLine::remove("b", 2),
                DiffLine::add("x", 2),
                DiffLine::context("c", 3, 3),
            ]
        );
    }

    #[test]
    fn test_distant_changes_split_into_two_hunks() {
        let old = join(&[
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m",
        ]);
        let new = join(&[
            "a", "B", "c", "d", "e", "f", "g", "h", "i", "j", "k", "L", "m",
        ]);
        let hunks = group_hunks(diff_lines(&old, &new), 3);
        assert_eq!(hunks.len(), 2);

        // First hunk: one leading context line, the change, then the hunk
        // closes after six trailing context lines.
        let first = &hunks[0];
        assert_eq!(first.old_start, 1);
        assert_eq!(first.lines[0], DiffLine::context("a", 1, 1));
        assert_eq!(first.old_count, 8);
        assert_eq!(first.new_count, 8);

        // Second hunk: three buffered leading context lines ("i", "j", "k").
        let second = &hunks[1];
        assert_eq!(second.old_start, 9);
        assert_eq!(second.lines[0], DiffLine::context("i", 9, 9));
        assert_eq!(second.old_count, 5);
        assert_eq!(second.new_count, 5);
    }

    #[test]
    fn test_nearby_changes_share_a_hunk() {
        // Five context lines between the changes: under the 2x3 close
        // threshold, so both land in one hunk.
        let old = join(&["a", "b", "c", "d", "e", "f", "g", "h", "i"]);
        let new = join(&["a", "B", "c", "d", "e", "f", "g", "H", "i"]);
        let hunks = group_hunks(diff_lines(&old, &new), 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_count, 9);
        assert_eq!(hunks[0].new_count, 9);
    }

    #[test]
    fn test_change_on_first_line_floors_start_at_one() {
        let lines = diff_lines("a\nb", "X\nb");
        let hunks = group_hunks(lines, 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_start, 1);
        assert_eq!(hunks[0].new_start, 1);
    }

    #[test]
    fn test_zero_context_buffers_no_leading_lines() {
        let lines = diff_lines("a\nb\nc", "a\nx\nc");
        let hunks = group_hunks(lines, 0);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_start, 2);
        assert_eq!(hunks[0].lines[0], DiffLine::remove("b", 2));
    }
}

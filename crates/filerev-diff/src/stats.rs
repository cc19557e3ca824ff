//! Order-insensitive change statistics.

use std::collections::HashMap;

/// Multiset comparison of the two inputs' lines: `(added, removed)`.
///
/// Counts how many line occurrences appear in `new` beyond their count in
/// `old` and vice versa. This ignores line order, so it can disagree with
/// the sequence diff for reorder-heavy edits; the version summary fields
/// deliberately use this cheaper approximation.
pub fn line_delta(old: &str, new: &str) -> (usize, usize) {
    let old_counts = count_lines(old);
    let new_counts = count_lines(new);

    let mut added = 0;
    for (line, count) in &new_counts {
        let before = old_counts.get(line).copied().unwrap_or(0);
        added += count.saturating_sub(before);
    }

    let mut removed = 0;
    for (line, count) in &old_counts {
        let after = new_counts.get(line).copied().unwrap_or(0);
        removed += count.saturating_sub(after);
    }

    (added, removed)
}

fn count_lines(content: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for line in content.split('\n') {
        *counts.entry(line).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_counts_one_each() {
        assert_eq!(line_delta("a\nb\nc", "a\nx\nc"), (1, 1));
    }

    #[test]
    fn test_reordering_counts_nothing() {
        assert_eq!(line_delta("a\nb\nc", "c\na\nb"), (0, 0));
    }

    #[test]
    fn test_duplicate_occurrences_are_counted() {
        assert_eq!(line_delta("x\nx\nx", "x"), (0, 2));
        assert_eq!(line_delta("x", "x\nx"), (1, 0));
    }

    #[test]
    fn test_identical_inputs() {
        assert_eq!(line_delta("a\nb", "a\nb"), (0, 0));
    }
}

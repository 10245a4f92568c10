//! Grapheme cluster stepping and display width.
//!
//! Buffer addressing stays in runes; these helpers only decide where a
//! cursor step lands so that `h`/`l`/`x` never stop inside a cluster
//! (e.g. `e` + combining acute). Columns in and out are rune columns within a
//! single line (no newline).

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// (rune column, cluster) pairs for every grapheme cluster of `line`.
fn clusters(line: &str) -> impl Iterator<Item = (usize, &str)> {
    line.graphemes(true).scan(0usize, |col, g| {
        let start = *col;
        *col += g.chars().count();
        Some((start, g))
    })
}

/// Column of the cluster following the one at `col`, or the line length.
pub fn next_boundary(line: &str, col: usize) -> usize {
    clusters(line)
        .map(|(start, _)| start)
        .find(|&start| start > col)
        .unwrap_or_else(|| line.chars().count())
}

/// Column of the cluster start preceding `col`, or 0.
pub fn prev_boundary(line: &str, col: usize) -> usize {
    clusters(line)
        .map(|(start, _)| start)
        .take_while(|&start| start < col)
        .last()
        .unwrap_or(0)
}

/// Start column of the cluster containing `col`.
pub fn cluster_start(line: &str, col: usize) -> usize {
    clusters(line)
        .map(|(start, _)| start)
        .take_while(|&start| start <= col)
        .last()
        .unwrap_or(0)
}

/// Terminal cell width of a cluster. Zero-width and control clusters occupy one cell.
pub fn cluster_width(g: &str) -> usize {
    g.width().max(1)
}

/// Display column of rune column `col`.
pub fn visual_col(line: &str, col: usize) -> usize {
    clusters(line)
        .take_while(|(start, _)| *start < col)
        .map(|(_, g)| cluster_width(g))
        .sum()
}

/// Rune column whose cluster covers display column `target`, clamped to the
/// line length.
pub fn col_for_visual_col(line: &str, target: usize) -> usize {
    let mut acc = 0;
    for (start, g) in clusters(line) {
        let w = cluster_width(g);
        if acc + w > target {
            return start;
        }
        acc += w;
    }
    line.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combining_sequence_is_one_step() {
        let line = "ae\u{0301}b";
        assert_eq!(next_boundary(line, 0), 1);
        assert_eq!(next_boundary(line, 1), 3);
        assert_eq!(prev_boundary(line, 3), 1);
        assert_eq!(cluster_start(line, 2), 1);
    }

    #[test]
    fn wide_clusters_shift_visual_columns() {
        let line = "漢a😀b";
        assert_eq!(visual_col(line, 1), 2);
        assert_eq!(visual_col(line, 3), 5);
        assert_eq!(col_for_visual_col(line, 1), 0);
        assert_eq!(col_for_visual_col(line, 2), 1);
        assert_eq!(col_for_visual_col(line, 40), 4);
    }
}

//! Motion targets and operator spans.
//!
//! Given a cursor offset, a `MotionKind` and a `count`, this module computes
//! either the raw target offset of the motion (cursor movement) or the
//! `[start, end)` rune range an operator acts on. It never mutates editor
//! state; the dispatcher applies the result.
//!
//! Operator range rules:
//! * Motions are end-exclusive; `e`/`E` include the target character, `$`
//!   stops before the newline.
//! * `j`/`k`/`gg`/`G` select whole lines.
//! * `w` under an operator stops at the end of the line holding the last word
//!   moved over; `cw` on a non-blank acts like `ce`.
//! * An exclusive range ending in column 0 of a later line either becomes
//!   linewise (start at or before the first non-blank) or loses that line.

use crate::{MotionKind, OperatorKind};
use core_text::{Buffer, grapheme, motion};

/// Resolved operator range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub linewise: bool,
}

impl Span {
    pub fn charwise(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            linewise: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

pub(crate) fn line_of(buf: &Buffer, pos: usize) -> usize {
    buf.line_of_offset(pos.min(buf.len())).unwrap_or(0)
}

pub(crate) fn line_start(buf: &Buffer, line: usize) -> usize {
    buf.line_start_offset(line).unwrap_or(buf.len())
}

pub(crate) fn line_end(buf: &Buffer, line: usize) -> usize {
    buf.line_end_offset(line).unwrap_or(buf.len())
}

fn first_non_blank(buf: &Buffer, line: usize) -> usize {
    buf.first_non_blank(line).unwrap_or(buf.len())
}

/// Whole lines `first..=last`, ending at the start of the following line or
/// at buffer end.
pub fn linewise_span(buf: &Buffer, first: usize, last: usize) -> Span {
    let end = if last + 1 < buf.line_count() {
        line_start(buf, last + 1)
    } else {
        buf.len()
    };
    Span {
        start: line_start(buf, first),
        end,
        linewise: true,
    }
}

/// Visual selection between `anchor` and `cursor`, both inclusive.
pub fn visual_span(buf: &Buffer, anchor: usize, cursor: usize, linewise: bool) -> Span {
    let lo = anchor.min(cursor);
    let hi = anchor.max(cursor);
    if linewise {
        return linewise_span(buf, line_of(buf, lo), line_of(buf, hi));
    }
    // Extend over the whole cluster under the far end.
    let line = line_of(buf, hi);
    let start = line_start(buf, line);
    let end = match buf.line_text(line) {
        Ok(text) if hi < line_end(buf, line) => start + grapheme::next_boundary(&text, hi - start),
        _ => hi + 1,
    };
    Span::charwise(lo, end.min(buf.len()))
}

/// Raw target of `motion` from `cursor`. `past_end` allows the target to rest
/// on the line end (insert mode, operator ranges). Updates the sticky display
/// column for vertical motions and clears it for everything else.
/// Returns `None` when the motion cannot move at all.
pub fn motion_target(
    buf: &Buffer,
    cursor: usize,
    kind: MotionKind,
    count: u32,
    sticky: &mut Option<usize>,
    past_end: bool,
) -> Option<usize> {
    let count = count.max(1) as usize;
    let cursor = cursor.min(buf.len());
    let line = line_of(buf, cursor);
    let last_line = buf.line_count().saturating_sub(1);
    if !matches!(kind, MotionKind::Up | MotionKind::Down) {
        *sticky = None;
    }
    match kind {
        MotionKind::Left => {
            let start = line_start(buf, line);
            let text = buf.line_text(line).ok()?;
            let mut col = cursor - start;
            if col == 0 {
                return None;
            }
            for _ in 0..count {
                if col == 0 {
                    break;
                }
                col = grapheme::prev_boundary(&text, col);
            }
            Some(start + col)
        }
        MotionKind::Right => {
            let start = line_start(buf, line);
            let text = buf.line_text(line).ok()?;
            let len = text.chars().count();
            let limit = if past_end {
                len
            } else {
                grapheme::prev_boundary(&text, len)
            };
            let mut col = cursor - start;
            if col >= limit {
                return None;
            }
            for _ in 0..count {
                if col >= limit {
                    break;
                }
                col = grapheme::next_boundary(&text, col);
            }
            Some(start + col.min(limit))
        }
        MotionKind::Up | MotionKind::Down => {
            let target = if kind == MotionKind::Up {
                line.saturating_sub(count)
            } else {
                (line + count).min(last_line)
            };
            if target == line {
                return None;
            }
            let text = buf.line_text(line).ok()?;
            let desired =
                sticky.unwrap_or_else(|| grapheme::visual_col(&text, cursor - line_start(buf, line)));
            *sticky = Some(desired);
            let target_text = buf.line_text(target).ok()?;
            let col = grapheme::col_for_visual_col(&target_text, desired);
            Some(line_start(buf, target) + col)
        }
        MotionKind::WordForward | MotionKind::BigWordForward => {
            let big = kind == MotionKind::BigWordForward;
            let target = (0..count).fold(cursor, |p, _| motion::next_word_start(buf, p, big));
            (target != cursor).then_some(target)
        }
        MotionKind::WordBackward | MotionKind::BigWordBackward => {
            let big = kind == MotionKind::BigWordBackward;
            let target = (0..count).fold(cursor, |p, _| motion::prev_word_start(buf, p, big));
            (target != cursor).then_some(target)
        }
        MotionKind::WordEnd | MotionKind::BigWordEnd => {
            let big = kind == MotionKind::BigWordEnd;
            let target = (0..count).fold(cursor, |p, _| motion::word_end(buf, p, big));
            (target != cursor).then_some(target)
        }
        MotionKind::LineStart => Some(line_start(buf, line)),
        MotionKind::FirstNonBlank => Some(first_non_blank(buf, line)),
        MotionKind::LineEnd => {
            *sticky = Some(usize::MAX);
            Some(line_end(buf, (line + count - 1).min(last_line)))
        }
        MotionKind::ParagraphForward => {
            let target = (0..count).fold(cursor, |p, _| motion::next_paragraph(buf, p));
            (target != cursor).then_some(target)
        }
        MotionKind::ParagraphBackward => {
            let target = (0..count).fold(cursor, |p, _| motion::prev_paragraph(buf, p));
            (target != cursor).then_some(target)
        }
        MotionKind::FirstLine => Some(first_non_blank(buf, 0)),
        MotionKind::LastLine => Some(first_non_blank(buf, last_line)),
        MotionKind::GotoLine(n) => Some(first_non_blank(buf, n.max(1).saturating_sub(1).min(last_line))),
    }
}

/// Range `op` acts on for `motion` from `cursor`. `None` when the motion
/// cannot move.
pub fn operator_span(
    buf: &Buffer,
    cursor: usize,
    op: OperatorKind,
    kind: MotionKind,
    count: u32,
) -> Option<Span> {
    let count = count.max(1);
    let cursor = cursor.min(buf.len());
    let mut sticky = None;
    if kind.is_linewise() {
        let target = motion_target(buf, cursor, kind, count, &mut sticky, true)?;
        let (a, b) = (line_of(buf, cursor), line_of(buf, target));
        return Some(linewise_span(buf, a.min(b), a.max(b)));
    }
    if matches!(kind, MotionKind::WordForward | MotionKind::BigWordForward) {
        let big = kind == MotionKind::BigWordForward;
        if op == OperatorKind::Change
            && let Some(c) = buf.char_at(cursor)
            && !c.is_whitespace()
        {
            return Some(Span::charwise(cursor, change_word_end(buf, cursor, count, big) + 1));
        }
        return word_forward_span(buf, cursor, count, big);
    }
    let target = motion_target(buf, cursor, kind, count, &mut sticky, true)?;
    let (start, mut end) = if target < cursor {
        (target, cursor)
    } else {
        (cursor, target)
    };
    if kind.is_inclusive() {
        return Some(Span::charwise(start, (end + 1).min(buf.len())));
    }
    let start_line = line_of(buf, start);
    let end_line = line_of(buf, end);
    if end > start && end_line > start_line && end == line_start(buf, end_line) {
        if start <= first_non_blank(buf, start_line) {
            return Some(linewise_span(buf, start_line, end_line - 1));
        }
        end = line_end(buf, end_line - 1);
    }
    Some(Span::charwise(start, end))
}

/// `w` under an operator: exclusive, but never past the end of the line that
/// holds the last word moved over.
fn word_forward_span(buf: &Buffer, cursor: usize, count: u32, big: bool) -> Option<Span> {
    let mut prev = cursor;
    let mut target = cursor;
    for _ in 0..count {
        prev = target;
        target = motion::next_word_start(buf, target, big);
    }
    if target == cursor {
        return None;
    }
    let prev_line = line_of(buf, prev);
    if target < buf.len() && line_of(buf, target) > prev_line {
        let eol = line_end(buf, prev_line);
        if eol > prev {
            target = eol;
        }
    }
    Some(Span::charwise(cursor, target))
}

/// Last character covered by `c{count}w` starting on a non-blank.
fn change_word_end(buf: &Buffer, cursor: usize, count: u32, big: bool) -> usize {
    let chars = buf.chars();
    let class = motion::char_class(chars[cursor], big);
    let mut end = cursor;
    while end + 1 < chars.len() && motion::char_class(chars[end + 1], big) == class {
        end += 1;
    }
    for _ in 1..count {
        end = motion::word_end(buf, end, big);
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, cursor: usize, op: OperatorKind, m: MotionKind, count: u32) -> (String, bool) {
        let buf = Buffer::from_str("t", text);
        let s = operator_span(&buf, cursor, op, m, count).expect("span");
        (buf.slice(s.start, s.end).unwrap(), s.linewise)
    }

    #[test]
    fn dw_is_exclusive_and_stops_at_line_end() {
        assert_eq!(
            span("hello world", 0, OperatorKind::Delete, MotionKind::WordForward, 1).0,
            "hello "
        );
        assert_eq!(
            span("foo bar\nbaz", 4, OperatorKind::Delete, MotionKind::WordForward, 1).0,
            "bar"
        );
        assert_eq!(
            span("one two", 4, OperatorKind::Delete, MotionKind::WordForward, 1).0,
            "two"
        );
    }

    #[test]
    fn cw_behaves_like_ce() {
        assert_eq!(
            span("hello world", 0, OperatorKind::Change, MotionKind::WordForward, 1).0,
            "hello"
        );
        assert_eq!(
            span("a bc def", 0, OperatorKind::Change, MotionKind::WordForward, 2).0,
            "a bc"
        );
        // On blanks it stays a plain `w`.
        assert_eq!(
            span("a   b", 1, OperatorKind::Change, MotionKind::WordForward, 1).0,
            "   "
        );
    }

    #[test]
    fn inclusive_and_line_end_motions() {
        assert_eq!(
            span("foo bar", 0, OperatorKind::Delete, MotionKind::WordEnd, 1).0,
            "foo"
        );
        assert_eq!(
            span("foo bar\nx", 2, OperatorKind::Delete, MotionKind::LineEnd, 1).0,
            "o bar"
        );
        assert_eq!(
            span("foo bar", 4, OperatorKind::Delete, MotionKind::LineStart, 1).0,
            "foo "
        );
    }

    #[test]
    fn vertical_motions_are_linewise() {
        let (text, linewise) = span("a\nb\nc", 0, OperatorKind::Delete, MotionKind::Down, 1);
        assert_eq!(text, "a\nb\n");
        assert!(linewise);
        let (text, _) = span("a\nb\nc", 4, OperatorKind::Yank, MotionKind::Up, 1);
        assert_eq!(text, "b\nc");
        let buf = Buffer::from_str("t", "a\nb");
        assert!(operator_span(&buf, 2, OperatorKind::Delete, MotionKind::Down, 1).is_none());
    }

    #[test]
    fn exclusive_range_ending_in_column_zero_becomes_linewise() {
        let (text, linewise) = span(
            "a\nb\n\nc",
            0,
            OperatorKind::Delete,
            MotionKind::ParagraphForward,
            1,
        );
        assert_eq!(text, "a\nb\n");
        assert!(linewise);
        let (text, linewise) = span("xa\nb\n\nc", 1, OperatorKind::Delete, MotionKind::ParagraphForward, 1);
        assert_eq!(text, "a\nb");
        assert!(!linewise);
    }

    #[test]
    fn vertical_motion_keeps_display_column() {
        let buf = Buffer::from_str("t", "abcdef\nab\nabcdef");
        let mut sticky = None;
        let down = motion_target(&buf, 4, MotionKind::Down, 1, &mut sticky, false).unwrap();
        assert_eq!(down, 9);
        assert_eq!(sticky, Some(4));
        let down = motion_target(&buf, down, MotionKind::Down, 1, &mut sticky, false).unwrap();
        assert_eq!(down, 14);
    }

    #[test]
    fn right_respects_clusters_and_line_end() {
        let buf = Buffer::from_str("t", "ae\u{0301}b");
        let mut sticky = None;
        assert_eq!(
            motion_target(&buf, 1, MotionKind::Right, 1, &mut sticky, false),
            Some(3)
        );
        assert_eq!(motion_target(&buf, 3, MotionKind::Right, 1, &mut sticky, false), None);
        assert_eq!(
            motion_target(&buf, 3, MotionKind::Right, 1, &mut sticky, true),
            Some(4)
        );
    }

    #[test]
    fn visual_span_covers_both_ends() {
        let buf = Buffer::from_str("t", "abc\ndef\nghi");
        assert_eq!(visual_span(&buf, 5, 1, false), Span::charwise(1, 6));
        let lines = visual_span(&buf, 5, 1, true);
        assert_eq!((lines.start, lines.end, lines.linewise), (0, 8, true));
    }
}

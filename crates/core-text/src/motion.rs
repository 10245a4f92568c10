//! Word and paragraph motion primitives.
//!
//! These operate on absolute rune offsets over a `Buffer` and are free of
//! editor state. Counts, operators and the exclusive/inclusive rules live in
//! the dispatcher; each function here computes a single step.

use crate::Buffer;

/// Character class used for word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Blank,
    Punct,
    Word,
}

/// Classify `c`. With `big` every non-blank character is a word character
/// (Vim's WORD).
pub fn char_class(c: char, big: bool) -> CharClass {
    if c.is_whitespace() {
        CharClass::Blank
    } else if big || c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// True when the newline at `i` terminates an empty line.
fn is_empty_line_at(chars: &[char], i: usize) -> bool {
    chars[i] == '\n' && (i == 0 || chars[i - 1] == '\n')
}

/// Start of the next word after `pos` (`w` / `W`). Empty lines count as
/// words. Returns the buffer length when no word follows.
pub fn next_word_start(buf: &Buffer, pos: usize, big: bool) -> usize {
    let chars = buf.chars();
    let n = chars.len();
    if pos >= n {
        return n;
    }
    let mut i = pos;
    let class = char_class(chars[i], big);
    if class != CharClass::Blank {
        while i < n && char_class(chars[i], big) == class {
            i += 1;
        }
    }
    while i < n && char_class(chars[i], big) == CharClass::Blank {
        if i > pos && is_empty_line_at(chars, i) {
            return i;
        }
        i += 1;
    }
    i
}

/// Start of the word before `pos` (`b` / `B`).
pub fn prev_word_start(buf: &Buffer, pos: usize, big: bool) -> usize {
    let chars = buf.chars();
    if pos == 0 || chars.is_empty() {
        return 0;
    }
    let mut i = (pos - 1).min(chars.len() - 1);
    while i > 0 && char_class(chars[i], big) == CharClass::Blank {
        if is_empty_line_at(chars, i) {
            return i;
        }
        i -= 1;
    }
    let class = char_class(chars[i], big);
    if class == CharClass::Blank {
        return i;
    }
    while i > 0 && char_class(chars[i - 1], big) == class {
        i -= 1;
    }
    i
}

/// Last character of the word ending after `pos` (`e` / `E`).
pub fn word_end(buf: &Buffer, pos: usize, big: bool) -> usize {
    let chars = buf.chars();
    let n = chars.len();
    if n == 0 {
        return 0;
    }
    let mut i = pos + 1;
    while i < n && char_class(chars[i], big) == CharClass::Blank {
        i += 1;
    }
    if i >= n {
        return n - 1;
    }
    let class = char_class(chars[i], big);
    while i + 1 < n && char_class(chars[i + 1], big) == class {
        i += 1;
    }
    i
}

/// Start of the next blank line after the paragraph at `pos` (`}`), or the
/// buffer length when the paragraph runs to the end.
pub fn next_paragraph(buf: &Buffer, pos: usize) -> usize {
    let count = buf.line_count();
    let mut line = buf.line_of_offset(pos.min(buf.len())).unwrap_or(0);
    while line < count && buf.is_blank_line(line) {
        line += 1;
    }
    while line < count && !buf.is_blank_line(line) {
        line += 1;
    }
    if line >= count {
        return buf.len();
    }
    buf.line_start_offset(line).unwrap_or(buf.len())
}

/// Start of the blank line above the paragraph at `pos` (`{`), or 0.
pub fn prev_paragraph(buf: &Buffer, pos: usize) -> usize {
    let mut line = buf.line_of_offset(pos.min(buf.len())).unwrap_or(0);
    while line > 0 && buf.is_blank_line(line) {
        line -= 1;
    }
    while line > 0 && !buf.is_blank_line(line) {
        line -= 1;
    }
    buf.line_start_offset(line).unwrap_or(0)
}

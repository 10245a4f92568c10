//! Position model: conversions between absolute rune offsets and
//! (line, column) pairs.
//!
//! The cursor is authoritative as an absolute offset; `Position` is a view
//! derived from it. Line starts are computed from buffer content on first use,
//! cached inside the buffer snapshot and shifted by each mutation. Lines are
//! split on `'\n'`, so `"a\n"` has two lines, the second one empty.

use crate::{Buffer, TextError};

/// Start offsets of every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn build(chars: &[char]) -> Self {
        let mut starts = vec![0];
        starts.extend(
            chars
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: chars.len(),
        }
    }

    /// Account for `text` inserted at `pos`.
    pub(crate) fn insert(&mut self, pos: usize, text: &[char]) {
        let at = self.starts.partition_point(|&s| s <= pos);
        for s in &mut self.starts[at..] {
            *s += text.len();
        }
        let added = text
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '\n')
            .map(|(i, _)| pos + i + 1);
        self.starts.splice(at..at, added);
        self.len += text.len();
    }

    /// Account for `[start, end)` being removed. Lines whose newline fell in
    /// the range merge into the line before them.
    pub(crate) fn delete(&mut self, start: usize, end: usize) {
        let lo = self.starts.partition_point(|&s| s <= start);
        let hi = self.starts.partition_point(|&s| s <= end);
        self.starts.drain(lo..hi);
        for s in &mut self.starts[lo..] {
            *s -= end - start;
        }
        self.len -= end - start;
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line).copied()
    }

    /// Offset just past the last character of `line`, excluding its newline.
    pub fn line_end(&self, line: usize) -> Option<usize> {
        if line + 1 < self.starts.len() {
            Some(self.starts[line + 1] - 1)
        } else if line < self.starts.len() {
            Some(self.len)
        } else {
            None
        }
    }

    /// Line containing `pos`. `pos == len` maps to the last line.
    pub fn line_of(&self, pos: usize) -> usize {
        self.starts.partition_point(|&s| s <= pos).saturating_sub(1)
    }
}

/// (line, column) view of an offset. Columns count runes from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
    pub fn origin() -> Self {
        Self { line: 0, col: 0 }
    }
}

impl Buffer {
    pub fn line_count(&self) -> usize {
        self.line_index().line_count()
    }

    fn check_line(&self, line: usize) -> Result<(), TextError> {
        let line_count = self.line_count();
        if line >= line_count {
            return Err(TextError::LineOutOfBounds { line, line_count });
        }
        Ok(())
    }

    /// Text of `line` without its trailing newline.
    pub fn line_text(&self, line: usize) -> Result<String, TextError> {
        let start = self.line_start_offset(line)?;
        let end = self.line_end_offset(line)?;
        self.slice(start, end)
    }

    pub fn line_start_offset(&self, line: usize) -> Result<usize, TextError> {
        self.check_line(line)?;
        let count = self.line_count();
        self.line_index()
            .line_start(line)
            .ok_or(TextError::LineOutOfBounds {
                line,
                line_count: count,
            })
    }

    /// Offset of the newline ending `line`, or buffer length for the last line.
    pub fn line_end_offset(&self, line: usize) -> Result<usize, TextError> {
        self.check_line(line)?;
        let count = self.line_count();
        self.line_index()
            .line_end(line)
            .ok_or(TextError::LineOutOfBounds {
                line,
                line_count: count,
            })
    }

    /// Length of `line` in runes, newline excluded.
    pub fn line_len(&self, line: usize) -> Result<usize, TextError> {
        Ok(self.line_end_offset(line)? - self.line_start_offset(line)?)
    }

    pub fn line_of_offset(&self, pos: usize) -> Result<usize, TextError> {
        if pos > self.len() {
            return Err(TextError::OutOfBounds {
                start: pos,
                end: pos,
                len: self.len(),
            });
        }
        Ok(self.line_index().line_of(pos))
    }

    pub fn offset_to_line_col(&self, pos: usize) -> Result<Position, TextError> {
        let line = self.line_of_offset(pos)?;
        let start = self.line_start_offset(line)?;
        Ok(Position::new(line, pos - start))
    }

    /// Offset of (`line`, `col`). `col` may equal the line length (the
    /// position of the newline / buffer end) but not exceed it.
    pub fn line_col_to_offset(&self, line: usize, col: usize) -> Result<usize, TextError> {
        let line_len = self.line_len(line)?;
        if col > line_len {
            return Err(TextError::ColumnOutOfBounds {
                line,
                col,
                line_len,
            });
        }
        Ok(self.line_start_offset(line)? + col)
    }

    /// True when `line` holds only whitespace (or nothing).
    pub fn is_blank_line(&self, line: usize) -> bool {
        match (self.line_start_offset(line), self.line_end_offset(line)) {
            (Ok(start), Ok(end)) => self.chars()[start..end].iter().all(|c| c.is_whitespace()),
            _ => false,
        }
    }

    /// Offset of the first non-blank character of `line`, or its end when the
    /// line is blank.
    pub fn first_non_blank(&self, line: usize) -> Result<usize, TextError> {
        let start = self.line_start_offset(line)?;
        let end = self.line_end_offset(line)?;
        let chars = self.chars();
        Ok((start..end)
            .find(|&i| !chars[i].is_whitespace())
            .unwrap_or(end))
    }
}

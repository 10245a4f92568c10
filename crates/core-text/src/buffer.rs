//! Piece table text storage.
//!
//! Text lives in two backing arrays of `char`: `original`, filled once at
//! construction, and `added`, which is append-only. The logical text is the
//! in-order concatenation of `pieces`, each a window into one of those arrays.
//! Every public offset is a rune (`char`) offset, never a byte offset.
//!
//! Invariants (hold after every public call):
//! * `original` is never mutated after `from_str`.
//! * A range of `added` referenced by a piece is never rewritten; new text is
//!   only ever appended.
//! * `pieces` partitions the logical text with no gaps or overlaps, holds no
//!   zero-length piece, and no two neighbours could be merged further.
//! * `len` equals the sum of piece lengths.

use std::cell::OnceCell;
use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::position::LineIndex;

/// Which backing array a piece points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Original,
    Added,
}

/// A window `[start, start + len)` into one backing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub source: Source,
    pub start: usize,
    pub len: usize,
}

impl Piece {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Invertible buffer mutation. Applying one returns its inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert { pos: usize, text: String },
    Delete { start: usize, end: usize },
}

impl Operation {
    /// Leftmost offset touched by the operation.
    pub fn position(&self) -> usize {
        match self {
            Operation::Insert { pos, .. } => *pos,
            Operation::Delete { start, .. } => *start,
        }
    }

    pub fn is_noop(&self) -> bool {
        match self {
            Operation::Insert { text, .. } => text.is_empty(),
            Operation::Delete { start, end } => start == end,
        }
    }
}

/// Bounds violations reported by buffer and position operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("range {start}..{end} out of bounds for length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("line {line} out of bounds ({line_count} lines)")]
    LineOutOfBounds { line: usize, line_count: usize },
    #[error("column {col} out of bounds on line {line} (length {line_len})")]
    ColumnOutOfBounds {
        line: usize,
        col: usize,
        line_len: usize,
    },
}

/// Read cache derived from the pieces. Built on first read, then patched in
/// place by each mutation instead of being rebuilt.
#[derive(Clone)]
pub(crate) struct Snapshot {
    pub(crate) chars: Vec<char>,
    pub(crate) lines: LineIndex,
}

/// Piece table buffer.
#[derive(Clone)]
pub struct Buffer {
    original: Vec<char>,
    added: Vec<char>,
    pieces: Vec<Piece>,
    len: usize,
    snapshot: OnceCell<Snapshot>,
    pub name: String,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("len", &self.len)
            .field("pieces", &self.pieces.len())
            .field("added", &self.added.len())
            .finish()
    }
}

impl Buffer {
    /// Construct a buffer whose original array holds `content`.
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        let original: Vec<char> = content.chars().collect();
        let len = original.len();
        let pieces = if len == 0 {
            Vec::new()
        } else {
            vec![Piece {
                source: Source::Original,
                start: 0,
                len,
            }]
        };
        Self {
            original,
            added: Vec::new(),
            pieces,
            len,
            snapshot: OnceCell::new(),
            name: name.into(),
        }
    }

    /// Length in runes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Full logical text.
    pub fn text(&self) -> String {
        self.chars().iter().collect()
    }

    /// Text in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<String, TextError> {
        self.check_range(start, end)?;
        Ok(self.chars()[start..end].iter().collect())
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.chars().get(pos).copied()
    }

    /// Flattened rune view, built lazily and kept in step with mutations.
    pub fn chars(&self) -> &[char] {
        &self.snapshot().chars
    }

    pub(crate) fn line_index(&self) -> &LineIndex {
        &self.snapshot().lines
    }

    fn snapshot(&self) -> &Snapshot {
        self.snapshot.get_or_init(|| {
            let mut chars = Vec::with_capacity(self.len);
            for piece in &self.pieces {
                chars.extend_from_slice(self.backing(piece));
            }
            let lines = LineIndex::build(&chars);
            Snapshot { chars, lines }
        })
    }

    fn backing(&self, piece: &Piece) -> &[char] {
        let src = match piece.source {
            Source::Original => &self.original,
            Source::Added => &self.added,
        };
        &src[piece.start..piece.end()]
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), TextError> {
        if start > end || end > self.len {
            return Err(TextError::OutOfBounds {
                start,
                end,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Insert `text` at `pos`. Returns the inverse `Delete`, or `None` when
    /// `text` is empty.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<Option<Operation>, TextError> {
        if pos > self.len {
            return Err(TextError::OutOfBounds {
                start: pos,
                end: pos,
                len: self.len,
            });
        }
        if text.is_empty() {
            return Ok(None);
        }
        let start = self.added.len();
        self.added.extend(text.chars());
        let inserted = self.added.len() - start;
        let piece = Piece {
            source: Source::Added,
            start,
            len: inserted,
        };
        let at = self.split_at(pos);
        self.pieces.insert(at, piece);
        self.len += inserted;
        self.coalesce();
        if let Some(snap) = self.snapshot.get_mut() {
            let text = &self.added[start..];
            snap.chars.splice(pos..pos, text.iter().copied());
            snap.lines.insert(pos, text);
        }
        trace!(target: "text.buffer", pos, inserted, pieces = self.pieces.len(), "insert");
        Ok(Some(Operation::Delete {
            start: pos,
            end: pos + inserted,
        }))
    }

    /// Remove `[start, end)`. Returns the inverse `Insert` carrying the removed
    /// text, or `None` for an empty range.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<Option<Operation>, TextError> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(None);
        }
        let removed = self.slice(start, end)?;
        let left = self.split_at(start);
        let right = self.split_at(end);
        self.pieces.drain(left..right);
        self.len -= end - start;
        self.coalesce();
        if let Some(snap) = self.snapshot.get_mut() {
            snap.chars.drain(start..end);
            snap.lines.delete(start, end);
        }
        trace!(target: "text.buffer", start, end, pieces = self.pieces.len(), "delete");
        Ok(Some(Operation::Insert {
            pos: start,
            text: removed,
        }))
    }

    /// Apply an operation, returning its inverse.
    pub fn apply(&mut self, op: &Operation) -> Result<Option<Operation>, TextError> {
        match op {
            Operation::Insert { pos, text } => self.insert(*pos, text),
            Operation::Delete { start, end } => self.delete(*start, *end),
        }
    }

    /// Ensure a piece boundary exists at `pos` and return the index of the
    /// first piece on the right side. The left side's total length is exactly
    /// `pos`. Caller guarantees `pos <= len`.
    fn split_at(&mut self, pos: usize) -> usize {
        let mut offset = 0;
        for idx in 0..self.pieces.len() {
            let piece = self.pieces[idx];
            if offset == pos {
                return idx;
            }
            if pos < offset + piece.len {
                let cut = pos - offset;
                self.pieces[idx] = Piece { len: cut, ..piece };
                self.pieces.insert(
                    idx + 1,
                    Piece {
                        start: piece.start + cut,
                        len: piece.len - cut,
                        ..piece
                    },
                );
                return idx + 1;
            }
            offset += piece.len;
        }
        self.pieces.len()
    }

    /// Drop empty pieces and merge neighbours that are contiguous in the same
    /// backing array.
    fn coalesce(&mut self) {
        let mut merged: Vec<Piece> = Vec::with_capacity(self.pieces.len());
        for piece in std::mem::take(&mut self.pieces) {
            if piece.len == 0 {
                continue;
            }
            if let Some(last) = merged.last_mut()
                && last.source == piece.source
                && last.end() == piece.start
            {
                last.len += piece.len;
                continue;
            }
            merged.push(piece);
        }
        self.pieces = merged;
    }
}

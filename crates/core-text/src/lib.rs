//! Piece table text buffer, position model and motion primitives.
//!
//! Offsets throughout this crate are rune (`char`) offsets. Byte offsets only
//! appear at the syntax-service boundary, which converts on its own.

use std::borrow::Cow;

pub mod buffer;
pub mod grapheme;
pub mod motion;
pub mod position;

pub use buffer::{Buffer, Operation, Piece, Source, TextError};
pub use motion::{CharClass, char_class};
pub use position::{LineIndex, Position};

/// Convert CRLF and lone CR line endings to LF. Borrowed when nothing changes.
pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
}

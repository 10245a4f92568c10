//! Editor model: the `EditorState` paired with the view that owns the cursor.
//!
//! The cursor is an absolute rune offset. `(line, col)` is always derived
//! from it through the buffer's line index, never stored independently.
//!
//! Invariants (must hold after every dispatched action):
//! * `cursor <= buffer.len()`.
//! * In Normal and Visual modes the cursor rests on a character of its line,
//!   i.e. never on the terminating newline unless the line is empty, and
//!   never inside a grapheme cluster.
//! * In Insert mode the cursor may sit at the line end.

use core_state::EditorState;
use core_text::{Buffer, Position, grapheme};

/// Presentation state for the single editing view.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub cursor: usize,
    /// Display column remembered across vertical motions.
    pub sticky_col: Option<usize>,
}

impl View {
    pub fn new(cursor: usize) -> Self {
        Self {
            cursor,
            sticky_col: None,
        }
    }

    pub fn position(&self, buffer: &Buffer) -> Position {
        buffer
            .offset_to_line_col(self.cursor.min(buffer.len()))
            .unwrap_or_default()
    }

    /// Clamp into the buffer without any mode-specific adjustment.
    pub fn clamp(&mut self, buffer: &Buffer) {
        self.cursor = self.cursor.min(buffer.len());
    }

    /// Move the cursor onto a real character cell for Normal mode: off the line
    /// end onto the last cluster, and back to the start of any cluster it sits in.
    pub fn normalize_for_normal(&mut self, buffer: &Buffer) {
        self.clamp(buffer);
        let Ok(pos) = buffer.offset_to_line_col(self.cursor) else {
            return;
        };
        let Ok(text) = buffer.line_text(pos.line) else {
            return;
        };
        let line_len = text.chars().count();
        if line_len == 0 {
            return;
        }
        let col = if pos.col >= line_len {
            grapheme::prev_boundary(&text, line_len)
        } else {
            grapheme::cluster_start(&text, pos.col)
        };
        self.cursor = self.cursor - pos.col + col;
    }
}

pub struct EditorModel {
    state: EditorState,
    view: View,
}

impl EditorModel {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            view: View::default(),
        }
    }

    /// Construct with a prepared view (tests, restored sessions).
    pub fn with_view(view: View, state: EditorState) -> Self {
        let mut model = Self { state, view };
        model.view.clamp(model.state.buffer());
        model
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }
    pub fn view(&self) -> &View {
        &self.view
    }
    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn cursor(&self) -> usize {
        self.view.cursor
    }

    pub fn cursor_position(&self) -> Position {
        self.view.position(self.state.buffer())
    }

    /// Disjoint mutable access to state and view for the duration of one dispatch.
    pub fn split_state_and_view(&mut self) -> (&mut EditorState, &mut View) {
        (&mut self.state, &mut self.view)
    }
}

//! Editor state: buffer, undo engine, registers, mode, visual anchor and the
//! ephemeral status message.
//!
//! All text mutations go through `EditorState::insert` / `EditorState::delete`
//! so the undo engine sees every inverse operation. Callers bracket a
//! multi-step change with `begin_group` / `end_group` to make it one undo unit.
//! The cursor is not stored here; it belongs to the view in `core-model`.

use std::path::PathBuf;

use core_text::{Buffer, TextError};
use tracing::{debug, trace};

pub mod registers;
pub mod undo;

pub use registers::{Register, RegisterError, RegisterKind, Registers, is_valid_register};
pub use undo::{HistoryError, UNDO_HISTORY_MAX, UndoEngine, UndoGroup};

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Insert,
    VisualChar,
    VisualLine,
}

impl Mode {
    /// Stable name exposed to scripting collaborators.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::VisualChar => "visual",
            Mode::VisualLine => "visual-line",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Mode::Normal),
            "insert" => Some(Mode::Insert),
            "visual" => Some(Mode::VisualChar),
            "visual-line" => Some(Mode::VisualLine),
            _ => None,
        }
    }

    pub fn is_visual(self) -> bool {
        matches!(self, Mode::VisualChar | Mode::VisualLine)
    }
}

pub struct EditorState {
    buffer: Buffer,
    undo: UndoEngine,
    pub registers: Registers,
    pub mode: Mode,
    /// Absolute offset where visual selection started.
    visual_anchor: Option<usize>,
    status: Option<String>,
    pub file_name: Option<PathBuf>,
    dirty: bool,
    revision: u64,
}

impl EditorState {
    pub fn new(buffer: Buffer) -> Self {
        Self::with_history(buffer, UNDO_HISTORY_MAX)
    }

    pub fn with_history(buffer: Buffer, max_groups: usize) -> Self {
        Self {
            buffer,
            undo: UndoEngine::with_capacity(max_groups),
            registers: Registers::new(),
            mode: Mode::Normal,
            visual_anchor: None,
            status: None,
            file_name: None,
            dirty: false,
            revision: 0,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Incremented on every successful mutation, undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn touched(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), TextError> {
        if let Some(inverse) = self.buffer.insert(pos, text)? {
            self.undo.record(inverse, pos);
            self.touched();
        }
        Ok(())
    }

    /// Remove `[start, end)` and return the removed text.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<String, TextError> {
        match self.buffer.delete(start, end)? {
            Some(inverse) => {
                let removed = match &inverse {
                    core_text::Operation::Insert { text, .. } => text.clone(),
                    core_text::Operation::Delete { .. } => String::new(),
                };
                self.undo.record(inverse, start);
                self.touched();
                Ok(removed)
            }
            None => Ok(String::new()),
        }
    }

    /// Push `inverse` onto the history without applying anything to the
    /// buffer. The next undo replays it against whatever text is there.
    #[cfg(any(test, feature = "test-support"))]
    #[doc(hidden)]
    pub fn record_unapplied(&mut self, inverse: core_text::Operation, cursor: usize) {
        self.undo.record(inverse, cursor);
    }

    /// Replace the whole text as a single undo group.
    pub fn replace_all(&mut self, text: &str, cursor: usize) -> Result<(), TextError> {
        self.begin_group(cursor);
        let result = self
            .delete(0, self.buffer.len())
            .and_then(|_| self.insert(0, text));
        self.end_group();
        result
    }

    pub fn begin_group(&mut self, cursor: usize) {
        self.undo.begin_group(cursor);
    }

    pub fn end_group(&mut self) {
        self.undo.end_group();
    }

    pub fn in_group(&self) -> bool {
        self.undo.in_group()
    }

    /// Undo one group, returning the cursor to restore.
    pub fn undo(&mut self) -> Result<usize, HistoryError> {
        let cursor = self.undo.undo(&mut self.buffer)?;
        self.touched();
        Ok(cursor)
    }

    pub fn redo(&mut self) -> Result<usize, HistoryError> {
        let cursor = self.undo.redo(&mut self.buffer)?;
        self.touched();
        Ok(cursor)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(target: "state.mode", from = self.mode.name(), to = mode.name(), "mode_change");
        }
        self.mode = mode;
        if !mode.is_visual() {
            self.visual_anchor = None;
        }
    }

    /// Enter a visual mode anchored at `anchor`.
    pub fn enter_visual(&mut self, mode: Mode, anchor: usize) {
        debug_assert!(mode.is_visual());
        self.set_mode(mode);
        self.visual_anchor = Some(anchor);
    }

    pub fn visual_anchor(&self) -> Option<usize> {
        self.visual_anchor
    }

    pub fn set_visual_anchor(&mut self, anchor: usize) {
        self.visual_anchor = Some(anchor);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        trace!(target: "state.status", len = msg.len(), "status_set");
        self.status = Some(msg);
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_bump_revision_and_dirty() {
        let mut st = EditorState::new(Buffer::from_str("t", "abc"));
        assert!(!st.is_dirty());
        st.insert(3, "d").unwrap();
        assert_eq!(st.revision(), 1);
        assert_eq!(st.delete(0, 2).unwrap(), "ab");
        assert_eq!(st.buffer().text(), "cd");
        assert!(st.is_dirty());
        // Empty edits are not changes.
        st.insert(0, "").unwrap();
        assert_eq!(st.revision(), 2);
    }

    #[test]
    fn undo_all_then_redo_all() {
        let mut st = EditorState::new(Buffer::from_str("t", "start"));
        st.insert(5, " one").unwrap();
        st.delete(0, 2).unwrap();
        st.begin_group(0);
        st.insert(0, "X").unwrap();
        st.insert(1, "Y").unwrap();
        st.end_group();
        let final_text = st.buffer().text();
        while st.undo().is_ok() {}
        assert_eq!(st.buffer().text(), "start");
        while st.redo().is_ok() {}
        assert_eq!(st.buffer().text(), final_text);
    }

    #[test]
    fn replace_all_is_one_undo_step() {
        let mut st = EditorState::new(Buffer::from_str("t", "old"));
        st.replace_all("new text", 0).unwrap();
        assert_eq!(st.buffer().text(), "new text");
        assert_eq!(st.undo_depth(), 1);
        st.undo().unwrap();
        assert_eq!(st.buffer().text(), "old");
    }

    #[test]
    fn leaving_visual_clears_anchor() {
        let mut st = EditorState::new(Buffer::from_str("t", "abc"));
        st.enter_visual(Mode::VisualChar, 1);
        assert_eq!(st.visual_anchor(), Some(1));
        st.set_mode(Mode::Normal);
        assert_eq!(st.visual_anchor(), None);
        assert_eq!(Mode::from_name("visual-line"), Some(Mode::VisualLine));
        assert_eq!(Mode::Insert.name(), "insert");
    }
}

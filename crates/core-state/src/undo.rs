//! Operation-log undo/redo.
//!
//! Every buffer mutation yields its inverse `Operation`; the engine collects
//! those inverses into groups and replays a whole group per `undo`/`redo`.
//! Replaying a group produces the opposite group (inverse of the inverse),
//! which moves to the other stack.
//!
//! Grouping:
//! * `begin_group`/`end_group` nest by depth; only the outermost pair commits.
//! * A group that collected nothing is discarded on close.
//! * An op recorded outside any group becomes a one-op group.
//! * Recording any op clears the redo stack.

use core_text::{Buffer, Operation, TextError};
use thiserror::Error;
use tracing::{error, trace, warn};

/// Default number of groups retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("history replay failed: {0}")]
    InvariantBroken(TextError),
}

/// Inverse operations in recording order plus the cursor to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoGroup {
    ops: Vec<Operation>,
    cursor: usize,
}

impl UndoGroup {
    fn new(cursor: usize) -> Self {
        Self {
            ops: Vec::new(),
            cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug)]
pub struct UndoEngine {
    undo_stack: Vec<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    pending: Option<UndoGroup>,
    depth: usize,
    max_groups: usize,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::with_capacity(UNDO_HISTORY_MAX)
    }

    pub fn with_capacity(max_groups: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
            depth: 0,
            max_groups: max_groups.max(1),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn in_group(&self) -> bool {
        self.depth > 0
    }

    /// Open (or nest into) a group. `cursor` is restored when the group is undone.
    pub fn begin_group(&mut self, cursor: usize) {
        self.depth += 1;
        if self.depth == 1 {
            self.pending = Some(UndoGroup::new(cursor));
        }
        trace!(target: "state.undo", depth = self.depth, "begin_group");
    }

    /// Close one nesting level; the outermost close commits a non-empty group.
    pub fn end_group(&mut self) {
        if self.depth == 0 {
            warn!(target: "state.undo", "end_group_without_begin");
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        match self.pending.take() {
            Some(group) if !group.is_empty() => {
                trace!(target: "state.undo", ops = group.len(), "group_committed");
                self.push_undo(group);
            }
            _ => trace!(target: "state.undo", "empty_group_discarded"),
        }
    }

    /// Record the inverse of a mutation that was just applied.
    pub fn record(&mut self, inverse: Operation, cursor: usize) {
        if inverse.is_noop() {
            return;
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
        match self.pending.as_mut() {
            Some(group) => group.ops.push(inverse),
            None => {
                let mut group = UndoGroup::new(cursor);
                group.ops.push(inverse);
                self.push_undo(group);
            }
        }
    }

    fn push_undo(&mut self, group: UndoGroup) {
        self.undo_stack.push(group);
        if self.undo_stack.len() > self.max_groups {
            self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "push_group");
    }

    /// Force-close any open group (e.g. before undo is issued mid-change).
    fn close_open_groups(&mut self) {
        if self.depth > 0 {
            warn!(target: "state.undo", depth = self.depth, "closing_open_group");
            self.depth = 1;
            self.end_group();
        }
    }

    /// Undo the latest group. Returns the cursor recorded when it began.
    pub fn undo(&mut self, buffer: &mut Buffer) -> Result<usize, HistoryError> {
        self.close_open_groups();
        let group = self.undo_stack.pop().ok_or(HistoryError::NothingToUndo)?;
        let restore = group.cursor;
        match replay(&group, buffer) {
            Ok((mut inverse, _)) => {
                inverse.cursor = restore;
                self.redo_stack.push(inverse);
                trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
                Ok(restore)
            }
            Err(e) => {
                error!(target: "state.undo", error = %e, "undo_replay_failed");
                Err(HistoryError::InvariantBroken(e))
            }
        }
    }

    /// Redo the latest undone group. Returns the leftmost offset it touched.
    pub fn redo(&mut self, buffer: &mut Buffer) -> Result<usize, HistoryError> {
        self.close_open_groups();
        let group = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;
        match replay(&group, buffer) {
            Ok((mut inverse, hint)) => {
                inverse.cursor = group.cursor;
                self.undo_stack.push(inverse);
                trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
                Ok(hint)
            }
            Err(e) => {
                error!(target: "state.undo", error = %e, "redo_replay_failed");
                Err(HistoryError::InvariantBroken(e))
            }
        }
    }
}

/// Apply a group's ops newest-first. On failure the ops already applied are
/// rolled back so the buffer is left exactly as it was.
fn replay(group: &UndoGroup, buffer: &mut Buffer) -> Result<(UndoGroup, usize), TextError> {
    let mut inverse = UndoGroup::new(group.cursor);
    let mut hint: Option<usize> = None;
    for op in group.ops.iter().rev() {
        match buffer.apply(op) {
            Ok(inv) => {
                let pos = op.position();
                hint = Some(hint.map_or(pos, |h| h.min(pos)));
                inverse.ops.extend(inv);
            }
            Err(e) => {
                for applied in inverse.ops.iter().rev() {
                    if let Err(rollback) = buffer.apply(applied) {
                        error!(target: "state.undo", error = %rollback, "rollback_failed");
                    }
                }
                return Err(e);
            }
        }
    }
    Ok((inverse, hint.unwrap_or(group.cursor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(engine: &mut UndoEngine, buf: &mut Buffer, op: Operation) {
        if let Some(inv) = buf.apply(&op).unwrap() {
            engine.record(inv, op.position());
        }
    }

    #[test]
    fn ungrouped_edits_undo_one_at_a_time() {
        let mut buf = Buffer::from_str("t", "one two three");
        let mut engine = UndoEngine::new();
        edit(&mut engine, &mut buf, Operation::Delete { start: 4, end: 8 });
        assert_eq!(buf.text(), "one three");
        assert_eq!(engine.undo(&mut buf).unwrap(), 4);
        assert_eq!(buf.text(), "one two three");
        engine.redo(&mut buf).unwrap();
        assert_eq!(buf.text(), "one three");
    }

    #[test]
    fn group_undoes_in_one_call() {
        let mut buf = Buffer::from_str("t", "abc");
        let mut engine = UndoEngine::new();
        engine.begin_group(1);
        edit(&mut engine, &mut buf, Operation::Insert { pos: 3, text: "d".into() });
        edit(&mut engine, &mut buf, Operation::Delete { start: 0, end: 1 });
        edit(&mut engine, &mut buf, Operation::Insert { pos: 0, text: "X".into() });
        engine.end_group();
        assert_eq!(buf.text(), "Xbcd");
        assert_eq!(engine.undo_depth(), 1);
        assert_eq!(engine.undo(&mut buf).unwrap(), 1);
        assert_eq!(buf.text(), "abc");
        assert_eq!(engine.redo(&mut buf).unwrap(), 0);
        assert_eq!(buf.text(), "Xbcd");
    }

    #[test]
    fn empty_and_nested_groups() {
        let mut buf = Buffer::from_str("t", "abc");
        let mut engine = UndoEngine::new();
        engine.begin_group(0);
        engine.end_group();
        assert_eq!(engine.undo_depth(), 0);

        engine.begin_group(0);
        edit(&mut engine, &mut buf, Operation::Delete { start: 0, end: 1 });
        engine.begin_group(0);
        edit(&mut engine, &mut buf, Operation::Delete { start: 0, end: 1 });
        engine.end_group();
        assert_eq!(engine.undo_depth(), 0, "inner close must not commit");
        engine.end_group();
        assert_eq!(engine.undo_depth(), 1);
        engine.undo(&mut buf).unwrap();
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut buf = Buffer::from_str("t", "abc");
        let mut engine = UndoEngine::new();
        edit(&mut engine, &mut buf, Operation::Delete { start: 0, end: 1 });
        engine.undo(&mut buf).unwrap();
        assert_eq!(engine.redo_depth(), 1);
        edit(&mut engine, &mut buf, Operation::Insert { pos: 0, text: "z".into() });
        assert_eq!(engine.redo_depth(), 0);
        assert_eq!(engine.redo(&mut buf), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn empty_stacks_report_nothing() {
        let mut buf = Buffer::from_str("t", "");
        let mut engine = UndoEngine::new();
        assert_eq!(engine.undo(&mut buf), Err(HistoryError::NothingToUndo));
        assert_eq!(engine.redo(&mut buf), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn history_is_capped() {
        let mut buf = Buffer::from_str("t", "");
        let mut engine = UndoEngine::with_capacity(3);
        for i in 0..5 {
            edit(&mut engine, &mut buf, Operation::Insert { pos: i, text: "x".into() });
        }
        assert_eq!(engine.undo_depth(), 3);
        while engine.undo(&mut buf).is_ok() {}
        assert_eq!(buf.text(), "xx");
    }

    #[test]
    fn broken_replay_rolls_back_and_reports() {
        let mut buf = Buffer::from_str("t", "abcdef");
        let mut engine = UndoEngine::new();
        engine.begin_group(0);
        edit(&mut engine, &mut buf, Operation::Insert { pos: 5, text: "Z".into() });
        edit(&mut engine, &mut buf, Operation::Delete { start: 0, end: 1 });
        engine.end_group();
        assert_eq!(buf.text(), "bcdeZf");
        // Shrink the buffer behind the engine's back: re-inserting "a" at 0
        // still applies, removing "Z" at 5..6 no longer can.
        buf.delete(3, 6).unwrap();
        assert_eq!(buf.text(), "bcd");
        let err = engine.undo(&mut buf).unwrap_err();
        assert!(matches!(err, HistoryError::InvariantBroken(_)));
        assert_eq!(buf.text(), "bcd", "partial replay must be rolled back");
        assert_eq!(engine.undo_depth(), 0);
    }
}

//! Dot-repeat engine.
//!
//! Holds exactly one record of the last buffer-changing command. Operators
//! store how their range was found (motion, doubled key, object or a visual
//! extent), never absolute offsets, so a replay re-resolves against the
//! current cursor. Insert sessions are recorded when they end, as the exact
//! sequence of insert-mode edit keys (backspaces included). A cursor motion
//! inside insert mode closes the current unit and starts a new one at the
//! new position.

use crate::{EditKind, InsertEntry, MotionKind, OperatorKind, TextObject};
use tracing::debug;

/// How an operator's range was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatTarget {
    Motion(MotionKind),
    /// Doubled operator (`dd`, `cc`).
    Line,
    Object(TextObject),
    /// Visual selection replayed as the same number of runes (charwise) or
    /// lines (linewise) from the cursor.
    Visual { linewise: bool, extent: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatAction {
    Operator {
        op: OperatorKind,
        target: RepeatTarget,
        count: u32,
        register: Option<char>,
        /// Edit keys typed after a `c` operator.
        inserted: Option<Vec<EditKind>>,
    },
    Insert {
        entry: InsertEntry,
        edits: Vec<EditKind>,
    },
    DeleteChar {
        forward: bool,
        count: u32,
        register: Option<char>,
    },
    Paste {
        before: bool,
        count: u32,
        register: Option<char>,
    },
}

/// Insert session awaiting `<Esc>`.
#[derive(Debug, Clone)]
enum Pending {
    Entry(InsertEntry),
    Change {
        target: RepeatTarget,
        count: u32,
        register: Option<char>,
    },
}

#[derive(Debug, Default)]
pub struct RepeatEngine {
    last: Option<RepeatAction>,
    pending: Option<(Pending, Vec<EditKind>)>,
    replaying: bool,
}

impl RepeatEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&RepeatAction> {
        self.last.as_ref()
    }

    pub fn record(&mut self, action: RepeatAction) {
        debug!(target: "actions.repeat", ?action, "repeat_recorded");
        self.last = Some(action);
    }

    /// Start capturing an insert session opened by `entry`.
    pub fn begin_insert(&mut self, entry: InsertEntry) {
        self.pending = Some((Pending::Entry(entry), Vec::new()));
    }

    /// Start capturing the insert half of a `c` operator.
    pub fn begin_change(&mut self, target: RepeatTarget, count: u32, register: Option<char>) {
        self.pending = Some((
            Pending::Change {
                target,
                count,
                register,
            },
            Vec::new(),
        ));
    }

    /// Append an applied insert-mode edit to the open session.
    pub fn edited(&mut self, kind: EditKind) {
        if let Some((_, edits)) = self.pending.as_mut() {
            edits.push(kind);
        }
    }

    /// The cursor moved inside insert mode. What was typed so far becomes
    /// the record (unless nothing was) and capture restarts as a plain `i`.
    pub fn break_insert(&mut self) {
        let Some((pending, edits)) = self.pending.take() else {
            return;
        };
        if !edits.is_empty() || matches!(pending, Pending::Change { .. }) {
            self.pending = Some((pending, edits));
            self.commit_insert();
        }
        debug!(target: "actions.repeat", "insert_unit_split");
        self.begin_insert(InsertEntry::Insert);
    }

    /// Close the current insert session and make it the repeat record.
    pub fn commit_insert(&mut self) {
        let Some((pending, edits)) = self.pending.take() else {
            return;
        };
        let action = match pending {
            Pending::Entry(entry) => RepeatAction::Insert { entry, edits },
            Pending::Change {
                target,
                count,
                register,
            } => RepeatAction::Operator {
                op: OperatorKind::Change,
                target,
                count,
                register,
                inserted: Some(edits),
            },
        };
        self.record(action);
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub(crate) fn set_replaying(&mut self, on: bool) {
        self.replaying = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_session_keeps_backspaces() {
        let mut r = RepeatEngine::new();
        r.begin_insert(InsertEntry::Append);
        r.edited(EditKind::Backspace);
        r.edited(EditKind::InsertChar('x'));
        r.commit_insert();
        assert_eq!(
            r.last(),
            Some(&RepeatAction::Insert {
                entry: InsertEntry::Append,
                edits: vec![EditKind::Backspace, EditKind::InsertChar('x')],
            })
        );
        // Committing again without a session keeps the record.
        r.commit_insert();
        assert!(r.last().is_some());
    }

    #[test]
    fn change_session_becomes_operator_record() {
        let mut r = RepeatEngine::new();
        r.begin_change(RepeatTarget::Line, 2, Some('a'));
        r.edited(EditKind::InsertChar('z'));
        r.commit_insert();
        assert_eq!(
            r.last(),
            Some(&RepeatAction::Operator {
                op: OperatorKind::Change,
                target: RepeatTarget::Line,
                count: 2,
                register: Some('a'),
                inserted: Some(vec![EditKind::InsertChar('z')]),
            })
        );
    }

    #[test]
    fn break_insert_records_prefix_and_restarts_capture() {
        let mut r = RepeatEngine::new();
        r.begin_insert(InsertEntry::Append);
        r.edited(EditKind::InsertChar('a'));
        r.break_insert();
        assert_eq!(
            r.last(),
            Some(&RepeatAction::Insert {
                entry: InsertEntry::Append,
                edits: vec![EditKind::InsertChar('a')],
            })
        );
        r.edited(EditKind::InsertChar('b'));
        r.commit_insert();
        assert_eq!(
            r.last(),
            Some(&RepeatAction::Insert {
                entry: InsertEntry::Insert,
                edits: vec![EditKind::InsertChar('b')],
            })
        );
    }

    #[test]
    fn break_insert_with_nothing_typed_keeps_previous_record() {
        let mut r = RepeatEngine::new();
        r.record(RepeatAction::Paste {
            before: false,
            count: 1,
            register: None,
        });
        r.begin_insert(InsertEntry::Insert);
        r.break_insert();
        assert!(matches!(r.last(), Some(RepeatAction::Paste { .. })));
    }
}

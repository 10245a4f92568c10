//! Undo / redo over the group history kept in `EditorState`.
//!
//! A count walks several groups; the walk stops quietly at the end of
//! history once at least one step was taken.

use super::DispatchResult;
use core_model::View;
use core_state::{EditorState, HistoryError, Mode};
use tracing::{error, trace};

#[derive(Clone, Copy, Debug)]
enum Direction {
    Undo,
    Redo,
}

pub(crate) fn handle_undo(count: u32, state: &mut EditorState, view: &mut View) -> DispatchResult {
    walk(Direction::Undo, count, state, view)
}

pub(crate) fn handle_redo(count: u32, state: &mut EditorState, view: &mut View) -> DispatchResult {
    walk(Direction::Redo, count, state, view)
}

fn walk(dir: Direction, count: u32, state: &mut EditorState, view: &mut View) -> DispatchResult {
    let mut steps = 0;
    let mut cursor = None;
    for _ in 0..count.max(1) {
        let step = match dir {
            Direction::Undo => state.undo(),
            Direction::Redo => state.redo(),
        };
        match step {
            Ok(pos) => {
                steps += 1;
                cursor = Some(pos);
            }
            Err(HistoryError::NothingToUndo | HistoryError::NothingToRedo) => break,
            Err(e @ HistoryError::InvariantBroken(_)) => {
                error!(target: "state.undo", ?dir, error = %e, "history_replay_failed");
                state.set_status(match dir {
                    Direction::Undo => "undo failed",
                    Direction::Redo => "redo failed",
                });
                return DispatchResult::failed();
            }
        }
    }
    let Some(pos) = cursor else {
        state.set_status(match dir {
            Direction::Undo => "Already at oldest change",
            Direction::Redo => "Already at newest change",
        });
        return DispatchResult::failed();
    };
    state.set_mode(Mode::Normal);
    view.cursor = pos;
    view.sticky_col = None;
    view.normalize_for_normal(state.buffer());
    trace!(target: "actions.dispatch", ?dir, steps, cursor = view.cursor, "history");
    DispatchResult::dirty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{Buffer, Operation};

    #[test]
    fn undo_then_redo_restores_text_and_cursor() {
        let mut s = EditorState::new(Buffer::from_str("t", "abc"));
        let mut v = View::new(2);
        s.begin_group(2);
        s.delete(1, 3).unwrap();
        s.end_group();
        v.cursor = 0;
        assert!(handle_undo(1, &mut s, &mut v).dirty);
        assert_eq!(s.buffer().text(), "abc");
        assert_eq!(v.cursor, 2);
        assert!(handle_redo(1, &mut s, &mut v).dirty);
        assert_eq!(s.buffer().text(), "a");
        assert_eq!(v.cursor, 0);
    }

    #[test]
    fn counted_undo_stops_at_oldest() {
        let mut s = EditorState::new(Buffer::from_str("t", "abc"));
        let mut v = View::new(0);
        for _ in 0..2 {
            s.begin_group(0);
            s.delete(0, 1).unwrap();
            s.end_group();
        }
        assert!(handle_undo(5, &mut s, &mut v).dirty);
        assert_eq!(s.buffer().text(), "abc");
        let r = handle_undo(1, &mut s, &mut v);
        assert!(r.failed);
        assert_eq!(s.status(), Some("Already at oldest change"));
        let r = handle_redo(3, &mut s, &mut v);
        assert!(r.dirty);
        assert_eq!(s.buffer().text(), "c");
        assert!(handle_redo(1, &mut s, &mut v).failed);
        assert_eq!(s.status(), Some("Already at newest change"));
    }

    #[test]
    fn broken_history_reports_and_leaves_text_alone() {
        let mut s = EditorState::new(Buffer::from_str("t", "abc"));
        let mut v = View::new(1);
        s.begin_group(1);
        s.record_unapplied(Operation::Delete { start: 10, end: 12 }, 1);
        s.insert(3, "d").unwrap();
        s.end_group();
        let r = handle_undo(1, &mut s, &mut v);
        assert!(r.failed);
        assert!(!r.dirty);
        assert_eq!(s.status(), Some("undo failed"));
        assert_eq!(s.buffer().text(), "abcd");
        assert_eq!(v.cursor, 1);
    }
}

//! Insert-session entry and exit.
//!
//! Entering insert opens the undo group that `<Esc>` closes, so everything
//! typed in one session (plus the line opened by `o` / `O`) undoes at once.

use super::{DispatchContext, DispatchResult};
use crate::InsertEntry;
use crate::indent::auto_indent;
use crate::span_resolver::{line_end, line_of, line_start};
use core_model::View;
use core_state::{EditorState, Mode};
use core_text::grapheme;

/// Switch to insert mode without touching undo grouping.
pub(crate) fn begin_insert_session(state: &mut EditorState) {
    state.set_mode(Mode::Insert);
}

pub(crate) fn enter_insert(
    entry: InsertEntry,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    if state.mode != Mode::Normal {
        return DispatchResult::clean();
    }
    let buf = state.buffer();
    let line = line_of(buf, view.cursor);
    let ls = line_start(buf, line);
    let le = line_end(buf, line);
    state.begin_group(view.cursor);
    match entry {
        InsertEntry::Insert => {}
        InsertEntry::Append => {
            if view.cursor < le {
                let text = state.buffer().line_text(line).unwrap_or_default();
                view.cursor = ls + grapheme::next_boundary(&text, view.cursor - ls);
            }
        }
        InsertEntry::AppendLineEnd => view.cursor = le,
        InsertEntry::InsertLineStart => {
            view.cursor = state.buffer().first_non_blank(line).unwrap_or(le);
        }
        InsertEntry::OpenBelow | InsertEntry::OpenAbove => {
            let indent = auto_indent(state.buffer(), line, &ctx.options);
            let (at, text, cursor) = if entry == InsertEntry::OpenBelow {
                (le, format!("\n{indent}"), le + 1 + indent.chars().count())
            } else {
                (ls, format!("{indent}\n"), ls + indent.chars().count())
            };
            if let Err(e) = state.insert(at, &text) {
                state.end_group();
                state.set_status(e.to_string());
                return DispatchResult::failed();
            }
            view.cursor = cursor;
        }
    }
    view.sticky_col = None;
    ctx.repeat.begin_insert(entry);
    begin_insert_session(state);
    tracing::trace!(target: "actions.dispatch", ?entry, cursor = view.cursor, "enter_insert");
    DispatchResult::dirty()
}

pub(crate) fn exit_insert(
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    if state.mode != Mode::Insert {
        return DispatchResult::clean();
    }
    if state.in_group() {
        state.end_group();
    }
    ctx.repeat.commit_insert();
    state.set_mode(Mode::Normal);
    let buf = state.buffer();
    let line = line_of(buf, view.cursor);
    let ls = line_start(buf, line);
    if view.cursor > ls {
        let text = buf.line_text(line).unwrap_or_default();
        view.cursor = ls + grapheme::prev_boundary(&text, view.cursor - ls);
    }
    view.normalize_for_normal(state.buffer());
    DispatchResult::dirty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    fn setup(text: &str, cursor: usize) -> (EditorState, View, DispatchContext) {
        (
            EditorState::new(Buffer::from_str("t", text)),
            View::new(cursor),
            DispatchContext::default(),
        )
    }

    #[test]
    fn append_entries_place_cursor() {
        let (mut s, mut v, mut ctx) = setup("  ab\ncd", 2);
        enter_insert(InsertEntry::Append, &mut s, &mut v, &mut ctx);
        assert_eq!(v.cursor, 3);
        exit_insert(&mut s, &mut v, &mut ctx);
        assert_eq!(v.cursor, 2);
        enter_insert(InsertEntry::AppendLineEnd, &mut s, &mut v, &mut ctx);
        assert_eq!(v.cursor, 4);
        exit_insert(&mut s, &mut v, &mut ctx);
        enter_insert(InsertEntry::InsertLineStart, &mut s, &mut v, &mut ctx);
        assert_eq!(v.cursor, 2);
    }

    #[test]
    fn open_below_and_above_with_indent() {
        let (mut s, mut v, mut ctx) = setup("    x\ny", 4);
        ctx.options.autoindent = true;
        enter_insert(InsertEntry::OpenBelow, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "    x\n    \ny");
        assert_eq!(v.cursor, 10);
        exit_insert(&mut s, &mut v, &mut ctx);
        assert_eq!(s.undo_depth(), 1);
        let (mut s, mut v, mut ctx) = setup("a\nb", 2);
        enter_insert(InsertEntry::OpenAbove, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "a\n\nb");
        assert_eq!(v.cursor, 2);
    }

    #[test]
    fn empty_session_leaves_no_undo_step() {
        let (mut s, mut v, mut ctx) = setup("abc", 1);
        enter_insert(InsertEntry::Insert, &mut s, &mut v, &mut ctx);
        assert_eq!(s.mode, Mode::Insert);
        exit_insert(&mut s, &mut v, &mut ctx);
        assert_eq!(s.mode, Mode::Normal);
        assert_eq!(s.undo_depth(), 0);
        assert_eq!(v.cursor, 0);
    }
}

//! Visual mode: entry, exit, selection growth and operators.
//!
//! The selection runs from the anchor kept in `EditorState` to the cursor,
//! inclusive of the cluster under whichever end is later.

use super::{DispatchContext, DispatchResult, nothing_to_operate, operator};
use crate::repeat::RepeatTarget;
use crate::span_resolver::{line_of, visual_span};
use crate::{OperatorKind, TextObject, VisualKind, text_object};
use core_model::View;
use core_state::{EditorState, Mode};
use tracing::debug;

fn mode_for(kind: VisualKind) -> Mode {
    match kind {
        VisualKind::Char => Mode::VisualChar,
        VisualKind::Line => Mode::VisualLine,
    }
}

/// `v` / `V`. Pressing the key of the active kind leaves visual mode; the
/// other kind switches while keeping the anchor.
pub(crate) fn enter(kind: VisualKind, state: &mut EditorState, view: &mut View) -> DispatchResult {
    let target = mode_for(kind);
    match state.mode {
        Mode::Normal => state.enter_visual(target, view.cursor),
        Mode::Insert => return DispatchResult::clean(),
        current if current == target => return exit(state, view),
        _ => {
            let anchor = state.visual_anchor().unwrap_or(view.cursor);
            state.enter_visual(target, anchor);
        }
    }
    DispatchResult::dirty()
}

pub(crate) fn exit(state: &mut EditorState, view: &mut View) -> DispatchResult {
    if !state.mode.is_visual() {
        return DispatchResult::clean();
    }
    state.set_mode(Mode::Normal);
    view.normalize_for_normal(state.buffer());
    DispatchResult::dirty()
}

/// `o`: jump to the other end of the selection.
pub(crate) fn swap_ends(state: &mut EditorState, view: &mut View) -> DispatchResult {
    let Some(anchor) = state.visual_anchor() else {
        return DispatchResult::clean();
    };
    state.set_visual_anchor(view.cursor);
    view.cursor = anchor;
    view.sticky_col = None;
    DispatchResult::dirty()
}

pub(crate) fn apply_operator(
    op: OperatorKind,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    if !state.mode.is_visual() {
        return DispatchResult::clean();
    }
    let linewise = state.mode == Mode::VisualLine;
    let anchor = state.visual_anchor().unwrap_or(view.cursor);
    let buf = state.buffer();
    let span = visual_span(buf, anchor, view.cursor, linewise);
    let extent = if linewise {
        let first = line_of(buf, span.start);
        let last = line_of(buf, span.end.saturating_sub(1).max(span.start));
        last - first + 1
    } else {
        span.len()
    };
    debug!(target: "actions.dispatch", ?op, anchor, cursor = view.cursor, linewise, extent, "visual_operator");
    state.set_mode(Mode::Normal);
    if span.is_empty() {
        view.normalize_for_normal(state.buffer());
        return nothing_to_operate(state);
    }
    if op == OperatorKind::Yank {
        view.cursor = span.start;
    }
    let target = RepeatTarget::Visual { linewise, extent };
    operator::apply(op, span, target, 1, register, state, view, ctx)
}

/// `iw`, `a(` and friends in visual mode: grow the selection to cover the
/// object. Paragraph objects turn a charwise selection linewise.
pub(crate) fn select_object(
    object: TextObject,
    count: u32,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    if !state.mode.is_visual() {
        return DispatchResult::clean();
    }
    let Some(span) = text_object::resolve(state.buffer(), view.cursor, object, count) else {
        return nothing_to_operate(state);
    };
    if span.is_empty() {
        return nothing_to_operate(state);
    }
    let anchor = state.visual_anchor().unwrap_or(view.cursor);
    let anchor = if anchor == view.cursor {
        span.start
    } else {
        anchor.min(span.start)
    };
    state.set_visual_anchor(anchor);
    view.cursor = view.cursor.max(span.end - 1);
    view.sticky_col = None;
    if span.linewise && state.mode == Mode::VisualChar {
        state.set_mode(Mode::VisualLine);
    }
    view.normalize_for_normal(state.buffer());
    DispatchResult::dirty()
}

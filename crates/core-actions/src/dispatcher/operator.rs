//! Operator application (`d`, `c`, `y`) over resolved spans.

use super::{DispatchContext, DispatchResult, mode, nothing_to_operate};
use crate::repeat::{RepeatAction, RepeatTarget};
use crate::span_resolver::{self, Span, line_end, line_of, line_start, linewise_span};
use crate::{MotionKind, OperatorKind, TextObject, indent, text_object};
use core_model::View;
use core_state::{EditorState, RegisterKind};
use tracing::debug;

pub(crate) fn apply_motion(
    op: OperatorKind,
    motion: MotionKind,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let Some(span) = span_resolver::operator_span(state.buffer(), view.cursor, op, motion, count)
    else {
        return nothing_to_operate(state);
    };
    apply(op, span, RepeatTarget::Motion(motion), count, register, state, view, ctx)
}

/// `dd` / `cc` / `yy`: `count` lines starting at the cursor line.
pub(crate) fn apply_linewise(
    op: OperatorKind,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let buf = state.buffer();
    let first = line_of(buf, view.cursor);
    let last = (first + count.max(1) as usize - 1).min(buf.line_count().saturating_sub(1));
    let span = linewise_span(buf, first, last);
    apply(op, span, RepeatTarget::Line, count, register, state, view, ctx)
}

pub(crate) fn apply_object(
    op: OperatorKind,
    object: TextObject,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let Some(span) = text_object::resolve(state.buffer(), view.cursor, object, count) else {
        return nothing_to_operate(state);
    };
    apply(op, span, RepeatTarget::Object(object), count, register, state, view, ctx)
}

/// Replay of a visual operator: the same extent measured from the cursor.
pub(crate) fn apply_region(
    op: OperatorKind,
    linewise: bool,
    extent: usize,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let buf = state.buffer();
    let span = if linewise {
        let first = line_of(buf, view.cursor);
        let last = (first + extent.max(1) - 1).min(buf.line_count().saturating_sub(1));
        linewise_span(buf, first, last)
    } else {
        Span::charwise(view.cursor, (view.cursor + extent).min(buf.len()))
    };
    let target = RepeatTarget::Visual { linewise, extent };
    apply(op, span, target, 1, register, state, view, ctx)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn apply(
    op: OperatorKind,
    span: Span,
    target: RepeatTarget,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    debug!(target: "actions.dispatch", ?op, start = span.start, end = span.end, linewise = span.linewise, "apply_operator");
    match op {
        OperatorKind::Yank => yank(span, register, state, view),
        OperatorKind::Delete => {
            let result = delete(span, register, state, view);
            if result.dirty {
                ctx.repeat.record(RepeatAction::Operator {
                    op,
                    target,
                    count,
                    register,
                    inserted: None,
                });
            }
            result
        }
        OperatorKind::Change => change(span, target, count, register, state, view, ctx),
    }
}

/// Register text for `span`; linewise content always ends with a newline.
fn register_text(state: &EditorState, span: Span) -> Option<(String, RegisterKind)> {
    let mut text = state.buffer().slice(span.start, span.end).ok()?;
    if span.linewise {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Some((text, RegisterKind::Linewise))
    } else {
        Some((text, RegisterKind::Charwise))
    }
}

fn yank(span: Span, register: Option<char>, state: &mut EditorState, view: &mut View) -> DispatchResult {
    if span.is_empty() {
        return DispatchResult::clean();
    }
    let Some((text, kind)) = register_text(state, span) else {
        return nothing_to_operate(state);
    };
    if let Err(e) = state.registers.write_yank(text, kind, register) {
        state.set_status(e.to_string());
        return DispatchResult::failed();
    }
    if span.start < view.cursor {
        view.cursor = span.start;
    }
    view.normalize_for_normal(state.buffer());
    DispatchResult::dirty()
}

fn delete(span: Span, register: Option<char>, state: &mut EditorState, view: &mut View) -> DispatchResult {
    // `d0` at column 0 succeeds without touching anything.
    if span.is_empty() {
        return DispatchResult::clean();
    }
    let Some((text, kind)) = register_text(state, span) else {
        return nothing_to_operate(state);
    };
    let mut start = span.start;
    let buf = state.buffer();
    if span.linewise
        && span.end == buf.len()
        && start > 0
        && buf.char_at(span.end - 1) != Some('\n')
    {
        // Last lines without a trailing newline take the preceding one.
        start -= 1;
    }
    state.begin_group(view.cursor);
    let removed = state.delete(start, span.end);
    state.end_group();
    if let Err(e) = removed {
        state.set_status(e.to_string());
        return DispatchResult::failed();
    }
    if let Err(e) = state.registers.write_delete(text, kind, register) {
        state.set_status(e.to_string());
    }
    let buf = state.buffer();
    view.cursor = if span.linewise {
        // After removing the last lines the cursor lands on the new last line.
        let line = if start < span.start {
            line_of(buf, buf.len())
        } else {
            line_of(buf, start)
        };
        buf.first_non_blank(line).unwrap_or(buf.len())
    } else {
        span.start
    };
    view.normalize_for_normal(state.buffer());
    DispatchResult::dirty()
}

#[allow(clippy::too_many_arguments)]
fn change(
    span: Span,
    target: RepeatTarget,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let (start, end, indent) = if span.linewise {
        // Keep the last newline; the changed lines collapse to one (indented) line.
        let buf = state.buffer();
        let first = line_of(buf, span.start);
        let last = line_of(buf, span.end.saturating_sub(1).max(span.start));
        let indent = indent::auto_indent(buf, first, &ctx.options);
        (line_start(buf, first), line_end(buf, last), indent)
    } else {
        (span.start, span.end, String::new())
    };
    let saved = register_text(state, span);
    state.begin_group(view.cursor);
    let result = state
        .delete(start, end)
        .and_then(|_| state.insert(start, &indent));
    if let Err(e) = result {
        state.end_group();
        state.set_status(e.to_string());
        return DispatchResult::failed();
    }
    if let Some((text, kind)) = saved
        && !span.is_empty()
        && let Err(e) = state.registers.write_delete(text, kind, register)
    {
        state.set_status(e.to_string());
    }
    view.cursor = start + indent.chars().count();
    view.sticky_col = None;
    ctx.repeat.begin_change(target, count, register);
    // The group stays open until the insert session ends.
    mode::begin_insert_session(state);
    DispatchResult::dirty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotionKind;
    use core_state::Mode;
    use core_text::Buffer;

    fn setup(text: &str, cursor: usize) -> (EditorState, View, DispatchContext) {
        (
            EditorState::new(Buffer::from_str("t", text)),
            View::new(cursor),
            DispatchContext::default(),
        )
    }

    #[test]
    fn dw_fills_register_one() {
        let (mut s, mut v, mut ctx) = setup("hello world", 0);
        let r = apply_motion(OperatorKind::Delete, MotionKind::WordForward, 1, None, &mut s, &mut v, &mut ctx);
        assert!(r.dirty);
        assert_eq!(s.buffer().text(), "world");
        assert_eq!(s.registers.numbered(1).unwrap().text, "hello ");
        assert_eq!(s.registers.unnamed().unwrap().text, "hello ");
        assert_eq!(s.undo_depth(), 1);
    }

    #[test]
    fn dd_on_last_line_takes_preceding_newline() {
        let (mut s, mut v, mut ctx) = setup("a\nb\nc", 4);
        apply_linewise(OperatorKind::Delete, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "a\nb");
        assert_eq!(s.registers.unnamed().unwrap().text, "c\n");
        assert!(s.registers.unnamed().unwrap().is_linewise());
        assert_eq!(v.cursor, 2);
    }

    #[test]
    fn dd_with_count_past_end_clamps() {
        let (mut s, mut v, mut ctx) = setup("a\n  b\nc", 0);
        apply_linewise(OperatorKind::Delete, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "  b\nc");
        assert_eq!(v.cursor, 2);
        apply_linewise(OperatorKind::Delete, 9, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "");
    }

    #[test]
    fn yank_leaves_text_and_moves_to_start() {
        let (mut s, mut v, mut ctx) = setup("foo bar", 6);
        apply_motion(OperatorKind::Yank, MotionKind::WordBackward, 1, Some('a'), &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "foo bar");
        assert_eq!(s.registers.named('a').unwrap().text, "ba");
        assert_eq!(s.registers.numbered(0).unwrap().text, "ba");
        assert_eq!(v.cursor, 4);
        assert!(ctx.repeat.last().is_none());
        assert_eq!(s.undo_depth(), 0);
    }

    #[test]
    fn cc_keeps_indent_and_enters_insert() {
        let (mut s, mut v, mut ctx) = setup("x\n    old\ny", 4);
        ctx.options.autoindent = true;
        apply_linewise(OperatorKind::Change, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "x\n    \ny");
        assert_eq!(s.mode, Mode::Insert);
        assert_eq!(v.cursor, 6);
        assert!(s.in_group());
        assert_eq!(s.registers.unnamed().unwrap().text, "    old\n");
    }

    #[test]
    fn missing_object_reports_nothing() {
        let (mut s, mut v, mut ctx) = setup("abc", 1);
        let obj = TextObject::from_key(crate::ObjectScope::Inner, '(').unwrap();
        let r = apply_object(OperatorKind::Delete, obj, 1, None, &mut s, &mut v, &mut ctx);
        assert!(r.failed);
        assert_eq!(s.status(), Some("nothing to operate on"));
        assert_eq!(s.buffer().text(), "abc");
    }

    #[test]
    fn empty_motion_range_is_quiet_noop() {
        let (mut s, mut v, mut ctx) = setup("abc", 0);
        for op in [OperatorKind::Delete, OperatorKind::Yank] {
            let r = apply_motion(op, MotionKind::LineStart, 1, None, &mut s, &mut v, &mut ctx);
            assert!(!r.failed);
            assert!(!r.dirty);
        }
        assert_eq!(s.buffer().text(), "abc");
        assert_eq!(s.status(), None);
        assert!(s.registers.unnamed().is_none());
        assert!(ctx.repeat.last().is_none());
        assert_eq!(s.undo_depth(), 0);
    }
}

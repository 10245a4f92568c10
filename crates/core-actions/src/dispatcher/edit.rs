//! Text edits outside the operator path: insert-mode keys, `x` / `X` and
//! paste.
//!
//! Insert-mode edits join the group opened when the session started. `x`,
//! `X` and `p` / `P` each form their own group.

use super::{DispatchContext, DispatchResult};
use crate::EditKind;
use crate::indent::auto_indent;
use crate::repeat::RepeatAction;
use crate::span_resolver::{line_end, line_of, line_start};
use core_model::View;
use core_state::{EditorState, Mode, RegisterKind};
use core_text::grapheme;

pub(crate) fn handle_edit(
    kind: EditKind,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    if state.mode != Mode::Insert {
        return DispatchResult::clean();
    }
    let before = view.cursor;
    let result = match kind {
        EditKind::InsertChar(c) => {
            let mut tmp = [0u8; 4];
            state.insert(view.cursor, c.encode_utf8(&mut tmp)).map(|_| {
                view.cursor += 1;
            })
        }
        EditKind::InsertNewline => {
            let line = line_of(state.buffer(), view.cursor);
            let indent = auto_indent(state.buffer(), line, &ctx.options);
            let text = format!("\n{indent}");
            state.insert(view.cursor, &text).map(|_| {
                view.cursor += 1 + indent.chars().count();
            })
        }
        EditKind::InsertTab => {
            let text = if ctx.options.expandtab {
                let buf = state.buffer();
                let line = line_of(buf, view.cursor);
                let col = view.cursor - line_start(buf, line);
                let line_text = buf.line_text(line).unwrap_or_default();
                let sw = ctx.options.shiftwidth.max(1);
                let width = grapheme::visual_col(&line_text, col);
                " ".repeat(sw - width % sw)
            } else {
                "\t".to_string()
            };
            state.insert(view.cursor, &text).map(|_| {
                view.cursor += text.chars().count();
            })
        }
        EditKind::Backspace => {
            if view.cursor == 0 {
                return DispatchResult::failed();
            }
            state.delete(view.cursor - 1, view.cursor).map(|_| {
                view.cursor -= 1;
            })
        }
    };
    match result {
        Ok(()) => {
            ctx.repeat.edited(kind);
            view.sticky_col = None;
            tracing::trace!(target: "actions.dispatch", ?kind, from = before, to = view.cursor, "edit");
            DispatchResult::dirty()
        }
        Err(e) => {
            state.set_status(e.to_string());
            DispatchResult::failed()
        }
    }
}

/// `x` (forward) / `X`: delete `count` clusters without leaving the line.
pub(crate) fn delete_char(
    forward: bool,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let buf = state.buffer();
    let line = line_of(buf, view.cursor);
    let ls = line_start(buf, line);
    let text = buf.line_text(line).unwrap_or_default();
    let len = text.chars().count();
    let col = view.cursor - ls;
    let (from, to) = if forward {
        if col >= len {
            return DispatchResult::failed();
        }
        let end = (0..count.max(1)).fold(col, |c, _| grapheme::next_boundary(&text, c));
        (col, end.min(len))
    } else {
        if col == 0 {
            return DispatchResult::failed();
        }
        let start = (0..count.max(1)).fold(col, |c, _| grapheme::prev_boundary(&text, c));
        (start, col)
    };
    state.begin_group(view.cursor);
    let removed = state.delete(ls + from, ls + to);
    state.end_group();
    let removed = match removed {
        Ok(r) => r,
        Err(e) => {
            state.set_status(e.to_string());
            return DispatchResult::failed();
        }
    };
    if let Err(e) = state
        .registers
        .write_delete(removed, RegisterKind::Charwise, register)
    {
        state.set_status(e.to_string());
    }
    view.cursor = ls + from;
    view.normalize_for_normal(state.buffer());
    ctx.repeat.record(RepeatAction::DeleteChar {
        forward,
        count,
        register,
    });
    DispatchResult::dirty()
}

/// `p` / `P`: charwise text goes after / at the cursor, linewise text below /
/// above the cursor line. Blockwise content is pasted charwise.
pub(crate) fn paste(
    before: bool,
    count: u32,
    register: Option<char>,
    state: &mut EditorState,
    view: &mut View,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    let reg = match state.registers.read_paste(register) {
        Ok(r) => r,
        Err(e) => {
            state.set_status(e.to_string());
            return DispatchResult::failed();
        }
    };
    let times = count.max(1) as usize;
    let buf = state.buffer();
    let line = line_of(buf, view.cursor);
    let (at, text, first_line) = if reg.is_linewise() {
        let body = reg.text.repeat(times);
        if before {
            (line_start(buf, line), body, line)
        } else if line + 1 < buf.line_count() {
            (line_start(buf, line + 1), body, line + 1)
        } else {
            let trimmed = body.strip_suffix('\n').unwrap_or(&body);
            (buf.len(), format!("\n{trimmed}"), line + 1)
        }
    } else {
        let at = if before || view.cursor >= line_end(buf, line) {
            view.cursor
        } else {
            let ls = line_start(buf, line);
            let text = buf.line_text(line).unwrap_or_default();
            ls + grapheme::next_boundary(&text, view.cursor - ls)
        };
        (at, reg.text.repeat(times), line)
    };
    if text.is_empty() {
        return DispatchResult::clean();
    }
    state.begin_group(view.cursor);
    let result = state.insert(at, &text);
    state.end_group();
    if let Err(e) = result {
        state.set_status(e.to_string());
        return DispatchResult::failed();
    }
    let buf = state.buffer();
    view.cursor = if reg.kind == RegisterKind::Linewise {
        buf.first_non_blank(first_line).unwrap_or(buf.len())
    } else {
        at + text.chars().count() - 1
    };
    view.normalize_for_normal(state.buffer());
    ctx.repeat.record(RepeatAction::Paste {
        before,
        count,
        register,
    });
    DispatchResult::dirty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::Register;
    use core_text::Buffer;

    fn setup(text: &str, cursor: usize) -> (EditorState, View, DispatchContext) {
        (
            EditorState::new(Buffer::from_str("t", text)),
            View::new(cursor),
            DispatchContext::default(),
        )
    }

    #[test]
    fn x_uses_small_delete_and_stays_on_line() {
        let (mut s, mut v, mut ctx) = setup("ab\ncd", 1);
        delete_char(true, 5, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "a\ncd");
        assert_eq!(v.cursor, 0);
        assert_eq!(s.registers.small_delete().unwrap().text, "b");
        assert!(s.registers.numbered(1).is_none());
    }

    #[test]
    fn x_removes_whole_cluster() {
        let (mut s, mut v, mut ctx) = setup("e\u{0301}x", 0);
        delete_char(true, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "x");
        assert_eq!(s.registers.unnamed().unwrap().text, "e\u{0301}");
    }

    #[test]
    fn big_x_deletes_before_cursor() {
        let (mut s, mut v, mut ctx) = setup("abcd", 3);
        delete_char(false, 2, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "ad");
        assert_eq!(v.cursor, 1);
        let r = delete_char(false, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "d");
        assert!(r.dirty);
        assert!(delete_char(false, 1, None, &mut s, &mut v, &mut ctx).failed);
    }

    #[test]
    fn charwise_paste_after_and_before() {
        let (mut s, mut v, mut ctx) = setup("ac", 0);
        s.registers
            .write_yank("b", RegisterKind::Charwise, None)
            .unwrap();
        paste(false, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "abc");
        assert_eq!(v.cursor, 1);
        paste(true, 3, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "abbbbc");
        assert_eq!(v.cursor, 3);
    }

    #[test]
    fn linewise_paste_below_last_line() {
        let (mut s, mut v, mut ctx) = setup("one\n  two", 0);
        s.registers
            .write_yank(Register::linewise("  new").text, RegisterKind::Linewise, None)
            .unwrap();
        v.cursor = 5;
        paste(false, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "one\n  two\n  new");
        assert_eq!(v.cursor, 12);
        v.cursor = 0;
        paste(true, 1, None, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "  new\none\n  two\n  new");
        assert_eq!(v.cursor, 2);
    }

    #[test]
    fn empty_register_reports() {
        let (mut s, mut v, mut ctx) = setup("x", 0);
        let r = paste(false, 1, Some('q'), &mut s, &mut v, &mut ctx);
        assert!(r.failed);
        assert_eq!(s.status(), Some("register q is empty"));
    }

    #[test]
    fn insert_edits_need_insert_mode() {
        let (mut s, mut v, mut ctx) = setup("", 0);
        assert!(!handle_edit(EditKind::InsertChar('a'), &mut s, &mut v, &mut ctx).dirty);
        s.set_mode(Mode::Insert);
        handle_edit(EditKind::InsertChar('a'), &mut s, &mut v, &mut ctx);
        handle_edit(EditKind::InsertTab, &mut s, &mut v, &mut ctx);
        handle_edit(EditKind::InsertChar('b'), &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "a   b");
        handle_edit(EditKind::Backspace, &mut s, &mut v, &mut ctx);
        assert_eq!(s.buffer().text(), "a   ");
        assert_eq!(v.cursor, 4);
    }
}

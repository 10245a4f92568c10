//! Text object resolution (`iw`, `a"`, `i(`, `ap`, ...).
//!
//! Every resolver returns `None` when the cursor context holds no object;
//! the dispatcher reports that as "nothing to operate on".

use crate::span_resolver::{Span, line_end, line_of, line_start, linewise_span};
use crate::{ObjectScope, ObjectUnit, TextObject};
use core_text::{Buffer, CharClass, char_class};

pub fn resolve(buf: &Buffer, cursor: usize, object: TextObject, count: u32) -> Option<Span> {
    let count = count.max(1);
    if buf.is_empty() && object.unit != ObjectUnit::Paragraph {
        return None;
    }
    let cursor = cursor.min(buf.len());
    let span = match object.unit {
        ObjectUnit::Word => word(buf, cursor, object.scope, count, false),
        ObjectUnit::BigWord => word(buf, cursor, object.scope, count, true),
        ObjectUnit::Quote(q) => quote(buf, cursor, object.scope, q),
        ObjectUnit::Pair { open, close } => pair(buf, cursor, object.scope, count, open, close),
        ObjectUnit::Paragraph => Some(paragraph(buf, cursor, object.scope, count)),
    };
    tracing::trace!(target: "actions.dispatch", ?object, count, found = span.is_some(), "text_object");
    span
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn word(buf: &Buffer, cursor: usize, scope: ObjectScope, count: u32, big: bool) -> Option<Span> {
    let chars = buf.chars();
    let line = line_of(buf, cursor);
    let ls = line_start(buf, line);
    let le = line_end(buf, line);
    if ls == le {
        return None;
    }
    let mut pos = cursor.min(le - 1);
    if is_blank(chars[pos]) {
        pos = (pos..le)
            .find(|&i| !is_blank(chars[i]))
            .or_else(|| (ls..pos).rev().find(|&i| !is_blank(chars[i])))?;
    }
    let class_at = |i: usize| char_class(chars[i], big);
    let class = class_at(pos);
    let mut start = pos;
    while start > ls && class_at(start - 1) == class {
        start -= 1;
    }
    let mut end = pos + 1;
    while end < le && class_at(end) == class {
        end += 1;
    }
    match scope {
        ObjectScope::Inner => {
            // Each further count takes the next run, blank or not.
            for _ in 1..count {
                if end >= le {
                    break;
                }
                let next = class_at(end);
                while end < le && class_at(end) == next {
                    end += 1;
                }
            }
        }
        ObjectScope::Around => {
            for _ in 1..count {
                while end < le && class_at(end) == CharClass::Blank {
                    end += 1;
                }
                if end >= le {
                    break;
                }
                let next = class_at(end);
                while end < le && class_at(end) == next {
                    end += 1;
                }
            }
            let word_end = end;
            while end < le && is_blank(chars[end]) {
                end += 1;
            }
            if end == word_end {
                while start > ls && is_blank(chars[start - 1]) {
                    start -= 1;
                }
            }
        }
    }
    Some(Span::charwise(start, end))
}

fn quote(buf: &Buffer, cursor: usize, scope: ObjectScope, q: char) -> Option<Span> {
    let chars = buf.chars();
    let line = line_of(buf, cursor);
    let ls = line_start(buf, line);
    let le = line_end(buf, line);
    let escaped = |i: usize| {
        let mut n = 0;
        while i > ls + n && chars[i - n - 1] == '\\' {
            n += 1;
        }
        n % 2 == 1
    };
    let quotes: Vec<usize> = (ls..le).filter(|&i| chars[i] == q && !escaped(i)).collect();
    let pairs: Vec<(usize, usize)> = quotes.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    let (open, close) = pairs
        .iter()
        .find(|(o, c)| *o <= cursor && cursor <= *c)
        .or_else(|| pairs.iter().find(|(o, _)| *o > cursor))
        .copied()?;
    match scope {
        ObjectScope::Inner => Some(Span::charwise(open + 1, close)),
        ObjectScope::Around => {
            let mut start = open;
            let mut end = close + 1;
            let after = end;
            while end < le && is_blank(chars[end]) {
                end += 1;
            }
            if end == after {
                while start > ls && is_blank(chars[start - 1]) {
                    start -= 1;
                }
            }
            Some(Span::charwise(start, end))
        }
    }
}

/// Nearest unmatched `open` strictly before `from`.
fn find_open(chars: &[char], from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..from).rev() {
        if chars[i] == close {
            depth += 1;
        } else if chars[i] == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// `close` matching the `open` at `open_at`.
fn find_close(chars: &[char], open_at: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open_at + 1) {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

fn pair(
    buf: &Buffer,
    cursor: usize,
    scope: ObjectScope,
    count: u32,
    open: char,
    close: char,
) -> Option<Span> {
    let chars = buf.chars();
    let at = cursor.min(chars.len().saturating_sub(1));
    let mut open_at = if chars[at] == open {
        at
    } else {
        find_open(chars, at, open, close)?
    };
    let mut close_at = find_close(chars, open_at, open, close)?;
    for _ in 1..count {
        open_at = find_open(chars, open_at, open, close)?;
        close_at = find_close(chars, open_at, open, close)?;
    }
    match scope {
        ObjectScope::Around => Some(Span::charwise(open_at, close_at + 1)),
        ObjectScope::Inner => {
            let mut start = open_at + 1;
            let mut end = close_at;
            if start < end && chars[start] == '\n' {
                start += 1;
            }
            // A close bracket on its own (indented) line keeps that line.
            if let Some(nl) = (start..end).rev().find(|&i| chars[i] == '\n')
                && chars[nl + 1..end].iter().all(|&c| is_blank(c))
            {
                end = nl + 1;
            }
            Some(Span::charwise(start, end.max(start)))
        }
    }
}

fn paragraph(buf: &Buffer, cursor: usize, scope: ObjectScope, count: u32) -> Span {
    let lines = buf.line_count();
    let blank = |l: usize| buf.is_blank_line(l);
    let line = line_of(buf, cursor);
    let kind = blank(line);
    let mut first = line;
    while first > 0 && blank(first - 1) == kind {
        first -= 1;
    }
    let mut last = line;
    while last + 1 < lines && blank(last + 1) == kind {
        last += 1;
    }
    // Extend `last` over the following run of lines.
    let next_run = |last: usize| {
        if last + 1 >= lines {
            return last;
        }
        let k = blank(last + 1);
        let mut e = last + 1;
        while e + 1 < lines && blank(e + 1) == k {
            e += 1;
        }
        e
    };
    match scope {
        ObjectScope::Inner => {
            for _ in 1..count {
                last = next_run(last);
            }
        }
        ObjectScope::Around => {
            let mut trailing = false;
            for i in 0..count {
                if i > 0 {
                    last = next_run(last);
                }
                trailing = last + 1 < lines && blank(last + 1) != blank(last);
                if trailing {
                    last = next_run(last);
                }
            }
            if !trailing && !kind {
                while first > 0 && blank(first - 1) {
                    first -= 1;
                }
            }
        }
    }
    linewise_span(buf, first, last)
}

//! Auto-indent helpers for `o`, `O`, `cc` and `<CR>` in insert mode.

use crate::dispatcher::EditOptions;
use core_text::Buffer;

/// Display width of the leading whitespace of `line`. Tabs advance to the
/// next multiple of `shiftwidth`.
pub fn indent_width(line: &str, shiftwidth: usize) -> usize {
    let sw = shiftwidth.max(1);
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += sw - width % sw,
            _ => break,
        }
    }
    width
}

/// Round `width` to a multiple of `shiftwidth`. Exactly half rounds down.
pub fn round_indent(width: usize, shiftwidth: usize) -> usize {
    let sw = shiftwidth.max(1);
    let rem = width % sw;
    if rem * 2 > sw {
        width - rem + sw
    } else {
        width - rem
    }
}

/// Whitespace string covering `width` columns.
pub fn render_indent(width: usize, opts: &EditOptions) -> String {
    if opts.expandtab {
        return " ".repeat(width);
    }
    let sw = opts.shiftwidth.max(1);
    let mut out = "\t".repeat(width / sw);
    out.push_str(&" ".repeat(width % sw));
    out
}

/// Indentation to insert on a line opened next to `line`, or an empty string
/// when auto-indent is off.
pub fn auto_indent(buf: &Buffer, line: usize, opts: &EditOptions) -> String {
    if !opts.autoindent {
        return String::new();
    }
    let Ok(text) = buf.line_text(line) else {
        return String::new();
    };
    let width = round_indent(indent_width(&text, opts.shiftwidth), opts.shiftwidth);
    render_indent(width, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_ties_go_down() {
        assert_eq!(round_indent(2, 4), 0);
        assert_eq!(round_indent(3, 4), 4);
        assert_eq!(round_indent(6, 4), 4);
        assert_eq!(round_indent(7, 4), 8);
        assert_eq!(round_indent(8, 4), 8);
        assert_eq!(round_indent(1, 3), 0);
        assert_eq!(round_indent(2, 3), 3);
    }

    #[test]
    fn tabs_count_to_next_stop() {
        assert_eq!(indent_width("\t x", 4), 5);
        assert_eq!(indent_width("  \tx", 4), 4);
        assert_eq!(indent_width("x", 4), 0);
    }

    #[test]
    fn renders_spaces_or_tabs() {
        let spaces = EditOptions {
            shiftwidth: 4,
            expandtab: true,
            autoindent: true,
        };
        assert_eq!(render_indent(6, &spaces), "      ");
        let tabs = EditOptions {
            expandtab: false,
            ..spaces
        };
        assert_eq!(render_indent(6, &tabs), "\t  ");
        let buf = Buffer::from_str("t", "      x");
        assert_eq!(auto_indent(&buf, 0, &tabs), "\t");
        let off = EditOptions {
            autoindent: false,
            ..spaces
        };
        assert_eq!(auto_indent(&buf, 0, &off), "");
    }
}

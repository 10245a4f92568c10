mod common;
use common::*;

use core_actions::Session;
use core_text::Buffer;
use pretty_assertions::assert_eq;

#[test]
fn change_and_typed_text_undo_together() {
    let s = run_keys("hello world", "cwbye<Esc>u");
    assert_eq!(s.text(), "hello world");
}

#[test]
fn insert_session_is_one_group() {
    let s = run_keys("a", "ob<CR>c<Esc>u");
    assert_eq!(s.text(), "a");
}

#[test]
fn counted_undo_and_redo() {
    let mut s = run_keys("abc", "xxxu");
    assert_eq!(s.text(), "c");
    s.feed_keys("2u").unwrap();
    assert_eq!(s.text(), "abc");
    s.feed_keys("<C-r>").unwrap();
    assert_eq!(s.text(), "bc");
}

#[test]
fn undo_restores_cursor_where_group_began() {
    let s = run_keys("one two", "wdwu");
    assert_eq!(s.text(), "one two");
    assert_eq!(s.cursor_offset(), 4);
}

#[test]
fn new_edit_clears_redo() {
    let s = run_keys("abc", "xux<C-r>");
    assert_eq!(s.text(), "bc");
    assert_eq!(s.status(), Some("Already at newest change"));
}

#[test]
fn undo_on_fresh_buffer_reports() {
    let s = run_keys("abc", "u");
    assert_eq!(s.status(), Some("Already at oldest change"));
}

#[test]
fn history_depth_follows_config() {
    let cfg = core_config::from_toml_str("[undo]\nmax_groups = 2\n").unwrap();
    let mut s = Session::with_config(Buffer::from_str("t", "abcd"), &cfg);
    s.feed_keys("xxxuuu").unwrap();
    assert_eq!(s.text(), "bcd");
}

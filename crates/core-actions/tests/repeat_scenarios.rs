mod common;
use common::*;

use pretty_assertions::assert_eq;

#[test]
fn dot_repeats_delete_word_at_new_cursor() {
    assert_eq!(run_keys("a b c d", "dw..").text(), "d");
}

#[test]
fn dot_repeats_change_with_typed_text() {
    let s = run_keys("foo bar", "ciwxy<Esc>w.");
    assert_eq!(s.text(), "xy xy");
    assert_eq!(s.mode(), core_state::Mode::Normal);
}

#[test]
fn dot_repeats_append_on_next_line() {
    assert_eq!(run_keys("a\nb", "A;<Esc>j.").text(), "a;\nb;");
}

#[test]
fn dot_repeats_open_line() {
    assert_eq!(run_keys("a", "ob<Esc>.").text(), "a\nb\nb");
}

#[test]
fn count_replaces_recorded_count() {
    assert_eq!(run_keys("abcdef", "x3.").text(), "ef");
}

#[test]
fn count_repeats_inserted_text() {
    assert_eq!(run_keys("", "ix<Esc>3.").text(), "xxxx");
}

#[test]
fn yank_does_not_replace_repeat_record() {
    assert_eq!(run_keys("abc def", "xyw.").text(), "c def");
}

#[test]
fn visual_delete_repeats_same_extent() {
    assert_eq!(run_keys("abcdefgh", "vld.").text(), "efgh");
}

#[test]
fn repeat_is_one_undo_step() {
    let s = run_keys("one two three", "dw.u");
    assert_eq!(s.text(), "two three");
}

#[test]
fn nothing_to_repeat_reports() {
    let s = run_keys("abc", ".");
    assert_eq!(s.status(), Some("nothing to repeat"));
    assert_eq!(s.text(), "abc");
}

#[test]
fn dot_replays_backspaces_over_existing_text() {
    assert_eq!(run_keys("abc\nabc", "A<BS><BS>x<Esc>j.").text(), "ax\nax");
}

#[test]
fn arrow_key_in_insert_starts_new_repeat_unit() {
    let live = run_keys("\n", "ifoo<Left>X<Esc>");
    assert_eq!(live.text(), "foXo\n");
    let s = run_keys("\n", "ifoo<Left>X<Esc>j.");
    assert_eq!(s.text(), "foXo\nX");
}

#[test]
fn dot_after_change_replays_backspace() {
    assert_eq!(run_keys("ab cd", "cwxy<BS>z<Esc>w.").text(), "xz xz");
}

#![allow(dead_code)] // Each test binary uses a subset of helpers.

use core_actions::Session;
use core_state::Register;
use core_text::Buffer;

pub fn session(text: &str) -> Session {
    Session::new(Buffer::from_str("t", text))
}

/// Start a session on `text` and feed `keys` in Vim notation.
pub fn run_keys(text: &str, keys: &str) -> Session {
    let mut s = session(text);
    s.feed_keys(keys).expect("valid key notation");
    s
}

pub fn register(s: &Session, name: char) -> Option<Register> {
    s.model().state().registers.read_paste(Some(name)).ok()
}

pub fn register_text(s: &Session, name: char) -> Option<String> {
    register(s, name).map(|r| r.text)
}

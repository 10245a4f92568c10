//! Macro recorder.
//!
//! Recording captures raw user key events. Playback is not done here: the
//! session pushes a slot's events onto its own input queue tagged as
//! `InputOrigin::Macro`, so replayed keys take the same path as typed ones.

use std::collections::HashMap;

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MacroRecorder {
    recording: Option<(char, Vec<KeyEvent>)>,
    slots: HashMap<char, Vec<KeyEvent>>,
    last_played: Option<char>,
}

impl MacroRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording_slot(&self) -> Option<char> {
        self.recording.as_ref().map(|(slot, _)| *slot)
    }

    pub fn start(&mut self, slot: char) {
        debug!(target: "actions.macro", slot = %slot, "recording_started");
        self.recording = Some((slot, Vec::new()));
    }

    pub fn capture(&mut self, event: KeyEvent) {
        if let Some((_, events)) = self.recording.as_mut() {
            events.push(event);
        }
    }

    /// Finish recording and commit the events to their slot. The `q` that
    /// stopped the recording was captured before dispatch and is dropped
    /// here. Returns the slot and the number of events kept.
    pub fn stop(&mut self) -> Option<(char, usize)> {
        let (slot, mut events) = self.recording.take()?;
        let stop_key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty());
        if events.last() == Some(&stop_key) {
            events.pop();
        }
        let len = events.len();
        debug!(target: "actions.macro", slot = %slot, events = len, "recording_stopped");
        self.slots.insert(slot, events);
        Some((slot, len))
    }

    pub fn get(&self, slot: char) -> Option<&[KeyEvent]> {
        self.slots.get(&slot).map(Vec::as_slice)
    }

    /// Store events directly (scripted setup, tests).
    pub fn set(&mut self, slot: char, events: Vec<KeyEvent>) {
        self.slots.insert(slot, events);
    }

    /// Resolve the slot for a play request; `None` means `@@`.
    pub fn resolve_play_slot(&mut self, slot: Option<char>) -> Option<char> {
        let slot = slot.or(self.last_played)?;
        self.last_played = Some(slot);
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_drops_trailing_q_and_commits() {
        let mut m = MacroRecorder::new();
        m.start('a');
        for ev in core_events::parse_keys("I#<Esc>jq").unwrap() {
            m.capture(ev);
        }
        assert_eq!(m.stop(), Some(('a', 4)));
        assert!(!m.is_recording());
        assert_eq!(core_events::format_keys(m.get('a').unwrap()), "I#<Esc>j");
    }

    #[test]
    fn empty_macro_is_legal() {
        let mut m = MacroRecorder::new();
        m.start('b');
        m.capture(KeyEvent::char('q'));
        assert_eq!(m.stop(), Some(('b', 0)));
        assert_eq!(m.get('b'), Some(&[][..]));
    }

    #[test]
    fn at_at_uses_last_played() {
        let mut m = MacroRecorder::new();
        assert_eq!(m.resolve_play_slot(None), None);
        assert_eq!(m.resolve_play_slot(Some('c')), Some('c'));
        assert_eq!(m.resolve_play_slot(None), Some('c'));
    }
}

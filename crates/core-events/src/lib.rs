//! Key event types, input origin tagging and Vim key notation.
//!
//! Key scripts (macros, tests, the `--keys` flag) are written in the usual
//! angle-bracket notation: `I#<Esc>j`, `<C-r>`, `"ayy`, `<lt>`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified printable key.
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }
}

/// Logical key representations consumed by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

/// Where a queued key came from. Macro playback keys are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrigin {
    User,
    Macro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedKey {
    pub event: KeyEvent,
    pub origin: InputOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unknown key name <{0}>")]
    UnknownKey(String),
    #[error("unterminated key name starting at {0:?}")]
    Unterminated(String),
}

/// Parse Vim key notation into events.
pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    let mut out = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '<' {
            out.push(KeyEvent::char(c));
            continue;
        }
        let rest = &input[idx + 1..];
        let Some(close) = rest.find('>') else {
            return Err(KeyParseError::Unterminated(input[idx..].to_string()));
        };
        let name = &rest[..close];
        if name.is_empty() {
            // "<>" is a literal '<' followed by '>'.
            out.push(KeyEvent::char('<'));
            continue;
        }
        out.push(parse_named(name)?);
        for _ in 0..name.chars().count() + 1 {
            chars.next();
        }
    }
    Ok(out)
}

fn parse_named(name: &str) -> Result<KeyEvent, KeyParseError> {
    let lower = name.to_ascii_lowercase();
    let named = match lower.as_str() {
        "esc" => Some(KeyCode::Esc),
        "cr" | "enter" | "return" => Some(KeyCode::Enter),
        "bs" | "backspace" => Some(KeyCode::Backspace),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "space" => Some(KeyCode::Char(' ')),
        "lt" => Some(KeyCode::Char('<')),
        "bar" => Some(KeyCode::Char('|')),
        "bslash" => Some(KeyCode::Char('\\')),
        _ => None,
    };
    if let Some(code) = named {
        return Ok(KeyEvent::plain(code));
    }
    let mut mods = KeyModifiers::empty();
    let mut rest = name;
    while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
        match rest.as_bytes()[0].to_ascii_lowercase() {
            b'c' => mods |= KeyModifiers::CTRL,
            b'a' | b'm' => mods |= KeyModifiers::ALT,
            b's' => mods |= KeyModifiers::SHIFT,
            _ => return Err(KeyParseError::UnknownKey(name.to_string())),
        }
        rest = &rest[2..];
    }
    if mods.is_empty() {
        return Err(KeyParseError::UnknownKey(name.to_string()));
    }
    let mut tail = rest.chars();
    match (tail.next(), tail.next()) {
        (Some(c), None) => {
            let c = if mods.contains(KeyModifiers::CTRL) {
                c.to_ascii_lowercase()
            } else {
                c
            };
            Ok(KeyEvent::new(KeyCode::Char(c), mods))
        }
        _ => {
            let inner = parse_named(rest)?;
            Ok(KeyEvent::new(inner.code, inner.mods | mods))
        }
    }
}

/// Render events back into key notation.
pub fn format_keys(events: &[KeyEvent]) -> String {
    events.iter().map(ToString::to_string).collect()
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.code {
            KeyCode::Char('<') => "lt".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "CR".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Backspace => "BS".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
        };
        let bare_char = matches!(self.code, KeyCode::Char(c) if c != '<');
        if self.mods.is_empty() && bare_char {
            return f.write_str(&base);
        }
        f.write_str("<")?;
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("A-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            f.write_str("S-")?;
        }
        write!(f, "{base}>")
    }
}

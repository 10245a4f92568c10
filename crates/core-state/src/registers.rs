//! Register bank: unnamed, numbered ring (0-9), named (a-z) and small-delete
//! slots holding text tagged with a paste kind.
//!
//! Routing rules:
//! * Explicit target: write (or append, for `A`-`Z`) that slot and mirror the
//!   result into unnamed. The numbered ring is left alone.
//! * Implicit delete: a single-character intra-line delete goes to the small
//!   delete slot (`-`); anything larger shifts 1..=8 into 2..=9 and lands in 1.
//! * Implicit or explicit yank: always also writes register 0.
//! * `_` discards writes and never yields content.
//!
//! Registers live for the session only; nothing is persisted.

use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    Charwise,
    Linewise,
    /// Produced by block selections in richer embeddings; pasted as charwise here.
    Blockwise,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub kind: RegisterKind,
    pub text: String,
}

impl Register {
    pub fn new(kind: RegisterKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn charwise(text: impl Into<String>) -> Self {
        Self::new(RegisterKind::Charwise, text)
    }

    pub fn linewise(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self::new(RegisterKind::Linewise, text)
    }

    pub fn is_linewise(&self) -> bool {
        self.kind == RegisterKind::Linewise
    }

    /// Append `other`; either side being linewise makes the result linewise.
    fn append(&mut self, other: Register) {
        if self.is_linewise() || other.is_linewise() {
            if !self.text.ends_with('\n') {
                self.text.push('\n');
            }
            self.text.push_str(&other.text);
            if !self.text.ends_with('\n') {
                self.text.push('\n');
            }
            self.kind = RegisterKind::Linewise;
        } else {
            self.text.push_str(&other.text);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("register {0} is empty")]
    Empty(char),
    #[error("invalid register {0}")]
    Invalid(char),
}

/// Resolved register name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unnamed,
    BlackHole,
    SmallDelete,
    Numbered(usize),
    Named { index: usize, append: bool },
}

impl Slot {
    fn parse(c: char) -> Result<Self, RegisterError> {
        match c {
            '"' => Ok(Slot::Unnamed),
            '_' => Ok(Slot::BlackHole),
            '-' => Ok(Slot::SmallDelete),
            '0'..='9' => Ok(Slot::Numbered((c as u8 - b'0') as usize)),
            'a'..='z' => Ok(Slot::Named {
                index: (c as u8 - b'a') as usize,
                append: false,
            }),
            'A'..='Z' => Ok(Slot::Named {
                index: (c as u8 - b'A') as usize,
                append: true,
            }),
            other => Err(RegisterError::Invalid(other)),
        }
    }
}

/// True for names accepted after `"`.
pub fn is_valid_register(c: char) -> bool {
    Slot::parse(c).is_ok()
}

#[derive(Debug, Clone, Default)]
pub struct Registers {
    unnamed: Option<Register>,
    numbered: [Option<Register>; 10],
    named: [Option<Register>; 26],
    small_delete: Option<Register>,
}

impl Registers {
    pub const RING: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn unnamed(&self) -> Option<&Register> {
        self.unnamed.as_ref()
    }

    pub fn numbered(&self, idx: usize) -> Option<&Register> {
        self.numbered.get(idx).and_then(Option::as_ref)
    }

    pub fn named(&self, c: char) -> Option<&Register> {
        match Slot::parse(c) {
            Ok(Slot::Named { index, .. }) => self.named[index].as_ref(),
            _ => None,
        }
    }

    pub fn small_delete(&self) -> Option<&Register> {
        self.small_delete.as_ref()
    }

    /// Record removed text. `explicit` is the register named with `"x`, if any.
    pub fn write_delete(
        &mut self,
        text: impl Into<String>,
        kind: RegisterKind,
        explicit: Option<char>,
    ) -> Result<(), RegisterError> {
        let reg = Register::new(kind, text);
        if let Some(c) = explicit {
            let slot = Slot::parse(c)?;
            if slot != Slot::Unnamed {
                self.write_explicit(slot, reg);
                return Ok(());
            }
        }
        if is_small_delete(&reg) {
            trace!(target: "state.registers", "small_delete");
            self.small_delete = Some(reg.clone());
        } else {
            self.numbered[1..].rotate_right(1);
            self.numbered[1] = Some(reg.clone());
            trace!(target: "state.registers", "numbered_shift");
        }
        self.unnamed = Some(reg);
        Ok(())
    }

    /// Record copied text. Register 0 always receives the yank.
    pub fn write_yank(
        &mut self,
        text: impl Into<String>,
        kind: RegisterKind,
        explicit: Option<char>,
    ) -> Result<(), RegisterError> {
        let reg = Register::new(kind, text);
        if let Some(c) = explicit {
            let slot = Slot::parse(c)?;
            if slot == Slot::BlackHole {
                return Ok(());
            }
            if slot != Slot::Unnamed {
                self.numbered[0] = Some(reg.clone());
                self.write_explicit(slot, reg);
                return Ok(());
            }
        }
        self.numbered[0] = Some(reg.clone());
        self.unnamed = Some(reg);
        trace!(target: "state.registers", "yank");
        Ok(())
    }

    fn write_explicit(&mut self, slot: Slot, reg: Register) {
        let stored = match slot {
            Slot::BlackHole => return,
            Slot::Unnamed => reg,
            Slot::SmallDelete => {
                self.small_delete = Some(reg.clone());
                reg
            }
            Slot::Numbered(idx) => {
                self.numbered[idx] = Some(reg.clone());
                reg
            }
            Slot::Named { index, append } => {
                let merged = match self.named[index].take() {
                    Some(mut existing) if append => {
                        existing.append(reg);
                        existing
                    }
                    _ => reg,
                };
                self.named[index] = Some(merged.clone());
                merged
            }
        };
        trace!(target: "state.registers", ?slot, "explicit_write");
        self.unnamed = Some(stored);
    }

    /// Contents to paste: the explicit register when given, else unnamed.
    pub fn read_paste(&self, explicit: Option<char>) -> Result<Register, RegisterError> {
        let name = explicit.unwrap_or('"');
        let found = match Slot::parse(name)? {
            Slot::Unnamed => self.unnamed.as_ref(),
            Slot::BlackHole => None,
            Slot::SmallDelete => self.small_delete.as_ref(),
            Slot::Numbered(idx) => self.numbered[idx].as_ref(),
            Slot::Named { index, .. } => self.named[index].as_ref(),
        };
        found.cloned().ok_or(RegisterError::Empty(name))
    }

    /// Non-empty registers as (name, register) pairs in display order.
    pub fn snapshot(&self) -> Vec<(char, &Register)> {
        let mut out = Vec::new();
        if let Some(r) = &self.unnamed {
            out.push(('"', r));
        }
        for (i, r) in self.numbered.iter().enumerate() {
            if let Some(r) = r {
                out.push(((b'0' + i as u8) as char, r));
            }
        }
        for (i, r) in self.named.iter().enumerate() {
            if let Some(r) = r {
                out.push(((b'a' + i as u8) as char, r));
            }
        }
        if let Some(r) = &self.small_delete {
            out.push(('-', r));
        }
        out
    }
}

/// A single-character delete that stays within its line.
fn is_small_delete(reg: &Register) -> bool {
    if reg.kind != RegisterKind::Charwise {
        return false;
    }
    let mut chars = reg.text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c != '\n')
}

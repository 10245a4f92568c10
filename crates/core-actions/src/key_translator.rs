//! KeyTranslator: stateful key -> Action translation.
//!
//! State machine:
//! * Idle: optional `pending_count` accumulating prefix digits. A leading `0`
//!   is the `LineStart` motion, not a count digit.
//! * `"x` captures an explicit register consumed by the next command.
//! * OperatorPending(op): operator captured; may accumulate a post-operator
//!   count (`post_op_count`). The doubled operator key (`dd`) emits
//!   `LinewiseOperator`, `i`/`a` enter object-pending, a motion key emits
//!   `ApplyOperator` with `count = prefix * post` (clamped to `MAX_COUNT`).
//! * Prefix keys `g`, `q`, `@` and (in visual mode) `i`/`a` wait for one more key.
//! * `<Esc>` cancels any pending state silently. Anything unrecognized resets
//!   to Idle and yields `Action::Unsupported` with a status message.

use crate::{
    Action, EditKind, InsertEntry, MAX_COUNT, MotionKind, ObjectScope, OperatorKind, TextObject,
    VisualKind,
};
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_state::{Mode, is_valid_register};

/// Secondary prefix awaiting exactly one more key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Prefix {
    #[default]
    None,
    /// `i` / `a` after an operator (or in visual mode when `op` is `None`).
    Object(ObjectScope),
    /// `g`
    G,
    /// `q`
    Record,
    /// `@`
    Play,
}

#[derive(Debug, Default)]
pub struct KeyTranslator {
    /// Count prefix prior to an operator or motion (e.g. `12d` or `12w`).
    pending_count: Option<u32>,
    /// Pending operator kind (d,y,c) awaiting motion.
    pending_operator: Option<OperatorKind>,
    /// Count following an operator but before the motion (e.g. `d3w`).
    post_op_count: Option<u32>,
    /// Pending explicit register (after '"').
    pending_register: Option<char>,
    /// True if we just saw '"' and expect a register designator next.
    awaiting_register: bool,
    prefix: Prefix,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop counts, operators, registers and prefixes.
    pub fn reset(&mut self) {
        self.pending_count = None;
        self.pending_operator = None;
        self.post_op_count = None;
        self.pending_register = None;
        self.awaiting_register = false;
        self.prefix = Prefix::None;
    }

    /// True when no partial command is buffered.
    pub fn is_idle(&self) -> bool {
        self.pending_count.is_none()
            && self.pending_operator.is_none()
            && self.post_op_count.is_none()
            && self.pending_register.is_none()
            && !self.awaiting_register
            && self.prefix == Prefix::None
    }

    /// Translate one key. `recording` tells whether a bare `q` stops a macro
    /// recording rather than starting one.
    pub fn translate(&mut self, mode: Mode, key: &KeyEvent, recording: bool) -> Option<Action> {
        tracing::trace!(target: "actions.translate", mode = mode.name(), key = %key, "translate_key");
        if mode == Mode::Insert {
            return translate_insert(key);
        }
        if key.code == KeyCode::Esc {
            let was_idle = self.is_idle();
            self.reset();
            return (mode.is_visual() && was_idle).then_some(Action::ExitVisual);
        }
        if key.mods.contains(KeyModifiers::CTRL) {
            if key.code == KeyCode::Char('r') && mode == Mode::Normal && self.pending_operator.is_none()
            {
                let count = self.take_count();
                self.reset();
                return Some(Action::Redo { count });
            }
            return Some(self.unsupported(key));
        }
        let c = match key.code {
            KeyCode::Char(c) => c,
            KeyCode::Left => 'h',
            KeyCode::Right => 'l',
            KeyCode::Up => 'k',
            KeyCode::Down => 'j',
            KeyCode::Backspace => 'h',
            KeyCode::Enter | KeyCode::Tab | KeyCode::Esc => return Some(self.unsupported(key)),
        };

        if self.awaiting_register {
            self.awaiting_register = false;
            if is_valid_register(c) {
                self.pending_register = Some(c);
                return None;
            }
            self.reset();
            return Some(Action::Unsupported(format!("invalid register \"{c}")));
        }

        match self.prefix {
            Prefix::None => {}
            Prefix::Object(scope) => {
                self.prefix = Prefix::None;
                let Some(object) = TextObject::from_key(scope, c) else {
                    return Some(self.unsupported(key));
                };
                let count = self.take_count();
                let register = self.pending_register.take();
                let op = self.pending_operator.take();
                self.reset();
                return Some(match op {
                    Some(op) => Action::ObjectOperator {
                        op,
                        object,
                        count,
                        register,
                    },
                    None => Action::VisualObject { object, count },
                });
            }
            Prefix::G => {
                self.prefix = Prefix::None;
                if c != 'g' {
                    return Some(self.unsupported(key));
                }
                let motion = match self.explicit_count() {
                    Some(n) => MotionKind::GotoLine(n as usize),
                    None => MotionKind::FirstLine,
                };
                return Some(self.finish_motion(motion));
            }
            Prefix::Record => {
                self.reset();
                return Some(if c.is_ascii_lowercase() {
                    Action::StartRecording(c)
                } else {
                    Action::Unsupported(format!("invalid macro register {c}"))
                });
            }
            Prefix::Play => {
                let count = self.take_count();
                self.reset();
                return Some(match c {
                    '@' => Action::PlayMacro { slot: None, count },
                    'a'..='z' => Action::PlayMacro {
                        slot: Some(c),
                        count,
                    },
                    _ => Action::Unsupported(format!("invalid macro register {c}")),
                });
            }
        }

        if let Some(op) = self.pending_operator {
            if c.is_ascii_digit() && !(c == '0' && self.post_op_count.is_none()) {
                self.post_op_count = Some(push_digit(self.post_op_count, c));
                return None;
            }
            if c == op.key() {
                let count = self.take_count();
                let register = self.pending_register.take();
                self.reset();
                return Some(Action::LinewiseOperator {
                    op,
                    count,
                    register,
                });
            }
            match c {
                'i' => {
                    self.prefix = Prefix::Object(ObjectScope::Inner);
                    return None;
                }
                'a' => {
                    self.prefix = Prefix::Object(ObjectScope::Around);
                    return None;
                }
                'g' => {
                    self.prefix = Prefix::G;
                    return None;
                }
                _ => {}
            }
            return match self.motion_for(c) {
                Some(motion) => Some(self.finish_motion(motion)),
                None => Some(self.unsupported(key)),
            };
        }

        if c.is_ascii_digit() && !(c == '0' && self.pending_count.is_none()) {
            self.pending_count = Some(push_digit(self.pending_count, c));
            return None;
        }
        if c == '"' {
            self.awaiting_register = true;
            self.pending_register = None;
            return None;
        }
        if let Some(op) = OperatorKind::from_char(c) {
            if mode.is_visual() {
                return Some(self.visual_operator(op));
            }
            self.pending_operator = Some(op);
            self.post_op_count = None;
            return None;
        }
        if let Some(motion) = self.motion_for(c) {
            return Some(self.finish_motion(motion));
        }
        if mode.is_visual() {
            self.translate_visual(c, key, recording)
        } else {
            self.translate_normal(c, key, recording)
        }
    }

    fn translate_normal(&mut self, c: char, key: &KeyEvent, recording: bool) -> Option<Action> {
        let action = match c {
            'x' | 'X' => Action::DeleteChar {
                forward: c == 'x',
                count: self.take_count(),
                register: self.pending_register.take(),
            },
            'p' | 'P' => Action::Paste {
                before: c == 'P',
                count: self.take_count(),
                register: self.pending_register.take(),
            },
            'u' => Action::Undo {
                count: self.take_count(),
            },
            'i' => Action::EnterInsert(InsertEntry::Insert),
            'a' => Action::EnterInsert(InsertEntry::Append),
            'A' => Action::EnterInsert(InsertEntry::AppendLineEnd),
            'I' => Action::EnterInsert(InsertEntry::InsertLineStart),
            'o' => Action::EnterInsert(InsertEntry::OpenBelow),
            'O' => Action::EnterInsert(InsertEntry::OpenAbove),
            'v' => Action::EnterVisual(VisualKind::Char),
            'V' => Action::EnterVisual(VisualKind::Line),
            '.' => Action::RepeatLast {
                count: self.explicit_count(),
            },
            'q' if recording => Action::StopRecording,
            'q' => {
                self.prefix = Prefix::Record;
                return None;
            }
            '@' => {
                self.prefix = Prefix::Play;
                return None;
            }
            'g' => {
                self.prefix = Prefix::G;
                return None;
            }
            _ => return Some(self.unsupported(key)),
        };
        self.reset();
        Some(action)
    }

    fn translate_visual(&mut self, c: char, key: &KeyEvent, recording: bool) -> Option<Action> {
        let action = match c {
            'x' => return Some(self.visual_operator(OperatorKind::Delete)),
            'v' => Action::EnterVisual(VisualKind::Char),
            'V' => Action::EnterVisual(VisualKind::Line),
            'o' => Action::VisualSwapEnds,
            'i' => {
                self.prefix = Prefix::Object(ObjectScope::Inner);
                return None;
            }
            'a' => {
                self.prefix = Prefix::Object(ObjectScope::Around);
                return None;
            }
            'g' => {
                self.prefix = Prefix::G;
                return None;
            }
            // The selection stays active.
            'q' if recording => Action::StopRecording,
            _ => return Some(self.unsupported(key)),
        };
        self.reset();
        Some(action)
    }

    fn visual_operator(&mut self, op: OperatorKind) -> Action {
        let register = self.pending_register.take();
        self.reset();
        Action::VisualOperator { op, register }
    }

    /// Map a motion key, resolving `G` against an explicit count.
    fn motion_for(&self, c: char) -> Option<MotionKind> {
        match MotionKind::from_key(c)? {
            MotionKind::LastLine => Some(match self.explicit_count() {
                Some(n) => MotionKind::GotoLine(n as usize),
                None => MotionKind::LastLine,
            }),
            m => Some(m),
        }
    }

    fn finish_motion(&mut self, motion: MotionKind) -> Action {
        let count = self.take_count();
        let register = self.pending_register.take();
        let op = self.pending_operator.take();
        self.reset();
        match op {
            Some(op) => Action::ApplyOperator {
                op,
                motion,
                count,
                register,
            },
            None => Action::Motion { motion, count },
        }
    }

    /// Product of prefix and post-operator counts, when either was typed.
    fn explicit_count(&self) -> Option<u32> {
        if self.pending_count.is_none() && self.post_op_count.is_none() {
            return None;
        }
        Some(
            self.pending_count
                .unwrap_or(1)
                .saturating_mul(self.post_op_count.unwrap_or(1))
                .clamp(1, MAX_COUNT),
        )
    }

    fn take_count(&mut self) -> u32 {
        let count = self.explicit_count().unwrap_or(1);
        self.pending_count = None;
        self.post_op_count = None;
        count
    }

    fn unsupported(&mut self, key: &KeyEvent) -> Action {
        let op = self.pending_operator.map(|op| op.key().to_string());
        self.reset();
        Action::Unsupported(format!("{}{key} not supported", op.unwrap_or_default()))
    }
}

fn push_digit(current: Option<u32>, c: char) -> u32 {
    let digit = c.to_digit(10).unwrap_or(0);
    current
        .unwrap_or(0)
        .saturating_mul(10)
        .saturating_add(digit)
        .min(MAX_COUNT)
}

fn translate_insert(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::ExitInsert),
        KeyCode::Enter => Some(Action::Edit(EditKind::InsertNewline)),
        KeyCode::Backspace => Some(Action::Edit(EditKind::Backspace)),
        KeyCode::Tab => Some(Action::Edit(EditKind::InsertTab)),
        KeyCode::Left => Some(insert_motion(MotionKind::Left)),
        KeyCode::Right => Some(insert_motion(MotionKind::Right)),
        KeyCode::Up => Some(insert_motion(MotionKind::Up)),
        KeyCode::Down => Some(insert_motion(MotionKind::Down)),
        KeyCode::Char(c)
            if !key.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) && !c.is_control() =>
        {
            Some(Action::Edit(EditKind::InsertChar(c)))
        }
        KeyCode::Char(_) => None,
    }
}

fn insert_motion(motion: MotionKind) -> Action {
    Action::Motion { motion, count: 1 }
}

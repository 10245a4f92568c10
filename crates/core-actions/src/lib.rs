//! Modal command interpreter: the `Action` vocabulary, the stateful key
//! translator, range resolution, the dispatcher, dot-repeat, macros and the
//! `Session` input loop that ties them together.
//!
//! Data flow for one key:
//! `Session::feed` -> queue -> `KeyTranslator::translate` -> `Action` ->
//! `dispatcher::dispatch` -> `EditorState` mutations (undo + registers) ->
//! repeat record -> hooks / syntax refresh.

pub mod dispatcher;
pub mod indent;
pub mod key_translator;
pub mod macros;
pub mod repeat;
pub mod session;
pub mod span_resolver;
pub mod text_object;

pub use dispatcher::{DispatchContext, DispatchResult, EditOptions, dispatch};
pub use key_translator::KeyTranslator;
pub use macros::MacroRecorder;
pub use repeat::{RepeatAction, RepeatEngine, RepeatTarget};
pub use session::Session;
pub use span_resolver::Span;

/// Upper bound for any count prefix.
pub const MAX_COUNT: u32 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Delete,
    Change,
    Yank,
}

impl OperatorKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(OperatorKind::Delete),
            'c' => Some(OperatorKind::Change),
            'y' => Some(OperatorKind::Yank),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            OperatorKind::Delete => 'd',
            OperatorKind::Change => 'c',
            OperatorKind::Yank => 'y',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    WordEnd,
    BigWordForward,
    BigWordBackward,
    BigWordEnd,
    LineStart,
    FirstNonBlank,
    LineEnd,
    ParagraphForward,
    ParagraphBackward,
    FirstLine,
    LastLine,
    /// 1-based line number (`{count}G` / `{count}gg`).
    GotoLine(usize),
}

impl MotionKind {
    /// Motions that select whole lines under an operator.
    pub fn is_linewise(self) -> bool {
        matches!(
            self,
            MotionKind::Up
                | MotionKind::Down
                | MotionKind::FirstLine
                | MotionKind::LastLine
                | MotionKind::GotoLine(_)
        )
    }

    /// Motions whose target character is part of the operated range.
    pub fn is_inclusive(self) -> bool {
        matches!(self, MotionKind::WordEnd | MotionKind::BigWordEnd)
    }

    /// Motions that report failure when the cursor cannot move (aborting
    /// macro playback). Absolute jumps never fail.
    pub fn can_fail(self) -> bool {
        !matches!(
            self,
            MotionKind::LineStart
                | MotionKind::FirstNonBlank
                | MotionKind::LineEnd
                | MotionKind::FirstLine
                | MotionKind::LastLine
                | MotionKind::GotoLine(_)
        )
    }

    /// Normal-mode key for single-key motions.
    pub fn from_key(c: char) -> Option<Self> {
        Some(match c {
            'h' => MotionKind::Left,
            'l' | ' ' => MotionKind::Right,
            'j' => MotionKind::Down,
            'k' => MotionKind::Up,
            'w' => MotionKind::WordForward,
            'b' => MotionKind::WordBackward,
            'e' => MotionKind::WordEnd,
            'W' => MotionKind::BigWordForward,
            'B' => MotionKind::BigWordBackward,
            'E' => MotionKind::BigWordEnd,
            '0' => MotionKind::LineStart,
            '^' => MotionKind::FirstNonBlank,
            '$' => MotionKind::LineEnd,
            '}' => MotionKind::ParagraphForward,
            '{' => MotionKind::ParagraphBackward,
            'G' => MotionKind::LastLine,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectScope {
    Inner,
    Around,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectUnit {
    Word,
    BigWord,
    Quote(char),
    Pair { open: char, close: char },
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextObject {
    pub scope: ObjectScope,
    pub unit: ObjectUnit,
}

impl TextObject {
    pub fn new(scope: ObjectScope, unit: ObjectUnit) -> Self {
        Self { scope, unit }
    }

    /// Unit key following `i` / `a`.
    pub fn from_key(scope: ObjectScope, c: char) -> Option<Self> {
        let unit = match c {
            'w' => ObjectUnit::Word,
            'W' => ObjectUnit::BigWord,
            'p' => ObjectUnit::Paragraph,
            '"' | '\'' | '`' => ObjectUnit::Quote(c),
            '(' | ')' | 'b' => ObjectUnit::Pair {
                open: '(',
                close: ')',
            },
            '[' | ']' => ObjectUnit::Pair {
                open: '[',
                close: ']',
            },
            '{' | '}' | 'B' => ObjectUnit::Pair {
                open: '{',
                close: '}',
            },
            '<' | '>' => ObjectUnit::Pair {
                open: '<',
                close: '>',
            },
            _ => return None,
        };
        Some(Self::new(scope, unit))
    }
}

/// How an insert session was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i`
    Insert,
    /// `a`
    Append,
    /// `A`
    AppendLineEnd,
    /// `I`
    InsertLineStart,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Char,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    InsertNewline,
    InsertTab,
    Backspace,
}

/// Fully resolved editor command produced by the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Motion {
        motion: MotionKind,
        count: u32,
    },
    ApplyOperator {
        op: OperatorKind,
        motion: MotionKind,
        count: u32,
        register: Option<char>,
    },
    /// Doubled operator: `dd`, `cc`, `yy`.
    LinewiseOperator {
        op: OperatorKind,
        count: u32,
        register: Option<char>,
    },
    ObjectOperator {
        op: OperatorKind,
        object: TextObject,
        count: u32,
        register: Option<char>,
    },
    VisualOperator {
        op: OperatorKind,
        register: Option<char>,
    },
    VisualObject {
        object: TextObject,
        count: u32,
    },
    VisualSwapEnds,
    EnterVisual(VisualKind),
    ExitVisual,
    EnterInsert(InsertEntry),
    ExitInsert,
    Edit(EditKind),
    DeleteChar {
        forward: bool,
        count: u32,
        register: Option<char>,
    },
    Paste {
        before: bool,
        count: u32,
        register: Option<char>,
    },
    Undo {
        count: u32,
    },
    Redo {
        count: u32,
    },
    StartRecording(char),
    StopRecording,
    /// `None` replays the last played slot (`@@`).
    PlayMacro {
        slot: Option<char>,
        count: u32,
    },
    RepeatLast {
        count: Option<u32>,
    },
    /// Unrecognized sequence; the message becomes the status line.
    Unsupported(String),
}

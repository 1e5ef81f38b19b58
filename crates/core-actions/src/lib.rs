//! Modal command engine: key translation, motion and text object resolution,
//! operator execution.
//!
//! Keys flow `Engine::feed` -> `KeyTranslator` -> `Action` -> `dispatch`.
//! The translator owns every pending keystroke; the dispatcher owns every
//! buffer mutation. Nothing in this crate holds global state.

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod key_translator;
pub mod motion_resolver;
pub mod text_object;

pub use dispatcher::{DispatchResult, dispatch};
pub use engine::{Engine, KeyOutcome};
pub use error::{CommandError, ResolveError};
pub use key_translator::{ArgumentKind, CharCommand, KeyTranslator, PendingCommand, Translation};
pub use motion_resolver::{
    Inclusivity, MotionContext, MotionSpec, MotionTarget, OperatorRange, RangeShape,
    operator_range, resolve_motion,
};
pub use text_object::{ObjectScope, TextObjectKind, resolve_text_object};

use core_state::SelectionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    /// `0`
    LineStart,
    /// `^`
    FirstNonBlank,
    /// `$`
    LineEnd,
    WordForward,
    BigWordForward,
    WordBackward,
    BigWordBackward,
    WordEnd,
    BigWordEnd,
    FindForward(char),
    FindBackward(char),
    TillForward(char),
    TillBackward(char),
    /// `;`
    RepeatFind,
    /// `,`
    RepeatFindReverse,
    /// `gg`
    FileStart,
    /// `G`
    FileEnd,
}

impl MotionKind {
    /// Motions that define a whole-line range under an operator.
    pub fn is_linewise(self) -> bool {
        matches!(
            self,
            MotionKind::Up | MotionKind::Down | MotionKind::FileStart | MotionKind::FileEnd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Delete,
    Change,
    Yank,
    /// `g~`
    ToggleCase,
    /// `gu`
    Lowercase,
    /// `gU`
    Uppercase,
    /// `>`
    ShiftRight,
    /// `<`
    ShiftLeft,
}

impl OperatorKind {
    pub fn label(self) -> &'static str {
        match self {
            OperatorKind::Delete => "delete",
            OperatorKind::Change => "change",
            OperatorKind::Yank => "yank",
            OperatorKind::ToggleCase => "toggle-case",
            OperatorKind::Lowercase => "lowercase",
            OperatorKind::Uppercase => "uppercase",
            OperatorKind::ShiftRight => "shift-right",
            OperatorKind::ShiftLeft => "shift-left",
        }
    }

    /// True when applying the operator changes buffer text.
    pub fn mutates(self) -> bool {
        !matches!(self, OperatorKind::Yank)
    }
}

/// Where a fresh insert session places the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i`
    Before,
    /// `a`
    After,
    /// `I`
    FirstNonBlank,
    /// `A`
    LineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
    /// `gi`
    LastInsert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    EnterInsert { entry: InsertEntry, count: u32 },
    LeaveInsert,
    /// `<C-o>` from Insert: run one Normal-mode command.
    DelegateOne,
    /// `v` / `V`; repeating the active kind leaves Visual.
    EnterVisual(SelectionKind),
    LeaveVisual,
}

/// Insert-mode text edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    InsertNewline,
    InsertTab,
    Backspace,
    DeleteUnder,
    /// `<C-w>`
    DeleteWordBack,
    /// `<C-u>`
    DeleteToInsertStart,
    /// Arrow and Home/End keys.
    Move(InsertMove),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMove {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Motion(MotionKind),
    MotionWithCount {
        motion: MotionKind,
        count: u32,
    },
    /// Operator + motion. `count` is the product of both counts, `None` when
    /// neither was typed (so `dG` and `d1G` stay distinguishable).
    ApplyOperator {
        op: OperatorKind,
        motion: MotionKind,
        count: Option<u32>,
        register: Option<char>,
    },
    ApplyOperatorObject {
        op: OperatorKind,
        object: TextObjectKind,
        scope: ObjectScope,
        count: u32,
        register: Option<char>,
    },
    /// Doubled operator (`dd`, `cc`, `g~~`, `>>`) over `count` lines.
    LinewiseOperator {
        op: OperatorKind,
        count: u32,
        register: Option<char>,
    },
    /// Operator applied to the active Visual selection.
    VisualOperator {
        op: OperatorKind,
        register: Option<char>,
    },
    /// Replace the Visual selection with a text object around the caret.
    VisualObject {
        object: TextObjectKind,
        scope: ObjectScope,
        count: u32,
    },
    /// `o` in Visual.
    VisualSwapEnds,
    ModeChange(ModeChange),
    Edit(EditKind),
    /// Standalone `~`.
    ToggleCaseChars {
        count: u32,
    },
    /// `r{char}`
    ReplaceChar {
        ch: char,
        count: u32,
    },
    /// `J`
    JoinLines {
        count: u32,
    },
    PasteAfter {
        register: Option<char>,
        count: u32,
    },
    PasteBefore {
        register: Option<char>,
        count: u32,
    },
    Undo {
        count: u32,
    },
    Redo {
        count: u32,
    },
    /// `<Esc>` with keys pending: drop them without effect.
    Cancel,
}

//! Command failure taxonomy.
//!
//! Every failure is local to the command that raised it: the pending keys are
//! discarded, the buffer is untouched and the engine rings the bell. Counts
//! and ranges past the edge of the buffer are clamped silently and never
//! surface here.

use core_events::KeyEvent;
use core_state::{Mode, PasteError};
use core_text::motion::MotionError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("character {0:?} not found on the line")]
    CharNotFound(char),
    #[error("no previous character search to repeat")]
    NoPreviousFind,
    #[error("no enclosing {0:?} pair")]
    NoEnclosingPair(char),
    #[error("no word under the caret")]
    NoWordUnderCaret,
    #[error("already at the edge of the buffer")]
    AtBufferEdge,
    #[error("register {0:?} is empty")]
    EmptyRegister(char),
    #[error("blockwise ranges are not supported")]
    BlockRange,
}

impl From<MotionError> for ResolveError {
    fn from(e: MotionError) -> Self {
        match e {
            MotionError::BufferEdge => ResolveError::AtBufferEdge,
            MotionError::CharNotFound(c) => ResolveError::CharNotFound(c),
        }
    }
}

impl From<PasteError> for ResolveError {
    fn from(e: PasteError) -> Self {
        match e {
            PasteError::Empty(c) | PasteError::InvalidRegister(c) => ResolveError::EmptyRegister(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unexpected key {key}")]
    ParseAbort { key: KeyEvent },
    #[error(transparent)]
    Resolution(#[from] ResolveError),
    #[error("command not available in {} mode", .mode.label())]
    ModeViolation { mode: Mode },
}

impl From<MotionError> for CommandError {
    fn from(e: MotionError) -> Self {
        CommandError::Resolution(e.into())
    }
}

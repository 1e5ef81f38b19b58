//! Editor session state: buffer, caret, mode, registers, selection and the
//! in-flight insert session.
//!
//! Undo history lives with the buffer (`core_text::TextBuffer` transactions);
//! this crate only decides *when* groups open and close, through the insert
//! session's `txn_open` flag.
//!
//! Insert sessions:
//! - Entering Insert (`i`, `a`, `o`, `c{motion}`, ...) creates an
//!   `InsertSession` recording the entry point, the command's count and the
//!   text typed so far. The count replays the typed text on `<Esc>`.
//! - A `<C-o>` delegation leaves the session untouched; the delegated
//!   command runs in its own undo group and typing resumes in a fresh one.
//! - Leaving Insert records the last-insert mark used by `gi`.

use core_text::motion::FindSpec;
use core_text::{Position, TextBuffer};

pub mod mode;
pub mod registers;

pub use mode::{ModeController, ModeObserver, Settled};
pub use registers::{
    OperatorMetrics, OperatorMetricsSnapshot, PasteError, RegisterContent, RegisterShape,
    Registers, RegistersFacade,
};

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Normal command/navigation mode.
    Normal,
    /// Insert text mode.
    Insert,
    /// Visual selection (characterwise or linewise; see `SelectionKind`).
    Visual,
    /// An operator is waiting for its motion or text object.
    OperatorPending,
    /// One Normal-mode command delegated from Insert via `<C-o>`.
    ReplaceOnce,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::OperatorPending => "OP-PENDING",
            Mode::ReplaceOnce => "(insert)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Characterwise,
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: Position,
    pub end: Position,
    pub kind: SelectionKind,
}

impl SelectionSpan {
    /// Construct a new span normalizing ordering so that start <= end.
    pub fn new(a: Position, b: Position, kind: SelectionKind) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, kind }
    }

    /// Absolute `[start, end)` char range covered by the span. Both
    /// characterwise endpoints are included; linewise spans cover whole
    /// lines including the final terminator.
    pub fn char_range<B: TextBuffer + ?Sized>(&self, buffer: &B) -> (usize, usize) {
        match self.kind {
            SelectionKind::Characterwise => {
                let start = buffer.offset_of(self.start);
                let (_, line_end) = buffer.line_bounds(self.end.line);
                let end = (buffer.offset_of(self.end) + 1).min(line_end.max(start));
                (start, end.max(start))
            }
            SelectionKind::Linewise => (
                buffer.line_bounds(self.start.line).0,
                buffer.line_end_inclusive(self.end.line),
            ),
        }
    }
}

/// Active Visual selection: fixed anchor plus the caret as the moving end.
#[derive(Debug, Default, Clone)]
pub struct SelectionModel {
    pub anchor: Option<Position>,
    pub kind: Option<SelectionKind>,
}

impl SelectionModel {
    pub fn begin(&mut self, anchor: Position, kind: SelectionKind) {
        self.anchor = Some(anchor);
        self.kind = Some(kind);
    }
    pub fn clear(&mut self) {
        self.anchor = None;
        self.kind = None;
    }
    /// Span between the anchor and `caret`.
    pub fn span(&self, caret: Position) -> Option<SelectionSpan> {
        Some(SelectionSpan::new(self.anchor?, caret, self.kind?))
    }
}

/// How the insert was entered; decides how a count replays the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKind {
    /// `i a I A gi s c...`: repeat appends at the caret.
    Inline,
    /// `o`: each repetition opens another line below.
    OpenBelow,
    /// `O`: each repetition opens another line above.
    OpenAbove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertSession {
    /// Where insertion started; `<BS>` and `<C-u>` treat it as a soft stop.
    pub start: Position,
    pub typed: String,
    pub repeat: u32,
    pub kind: InsertKind,
    /// The session owns an open buffer transaction.
    pub txn_open: bool,
}

impl InsertSession {
    pub fn new(start: Position, repeat: u32, kind: InsertKind) -> Self {
        Self {
            start,
            typed: String::new(),
            repeat: repeat.max(1),
            kind,
            txn_open: false,
        }
    }
}

/// Caret facts remembered when `<C-o>` leaves Insert, used to put the caret
/// back after the end of the line when typing resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegatedInsert {
    pub at_eol: bool,
    pub line: usize,
}

/// Top-level state for one editing session over one buffer.
pub struct EditorState<B> {
    pub buffer: B,
    pub caret: Position,
    pub mode: ModeController,
    pub registers: Registers,
    pub operator_metrics: OperatorMetrics,
    pub selection: SelectionModel,
    pub insert: Option<InsertSession>,
    /// Where Insert mode was last left (the `^` mark).
    pub last_insert: Option<Position>,
    /// Column vertical motions try to keep; `usize::MAX` sticks to the end.
    pub want_col: usize,
    /// Last `f`/`F`/`t`/`T` search, replayed by `;` and `,`.
    pub last_find: Option<FindSpec>,
    pub delegated_from: Option<DelegatedInsert>,
}

impl<B: TextBuffer> EditorState<B> {
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            caret: Position::origin(),
            mode: ModeController::new(),
            registers: Registers::new(),
            operator_metrics: OperatorMetrics::default(),
            selection: SelectionModel::default(),
            insert: None,
            last_insert: None,
            want_col: 0,
            last_find: None,
            delegated_from: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    /// Place the caret, clamping it into the buffer.
    pub fn set_caret(&mut self, mut pos: Position) {
        let buffer = &self.buffer;
        pos.clamp_to(buffer.line_count(), |l| buffer.line_len(l));
        self.caret = pos;
    }

    /// Place the caret and make its column the wanted column.
    pub fn move_caret(&mut self, pos: Position) {
        self.set_caret(pos);
        self.want_col = self.caret.col;
    }

    pub fn caret_offset(&self) -> usize {
        self.buffer.offset_of(self.caret)
    }

    pub fn registers_facade(&mut self) -> RegistersFacade<'_> {
        RegistersFacade::new(&mut self.registers, &mut self.operator_metrics)
    }

    pub fn operator_metrics_snapshot(&self) -> OperatorMetricsSnapshot {
        self.operator_metrics.snapshot()
    }

    pub fn selection(&self) -> Option<SelectionSpan> {
        self.selection.span(self.caret)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    fn state(text: &str) -> EditorState<Buffer> {
        EditorState::new(Buffer::from_str("t", text).unwrap())
    }

    #[test]
    fn span_normalizes_order() {
        let a = Position::new(2, 1);
        let b = Position::new(0, 4);
        let span = SelectionSpan::new(a, b, SelectionKind::Characterwise);
        assert_eq!(span.start, b);
        assert_eq!(span.end, a);
    }

    #[test]
    fn characterwise_range_includes_both_ends() {
        let st = state("abcdef\nxyz\n");
        let span = SelectionSpan::new(
            Position::new(0, 1),
            Position::new(0, 3),
            SelectionKind::Characterwise,
        );
        assert_eq!(span.char_range(&st.buffer), (1, 4));
        let across = SelectionSpan::new(
            Position::new(0, 4),
            Position::new(1, 0),
            SelectionKind::Characterwise,
        );
        assert_eq!(across.char_range(&st.buffer), (4, 8));
    }

    #[test]
    fn linewise_range_covers_terminators() {
        let st = state("one\ntwo\nthree\n");
        let span = SelectionSpan::new(
            Position::new(1, 2),
            Position::new(0, 0),
            SelectionKind::Linewise,
        );
        assert_eq!(span.char_range(&st.buffer), (0, 8));
    }

    #[test]
    fn set_caret_clamps() {
        let mut st = state("ab\n");
        st.move_caret(Position::new(5, 9));
        assert_eq!(st.caret, Position::new(0, 2));
        assert_eq!(st.want_col, 2);
    }

    #[test]
    fn selection_follows_caret() {
        let mut st = state("hello\n");
        st.selection.begin(Position::new(0, 3), SelectionKind::Characterwise);
        st.caret = Position::new(0, 1);
        let span = st.selection().unwrap();
        assert_eq!(span.start, Position::new(0, 1));
        assert_eq!(span.end, Position::new(0, 3));
        st.clear_selection();
        assert!(st.selection().is_none());
    }
}

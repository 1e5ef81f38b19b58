//! Mode transitions: entering and leaving Insert, `<C-o>` delegation and
//! the Visual selection commands.

use super::DispatchResult;
use super::edit::break_line;
use crate::motion_resolver::Inclusivity;
use crate::text_object::{ObjectScope, TextObjectKind, resolve_text_object};
use crate::{CommandError, InsertEntry, ModeChange};
use core_state::{DelegatedInsert, EditorState, InsertKind, InsertSession, Mode, SelectionKind};
use core_text::motion::{dec, first_non_blank};
use core_text::{Position, TextBuffer};
use tracing::trace;

pub(crate) fn handle_mode_change<B: TextBuffer>(
    mc: ModeChange,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let from = state.mode();
    let result = match mc {
        ModeChange::EnterInsert { entry, count } => enter_insert(state, entry, count),
        ModeChange::LeaveInsert => leave_insert(state),
        ModeChange::DelegateOne => delegate_one(state),
        ModeChange::EnterVisual(kind) => enter_visual(state, kind),
        ModeChange::LeaveVisual => {
            state.clear_selection();
            let home = state.mode.command_home();
            state.mode.set(home);
            DispatchResult::clean()
        }
    };
    trace!(target: "actions.dispatch", op = "mode_change", ?mc, ?from, to = ?state.mode(), "mode_change");
    Ok(result)
}

fn enter_insert<B: TextBuffer>(
    state: &mut EditorState<B>,
    entry: InsertEntry,
    count: u32,
) -> DispatchResult {
    state.buffer.begin_transaction("insert");
    let caret = state.caret;
    let len = state.buffer.line_len(caret.line);
    let mut dirty = false;
    let (pos, kind) = match entry {
        InsertEntry::Before => (caret, InsertKind::Inline),
        InsertEntry::After => (
            Position::new(caret.line, (caret.col + 1).min(len)),
            InsertKind::Inline,
        ),
        InsertEntry::FirstNonBlank => (
            Position::new(caret.line, first_non_blank(&state.buffer, caret.line)),
            InsertKind::Inline,
        ),
        InsertEntry::LineEnd => (Position::new(caret.line, len), InsertKind::Inline),
        InsertEntry::OpenBelow => {
            let (_, end) = state.buffer.line_bounds(caret.line);
            break_line(&mut state.buffer, end);
            dirty = true;
            (Position::new(caret.line + 1, 0), InsertKind::OpenBelow)
        }
        InsertEntry::OpenAbove => {
            let (start, _) = state.buffer.line_bounds(caret.line);
            state.buffer.replace(start..start, "\n");
            dirty = true;
            (Position::new(caret.line, 0), InsertKind::OpenAbove)
        }
        InsertEntry::LastInsert => (state.last_insert.unwrap_or(caret), InsertKind::Inline),
    };
    state.move_caret(pos);
    let mut session = InsertSession::new(state.caret, count, kind);
    session.txn_open = true;
    state.insert = Some(session);
    state.mode.set(Mode::Insert);
    DispatchResult { dirty, bell: false }
}

/// Insert `text` at `offset`, returning the offset just past it.
fn insert_text<B: TextBuffer>(buf: &mut B, offset: usize, text: &str) -> usize {
    if offset >= buf.len_chars() && text.ends_with('\n') {
        // A trailing break at the end of the buffer needs its own terminator.
        buf.replace(offset..offset, &format!("{text}\n"));
    } else {
        buf.replace(offset..offset, text);
    }
    offset + text.chars().count()
}

fn leave_insert<B: TextBuffer>(state: &mut EditorState<B>) -> DispatchResult {
    let mut dirty = false;
    if let Some(session) = state.insert.take() {
        if session.repeat > 1 && !session.typed.is_empty() {
            dirty = true;
            for _ in 1..session.repeat {
                let end = match session.kind {
                    InsertKind::Inline => {
                        let at = state.caret_offset();
                        insert_text(&mut state.buffer, at, &session.typed)
                    }
                    InsertKind::OpenBelow | InsertKind::OpenAbove => {
                        let line = state.caret.line;
                        let (_, eol) = state.buffer.line_bounds(line);
                        break_line(&mut state.buffer, eol);
                        let at = state.buffer.line_bounds(line + 1).0;
                        insert_text(&mut state.buffer, at, &session.typed)
                    }
                };
                let pos = state.buffer.position_of(end);
                state.set_caret(pos);
            }
        }
        if session.txn_open {
            state.buffer.end_transaction();
        }
    }
    let mut caret = state.caret;
    state.last_insert = Some(caret);
    caret.col = caret.col.saturating_sub(1);
    state.move_caret(caret);
    state.mode.set(Mode::Normal);
    DispatchResult {
        dirty,
        bell: false,
    }
}

/// `<C-o>`: run one Normal-mode command, then resume typing.
fn delegate_one<B: TextBuffer>(state: &mut EditorState<B>) -> DispatchResult {
    let mut caret = state.caret;
    state.last_insert = Some(caret);
    let len = state.buffer.line_len(caret.line);
    let at_eol = caret.col > 0 && caret.col == len;
    if at_eol {
        caret.col -= 1;
    }
    state.set_caret(caret);
    state.delegated_from = Some(DelegatedInsert {
        at_eol,
        line: caret.line,
    });
    if let Some(s) = state.insert.as_mut()
        && s.txn_open
    {
        state.buffer.end_transaction();
        s.txn_open = false;
    }
    state.mode.delegate_one();
    DispatchResult::clean()
}

fn enter_visual<B: TextBuffer>(state: &mut EditorState<B>, kind: SelectionKind) -> DispatchResult {
    if state.mode() == Mode::Visual {
        if state.selection.kind == Some(kind) {
            state.clear_selection();
            let home = state.mode.command_home();
            state.mode.set(home);
        } else {
            state.selection.kind = Some(kind);
        }
    } else {
        let caret = state.caret;
        state.selection.begin(caret, kind);
        state.mode.set(Mode::Visual);
    }
    DispatchResult::clean()
}

/// `o` in Visual: the caret jumps to the anchor and vice versa.
pub(crate) fn swap_visual_ends<B: TextBuffer>(
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    if let Some(anchor) = state.selection.anchor {
        state.selection.anchor = Some(state.caret);
        state.move_caret(anchor);
    }
    Ok(DispatchResult::clean())
}

/// `iw`, `a(`, ... in Visual: select exactly the object around the caret.
pub(crate) fn handle_visual_object<B: TextBuffer>(
    object: TextObjectKind,
    scope: ObjectScope,
    count: u32,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let range = resolve_text_object(&state.buffer, state.caret, object, scope, count)?;
    if range.is_linewise() {
        state
            .selection
            .begin(Position::new(range.start.line, 0), SelectionKind::Linewise);
        state.move_caret(Position::new(range.end.line, 0));
    } else {
        let mut end = range.end;
        if range.inclusivity == Inclusivity::Exclusive && !range.is_empty(&state.buffer) {
            dec(&state.buffer, &mut end);
        }
        state
            .selection
            .begin(range.start, SelectionKind::Characterwise);
        state.move_caret(end);
    }
    trace!(target: "actions.dispatch", op = "visual_object", ?object, ?scope, count, "visual");
    Ok(DispatchResult::clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn state(text: &str, line: usize, col: usize) -> EditorState<Buffer> {
        let mut st = EditorState::new(Buffer::from_str("t", text).unwrap());
        st.caret = Position::new(line, col);
        st
    }

    fn enter(st: &mut EditorState<Buffer>, entry: InsertEntry, count: u32) {
        handle_mode_change(ModeChange::EnterInsert { entry, count }, st).unwrap();
    }

    #[test]
    fn entry_points_place_the_caret() {
        let mut st = state("  abc\n", 0, 3);
        enter(&mut st, InsertEntry::After, 1);
        assert_eq!(st.caret, Position::new(0, 4));
        assert_eq!(st.mode(), Mode::Insert);
        handle_mode_change(ModeChange::LeaveInsert, &mut st).unwrap();
        assert_eq!(st.caret, Position::new(0, 3));
        enter(&mut st, InsertEntry::FirstNonBlank, 1);
        assert_eq!(st.caret, Position::new(0, 2));
        handle_mode_change(ModeChange::LeaveInsert, &mut st).unwrap();
        enter(&mut st, InsertEntry::LineEnd, 1);
        assert_eq!(st.caret, Position::new(0, 5));
    }

    #[test]
    fn open_below_on_unterminated_last_line() {
        let mut st = state("abc", 0, 1);
        enter(&mut st, InsertEntry::OpenBelow, 1);
        assert_eq!(st.buffer.line_count(), 2);
        assert_eq!(st.caret, Position::new(1, 0));
        let mut st = state("abc\n", 0, 1);
        enter(&mut st, InsertEntry::OpenAbove, 1);
        assert_eq!(st.buffer.text(), "\nabc\n");
        assert_eq!(st.caret, Position::new(0, 0));
    }

    #[test]
    fn count_replays_typed_text_on_leave() {
        let mut st = state("x\n", 0, 0);
        enter(&mut st, InsertEntry::Before, 3);
        let at = st.caret_offset();
        st.buffer.replace(at..at, "ab");
        st.caret.col = 2;
        st.insert.as_mut().unwrap().typed.push_str("ab");
        handle_mode_change(ModeChange::LeaveInsert, &mut st).unwrap();
        assert_eq!(st.buffer.text(), "abababx\n");
        assert_eq!(st.caret, Position::new(0, 5));
        assert_eq!(st.last_insert, Some(Position::new(0, 6)));
        // The whole session undoes in one step.
        assert!(st.buffer.undo().is_some());
        assert_eq!(st.buffer.text(), "x\n");
    }

    #[test]
    fn delegate_steps_off_the_end_of_line() {
        let mut st = state("abc\n", 0, 3);
        enter(&mut st, InsertEntry::Before, 1);
        handle_mode_change(ModeChange::DelegateOne, &mut st).unwrap();
        assert_eq!(st.caret, Position::new(0, 2));
        assert_eq!(st.mode(), Mode::ReplaceOnce);
        assert_eq!(
            st.delegated_from,
            Some(DelegatedInsert {
                at_eol: true,
                line: 0
            })
        );
        assert!(!st.insert.as_ref().unwrap().txn_open);
    }

    #[test]
    fn visual_toggles_and_switches_kind() {
        let mut st = state("abc\n", 0, 1);
        handle_mode_change(ModeChange::EnterVisual(SelectionKind::Characterwise), &mut st).unwrap();
        assert_eq!(st.mode(), Mode::Visual);
        handle_mode_change(ModeChange::EnterVisual(SelectionKind::Linewise), &mut st).unwrap();
        assert_eq!(st.selection().unwrap().kind, SelectionKind::Linewise);
        handle_mode_change(ModeChange::EnterVisual(SelectionKind::Linewise), &mut st).unwrap();
        assert_eq!(st.mode(), Mode::Normal);
        assert!(st.selection().is_none());
    }

    #[test]
    fn visual_object_replaces_selection() {
        let mut st = state("say (hi there) now\n", 0, 7);
        handle_mode_change(ModeChange::EnterVisual(SelectionKind::Characterwise), &mut st).unwrap();
        handle_visual_object(
            TextObjectKind::Bracket {
                open: '(',
                close: ')',
            },
            ObjectScope::Inner,
            1,
            &mut st,
        )
        .unwrap();
        let span = st.selection().unwrap();
        assert_eq!(span.start, Position::new(0, 5));
        assert_eq!(span.end, Position::new(0, 12));
        swap_visual_ends(&mut st).unwrap();
        assert_eq!(st.caret, Position::new(0, 5));
        assert_eq!(st.selection.anchor, Some(Position::new(0, 12)));
    }
}

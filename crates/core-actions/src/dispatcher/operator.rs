//! Operator executor.
//!
//! Entry points resolve an `OperatorRange` (from a motion, a text object,
//! a doubled operator or the Visual selection) and hand it to
//! `apply_operator`, which performs the mutation as one buffer transaction,
//! writes registers through the `RegistersFacade` and places the caret.
//!
//! `Change` is the exception to "one transaction per command": its
//! transaction stays open through the Insert session it starts and is
//! closed on `<Esc>`, so `u` reverts the deletion and the typed text
//! together.

use super::DispatchResult;
use crate::motion_resolver::{
    Inclusivity, MotionContext, MotionSpec, OperatorRange, RangeShape, find_spec,
    operator_range, resolve_motion,
};
use crate::text_object::{ObjectScope, TextObjectKind, resolve_text_object};
use crate::{CommandError, MotionKind, OperatorKind, ResolveError};
use core_config::EngineSettings;
use core_state::{EditorState, InsertKind, InsertSession, Mode, RegisterContent, SelectionKind};
use core_text::motion::{first_non_blank, normalize_normal_mode_position};
use core_text::{Position, TextBuffer};
use tracing::debug;

pub(crate) fn handle_operator_motion<B: TextBuffer>(
    op: OperatorKind,
    motion: MotionKind,
    count: Option<u32>,
    register: Option<char>,
    state: &mut EditorState<B>,
    settings: &EngineSettings,
) -> Result<DispatchResult, CommandError> {
    if let Some(find) = find_spec(motion) {
        state.last_find = Some(find);
    }
    let ctx = MotionContext::new(state.want_col)
        .with_operator(Some(op))
        .with_last_find(state.last_find);
    let caret = state.caret;
    let target = resolve_motion(&state.buffer, caret, &MotionSpec::new(motion, count), ctx)?;
    let range = operator_range(&state.buffer, caret, &target);
    let result = apply_operator(state, op, range, register, settings)?;
    Ok(result.with_bell(target.stopped_short))
}

pub(crate) fn handle_operator_object<B: TextBuffer>(
    op: OperatorKind,
    object: TextObjectKind,
    scope: ObjectScope,
    count: u32,
    register: Option<char>,
    state: &mut EditorState<B>,
    settings: &EngineSettings,
) -> Result<DispatchResult, CommandError> {
    let range = resolve_text_object(&state.buffer, state.caret, object, scope, count)?;
    apply_operator(state, op, range, register, settings)
}

/// `dd`, `cc`, `yy`, `>>`, `g~~`, ...: `count` lines from the caret line.
pub(crate) fn handle_linewise<B: TextBuffer>(
    op: OperatorKind,
    count: u32,
    register: Option<char>,
    state: &mut EditorState<B>,
    settings: &EngineSettings,
) -> Result<DispatchResult, CommandError> {
    let first = state.caret.line;
    let last_line = state.buffer.line_count().saturating_sub(1);
    let count = count.max(1) as usize;
    if count > 1 && first >= last_line {
        return Err(ResolveError::AtBufferEdge.into());
    }
    let last = first.saturating_add(count - 1).min(last_line);
    apply_operator(state, op, OperatorRange::linewise(first, last), register, settings)
}

pub(crate) fn handle_visual_operator<B: TextBuffer>(
    op: OperatorKind,
    register: Option<char>,
    state: &mut EditorState<B>,
    settings: &EngineSettings,
) -> Result<DispatchResult, CommandError> {
    let Some(span) = state.selection() else {
        return Err(CommandError::ModeViolation { mode: state.mode() });
    };
    let range = match span.kind {
        SelectionKind::Linewise => OperatorRange::linewise(span.start.line, span.end.line),
        SelectionKind::Characterwise => {
            let buf = &state.buffer;
            // A selection ending on an end-of-line cell takes the line break.
            if span.end.col >= buf.line_len(span.end.line) && span.end.line + 1 < buf.line_count()
            {
                OperatorRange::characterwise(
                    span.start,
                    Position::new(span.end.line + 1, 0),
                    Inclusivity::Exclusive,
                )
            } else {
                OperatorRange::characterwise(span.start, span.end, Inclusivity::Inclusive)
            }
        }
    };
    state.clear_selection();
    let home = state.mode.command_home();
    state.mode.set(home);
    apply_operator(state, op, range, register, settings)
}

fn content_for(range: &OperatorRange, text: String) -> RegisterContent {
    if range.is_linewise() {
        RegisterContent::linewise(text)
    } else {
        RegisterContent::charwise(text)
    }
}

/// Apply `op` to `range`.
pub fn apply_operator<B: TextBuffer>(
    state: &mut EditorState<B>,
    op: OperatorKind,
    range: OperatorRange,
    register: Option<char>,
    settings: &EngineSettings,
) -> Result<DispatchResult, CommandError> {
    debug!(
        target: "actions.operator",
        op = op.label(),
        shape = ?range.shape,
        start_line = range.start.line,
        start_col = range.start.col,
        end_line = range.end.line,
        end_col = range.end.col,
        ?register,
        "apply_operator"
    );
    if range.shape == RangeShape::Block {
        return Err(ResolveError::BlockRange.into());
    }
    if op != OperatorKind::Change && range.is_empty(&state.buffer) {
        return Ok(DispatchResult::clean());
    }
    match op {
        OperatorKind::Delete => Ok(delete(state, &range, register)),
        OperatorKind::Change => Ok(change(state, &range, register)),
        OperatorKind::Yank => Ok(yank(state, &range, register)),
        OperatorKind::ToggleCase | OperatorKind::Lowercase | OperatorKind::Uppercase => {
            Ok(change_case(state, op, &range))
        }
        OperatorKind::ShiftRight | OperatorKind::ShiftLeft => {
            Ok(shift(state, op, &range, settings.shift_width))
        }
    }
}

fn delete<B: TextBuffer>(
    state: &mut EditorState<B>,
    range: &OperatorRange,
    register: Option<char>,
) -> DispatchResult {
    let mut span = range.char_range(&state.buffer);
    let text = state.buffer.read(span.clone());
    state
        .registers_facade()
        .write_delete(content_for(range, text.clone()), register);
    // Removing the final line of a buffer without a trailing newline takes
    // the preceding line break instead.
    if range.is_linewise()
        && span.start > 0
        && span.end == state.buffer.len_chars()
        && !text.ends_with('\n')
    {
        span.start -= 1;
    }
    state.buffer.begin_transaction("delete");
    state.buffer.replace(span, "");
    state.buffer.end_transaction();

    let caret = if range.is_linewise() {
        let line = range.start.line.min(state.buffer.line_count().saturating_sub(1));
        Position::new(line, first_non_blank(&state.buffer, line))
    } else {
        range.start
    };
    place_caret(state, caret);
    DispatchResult::dirty()
}

fn change<B: TextBuffer>(
    state: &mut EditorState<B>,
    range: &OperatorRange,
    register: Option<char>,
) -> DispatchResult {
    let span = if range.is_linewise() {
        // Keep one (now empty) line to type into.
        let start = state.buffer.line_bounds(range.start.line).0;
        let end = state.buffer.line_bounds(range.end.line).1;
        start..end
    } else {
        range.char_range(&state.buffer)
    };
    let text = state.buffer.read(span.clone());
    if range.is_linewise() || !text.is_empty() {
        state
            .registers_facade()
            .write_change(content_for(range, text), register);
    }
    state.buffer.begin_transaction("change");
    state.buffer.replace(span.clone(), "");

    let at = state.buffer.position_of(span.start);
    state.move_caret(at);
    let mut session = InsertSession::new(state.caret, 1, InsertKind::Inline);
    session.txn_open = true;
    state.insert = Some(session);
    state.mode.set(Mode::Insert);
    DispatchResult::dirty()
}

fn yank<B: TextBuffer>(
    state: &mut EditorState<B>,
    range: &OperatorRange,
    register: Option<char>,
) -> DispatchResult {
    let text = state.buffer.read(range.char_range(&state.buffer));
    state
        .registers_facade()
        .write_yank(content_for(range, text), register);
    let caret = if range.is_linewise() {
        Position::new(range.start.line, state.caret.col)
    } else {
        range.start
    };
    place_caret(state, caret);
    DispatchResult::clean()
}

/// Case-map `text` one char at a time. A char whose mapping expands
/// (`ß` to `SS`) is left alone, so line lengths and columns never change.
fn map_case(op: OperatorKind, text: &str) -> String {
    fn single(mut it: impl Iterator<Item = char>, c: char) -> char {
        match (it.next(), it.next()) {
            (Some(m), None) => m,
            _ => c,
        }
    }
    text.chars()
        .map(|c| match op {
            OperatorKind::Lowercase => single(c.to_lowercase(), c),
            OperatorKind::Uppercase => single(c.to_uppercase(), c),
            _ if c.is_lowercase() => single(c.to_uppercase(), c),
            _ if c.is_uppercase() => single(c.to_lowercase(), c),
            _ => c,
        })
        .collect()
}

fn change_case<B: TextBuffer>(
    state: &mut EditorState<B>,
    op: OperatorKind,
    range: &OperatorRange,
) -> DispatchResult {
    let span = range.char_range(&state.buffer);
    let text = state.buffer.read(span.clone());
    let mapped = map_case(op, &text);
    let dirty = mapped != text;
    if dirty {
        state.buffer.begin_transaction("case");
        state.buffer.replace(span, &mapped);
        state.buffer.end_transaction();
    }
    state.operator_metrics.incr_case();
    let caret = if range.is_linewise() {
        Position::new(range.start.line, 0)
    } else {
        range.start
    };
    place_caret(state, caret);
    DispatchResult {
        dirty,
        bell: false,
    }
}

/// Indent width of a run of leading blanks to remove for `<`: spaces count
/// one column each, a tab counts as a whole indent unit.
fn outdent_len(line: &str, width: usize) -> usize {
    let mut cols = 0;
    let mut taken = 0;
    for c in line.chars() {
        if cols >= width {
            break;
        }
        match c {
            ' ' => cols += 1,
            '\t' => cols = width,
            _ => break,
        }
        taken += 1;
    }
    taken
}

fn shift<B: TextBuffer>(
    state: &mut EditorState<B>,
    op: OperatorKind,
    range: &OperatorRange,
    width: usize,
) -> DispatchResult {
    let indent = " ".repeat(width);
    let mut dirty = false;
    state.buffer.begin_transaction("shift");
    for line in (range.start.line..=range.end.line).rev() {
        let text = state.buffer.line_text(line);
        if text.is_empty() {
            continue;
        }
        let (start, _) = state.buffer.line_bounds(line);
        if op == OperatorKind::ShiftRight {
            state.buffer.replace(start..start, &indent);
            dirty = true;
        } else {
            let n = outdent_len(&text, width);
            if n > 0 {
                state.buffer.replace(start..start + n, "");
                dirty = true;
            }
        }
    }
    state.buffer.end_transaction();
    state.operator_metrics.incr_shift();
    let line = range.start.line;
    place_caret(state, Position::new(line, first_non_blank(&state.buffer, line)));
    DispatchResult { dirty, bell: false }
}

/// Standalone `~`: toggle `count` characters from the caret, stopping at
/// the end of the line.
pub(crate) fn toggle_case_chars<B: TextBuffer>(
    count: u32,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let line = state.caret.line;
    let len = state.buffer.line_len(line);
    if len == 0 {
        return Err(ResolveError::AtBufferEdge.into());
    }
    let col = state.caret.col.min(len - 1);
    let n = (count.max(1) as usize).min(len - col);
    let start = state.buffer.offset_of(Position::new(line, col));
    let text = state.buffer.read(start..start + n);
    let mapped = map_case(OperatorKind::ToggleCase, &text);
    let dirty = mapped != text;
    if dirty {
        state.buffer.begin_transaction("toggle-case");
        state.buffer.replace(start..start + n, &mapped);
        state.buffer.end_transaction();
    }
    state.operator_metrics.incr_case();
    state.move_caret(Position::new(line, (col + n).min(len - 1)));
    debug!(target: "actions.operator", op = "toggle-chars", count = n, "apply_operator");
    Ok(DispatchResult {
        dirty,
        bell: false,
    })
}

fn place_caret<B: TextBuffer>(state: &mut EditorState<B>, mut pos: Position) {
    normalize_normal_mode_position(&state.buffer, &mut pos);
    state.move_caret(pos);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn state(text: &str, caret: (usize, usize)) -> EditorState<Buffer> {
        let mut st = EditorState::new(Buffer::from_str("t", text).unwrap());
        st.caret = Position::new(caret.0, caret.1);
        st
    }

    fn apply(st: &mut EditorState<Buffer>, op: OperatorKind, range: OperatorRange) {
        apply_operator(st, op, range, None, &EngineSettings::default()).unwrap();
    }

    #[test]
    fn case_mapping_never_changes_line_length() {
        let mut st = state("\u{df}ab\n", (0, 0));
        toggle_case_chars(1, &mut st).unwrap();
        assert_eq!(st.buffer.text(), "\u{df}ab\n");
        assert_eq!(st.caret, Position::new(0, 1));
        toggle_case_chars(5, &mut st).unwrap();
        assert_eq!(st.buffer.text(), "\u{df}AB\n");
        assert_eq!(st.caret, Position::new(0, 2));
        apply(&mut st, OperatorKind::Uppercase, OperatorRange::linewise(0, 0));
        assert_eq!(st.buffer.text(), "\u{df}AB\n");
        assert_eq!(map_case(OperatorKind::Lowercase, "\u{130}X"), "\u{130}x");
    }

    #[test]
    fn block_range_is_rejected_untouched() {
        let mut st = state("abc\ndef\n", (0, 0));
        let range = OperatorRange {
            shape: RangeShape::Block,
            ..OperatorRange::characterwise(
                Position::new(0, 0),
                Position::new(1, 1),
                Inclusivity::Inclusive,
            )
        };
        let r = apply_operator(&mut st, OperatorKind::Delete, range, None, &EngineSettings::default());
        assert_eq!(r, Err(CommandError::Resolution(ResolveError::BlockRange)));
        assert_eq!(st.buffer.text(), "abc\ndef\n");
        assert!(st.registers.unnamed().is_none());
    }

    #[test]
    fn linewise_delete_moves_to_first_non_blank() {
        let mut st = state("one\n  two\nthree\n", (0, 2));
        apply(&mut st, OperatorKind::Delete, OperatorRange::linewise(0, 0));
        assert_eq!(st.buffer.text(), "  two\nthree\n");
        assert_eq!(st.caret, Position::new(0, 2));
        assert_eq!(st.registers.unnamed().unwrap().text, "one\n");
    }

    #[test]
    fn deleting_last_line_without_newline_takes_preceding_break() {
        let mut st = state("one\ntwo", (1, 0));
        apply(&mut st, OperatorKind::Delete, OperatorRange::linewise(1, 1));
        assert_eq!(st.buffer.text(), "one");
        assert_eq!(st.caret, Position::new(0, 0));
        assert_eq!(st.registers.unnamed().unwrap().text, "two\n");
    }

    #[test]
    fn linewise_change_keeps_an_empty_line() {
        let mut st = state("a\n    b\nc\n", (1, 4));
        apply(&mut st, OperatorKind::Change, OperatorRange::linewise(1, 1));
        assert_eq!(st.buffer.text(), "a\n\nc\n");
        assert_eq!(st.caret, Position::new(1, 0));
        assert_eq!(st.mode(), Mode::Insert);
        assert!(st.insert.as_ref().unwrap().txn_open);
        assert_eq!(st.registers.unnamed().unwrap().text, "    b\n");
    }

    #[test]
    fn case_operators_map_in_place() {
        let mut st = state("Hello World\n", (0, 3));
        let range = OperatorRange::characterwise(
            Position::new(0, 0),
            Position::new(0, 4),
            Inclusivity::Inclusive,
        );
        apply(&mut st, OperatorKind::ToggleCase, range);
        assert_eq!(st.buffer.text(), "hELLO World\n");
        assert_eq!(st.caret, Position::new(0, 0));
        apply(&mut st, OperatorKind::Uppercase, OperatorRange::linewise(0, 0));
        assert_eq!(st.buffer.text(), "HELLO WORLD\n");
        assert_eq!(st.operator_metrics_snapshot().operator_case, 2);
    }

    #[test]
    fn shift_right_skips_empty_lines_and_left_removes_one_unit() {
        let mut st = state("a\n\n  b\n", (0, 0));
        apply(&mut st, OperatorKind::ShiftRight, OperatorRange::linewise(0, 2));
        assert_eq!(st.buffer.text(), "    a\n\n      b\n");
        assert_eq!(st.caret, Position::new(0, 4));
        apply(&mut st, OperatorKind::ShiftLeft, OperatorRange::linewise(0, 2));
        assert_eq!(st.buffer.text(), "a\n\n  b\n");
        let mut tabbed = state("\t\tx\n", (0, 0));
        apply(&mut tabbed, OperatorKind::ShiftLeft, OperatorRange::linewise(0, 0));
        assert_eq!(tabbed.buffer.text(), "\tx\n");
    }

    #[test]
    fn yank_leaves_text_and_moves_to_start() {
        let mut st = state("one two\n", (0, 6));
        let range = OperatorRange::characterwise(
            Position::new(0, 4),
            Position::new(0, 6),
            Inclusivity::Inclusive,
        );
        apply_operator(&mut st, OperatorKind::Yank, range, Some('a'), &EngineSettings::default())
            .unwrap();
        assert_eq!(st.buffer.text(), "one two\n");
        assert_eq!(st.caret, Position::new(0, 4));
        assert_eq!(st.registers.get('a').unwrap().text, "two");
    }

    #[test]
    fn empty_range_is_a_no_op() {
        let mut st = state("abc\n", (0, 0));
        let range = OperatorRange::characterwise(
            Position::new(0, 0),
            Position::new(0, 0),
            Inclusivity::Exclusive,
        );
        let r = apply_operator(&mut st, OperatorKind::Delete, range, None, &EngineSettings::default())
            .unwrap();
        assert_eq!(r, DispatchResult::clean());
        assert!(st.registers.unnamed().is_none());
    }

    #[test]
    fn toggle_chars_absorbs_excess_count() {
        let mut st = state("hello\n", (0, 3));
        toggle_case_chars(10, &mut st).unwrap();
        assert_eq!(st.buffer.text(), "helLO\n");
        assert_eq!(st.caret, Position::new(0, 4));
        let mut empty = state("\n", (0, 0));
        assert!(toggle_case_chars(1, &mut empty).is_err());
    }
}

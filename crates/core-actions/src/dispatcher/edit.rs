//! Text edits: Insert-mode typing plus the Normal-mode `r`, `J`, `p`, `P`.
//!
//! Typing runs inside the transaction opened when Insert mode was entered
//! (or by the change operator), so a whole insert session undoes as one
//! step. Cursor keys close that transaction and start a fresh session at
//! the new caret position.

use super::DispatchResult;
use crate::{CommandError, EditKind, InsertMove, ResolveError};
use core_state::{EditorState, InsertKind, InsertSession};
use core_text::motion::{first_non_blank, normalize_normal_mode_position, vertical};
use core_text::{CharClass, Position, TextBuffer};
use tracing::trace;

fn session<B: TextBuffer>(state: &mut EditorState<B>) -> &mut InsertSession {
    let caret = state.caret;
    state
        .insert
        .get_or_insert_with(|| InsertSession::new(caret, 1, InsertKind::Inline))
}

fn ensure_txn<B: TextBuffer>(state: &mut EditorState<B>) {
    if !session(state).txn_open {
        state.buffer.begin_transaction("insert");
        session(state).txn_open = true;
    }
}

/// Insert a line break at `offset`. At the very end of a buffer without a
/// trailing newline a single `\n` would only terminate the last line, so a
/// second one is needed to open a new line.
pub(super) fn break_line<B: TextBuffer + ?Sized>(buf: &mut B, offset: usize) {
    if offset >= buf.len_chars() {
        buf.replace(offset..offset, "\n\n");
    } else {
        buf.replace(offset..offset, "\n");
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub(crate) fn handle_edit<B: TextBuffer>(
    kind: EditKind,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let before = state.caret;
    let result = match kind {
        EditKind::InsertChar(c) => Ok(type_char(state, c)),
        EditKind::InsertTab => Ok(type_char(state, '\t')),
        EditKind::InsertNewline => {
            ensure_txn(state);
            let offset = state.caret_offset();
            break_line(&mut state.buffer, offset);
            state.move_caret(Position::new(before.line + 1, 0));
            session(state).typed.push('\n');
            Ok(DispatchResult::dirty())
        }
        EditKind::Backspace => backspace(state),
        EditKind::DeleteUnder => delete_under(state),
        EditKind::DeleteWordBack => delete_word_back(state),
        EditKind::DeleteToInsertStart => delete_to_insert_start(state),
        EditKind::Move(m) => Ok(insert_move(state, m)),
    };
    trace!(
        target: "actions.dispatch",
        op = "edit",
        ?kind,
        line = before.line,
        col = before.col,
        to_line = state.caret.line,
        to_col = state.caret.col,
        "edit"
    );
    result
}

fn type_char<B: TextBuffer>(state: &mut EditorState<B>, c: char) -> DispatchResult {
    ensure_txn(state);
    let offset = state.caret_offset();
    let mut tmp = [0u8; 4];
    state.buffer.replace(offset..offset, c.encode_utf8(&mut tmp));
    let caret = Position::new(state.caret.line, state.caret.col + 1);
    state.move_caret(caret);
    session(state).typed.push(c);
    DispatchResult::dirty()
}

/// Remove `from..caret` on the caret line (or the preceding line break when
/// the caret is in column 0) and keep the session bookkeeping in step.
fn erase_back<B: TextBuffer>(
    state: &mut EditorState<B>,
    from_col: usize,
) -> Result<DispatchResult, CommandError> {
    let caret = state.caret;
    if caret.col == 0 {
        if caret.line == 0 {
            return Err(ResolveError::AtBufferEdge.into());
        }
        ensure_txn(state);
        let prev_len = state.buffer.line_len(caret.line - 1);
        let offset = state.caret_offset();
        state.buffer.replace(offset - 1..offset, "");
        state.move_caret(Position::new(caret.line - 1, prev_len));
        pop_typed(state, 1);
        return Ok(DispatchResult::dirty());
    }
    ensure_txn(state);
    let start = state.buffer.offset_of(Position::new(caret.line, from_col));
    let end = state.caret_offset();
    state.buffer.replace(start..end, "");
    state.move_caret(Position::new(caret.line, from_col));
    pop_typed(state, end - start);
    Ok(DispatchResult::dirty())
}

fn pop_typed<B: TextBuffer>(state: &mut EditorState<B>, n: usize) {
    let caret = state.caret;
    let s = session(state);
    for _ in 0..n {
        if s.typed.pop().is_none() {
            break;
        }
    }
    if caret < s.start {
        s.start = caret;
    }
}

fn backspace<B: TextBuffer>(state: &mut EditorState<B>) -> Result<DispatchResult, CommandError> {
    let col = state.caret.col;
    erase_back(state, col.saturating_sub(1))
}

fn delete_under<B: TextBuffer>(
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let offset = state.caret_offset();
    if offset >= state.buffer.len_chars() {
        return Err(ResolveError::AtBufferEdge.into());
    }
    let caret = state.caret;
    // On the end-of-line cell this removes the line break, joining lines.
    if caret.col >= state.buffer.line_len(caret.line) && caret.line + 1 >= state.buffer.line_count()
    {
        return Err(ResolveError::AtBufferEdge.into());
    }
    ensure_txn(state);
    state.buffer.replace(offset..offset + 1, "");
    Ok(DispatchResult::dirty())
}

fn delete_word_back<B: TextBuffer>(
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let caret = state.caret;
    if caret.col == 0 {
        return erase_back(state, 0);
    }
    let stop = match &state.insert {
        Some(s) if s.start.line == caret.line && s.start.col < caret.col => s.start.col,
        _ => 0,
    };
    let chars: Vec<char> = state.buffer.line_text(caret.line).chars().collect();
    let mut col = caret.col.min(chars.len());
    while col > stop && is_blank(chars[col - 1]) {
        col -= 1;
    }
    if col > stop {
        let class = state.buffer.classify(chars[col - 1]);
        while col > stop
            && state.buffer.classify(chars[col - 1]) == class
            && class != CharClass::Space
        {
            col -= 1;
        }
    }
    erase_back(state, col)
}

fn delete_to_insert_start<B: TextBuffer>(
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let caret = state.caret;
    if caret.col == 0 {
        return erase_back(state, 0);
    }
    let col = match &state.insert {
        Some(s) if s.start.line == caret.line && s.start.col < caret.col => s.start.col,
        _ => {
            let indent = first_non_blank(&state.buffer, caret.line);
            if indent < caret.col { indent } else { 0 }
        }
    };
    erase_back(state, col)
}

fn insert_move<B: TextBuffer>(state: &mut EditorState<B>, m: InsertMove) -> DispatchResult {
    if let Some(s) = state.insert.as_mut()
        && s.txn_open
    {
        state.buffer.end_transaction();
        s.txn_open = false;
    }
    let caret = state.caret;
    let len = state.buffer.line_len(caret.line);
    let mut pos = caret;
    let moved = match m {
        InsertMove::Left if caret.col > 0 => {
            pos.col -= 1;
            true
        }
        InsertMove::Right if caret.col < len => {
            pos.col += 1;
            true
        }
        InsertMove::Up | InsertMove::Down => {
            vertical(&state.buffer, &mut pos, 1, m == InsertMove::Down, state.want_col).is_ok()
        }
        InsertMove::Home => {
            pos.col = 0;
            true
        }
        InsertMove::End => {
            pos.col = len;
            true
        }
        InsertMove::Left | InsertMove::Right => false,
    };
    match m {
        InsertMove::Up | InsertMove::Down => state.set_caret(pos),
        _ => state.move_caret(pos),
    }
    if m == InsertMove::End {
        state.want_col = usize::MAX;
    }
    let caret = state.caret;
    let s = session(state);
    s.start = caret;
    s.typed.clear();
    s.repeat = 1;
    DispatchResult::clean().with_bell(!moved)
}

/// `r{char}`: overwrite `count` characters. `r<CR>` replaces them with a
/// single line break.
pub(crate) fn replace_chars<B: TextBuffer>(
    ch: char,
    count: u32,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let caret = state.caret;
    let len = state.buffer.line_len(caret.line);
    let n = count.max(1) as usize;
    if len == 0 || caret.col + n > len {
        return Err(ResolveError::AtBufferEdge.into());
    }
    let start = state.caret_offset();
    state.buffer.begin_transaction("replace");
    if ch == '\n' {
        state.buffer.replace(start..start + n, "");
        break_line(&mut state.buffer, start);
        state.buffer.end_transaction();
        state.move_caret(Position::new(caret.line + 1, 0));
    } else {
        let text: String = std::iter::repeat_n(ch, n).collect();
        state.buffer.replace(start..start + n, &text);
        state.buffer.end_transaction();
        state.move_caret(Position::new(caret.line, caret.col + n - 1));
    }
    trace!(target: "actions.dispatch", op = "replace", ?ch, count = n, "edit");
    Ok(DispatchResult::dirty())
}

/// `J`: join `count` lines (at least two) into one, separating them with a
/// single space unless the joined text makes that redundant.
pub(crate) fn join_lines<B: TextBuffer>(
    count: u32,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let line = state.caret.line;
    let last = state.buffer.line_count().saturating_sub(1);
    if line >= last {
        return Err(ResolveError::AtBufferEdge.into());
    }
    let joins = (count.max(2) as usize - 1).min(last - line);
    let mut col = 0;
    state.buffer.begin_transaction("join");
    for _ in 0..joins {
        let cur = state.buffer.line_text(line);
        let next = state.buffer.line_text(line + 1);
        let indent = next.chars().take_while(|c| is_blank(*c)).count();
        let rest = &next[next.char_indices().nth(indent).map_or(next.len(), |(i, _)| i)..];
        let sep = if rest.is_empty()
            || rest.starts_with(')')
            || cur.is_empty()
            || cur.ends_with(is_blank)
        {
            ""
        } else {
            " "
        };
        let (_, end) = state.buffer.line_bounds(line);
        let next_start = state.buffer.line_bounds(line + 1).0;
        col = cur.chars().count();
        state.buffer.replace(end..next_start + indent, sep);
    }
    state.buffer.end_transaction();
    let mut pos = Position::new(line, col);
    normalize_normal_mode_position(&state.buffer, &mut pos);
    state.move_caret(pos);
    trace!(target: "actions.dispatch", op = "join", joins, "edit");
    Ok(DispatchResult::dirty())
}

/// `p` / `P` from `register` (unnamed when `None`), `count` times.
pub(crate) fn paste<B: TextBuffer>(
    register: Option<char>,
    count: u32,
    before: bool,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    let content = state
        .registers_facade()
        .read_paste(register)
        .map_err(ResolveError::from)?;
    let text = content.text.repeat(count.max(1) as usize);
    let caret = state.caret;
    state.buffer.begin_transaction("paste");
    let pos = if content.is_linewise() {
        let line = if before { caret.line } else { caret.line + 1 };
        if line < state.buffer.line_count() {
            let at = state.buffer.line_bounds(line).0;
            state.buffer.replace(at..at, &text);
        } else {
            let at = state.buffer.len_chars();
            let ends_with_newline =
                at > 0 && state.buffer.read(at - 1..at) == "\n";
            if ends_with_newline {
                state.buffer.replace(at..at, &text);
            } else {
                state.buffer.replace(at..at, &format!("\n{text}"));
            }
        }
        Position::new(line, first_non_blank(&state.buffer, line))
    } else {
        let mut at = state.caret_offset();
        if !before && state.buffer.char_at(caret).is_some() {
            at += 1;
        }
        state.buffer.replace(at..at, &text);
        if text.contains('\n') {
            state.buffer.position_of(at)
        } else {
            state.buffer.position_of(at + text.chars().count() - 1)
        }
    };
    state.buffer.end_transaction();
    let mut pos = pos;
    normalize_normal_mode_position(&state.buffer, &mut pos);
    state.move_caret(pos);
    trace!(target: "actions.dispatch", op = "paste", ?register, count, before, linewise = content.is_linewise(), "edit");
    Ok(DispatchResult::dirty())
}

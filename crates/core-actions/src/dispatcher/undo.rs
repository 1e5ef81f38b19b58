//! Undo / redo forwarding to the buffer's history.
//!
//! The buffer reports the offset of the first change in each reverted
//! group; the caret lands there.

use super::DispatchResult;
use crate::{CommandError, ResolveError};
use core_state::EditorState;
use core_text::TextBuffer;
use core_text::motion::normalize_normal_mode_position;
use tracing::trace;

fn step<B: TextBuffer>(
    state: &mut EditorState<B>,
    count: u32,
    op: &'static str,
    f: fn(&mut B) -> Option<usize>,
) -> Result<DispatchResult, CommandError> {
    let mut last = None;
    let mut steps = 0;
    for _ in 0..count.max(1) {
        match f(&mut state.buffer) {
            Some(offset) => {
                last = Some(offset);
                steps += 1;
            }
            None => break,
        }
    }
    trace!(target: "actions.dispatch", op, requested = count, steps, "history");
    let Some(offset) = last else {
        return Err(ResolveError::AtBufferEdge.into());
    };
    let mut pos = state.buffer.position_of(offset);
    normalize_normal_mode_position(&state.buffer, &mut pos);
    state.move_caret(pos);
    Ok(DispatchResult::dirty())
}

pub(crate) fn handle_undo<B: TextBuffer>(
    count: u32,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    step(state, count, "undo", B::undo)
}

pub(crate) fn handle_redo<B: TextBuffer>(
    count: u32,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    step(state, count, "redo", B::redo)
}

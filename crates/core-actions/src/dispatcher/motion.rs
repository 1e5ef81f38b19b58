//! Caret motion handling.
//!
//! Resolution is delegated to `motion_resolver`; this layer records the
//! character search for `;`/`,`, moves the caret and keeps the wanted
//! column. In Visual mode the caret is the moving end of the selection, so
//! moving it is all a motion has to do.

use super::DispatchResult;
use crate::motion_resolver::{MotionContext, MotionSpec, find_spec, resolve_motion};
use crate::{CommandError, MotionKind};
use core_state::EditorState;
use core_text::TextBuffer;
use tracing::trace;

pub(crate) fn handle_motion<B: TextBuffer>(
    kind: MotionKind,
    count: Option<u32>,
    state: &mut EditorState<B>,
) -> Result<DispatchResult, CommandError> {
    if let Some(find) = find_spec(kind) {
        state.last_find = Some(find);
    }
    let ctx = MotionContext::new(state.want_col).with_last_find(state.last_find);
    let before = state.caret;
    let target = resolve_motion(&state.buffer, before, &MotionSpec::new(kind, count), ctx)?;
    state.set_caret(target.position);
    state.want_col = target.want_col.unwrap_or(state.caret.col);
    trace!(
        target: "actions.dispatch",
        op = "motion",
        ?kind,
        count = count.unwrap_or(1),
        from_line = before.line,
        from_col = before.col,
        to_line = state.caret.line,
        to_col = state.caret.col,
        short = target.stopped_short,
        "motion"
    );
    Ok(DispatchResult::clean().with_bell(target.stopped_short))
}

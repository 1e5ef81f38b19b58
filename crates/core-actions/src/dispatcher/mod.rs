//! Dispatcher applying `Action` to an `EditorState`.
//!
//! Sub-modules:
//! * `motion`   - caret movement (Normal and Visual)
//! * `operator` - the operator executor (`d c y g~ gu gU > <`, `~`)
//! * `edit`     - Insert-mode typing plus `r`, `J`, `p`, `P`
//! * `mode`     - Insert entry/exit, `<C-o>` delegation, Visual
//! * `undo`     - undo / redo forwarding to the buffer
//!
//! Every action is first checked against the current mode; buffer mutation
//! only happens after that check passes, inside one transaction per
//! command.

use crate::{Action, CommandError, ModeChange};
use core_config::EngineSettings;
use core_state::{EditorState, Mode};
use core_text::TextBuffer;
use tracing::debug;

mod edit;
mod mode;
mod motion;
pub mod operator;
mod undo;

pub use operator::apply_operator;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// Buffer text changed.
    pub dirty: bool,
    /// The command took effect but hit an edge on the way (`w` on the last
    /// word, `dh` in column 0); the host should ring the bell.
    pub bell: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            bell: false,
        }
    }
    pub fn clean() -> Self {
        Self::default()
    }
    pub fn with_bell(mut self, bell: bool) -> Self {
        self.bell |= bell;
        self
    }
}

/// Modes in which `action` may run.
fn allowed(action: &Action, mode: Mode) -> bool {
    let command_mode = matches!(
        mode,
        Mode::Normal | Mode::OperatorPending | Mode::ReplaceOnce
    );
    match action {
        Action::Cancel => true,
        Action::Motion(_) | Action::MotionWithCount { .. } => mode != Mode::Insert,
        Action::Edit(_)
        | Action::ModeChange(ModeChange::LeaveInsert)
        | Action::ModeChange(ModeChange::DelegateOne) => mode == Mode::Insert,
        Action::VisualOperator { .. }
        | Action::VisualObject { .. }
        | Action::VisualSwapEnds
        | Action::ModeChange(ModeChange::LeaveVisual) => mode == Mode::Visual,
        Action::ModeChange(ModeChange::EnterVisual(_)) => command_mode || mode == Mode::Visual,
        _ => command_mode,
    }
}

/// Apply an action to editor state.
pub fn dispatch<B: TextBuffer>(
    action: Action,
    state: &mut EditorState<B>,
    settings: &EngineSettings,
) -> Result<DispatchResult, CommandError> {
    let mode = state.mode();
    debug!(target: "actions.dispatch", ?action, ?mode, line = state.caret.line, col = state.caret.col, "dispatch");
    if !allowed(&action, mode) {
        return Err(CommandError::ModeViolation { mode });
    }

    match action {
        Action::Motion(kind) => motion::handle_motion(kind, None, state),
        Action::MotionWithCount { motion, count } => {
            motion::handle_motion(motion, Some(count), state)
        }
        Action::ApplyOperator {
            op,
            motion,
            count,
            register,
        } => operator::handle_operator_motion(op, motion, count, register, state, settings),
        Action::ApplyOperatorObject {
            op,
            object,
            scope,
            count,
            register,
        } => operator::handle_operator_object(op, object, scope, count, register, state, settings),
        Action::LinewiseOperator {
            op,
            count,
            register,
        } => operator::handle_linewise(op, count, register, state, settings),
        Action::VisualOperator { op, register } => {
            operator::handle_visual_operator(op, register, state, settings)
        }
        Action::VisualObject {
            object,
            scope,
            count,
        } => mode::handle_visual_object(object, scope, count, state),
        Action::VisualSwapEnds => mode::swap_visual_ends(state),
        Action::ModeChange(mc) => mode::handle_mode_change(mc, state),
        Action::Edit(kind) => edit::handle_edit(kind, state),
        Action::ToggleCaseChars { count } => operator::toggle_case_chars(count, state),
        Action::ReplaceChar { ch, count } => edit::replace_chars(ch, count, state),
        Action::JoinLines { count } => edit::join_lines(count, state),
        Action::PasteAfter { register, count } => edit::paste(register, count, false, state),
        Action::PasteBefore { register, count } => edit::paste(register, count, true, state),
        Action::Undo { count } => undo::handle_undo(count, state),
        Action::Redo { count } => undo::handle_redo(count, state),
        Action::Cancel => Ok(DispatchResult::clean()),
    }
}

//! Mode controller: the single owner of the current editor mode.
//!
//! Transitions go through `set` so every change is logged and reported to
//! observers. Operator-pending remembers the mode it was entered from, and
//! a one-shot delegation from Insert (`<C-o>`) returns to Insert once the
//! delegated command settles.

use tracing::debug;

use crate::Mode;

/// Read-only hook for hosts that display or react to the mode.
pub trait ModeObserver {
    fn on_mode_change(&mut self, from: Mode, to: Mode);
}

/// What `settle` did after a completed or aborted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Unchanged,
    /// Operator-pending resolved back into the mode it started from.
    Restored,
    /// A delegated command finished and Insert mode resumed.
    ResumedInsert,
}

pub struct ModeController {
    mode: Mode,
    operator_base: Mode,
    delegated: bool,
    observers: Vec<Box<dyn ModeObserver>>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("mode", &self.mode)
            .field("operator_base", &self.operator_base)
            .field("delegated", &self.delegated)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            operator_base: Mode::Normal,
            delegated: false,
            observers: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True while a `<C-o>` command from Insert is in flight.
    pub fn is_delegated(&self) -> bool {
        self.delegated
    }

    pub fn add_observer(&mut self, observer: Box<dyn ModeObserver>) {
        self.observers.push(observer);
    }

    pub fn set(&mut self, to: Mode) {
        let from = self.mode;
        if from == to {
            return;
        }
        self.mode = to;
        debug!(target: "state.mode", ?from, ?to, delegated = self.delegated, "mode_transition");
        for observer in &mut self.observers {
            observer.on_mode_change(from, to);
        }
    }

    /// An operator key arrived; remember where to return.
    pub fn begin_operator(&mut self) {
        if self.mode == Mode::OperatorPending {
            return;
        }
        self.operator_base = self.mode;
        self.set(Mode::OperatorPending);
    }

    /// Insert → one delegated Normal-mode command.
    pub fn delegate_one(&mut self) {
        self.delegated = true;
        self.set(Mode::ReplaceOnce);
    }

    /// Mode a finished Normal-mode command should fall back to: the
    /// delegated state while a `<C-o>` command runs, otherwise Normal.
    pub fn command_home(&self) -> Mode {
        if self.delegated {
            Mode::ReplaceOnce
        } else {
            Mode::Normal
        }
    }

    /// Resolve the mode after a command completed or was aborted.
    pub fn settle(&mut self) -> Settled {
        let mut settled = Settled::Unchanged;
        if self.mode == Mode::OperatorPending {
            let base = self.operator_base;
            self.set(base);
            settled = Settled::Restored;
        }
        match self.mode {
            Mode::Insert => self.delegated = false,
            Mode::Normal | Mode::ReplaceOnce if self.delegated => {
                self.delegated = false;
                self.set(Mode::Insert);
                settled = Settled::ResumedInsert;
            }
            _ => {}
        }
        settled
    }
}

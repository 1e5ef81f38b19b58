//! Snapshot undo history for the rope buffer.
//!
//! A transaction captures one rope snapshot lazily, on its first mutation,
//! so commands that end up changing nothing leave no undo step. Nested
//! transactions fold into the outermost one. Edits outside any transaction
//! each get their own snapshot.

use ropey::Rope;
use std::collections::VecDeque;
use tracing::trace;

/// Default number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

#[derive(Clone)]
struct Snapshot {
    rope: Rope,
    /// Offset of the first change in the group; the caret lands here.
    offset: usize,
    label: String,
}

#[derive(Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    depth: usize,
    label: String,
    captured: bool,
    max: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(UNDO_HISTORY_MAX)
    }
}

impl History {
    pub fn with_limit(max: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            depth: 0,
            label: String::new(),
            captured: false,
            max: max.max(1),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    /// Label of the most recent undo step.
    pub fn last_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.label.as_str())
    }

    pub fn begin(&mut self, label: &str) {
        if self.depth == 0 {
            self.label = label.to_string();
            self.captured = false;
        }
        self.depth += 1;
        trace!(target: "text.history", depth = self.depth, label, "begin_transaction");
    }

    pub fn end(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.captured = false;
        }
        trace!(target: "text.history", depth = self.depth, "end_transaction");
    }

    /// Called before every mutation with the pre-edit rope.
    pub(crate) fn record(&mut self, rope: &Rope, offset: usize) {
        if self.depth > 0 && self.captured {
            return;
        }
        let label = if self.depth > 0 {
            self.label.clone()
        } else {
            "edit".to_string()
        };
        self.undo_stack.push_back(Snapshot {
            rope: rope.clone(),
            offset,
            label,
        });
        self.captured = self.depth > 0;
        if self.undo_stack.len() > self.max {
            self.undo_stack.pop_front();
            trace!(target: "text.history", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
        trace!(target: "text.history", undo_depth = self.undo_stack.len(), offset, "push_snapshot");
    }

    pub(crate) fn undo(&mut self, rope: &mut Rope) -> Option<usize> {
        let last = self.undo_stack.pop_back()?;
        trace!(target: "text.history", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        let offset = last.offset;
        let current = std::mem::replace(rope, last.rope);
        self.redo_stack.push(Snapshot {
            rope: current,
            offset,
            label: last.label,
        });
        self.captured = false;
        Some(offset)
    }

    pub(crate) fn redo(&mut self, rope: &mut Rope) -> Option<usize> {
        let next = self.redo_stack.pop()?;
        trace!(target: "text.history", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        let offset = next.offset;
        let current = std::mem::replace(rope, next.rope);
        self.undo_stack.push_back(Snapshot {
            rope: current,
            offset,
            label: next.label,
        });
        Some(offset)
    }
}

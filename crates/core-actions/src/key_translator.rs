//! KeyTranslator: stateful key -> Action translation (the command accumulator).
//!
//! State machine:
//! * Idle: optional `count` accumulating prefix digits, optional register
//!   picked with `"x`.
//! * Operator pending: operator captured; digits 1-9 start a post-operator
//!   count (a leading `0` is the `LineStart` motion, so `d0` works).
//! * Awaiting argument: the next key is consumed verbatim (`f{char}`,
//!   `r{char}`, `"{reg}`, `g{key}`, `i{obj}` / `a{obj}`).
//!
//! A motion while an operator is pending emits `ApplyOperator` with
//! `count = prefix_count * post_op_count`. Typing the operator again emits
//! `LinewiseOperator`; that check runs before motion lookup. Anything the
//! grammar does not accept is `Invalid` and the pending state is dropped.
//!
//! Insert mode has no pending state: every key maps straight to an edit.

use crate::{
    Action, CommandError, EditKind, InsertEntry, InsertMove, ModeChange, MotionKind, ObjectScope,
    OperatorKind, TextObjectKind,
};
use core_events::{KeyCode, KeyEvent};
use core_state::{Mode, Registers, SelectionKind};
use smallvec::SmallVec;
use std::fmt::Write as _;
use tracing::{debug, trace};

/// Default ceiling for typed counts.
pub const DEFAULT_MAX_COUNT: u32 = 999_999;

/// Commands that consume one literal character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCommand {
    /// `f` `F` `t` `T`
    Find { forward: bool, till: bool },
    /// `r`
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Register,
    Char(CharCommand),
    GPrefix,
    TextObject(ObjectScope),
}

/// Keys typed so far for the command being built.
#[derive(Debug, Clone, Default)]
pub struct PendingCommand {
    /// Count prefix prior to an operator or motion (e.g. `12d` or `12w`).
    pub count: Option<u32>,
    pub register: Option<char>,
    pub operator: Option<OperatorKind>,
    /// Count following an operator but before the motion (e.g. `d3w`).
    pub post_op_count: Option<u32>,
    pub awaiting: Option<ArgumentKind>,
    keys: SmallVec<[KeyEvent; 8]>,
}

impl PendingCommand {
    pub fn is_idle(&self) -> bool {
        self.count.is_none()
            && self.register.is_none()
            && self.operator.is_none()
            && self.post_op_count.is_none()
            && self.awaiting.is_none()
    }

    /// Product of both counts, `None` when neither was typed.
    pub fn total_count(&self, max: u32) -> Option<u32> {
        match (self.count, self.post_op_count) {
            (None, None) => None,
            (prefix, post) => Some(
                prefix
                    .unwrap_or(1)
                    .saturating_mul(post.unwrap_or(1))
                    .min(max),
            ),
        }
    }

    pub fn keys(&self) -> &[KeyEvent] {
        &self.keys
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Incomplete,
    Dispatch(Action),
    Invalid(CommandError),
}

#[derive(Debug)]
pub struct KeyTranslator {
    pending: PendingCommand,
    max_count: u32,
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::with_max_count(DEFAULT_MAX_COUNT)
    }

    pub fn with_max_count(max_count: u32) -> Self {
        Self {
            pending: PendingCommand::default(),
            max_count: max_count.max(1),
        }
    }

    /// Drop every pending key.
    pub fn reset(&mut self) {
        self.pending = PendingCommand::default();
    }

    pub fn pending(&self) -> &PendingCommand {
        &self.pending
    }

    pub fn pending_operator(&self) -> Option<OperatorKind> {
        self.pending.operator
    }

    /// Pending keys in `<C-x>` notation (vi's showcmd area).
    pub fn showcmd(&self) -> String {
        let mut out = String::new();
        for key in &self.pending.keys {
            let _ = write!(out, "{key}");
        }
        out
    }

    pub fn feed(&mut self, mode: Mode, key: &KeyEvent) -> Translation {
        if mode == Mode::Insert {
            let t = insert_map(key);
            trace!(target: "actions.translate", key = %key, translation = ?t, "insert_key");
            return t;
        }
        self.pending.keys.push(*key);
        let t = self.step(mode, key);
        match &t {
            Translation::Incomplete => {
                trace!(target: "actions.translate", ?mode, key = %key, pending = %self.showcmd(), "incomplete");
            }
            Translation::Dispatch(action) => {
                debug!(target: "actions.translate", ?mode, keys = %self.showcmd(), ?action, "dispatch");
                self.reset();
            }
            Translation::Invalid(err) => {
                debug!(target: "actions.translate", ?mode, keys = %self.showcmd(), error = %err, "invalid");
                self.reset();
            }
        }
        t
    }

    fn step(&mut self, mode: Mode, key: &KeyEvent) -> Translation {
        let visual = mode == Mode::Visual;
        if let Some(arg) = self.pending.awaiting.take() {
            return self.argument(arg, visual, key);
        }
        if key.is_esc() {
            if visual {
                return Translation::Dispatch(Action::ModeChange(ModeChange::LeaveVisual));
            }
            // A bare <Esc> in Normal mode is an error in vi; anything else
            // just abandons what was typed.
            if self.pending.is_idle() && mode == Mode::Normal {
                return invalid(key);
            }
            return Translation::Dispatch(Action::Cancel);
        }
        if key.is_ctrl('r') && self.pending.operator.is_none() && !visual {
            return Translation::Dispatch(Action::Redo {
                count: self.count1(),
            });
        }
        if let Some(motion) = named_motion(key) {
            return self.motion(motion);
        }
        let c = match (key.code, key.printable()) {
            (KeyCode::Delete, _) => 'x',
            (_, Some(c)) => c,
            _ => return invalid(key),
        };

        if c.is_ascii_digit() && (c != '0' || self.counting()) {
            let digit = (c as u8 - b'0') as u32;
            let max = self.max_count;
            let slot = if self.pending.operator.is_some() {
                &mut self.pending.post_op_count
            } else {
                &mut self.pending.count
            };
            *slot = Some(
                slot.unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(digit)
                    .min(max),
            );
            return Translation::Incomplete;
        }
        if c == '"' && self.pending.operator.is_none() {
            self.pending.awaiting = Some(ArgumentKind::Register);
            return Translation::Incomplete;
        }
        if let Some(op) = self.pending.operator
            && doubled_char(op) == c
        {
            return self.operator_key(op, visual, key);
        }
        if let Some(op) = operator_for(c) {
            return self.operator_key(op, visual, key);
        }
        if c == 'g' {
            self.pending.awaiting = Some(ArgumentKind::GPrefix);
            return Translation::Incomplete;
        }
        if (self.pending.operator.is_some() || visual) && matches!(c, 'i' | 'a') {
            let scope = if c == 'i' {
                ObjectScope::Inner
            } else {
                ObjectScope::Around
            };
            self.pending.awaiting = Some(ArgumentKind::TextObject(scope));
            return Translation::Incomplete;
        }
        if let Some(cmd) = char_command(c, self.pending.operator.is_none() && !visual) {
            self.pending.awaiting = Some(ArgumentKind::Char(cmd));
            return Translation::Incomplete;
        }
        if let Some(motion) = motion_for(c) {
            return self.motion(motion);
        }
        if self.pending.operator.is_some() {
            return invalid(key);
        }
        if visual {
            self.visual_command(c, key)
        } else {
            self.normal_command(c, key)
        }
    }

    fn counting(&self) -> bool {
        if self.pending.operator.is_some() {
            self.pending.post_op_count.is_some()
        } else {
            self.pending.count.is_some()
        }
    }

    fn count1(&self) -> u32 {
        self.pending.total_count(self.max_count).unwrap_or(1).max(1)
    }

    fn operator_key(&mut self, op: OperatorKind, visual: bool, key: &KeyEvent) -> Translation {
        if visual {
            return Translation::Dispatch(Action::VisualOperator {
                op,
                register: self.pending.register,
            });
        }
        match self.pending.operator {
            None => {
                self.pending.operator = Some(op);
                Translation::Incomplete
            }
            Some(pending) if pending == op => Translation::Dispatch(Action::LinewiseOperator {
                op,
                count: self.count1(),
                register: self.pending.register,
            }),
            Some(_) => invalid(key),
        }
    }

    fn motion(&mut self, motion: MotionKind) -> Translation {
        let count = self.pending.total_count(self.max_count);
        if let Some(op) = self.pending.operator {
            return Translation::Dispatch(Action::ApplyOperator {
                op,
                motion,
                count,
                register: self.pending.register,
            });
        }
        Translation::Dispatch(match count {
            Some(count) => Action::MotionWithCount { motion, count },
            None => Action::Motion(motion),
        })
    }

    fn argument(&mut self, arg: ArgumentKind, visual: bool, key: &KeyEvent) -> Translation {
        match arg {
            ArgumentKind::Register => match key.printable() {
                Some(c) if Registers::is_valid_name(c) => {
                    self.pending.register = Some(c);
                    Translation::Incomplete
                }
                _ => invalid(key),
            },
            ArgumentKind::Char(cmd) => {
                let Some(ch) = argument_char(key) else {
                    return invalid(key);
                };
                match cmd {
                    CharCommand::Find { forward, till } => {
                        let motion = match (forward, till) {
                            (true, false) => MotionKind::FindForward(ch),
                            (false, false) => MotionKind::FindBackward(ch),
                            (true, true) => MotionKind::TillForward(ch),
                            (false, true) => MotionKind::TillBackward(ch),
                        };
                        self.motion(motion)
                    }
                    CharCommand::Replace => Translation::Dispatch(Action::ReplaceChar {
                        ch,
                        count: self.count1(),
                    }),
                }
            }
            ArgumentKind::GPrefix => match key.printable() {
                Some('g') => self.motion(MotionKind::FileStart),
                Some('i') if self.pending.operator.is_none() && !visual => {
                    Translation::Dispatch(Action::ModeChange(ModeChange::EnterInsert {
                        entry: InsertEntry::LastInsert,
                        count: self.count1(),
                    }))
                }
                Some('~') => self.operator_key(OperatorKind::ToggleCase, visual, key),
                Some('u') => self.operator_key(OperatorKind::Lowercase, visual, key),
                Some('U') => self.operator_key(OperatorKind::Uppercase, visual, key),
                _ => invalid(key),
            },
            ArgumentKind::TextObject(scope) => {
                let Some(object) = key.printable().and_then(TextObjectKind::from_key) else {
                    return invalid(key);
                };
                let count = self.count1();
                if visual {
                    return Translation::Dispatch(Action::VisualObject {
                        object,
                        scope,
                        count,
                    });
                }
                match self.pending.operator {
                    Some(op) => Translation::Dispatch(Action::ApplyOperatorObject {
                        op,
                        object,
                        scope,
                        count,
                        register: self.pending.register,
                    }),
                    None => invalid(key),
                }
            }
        }
    }

    fn visual_command(&mut self, c: char, key: &KeyEvent) -> Translation {
        let op = |op| Action::VisualOperator {
            op,
            register: self.pending.register,
        };
        let action = match c {
            'o' => Action::VisualSwapEnds,
            'x' => op(OperatorKind::Delete),
            's' => op(OperatorKind::Change),
            'u' => op(OperatorKind::Lowercase),
            'U' => op(OperatorKind::Uppercase),
            '~' => op(OperatorKind::ToggleCase),
            'v' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Characterwise)),
            'V' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Linewise)),
            _ => return invalid(key),
        };
        Translation::Dispatch(action)
    }

    fn normal_command(&mut self, c: char, key: &KeyEvent) -> Translation {
        let count = self.count1();
        let total = self.pending.total_count(self.max_count);
        let register = self.pending.register;
        let insert = |entry| Action::ModeChange(ModeChange::EnterInsert { entry, count });
        let shorthand = |op, motion| Action::ApplyOperator {
            op,
            motion,
            count: total,
            register,
        };
        let action = match c {
            'i' => insert(InsertEntry::Before),
            'a' => insert(InsertEntry::After),
            'I' => insert(InsertEntry::FirstNonBlank),
            'A' => insert(InsertEntry::LineEnd),
            'o' => insert(InsertEntry::OpenBelow),
            'O' => insert(InsertEntry::OpenAbove),
            'x' => shorthand(OperatorKind::Delete, MotionKind::Right),
            'X' => shorthand(OperatorKind::Delete, MotionKind::Left),
            'D' => shorthand(OperatorKind::Delete, MotionKind::LineEnd),
            'C' => shorthand(OperatorKind::Change, MotionKind::LineEnd),
            's' => shorthand(OperatorKind::Change, MotionKind::Right),
            'S' => Action::LinewiseOperator {
                op: OperatorKind::Change,
                count,
                register,
            },
            'Y' => Action::LinewiseOperator {
                op: OperatorKind::Yank,
                count,
                register,
            },
            '~' => Action::ToggleCaseChars { count },
            'p' => Action::PasteAfter { register, count },
            'P' => Action::PasteBefore { register, count },
            'J' => Action::JoinLines { count },
            'u' => Action::Undo { count },
            'v' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Characterwise)),
            'V' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Linewise)),
            _ => return invalid(key),
        };
        Translation::Dispatch(action)
    }
}

fn invalid(key: &KeyEvent) -> Translation {
    Translation::Invalid(CommandError::ParseAbort { key: *key })
}

fn operator_for(c: char) -> Option<OperatorKind> {
    match c {
        'd' => Some(OperatorKind::Delete),
        'c' => Some(OperatorKind::Change),
        'y' => Some(OperatorKind::Yank),
        '>' => Some(OperatorKind::ShiftRight),
        '<' => Some(OperatorKind::ShiftLeft),
        _ => None,
    }
}

/// Key that repeats a pending operator into its linewise form.
fn doubled_char(op: OperatorKind) -> char {
    match op {
        OperatorKind::Delete => 'd',
        OperatorKind::Change => 'c',
        OperatorKind::Yank => 'y',
        OperatorKind::ShiftRight => '>',
        OperatorKind::ShiftLeft => '<',
        OperatorKind::ToggleCase => '~',
        OperatorKind::Lowercase => 'u',
        OperatorKind::Uppercase => 'U',
    }
}

fn char_command(c: char, replace_allowed: bool) -> Option<CharCommand> {
    match c {
        'f' => Some(CharCommand::Find {
            forward: true,
            till: false,
        }),
        'F' => Some(CharCommand::Find {
            forward: false,
            till: false,
        }),
        't' => Some(CharCommand::Find {
            forward: true,
            till: true,
        }),
        'T' => Some(CharCommand::Find {
            forward: false,
            till: true,
        }),
        'r' if replace_allowed => Some(CharCommand::Replace),
        _ => None,
    }
}

fn motion_for(c: char) -> Option<MotionKind> {
    Some(match c {
        'h' => MotionKind::Left,
        'l' | ' ' => MotionKind::Right,
        'j' => MotionKind::Down,
        'k' => MotionKind::Up,
        '0' => MotionKind::LineStart,
        '^' => MotionKind::FirstNonBlank,
        '$' => MotionKind::LineEnd,
        'w' => MotionKind::WordForward,
        'W' => MotionKind::BigWordForward,
        'b' => MotionKind::WordBackward,
        'B' => MotionKind::BigWordBackward,
        'e' => MotionKind::WordEnd,
        'E' => MotionKind::BigWordEnd,
        ';' => MotionKind::RepeatFind,
        ',' => MotionKind::RepeatFindReverse,
        'G' => MotionKind::FileEnd,
        _ => return None,
    })
}

fn named_motion(key: &KeyEvent) -> Option<MotionKind> {
    if !key.mods.is_empty() {
        return None;
    }
    Some(match key.code {
        KeyCode::Left => MotionKind::Left,
        KeyCode::Right => MotionKind::Right,
        KeyCode::Up => MotionKind::Up,
        KeyCode::Down => MotionKind::Down,
        KeyCode::Home => MotionKind::LineStart,
        KeyCode::End => MotionKind::LineEnd,
        _ => return None,
    })
}

/// Literal argument for `f`/`t`/`r`: printable keys, `<Tab>` and `<CR>`.
fn argument_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Tab => Some('\t'),
        KeyCode::Enter => Some('\n'),
        _ => key.printable(),
    }
}

fn insert_map(key: &KeyEvent) -> Translation {
    let edit = |kind| Translation::Dispatch(Action::Edit(kind));
    if key.is_esc() {
        return Translation::Dispatch(Action::ModeChange(ModeChange::LeaveInsert));
    }
    if key.is_ctrl('o') {
        return Translation::Dispatch(Action::ModeChange(ModeChange::DelegateOne));
    }
    if key.is_ctrl('w') {
        return edit(EditKind::DeleteWordBack);
    }
    if key.is_ctrl('u') {
        return edit(EditKind::DeleteToInsertStart);
    }
    if key.is_ctrl('h') {
        return edit(EditKind::Backspace);
    }
    if key.is_ctrl('j') || key.is_ctrl('m') {
        return edit(EditKind::InsertNewline);
    }
    if key.is_ctrl('i') {
        return edit(EditKind::InsertTab);
    }
    match key.code {
        KeyCode::Enter => edit(EditKind::InsertNewline),
        KeyCode::Backspace => edit(EditKind::Backspace),
        KeyCode::Tab => edit(EditKind::InsertTab),
        KeyCode::Delete => edit(EditKind::DeleteUnder),
        KeyCode::Left => edit(EditKind::Move(InsertMove::Left)),
        KeyCode::Right => edit(EditKind::Move(InsertMove::Right)),
        KeyCode::Up => edit(EditKind::Move(InsertMove::Up)),
        KeyCode::Down => edit(EditKind::Move(InsertMove::Down)),
        KeyCode::Home => edit(EditKind::Move(InsertMove::Home)),
        KeyCode::End => edit(EditKind::Move(InsertMove::End)),
        _ => match key.printable() {
            Some(c) if !c.is_control() => edit(EditKind::InsertChar(c)),
            _ => invalid(key),
        },
    }
}

//! Registers & operator metrics.
//!
//! Write rules:
//! - Yanks land in `"0` (or the named target) and the unnamed register.
//! - Deletes and changes that span a line break or are linewise shift the
//!   `"1`..`"9` ring; smaller deletes go to `"-` unless a named target was
//!   given. The unnamed register always mirrors the last write.
//! - `a`..`z` replace, `A`..`Z` append. `_` discards everything.

use std::collections::VecDeque;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterShape {
    Characterwise,
    Linewise,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterContent {
    pub text: String,
    pub shape: RegisterShape,
}

impl RegisterContent {
    pub fn new(text: impl Into<String>, shape: RegisterShape) -> Self {
        Self {
            text: text.into(),
            shape,
        }
    }
    pub fn charwise(text: impl Into<String>) -> Self {
        Self::new(text, RegisterShape::Characterwise)
    }
    /// Linewise content always carries its trailing newline.
    pub fn linewise(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self::new(text, RegisterShape::Linewise)
    }
    pub fn is_linewise(&self) -> bool {
        self.shape == RegisterShape::Linewise
    }

    fn append(&mut self, other: RegisterContent) {
        match (self.shape, other.shape) {
            (RegisterShape::Linewise, _) => {
                self.text.push_str(&other.text);
                if !self.text.ends_with('\n') {
                    self.text.push('\n');
                }
            }
            (_, RegisterShape::Linewise) => {
                self.text.push('\n');
                self.text.push_str(&other.text);
                self.shape = RegisterShape::Linewise;
            }
            _ => self.text.push_str(&other.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasteError {
    #[error("register {0:?} is empty")]
    Empty(char),
    #[error("{0:?} is not a register")]
    InvalidRegister(char),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OperatorMetricsSnapshot {
    pub operator_delete: u64,
    pub operator_yank: u64,
    pub operator_change: u64,
    pub operator_case: u64,
    pub operator_shift: u64,
    pub register_writes: u64,
    pub numbered_ring_rotations: u64,
    pub bells: u64,
}

#[derive(Debug, Default, Clone)]
pub struct OperatorMetrics {
    operator_delete: u64,
    operator_yank: u64,
    operator_change: u64,
    operator_case: u64,
    operator_shift: u64,
    register_writes: u64,
    numbered_ring_rotations: u64,
    bells: u64,
}

impl OperatorMetrics {
    pub fn snapshot(&self) -> OperatorMetricsSnapshot {
        OperatorMetricsSnapshot {
            operator_delete: self.operator_delete,
            operator_yank: self.operator_yank,
            operator_change: self.operator_change,
            operator_case: self.operator_case,
            operator_shift: self.operator_shift,
            register_writes: self.register_writes,
            numbered_ring_rotations: self.numbered_ring_rotations,
            bells: self.bells,
        }
    }
    pub fn incr_delete(&mut self) {
        self.operator_delete += 1;
    }
    pub fn incr_yank(&mut self) {
        self.operator_yank += 1;
    }
    pub fn incr_change(&mut self) {
        self.operator_change += 1;
    }
    pub fn incr_case(&mut self) {
        self.operator_case += 1;
    }
    pub fn incr_shift(&mut self) {
        self.operator_shift += 1;
    }
    pub fn incr_bell(&mut self) {
        self.bells += 1;
    }
    pub fn note_register_write(&mut self, rotated: bool) {
        self.register_writes += 1;
        if rotated {
            self.numbered_ring_rotations += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registers {
    unnamed: Option<RegisterContent>,
    yank: Option<RegisterContent>,
    /// `"1` at the front.
    ring: VecDeque<RegisterContent>,
    small_delete: Option<RegisterContent>,
    named: [Option<RegisterContent>; 26],
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Capacity of the `"1`..`"9` ring.
    pub const RING: usize = 9;

    pub fn new() -> Self {
        Self {
            unnamed: None,
            yank: None,
            ring: VecDeque::with_capacity(Self::RING),
            small_delete: None,
            named: std::array::from_fn(|_| None),
        }
    }

    pub fn is_valid_name(c: char) -> bool {
        matches!(c, '"' | '-' | '_' | '0'..='9' | 'a'..='z' | 'A'..='Z')
    }

    fn named_index(c: char) -> Option<usize> {
        if c.is_ascii_alphabetic() {
            Some((c.to_ascii_lowercase() as u8 - b'a') as usize)
        } else {
            None
        }
    }

    /// Read a register. Uppercase names read the same slot as lowercase.
    pub fn get(&self, name: char) -> Option<&RegisterContent> {
        match name {
            '"' => self.unnamed.as_ref(),
            '0' => self.yank.as_ref(),
            '1'..='9' => self.ring.get(name as usize - '1' as usize),
            '-' => self.small_delete.as_ref(),
            _ => Self::named_index(name).and_then(|i| self.named[i].as_ref()),
        }
    }

    /// Store content directly into one slot (uppercase appends). The unnamed
    /// register is left alone unless it is the target.
    pub fn set(&mut self, name: char, content: RegisterContent) {
        match name {
            '"' => self.unnamed = Some(content),
            '0' => self.yank = Some(content),
            '1'..='9' => {
                let idx = name as usize - '1' as usize;
                while self.ring.len() <= idx {
                    self.ring.push_back(RegisterContent::charwise(""));
                }
                self.ring[idx] = content;
            }
            '-' => self.small_delete = Some(content),
            _ => {
                self.write_named(name, content);
            }
        }
    }

    pub fn unnamed(&self) -> Option<&RegisterContent> {
        self.unnamed.as_ref()
    }

    /// Numbered ring, `"1` first.
    pub fn numbered(&self) -> impl Iterator<Item = &RegisterContent> {
        self.ring.iter()
    }

    /// Non-empty registers in display order.
    pub fn snapshot(&self) -> Vec<(char, &RegisterContent)> {
        let mut out = Vec::new();
        if let Some(c) = &self.unnamed {
            out.push(('"', c));
        }
        if let Some(c) = &self.yank {
            out.push(('0', c));
        }
        for (i, c) in self.ring.iter().enumerate() {
            out.push(((b'1' + i as u8) as char, c));
        }
        if let Some(c) = &self.small_delete {
            out.push(('-', c));
        }
        for (i, c) in self.named.iter().enumerate() {
            if let Some(c) = c {
                out.push(((b'a' + i as u8) as char, c));
            }
        }
        out
    }

    fn write_named(&mut self, name: char, content: RegisterContent) -> Option<RegisterContent> {
        let idx = Self::named_index(name)?;
        let append = name.is_ascii_uppercase();
        match &mut self.named[idx] {
            Some(existing) if append => existing.append(content),
            slot => *slot = Some(content),
        }
        self.named[idx].clone()
    }

    fn shift_ring(&mut self, content: RegisterContent) -> bool {
        let rotated = self.ring.len() == Self::RING;
        if rotated {
            self.ring.pop_back();
        }
        self.ring.push_front(content);
        rotated
    }

    pub fn record_yank(
        &mut self,
        target: Option<char>,
        content: RegisterContent,
        metrics: &mut OperatorMetrics,
    ) {
        match target {
            Some('_') => return,
            Some(name) if name.is_ascii_alphabetic() => {
                self.unnamed = self.write_named(name, content);
            }
            _ => {
                self.yank = Some(content.clone());
                self.unnamed = Some(content);
            }
        }
        metrics.note_register_write(false);
        debug!(target: "state.registers", register = ?target, "yank_recorded");
    }

    pub fn record_delete(
        &mut self,
        target: Option<char>,
        content: RegisterContent,
        metrics: &mut OperatorMetrics,
    ) {
        if target == Some('_') {
            return;
        }
        let multiline = content.is_linewise() || content.text.contains('\n');
        let named = target.filter(|c| c.is_ascii_alphabetic());
        let mut rotated = false;
        let mut last = None;
        if let Some(name) = named {
            last = self.write_named(name, content.clone());
        }
        if multiline {
            rotated = self.shift_ring(content.clone());
            if last.is_none() {
                last = Some(content);
            }
        } else if named.is_none() {
            self.small_delete = Some(content.clone());
            last = Some(content);
        }
        self.unnamed = last;
        metrics.note_register_write(rotated);
        debug!(target: "state.registers", register = ?target, multiline, rotated, "delete_recorded");
    }
}

/// Facade encapsulating register mutations and metrics updates so operators
/// never reach into register slots directly.
pub struct RegistersFacade<'state> {
    registers: &'state mut Registers,
    metrics: &'state mut OperatorMetrics,
}

impl<'state> RegistersFacade<'state> {
    pub fn new(registers: &'state mut Registers, metrics: &'state mut OperatorMetrics) -> Self {
        Self { registers, metrics }
    }

    pub fn write_delete(&mut self, content: RegisterContent, target: Option<char>) {
        self.metrics.incr_delete();
        self.registers.record_delete(target, content, self.metrics);
    }

    pub fn write_yank(&mut self, content: RegisterContent, target: Option<char>) {
        self.metrics.incr_yank();
        self.registers.record_yank(target, content, self.metrics);
    }

    /// Change writes registers exactly like delete, with its own metric.
    pub fn write_change(&mut self, content: RegisterContent, target: Option<char>) {
        self.metrics.incr_change();
        self.registers.record_delete(target, content, self.metrics);
    }

    /// Content to paste from `target` (unnamed when `None`).
    pub fn read_paste(&self, target: Option<char>) -> Result<RegisterContent, PasteError> {
        let name = target.unwrap_or('"');
        if !Registers::is_valid_name(name) {
            return Err(PasteError::InvalidRegister(name));
        }
        self.registers
            .get(name)
            .filter(|c| !c.text.is_empty())
            .cloned()
            .ok_or(PasteError::Empty(name))
    }
}

//! Key event types consumed by the command engine.
//!
//! A key is a closed value: a logical code plus a modifier mask. Equality is
//! structural so pending-state comparisons (doubled operators, awaited
//! arguments) never depend on identity or platform key codes.

use std::fmt;

pub mod notation;

pub use notation::{KeyParseError, parse_keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified printable key.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// `CTRL` chord over a printable key (`<C-o>`, `<C-w>`).
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub const fn named(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Printable character carried by this key when no control/alt modifier
    /// is held. SHIFT is ignored; the character already reflects it.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// True for `<C-c>` style chords on the given character.
    pub fn is_ctrl(&self, c: char) -> bool {
        self.code == KeyCode::Char(c) && self.mods.contains(KeyModifiers::CTRL)
    }

    pub fn is_esc(&self) -> bool {
        self.code == KeyCode::Esc || self.is_ctrl('[')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Normalized logical key codes. Printable input always arrives as `Char`.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        notation::write_key(f, self)
    }
}

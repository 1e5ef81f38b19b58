//! Text storage and the buffer capability the command engine drives.
//!
//! Columns are counted in `char`s. A line's end-of-line cell (`col ==
//! line_len`) is addressable so Insert mode and host-placed carets can sit
//! after the last character.

use anyhow::Result;
use ropey::Rope;
use std::ops::Range;

pub mod buffer;
pub mod history;
pub mod motion;

pub use buffer::TextBuffer;
pub use history::History;

/// A position inside a buffer expressed as (line index, char column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
    pub fn origin() -> Self {
        Self { line: 0, col: 0 }
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.col = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.col > max_len {
            self.col = max_len;
        }
    }
}

/// Character classification used by word motions and word objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Space,
    Punct,
    Word,
}

impl CharClass {
    /// Default classification: whitespace, keyword characters
    /// (alphanumeric or `_`), everything else punctuation.
    pub fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Space
        } else if c == '_' || c.is_alphanumeric() {
            CharClass::Word
        } else {
            CharClass::Punct
        }
    }
}

/// A text buffer backed by a `ropey::Rope`.
///
/// Logical lines follow vi conventions: a trailing `\n` terminates the last
/// line instead of opening an empty one, so `"hello\n"` has one line.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
    extra_word_chars: Vec<char>,
    history: History,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
            extra_word_chars: Vec::new(),
            history: History::default(),
        })
    }

    /// Treat these characters as keyword characters in addition to the
    /// alphanumerics and `_`.
    pub fn with_word_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.extra_word_chars = chars.into_iter().collect();
        self
    }

    pub fn with_history_limit(mut self, max: usize) -> Self {
        self.history = History::with_limit(max);
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whole buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Return the requested raw line (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < TextBuffer::line_count(self) {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    fn clamp_range(&self, range: Range<usize>) -> Range<usize> {
        let total = self.rope.len_chars();
        let end = range.end.min(total);
        range.start.min(end)..end
    }
}

impl TextBuffer for Buffer {
    fn line_count(&self) -> usize {
        let raw = self.rope.len_lines();
        let total = self.rope.len_chars();
        if total > 0 && self.rope.char(total - 1) == '\n' {
            raw - 1
        } else {
            raw
        }
    }

    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let last = TextBuffer::line_count(self).saturating_sub(1);
        let line = line.min(last);
        let start = self.rope.line_to_char(line);
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        (start, start + len)
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn read(&self, range: Range<usize>) -> String {
        let range = self.clamp_range(range);
        self.rope.slice(range).to_string()
    }

    fn replace(&mut self, range: Range<usize>, text: &str) {
        let range = self.clamp_range(range);
        if range.is_empty() && text.is_empty() {
            return;
        }
        self.history.record(&self.rope, range.start);
        if !range.is_empty() {
            self.rope.remove(range.clone());
        }
        if !text.is_empty() {
            self.rope.insert(range.start, text);
        }
    }

    fn classify(&self, c: char) -> CharClass {
        if self.extra_word_chars.contains(&c) {
            CharClass::Word
        } else {
            CharClass::of(c)
        }
    }

    fn begin_transaction(&mut self, label: &str) {
        self.history.begin(label);
    }

    fn end_transaction(&mut self) {
        self.history.end();
    }

    fn undo(&mut self) -> Option<usize> {
        self.history.undo(&mut self.rope)
    }

    fn redo(&mut self) -> Option<usize> {
        self.history.redo(&mut self.rope)
    }

    fn char_at(&self, pos: Position) -> Option<char> {
        let (start, end) = self.line_bounds(pos.line);
        let offset = start + pos.col;
        if pos.line < self.line_count() && offset < end {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    fn position_of(&self, offset: usize) -> Position {
        let total = self.rope.len_chars();
        let last = self.line_count().saturating_sub(1);
        let line = self.rope.char_to_line(offset.min(total)).min(last);
        let (start, end) = self.line_bounds(line);
        Position::new(line, offset.clamp(start, end) - start)
    }
}

//! The buffer capability the command engine is written against.
//!
//! Hosts implement the required methods; offsets are absolute `char`
//! indexes and line bounds exclude the line terminator. Every mutation of a
//! completed command is bracketed by `begin_transaction`/`end_transaction`
//! so the host can group it as one undoable edit.

use std::ops::Range;

use crate::{CharClass, Position};

pub trait TextBuffer {
    /// Number of logical lines; at least 1 even for an empty buffer.
    fn line_count(&self) -> usize;

    /// `(start, end)` char offsets of `line`, terminator excluded. Lines past
    /// the end clamp to the last line.
    fn line_bounds(&self, line: usize) -> (usize, usize);

    fn len_chars(&self) -> usize;

    fn read(&self, range: Range<usize>) -> String;

    fn replace(&mut self, range: Range<usize>, text: &str);

    fn classify(&self, c: char) -> CharClass {
        CharClass::of(c)
    }

    fn begin_transaction(&mut self, _label: &str) {}

    fn end_transaction(&mut self) {}

    /// Revert the most recent transaction, returning the offset the caret
    /// should move to. Hosts without history return `None`.
    fn undo(&mut self) -> Option<usize> {
        None
    }

    fn redo(&mut self) -> Option<usize> {
        None
    }

    fn line_len(&self, line: usize) -> usize {
        let (start, end) = self.line_bounds(line);
        end - start
    }

    fn line_text(&self, line: usize) -> String {
        let (start, end) = self.line_bounds(line);
        self.read(start..end)
    }

    /// Character under `pos`, `None` on the end-of-line cell.
    fn char_at(&self, pos: Position) -> Option<char> {
        if pos.line >= self.line_count() {
            return None;
        }
        let (start, end) = self.line_bounds(pos.line);
        let offset = start + pos.col;
        if offset < end {
            self.read(offset..offset + 1).chars().next()
        } else {
            None
        }
    }

    /// Absolute offset of `pos`, clamping line and column.
    fn offset_of(&self, pos: Position) -> usize {
        let (start, end) = self.line_bounds(pos.line);
        (start + pos.col).min(end)
    }

    fn position_of(&self, offset: usize) -> Position {
        let mut lo = 0usize;
        let mut hi = self.line_count().saturating_sub(1);
        while lo < hi {
            let mid = (lo + hi).div_ceil(2);
            if self.line_bounds(mid).0 <= offset {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let (start, end) = self.line_bounds(lo);
        Position::new(lo, offset.clamp(start, end) - start)
    }

    /// Offset just past the terminator of `line`, or the buffer end for the
    /// final line.
    fn line_end_inclusive(&self, line: usize) -> usize {
        if line + 1 < self.line_count() {
            self.line_bounds(line + 1).0
        } else {
            self.len_chars()
        }
    }
}

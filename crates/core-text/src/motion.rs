//! Cursor motion primitives.
//!
//! These operate purely on a `TextBuffer` + `Position` pair and are free of
//! editor state. Word motions walk the buffer one cell at a time the way vi
//! does, treating each line's end-of-line cell as a blank. Failing motions
//! leave `pos` wherever the walk stopped; callers decide whether that partial
//! movement counts.

use crate::{CharClass, Position, TextBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MotionError {
    #[error("motion hit the edge of the buffer")]
    BufferEdge,
    #[error("character {0:?} not found on the line")]
    CharNotFound(char),
}

pub type MotionResult = Result<(), MotionError>;

/// Outcome of a single-cell step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved within the line onto a character.
    Moved,
    /// Moved forward onto the end-of-line cell.
    ReachedEol,
    /// Wrapped to column 0 of the next line.
    NextLine,
    /// Wrapped to the end-of-line cell of the previous line.
    PrevLine,
    /// Could not move: start or end of buffer.
    Stuck,
}

impl Step {
    /// True when the step left the characters of the current line.
    pub fn crossed(self) -> bool {
        matches!(self, Step::ReachedEol | Step::NextLine)
    }
}

/// Advance one cell, wrapping from the end-of-line cell to the next line.
pub fn inc<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) -> Step {
    let len = buf.line_len(pos.line);
    if pos.col < len {
        pos.col += 1;
        return if pos.col < len {
            Step::Moved
        } else {
            Step::ReachedEol
        };
    }
    if pos.line + 1 < buf.line_count() {
        pos.line += 1;
        pos.col = 0;
        return Step::NextLine;
    }
    pos.col = len;
    Step::Stuck
}

/// Retreat one cell, wrapping to the previous line's end-of-line cell.
pub fn dec<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) -> Step {
    pos.col = pos.col.min(buf.line_len(pos.line));
    if pos.col > 0 {
        pos.col -= 1;
        return Step::Moved;
    }
    if pos.line > 0 {
        pos.line -= 1;
        pos.col = buf.line_len(pos.line);
        return Step::PrevLine;
    }
    Step::Stuck
}

/// Class of the cell under `pos`; the end-of-line cell is blank. With `big`
/// every non-blank collapses into one class.
pub fn class_at<B: TextBuffer + ?Sized>(buf: &B, pos: Position, big: bool) -> CharClass {
    match buf.char_at(pos) {
        None => CharClass::Space,
        Some(c) => match buf.classify(c) {
            CharClass::Space => CharClass::Space,
            _ if big => CharClass::Word,
            class => class,
        },
    }
}

fn on_empty_line<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> bool {
    pos.col == 0 && buf.line_len(pos.line) == 0
}

fn skip_class_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    class: CharClass,
    big: bool,
) -> MotionResult {
    while class_at(buf, *pos, big) == class {
        if inc(buf, pos) == Step::Stuck {
            return Err(MotionError::BufferEdge);
        }
    }
    Ok(())
}

/// `w` / `W`. With `stop_at_eol` (operator pending) the final repetition
/// stops as soon as it leaves the current line's characters, so an operator
/// never swallows the line break.
pub fn word_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    count: usize,
    big: bool,
    stop_at_eol: bool,
) -> MotionResult {
    for remaining in (0..count.max(1)).rev() {
        let last = remaining == 0;
        let start_class = class_at(buf, *pos, big);
        let on_last_line = pos.line + 1 == buf.line_count();
        let step = inc(buf, pos);
        if step == Step::Stuck || (step.crossed() && on_last_line) {
            return Err(MotionError::BufferEdge);
        }
        if step.crossed() && stop_at_eol && last {
            return Ok(());
        }
        if start_class != CharClass::Space {
            while class_at(buf, *pos, big) == start_class {
                let step = inc(buf, pos);
                if step == Step::Stuck || (step.crossed() && stop_at_eol && last) {
                    return Ok(());
                }
            }
        }
        while class_at(buf, *pos, big) == CharClass::Space {
            if on_empty_line(buf, *pos) {
                break;
            }
            let step = inc(buf, pos);
            if step == Step::Stuck || (step.crossed() && stop_at_eol && last) {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// `e` / `E`, and `cw` on a non-blank. With `stay` the first repetition
/// does not move when the caret already sits on the last character of a
/// word. With `stop_at_empty` blank lines count as words.
pub fn word_end<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    count: usize,
    big: bool,
    stay: bool,
    stop_at_empty: bool,
) -> MotionResult {
    let mut stay = stay;
    for _ in 0..count.max(1) {
        let start_class = class_at(buf, *pos, big);
        if inc(buf, pos) == Step::Stuck {
            return Err(MotionError::BufferEdge);
        }
        let here = class_at(buf, *pos, big);
        if here == start_class && start_class != CharClass::Space {
            skip_class_forward(buf, pos, start_class, big)?;
        } else if !stay || start_class == CharClass::Space {
            let mut landed_on_empty = false;
            while class_at(buf, *pos, big) == CharClass::Space {
                if stop_at_empty && on_empty_line(buf, *pos) {
                    landed_on_empty = true;
                    break;
                }
                if inc(buf, pos) == Step::Stuck {
                    return Err(MotionError::BufferEdge);
                }
            }
            if landed_on_empty {
                stay = false;
                continue;
            }
            let class = class_at(buf, *pos, big);
            skip_class_forward(buf, pos, class, big)?;
        }
        dec(buf, pos);
        stay = false;
    }
    Ok(())
}

/// `b` / `B`.
pub fn word_backward<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    count: usize,
    big: bool,
) -> MotionResult {
    'outer: for _ in 0..count.max(1) {
        if dec(buf, pos) == Step::Stuck {
            return Err(MotionError::BufferEdge);
        }
        while class_at(buf, *pos, big) == CharClass::Space {
            if on_empty_line(buf, *pos) {
                continue 'outer;
            }
            if dec(buf, pos) == Step::Stuck {
                return Ok(());
            }
        }
        let class = class_at(buf, *pos, big);
        while class_at(buf, *pos, big) == class {
            if dec(buf, pos) == Step::Stuck {
                return Ok(());
            }
        }
        inc(buf, pos);
    }
    Ok(())
}

/// Column of the first non-blank character of `line`, or the end-of-line
/// cell when the line is blank.
pub fn first_non_blank<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    buf.line_text(line)
        .chars()
        .position(|c| buf.classify(c) != CharClass::Space)
        .unwrap_or_else(|| buf.line_len(line))
}

/// Last character column of `line` (0 for an empty line).
pub fn last_char_col<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    buf.line_len(line).saturating_sub(1)
}

/// Clamp a Normal-mode caret onto a real character cell.
pub fn normalize_normal_mode_position<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    pos.clamp_to(buf.line_count(), |l| buf.line_len(l));
    let len = buf.line_len(pos.line);
    if len > 0 && pos.col >= len {
        pos.col = len - 1;
    }
}

/// Character search on the caret's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindSpec {
    pub target: char,
    pub forward: bool,
    /// `t`/`T`: land one cell short of the match.
    pub till: bool,
}

/// Column reached by `f`/`F`/`t`/`T` for the `count`th occurrence. With
/// `repeat` a till search ignores an occurrence directly next to the caret.
pub fn find_in_line<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    spec: FindSpec,
    count: usize,
    repeat: bool,
) -> Result<usize, MotionError> {
    let chars: Vec<char> = buf.line_text(pos.line).chars().collect();
    let len = chars.len();
    let mut col = pos.col.min(len);
    let mut accept_first = !(repeat && spec.till && count == 1);
    for _ in 0..count.max(1) {
        loop {
            if spec.forward {
                col += 1;
                if col >= len {
                    return Err(MotionError::CharNotFound(spec.target));
                }
            } else {
                if col == 0 {
                    return Err(MotionError::CharNotFound(spec.target));
                }
                col -= 1;
            }
            let hit = chars[col] == spec.target && accept_first;
            accept_first = true;
            if hit {
                break;
            }
        }
    }
    if spec.till {
        col = if spec.forward { col - 1 } else { col + 1 };
    }
    Ok(col)
}

/// Move `count` lines up or down keeping the wanted column. Moving as far
/// as possible is fine; failing to move at all is an error.
pub fn vertical<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    count: usize,
    down: bool,
    want_col: usize,
) -> MotionResult {
    let last = buf.line_count().saturating_sub(1);
    let count = count.max(1);
    let line = if down {
        if pos.line >= last {
            return Err(MotionError::BufferEdge);
        }
        pos.line.saturating_add(count).min(last)
    } else {
        if pos.line == 0 {
            return Err(MotionError::BufferEdge);
        }
        pos.line.saturating_sub(count)
    };
    pos.line = line;
    pos.col = want_col.min(buf.line_len(line));
    Ok(())
}

//! Motion resolution: (buffer, caret, motion, count) -> target position.
//!
//! `resolve_motion` is pure. It reports where a motion lands and how an
//! operator should treat the landing cell; `operator_range` then turns the
//! caret and that target into the span an operator acts on, applying vi's
//! "exclusive motion ending in column 0" adjustment.
//!
//! Inclusivity table: inclusive for `e E f t $`, exclusive for
//! `h l w W b B 0 ^ F T`, linewise for `j k gg G`. Motions that run out of
//! buffer fall back the way vi does: `w`/`e` under an operator still apply
//! to where they stopped, `b` under an operator aborts.

use crate::{MotionKind, OperatorKind, ResolveError};
use core_text::motion::{
    FindSpec, MotionError, MotionResult, find_in_line, first_non_blank, last_char_col,
    vertical, word_backward, word_end, word_forward,
};
use core_text::{CharClass, Position, TextBuffer};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionSpec {
    pub kind: MotionKind,
    /// `None` when no count was typed; `G` and `gg` care about the
    /// difference.
    pub count: Option<u32>,
}

impl MotionSpec {
    pub fn new(kind: MotionKind, count: Option<u32>) -> Self {
        Self { kind, count }
    }

    pub fn count1(&self) -> usize {
        self.count.unwrap_or(1).max(1) as usize
    }
}

/// Editor state a motion may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionContext {
    pub operator: Option<OperatorKind>,
    /// Column vertical motions aim for; `usize::MAX` sticks to line ends.
    pub want_col: usize,
    pub last_find: Option<FindSpec>,
    /// `cw` on a non-blank acts like `ce` and may stay put.
    pub change_word: bool,
}

impl MotionContext {
    pub fn new(want_col: usize) -> Self {
        Self {
            want_col,
            ..Self::default()
        }
    }

    pub fn with_operator(mut self, op: Option<OperatorKind>) -> Self {
        self.operator = op;
        self.change_word = op == Some(OperatorKind::Change);
        self
    }

    pub fn with_last_find(mut self, last_find: Option<FindSpec>) -> Self {
        self.last_find = last_find;
        self
    }

    /// Context for the motion of a `c` command.
    pub fn for_change(want_col: usize) -> Self {
        Self::new(want_col).with_operator(Some(OperatorKind::Change))
    }

    fn pending(&self) -> bool {
        self.operator.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTarget {
    pub position: Position,
    pub inclusive: bool,
    pub linewise: bool,
    /// Column to remember for later vertical moves. `None` means "the
    /// landing column".
    pub want_col: Option<usize>,
    /// The motion moved but could not complete every repetition. The caret
    /// still moves; the engine rings the bell.
    pub stopped_short: bool,
}

impl MotionTarget {
    fn exclusive(position: Position) -> Self {
        Self {
            position,
            inclusive: false,
            linewise: false,
            want_col: None,
            stopped_short: false,
        }
    }

    fn inclusive(position: Position) -> Self {
        Self {
            inclusive: true,
            ..Self::exclusive(position)
        }
    }

    fn linewise(position: Position) -> Self {
        Self {
            linewise: true,
            ..Self::exclusive(position)
        }
    }

    fn short(mut self) -> Self {
        self.stopped_short = true;
        self
    }
}

/// Character search described by a find motion, if it is one.
pub fn find_spec(kind: MotionKind) -> Option<FindSpec> {
    let (target, forward, till) = match kind {
        MotionKind::FindForward(c) => (c, true, false),
        MotionKind::FindBackward(c) => (c, false, false),
        MotionKind::TillForward(c) => (c, true, true),
        MotionKind::TillBackward(c) => (c, false, true),
        _ => return None,
    };
    Some(FindSpec {
        target,
        forward,
        till,
    })
}

pub fn resolve_motion<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    spec: &MotionSpec,
    ctx: MotionContext,
) -> Result<MotionTarget, ResolveError> {
    let count = spec.count1();
    let mut pos = caret;
    pos.clamp_to(buf.line_count(), |l| buf.line_len(l));
    let caret = pos;
    let target = match spec.kind {
        MotionKind::Left => {
            if caret.col == 0 {
                // `dh` at column 0 rings the bell but leaves the operator
                // with an empty range.
                if ctx.pending() {
                    return Ok(MotionTarget::exclusive(caret).short());
                }
                return Err(ResolveError::AtBufferEdge);
            }
            pos.col -= count.min(caret.col);
            MotionTarget::exclusive(pos)
        }
        MotionKind::Right => {
            let len = buf.line_len(caret.line);
            let room = len.saturating_sub(1).saturating_sub(caret.col);
            pos.col = caret.col + count.min(room);
            let blocked = count > room;
            if blocked && ctx.pending() {
                // Under an operator `l` may take the last character.
                if len > 0 {
                    return Ok(MotionTarget::inclusive(pos));
                }
                return Ok(MotionTarget::exclusive(pos));
            }
            if pos == caret {
                return Err(ResolveError::AtBufferEdge);
            }
            MotionTarget::exclusive(pos)
        }
        MotionKind::Up | MotionKind::Down => {
            vertical(buf, &mut pos, count, spec.kind == MotionKind::Down, ctx.want_col)?;
            MotionTarget {
                want_col: Some(ctx.want_col),
                ..MotionTarget::linewise(pos)
            }
        }
        MotionKind::LineStart => {
            pos.col = 0;
            MotionTarget::exclusive(pos)
        }
        MotionKind::FirstNonBlank => {
            pos.col = first_non_blank(buf, caret.line).min(last_char_col(buf, caret.line));
            MotionTarget::exclusive(pos)
        }
        MotionKind::LineEnd => {
            if count > 1 {
                vertical(buf, &mut pos, count - 1, true, 0)?;
            }
            pos.col = last_char_col(buf, pos.line);
            MotionTarget {
                want_col: Some(usize::MAX),
                ..MotionTarget::inclusive(pos)
            }
        }
        MotionKind::WordForward | MotionKind::BigWordForward => {
            let big = spec.kind == MotionKind::BigWordForward;
            let on_non_blank = buf
                .char_at(caret)
                .is_some_and(|c| buf.classify(c) != CharClass::Space);
            if ctx.change_word && on_non_blank {
                let result = word_end(buf, &mut pos, count, big, true, false);
                forward_word(buf, caret, pos, result, true, &ctx)?
            } else {
                let result = word_forward(buf, &mut pos, count, big, ctx.pending());
                forward_word(buf, caret, pos, result, false, &ctx)?
            }
        }
        MotionKind::WordEnd | MotionKind::BigWordEnd => {
            let big = spec.kind == MotionKind::BigWordEnd;
            let result = word_end(buf, &mut pos, count, big, false, false);
            forward_word(buf, caret, pos, result, true, &ctx)?
        }
        MotionKind::WordBackward | MotionKind::BigWordBackward => {
            let big = spec.kind == MotionKind::BigWordBackward;
            match word_backward(buf, &mut pos, count, big) {
                Ok(()) => MotionTarget::exclusive(pos),
                Err(e) if ctx.pending() || pos == caret => return Err(e.into()),
                Err(_) => MotionTarget::exclusive(pos).short(),
            }
        }
        MotionKind::FindForward(_)
        | MotionKind::FindBackward(_)
        | MotionKind::TillForward(_)
        | MotionKind::TillBackward(_) => {
            let Some(find) = find_spec(spec.kind) else {
                return Err(ResolveError::NoPreviousFind);
            };
            find_target(buf, caret, find, count, false)?
        }
        MotionKind::RepeatFind | MotionKind::RepeatFindReverse => {
            let Some(last) = ctx.last_find else {
                return Err(ResolveError::NoPreviousFind);
            };
            let find = if spec.kind == MotionKind::RepeatFindReverse {
                FindSpec {
                    forward: !last.forward,
                    ..last
                }
            } else {
                last
            };
            find_target(buf, caret, find, count, true)?
        }
        MotionKind::FileStart | MotionKind::FileEnd => {
            let last = buf.line_count().saturating_sub(1);
            pos.line = match (spec.count, spec.kind) {
                (Some(n), _) => (n.max(1) as usize - 1).min(last),
                (None, MotionKind::FileStart) => 0,
                (None, _) => last,
            };
            pos.col = first_non_blank(buf, pos.line).min(last_char_col(buf, pos.line));
            MotionTarget::linewise(pos)
        }
    };
    Ok(target)
}

fn find_target<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    find: FindSpec,
    count: usize,
    repeat: bool,
) -> Result<MotionTarget, ResolveError> {
    let col = find_in_line(buf, caret, find, count, repeat)?;
    let pos = Position::new(caret.line, col);
    Ok(if find.forward {
        MotionTarget::inclusive(pos)
    } else {
        MotionTarget::exclusive(pos)
    })
}

/// Shared tail of `w` and `e`: pull a forward landing off the end-of-line
/// cell, then decide what a failed walk means.
fn forward_word<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    mut pos: Position,
    result: MotionResult,
    inclusive: bool,
    ctx: &MotionContext,
) -> Result<MotionTarget, MotionError> {
    let mut inclusive = inclusive;
    if pos > caret && pos.col > 0 && buf.char_at(pos).is_none() {
        pos.col -= 1;
        inclusive = true;
    }
    let target = if inclusive {
        MotionTarget::inclusive(pos)
    } else {
        MotionTarget::exclusive(pos)
    };
    match result {
        Ok(()) => Ok(target),
        Err(_) if ctx.pending() => Ok(target),
        Err(e) if pos == caret => Err(e),
        Err(_) => Ok(target.short()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusivity {
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeShape {
    Character,
    Linewise,
    /// Rectangular column span. No resolver produces one and operators
    /// reject it.
    Block,
}

/// Span an operator acts on. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorRange {
    pub start: Position,
    pub end: Position,
    pub inclusivity: Inclusivity,
    pub shape: RangeShape,
}

impl OperatorRange {
    pub fn characterwise(a: Position, b: Position, inclusivity: Inclusivity) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start,
            end,
            inclusivity,
            shape: RangeShape::Character,
        }
    }

    pub fn linewise(first: usize, last: usize) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        Self {
            start: Position::new(first, 0),
            end: Position::new(last, 0),
            inclusivity: Inclusivity::Inclusive,
            shape: RangeShape::Linewise,
        }
    }

    pub fn is_linewise(&self) -> bool {
        self.shape == RangeShape::Linewise
    }

    /// Absolute char offsets covered. Linewise ranges include the final
    /// line terminator; an inclusive end never reaches past its line.
    pub fn char_range<B: TextBuffer + ?Sized>(&self, buf: &B) -> Range<usize> {
        match self.shape {
            RangeShape::Linewise => {
                buf.line_bounds(self.start.line).0..buf.line_end_inclusive(self.end.line)
            }
            RangeShape::Character | RangeShape::Block => {
                let start = buf.offset_of(self.start);
                let end = match self.inclusivity {
                    Inclusivity::Exclusive => buf.offset_of(self.end),
                    Inclusivity::Inclusive => {
                        let (_, line_end) = buf.line_bounds(self.end.line);
                        (buf.offset_of(self.end) + 1).min(line_end)
                    }
                };
                start..end.max(start)
            }
        }
    }

    pub fn is_empty<B: TextBuffer + ?Sized>(&self, buf: &B) -> bool {
        !self.is_linewise() && self.char_range(buf).is_empty()
    }
}

/// Range an operator covers when the caret moves to `target`.
pub fn operator_range<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    target: &MotionTarget,
) -> OperatorRange {
    if target.linewise {
        return OperatorRange::linewise(caret.line, target.position.line);
    }
    let inclusivity = if target.inclusive {
        Inclusivity::Inclusive
    } else {
        Inclusivity::Exclusive
    };
    adjust_exclusive_end(
        buf,
        OperatorRange::characterwise(caret, target.position, inclusivity),
    )
}

/// An exclusive range whose end sits in column 0 of a later line stops at
/// the end of the previous line instead; if the start is inside the
/// indentation the whole thing becomes linewise (`dw` on a line's last
/// word, `d}` style spans, multi-line `di(`).
pub fn adjust_exclusive_end<B: TextBuffer + ?Sized>(
    buf: &B,
    range: OperatorRange,
) -> OperatorRange {
    if range.shape != RangeShape::Character
        || range.inclusivity != Inclusivity::Exclusive
        || range.end.col != 0
        || range.end.line <= range.start.line
    {
        return range;
    }
    let prev = range.end.line - 1;
    let in_indent = buf
        .line_text(range.start.line)
        .chars()
        .take(range.start.col)
        .all(|c| buf.classify(c) == CharClass::Space);
    if in_indent {
        return OperatorRange::linewise(range.start.line, prev);
    }
    let len = buf.line_len(prev);
    if len == 0 {
        return OperatorRange {
            end: Position::new(prev, 0),
            ..range
        };
    }
    OperatorRange {
        end: Position::new(prev, len - 1),
        inclusivity: Inclusivity::Inclusive,
        ..range
    }
}

//! Text objects: `iw aw iW aW`, quote objects and bracket objects.
//!
//! Word and quote objects are confined to the caret's line. Bracket objects
//! search the whole buffer for the nearest enclosing pair, honouring
//! nesting, and may span lines. Every resolver returns an `OperatorRange`
//! ready for the operator executor or for replacing a Visual selection.

use crate::ResolveError;
use crate::motion_resolver::{Inclusivity, OperatorRange, adjust_exclusive_end};
use core_text::motion::{Step, dec, inc};
use core_text::{CharClass, Position, TextBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectScope {
    /// `i`: contents only.
    Inner,
    /// `a`: contents plus delimiters or surrounding blanks.
    Around,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextObjectKind {
    Word,
    BigWord,
    Quote(char),
    Bracket { open: char, close: char },
}

impl TextObjectKind {
    /// Object named by the key typed after `i`/`a`.
    pub fn from_key(c: char) -> Option<Self> {
        let bracket = |open, close| Some(TextObjectKind::Bracket { open, close });
        match c {
            'w' => Some(TextObjectKind::Word),
            'W' => Some(TextObjectKind::BigWord),
            '"' | '\'' | '`' => Some(TextObjectKind::Quote(c)),
            '(' | ')' | 'b' => bracket('(', ')'),
            '{' | '}' | 'B' => bracket('{', '}'),
            '[' | ']' => bracket('[', ']'),
            '<' | '>' => bracket('<', '>'),
            _ => None,
        }
    }
}

pub fn resolve_text_object<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    kind: TextObjectKind,
    scope: ObjectScope,
    count: u32,
) -> Result<OperatorRange, ResolveError> {
    let around = scope == ObjectScope::Around;
    let count = count.max(1) as usize;
    match kind {
        TextObjectKind::Word => word_object(buf, caret, false, around, count),
        TextObjectKind::BigWord => word_object(buf, caret, true, around, count),
        TextObjectKind::Quote(quote) => quote_object(buf, caret, quote, around),
        TextObjectKind::Bracket { open, close } => {
            bracket_object(buf, caret, open, close, around, count)
        }
    }
}

fn word_object<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    big: bool,
    around: bool,
    count: usize,
) -> Result<OperatorRange, ResolveError> {
    let chars: Vec<char> = buf.line_text(caret.line).chars().collect();
    let len = chars.len();
    if len == 0 {
        return Err(ResolveError::NoWordUnderCaret);
    }
    let class = |i: usize| match buf.classify(chars[i]) {
        CharClass::Space => CharClass::Space,
        _ if big => CharClass::Word,
        other => other,
    };
    let run_end = |from: usize| {
        let cls = class(from);
        let mut end = from;
        while end + 1 < len && class(end + 1) == cls {
            end += 1;
        }
        end
    };
    let col = caret.col.min(len - 1);
    let on_blank = class(col) == CharClass::Space;
    let mut start = col;
    while start > 0 && class(start - 1) == class(col) {
        start -= 1;
    }
    let mut end = run_end(col);

    if !around {
        for _ in 1..count {
            if end + 1 >= len {
                break;
            }
            end = run_end(end + 1);
        }
    } else if on_blank {
        // Blanks plus the word after them, then blank+word per extra count.
        for i in 0..count {
            if i > 0 && end + 1 < len && class(end + 1) == CharClass::Space {
                end = run_end(end + 1);
            }
            if end + 1 >= len {
                break;
            }
            end = run_end(end + 1);
        }
    } else {
        for _ in 1..count {
            if end + 1 < len && class(end + 1) == CharClass::Space {
                end = run_end(end + 1);
            }
            if end + 1 >= len {
                break;
            }
            end = run_end(end + 1);
        }
        if end + 1 < len && class(end + 1) == CharClass::Space {
            end = run_end(end + 1);
        } else if start > 0 && class(start - 1) == CharClass::Space {
            let mut lead = start - 1;
            while lead > 0 && class(lead - 1) == CharClass::Space {
                lead -= 1;
            }
            // Indentation stays put.
            if lead > 0 {
                start = lead;
            }
        }
    }
    Ok(OperatorRange::characterwise(
        Position::new(caret.line, start),
        Position::new(caret.line, end),
        Inclusivity::Inclusive,
    ))
}

/// Columns of the unescaped `quote` characters on a line.
fn quote_columns(chars: &[char], quote: char) -> Vec<usize> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == quote {
            out.push(i);
        }
        i += 1;
    }
    out
}

fn quote_object<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    quote: char,
    around: bool,
) -> Result<OperatorRange, ResolveError> {
    let missing = ResolveError::NoEnclosingPair(quote);
    let chars: Vec<char> = buf.line_text(caret.line).chars().collect();
    let quotes = quote_columns(&chars, quote);
    let col = caret.col.min(chars.len().saturating_sub(1));

    let pair = if let Some(idx) = quotes.iter().position(|&q| q == col) {
        // On a quote: its role follows from how many quotes precede it.
        if idx % 2 == 0 {
            quotes.get(idx + 1).map(|&close| (col, close))
        } else {
            Some((quotes[idx - 1], col))
        }
    } else {
        let before = quotes.iter().rposition(|&q| q < col);
        match before {
            Some(idx) => quotes.get(idx + 1).map(|&close| (quotes[idx], close)),
            None => match (quotes.first(), quotes.get(1)) {
                (Some(&open), Some(&close)) => Some((open, close)),
                _ => None,
            },
        }
    };
    let (open, close) = pair.ok_or(missing)?;
    let at = |c: usize| Position::new(caret.line, c);

    if !around {
        if close == open + 1 {
            return Ok(OperatorRange::characterwise(
                at(close),
                at(close),
                Inclusivity::Exclusive,
            ));
        }
        return Ok(OperatorRange::characterwise(
            at(open + 1),
            at(close - 1),
            Inclusivity::Inclusive,
        ));
    }

    let blank = |c: char| buf.classify(c) == CharClass::Space;
    let (mut start, mut end) = (open, close);
    if end + 1 < chars.len() && blank(chars[end + 1]) {
        while end + 1 < chars.len() && blank(chars[end + 1]) {
            end += 1;
        }
    } else {
        while start > 0 && blank(chars[start - 1]) {
            start -= 1;
        }
    }
    Ok(OperatorRange::characterwise(
        at(start),
        at(end),
        Inclusivity::Inclusive,
    ))
}

/// Step forward, skipping over an end-of-line cell.
fn incl<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) -> Step {
    let step = inc(buf, pos);
    if step.crossed() && pos.col > 0 {
        return inc(buf, pos);
    }
    step
}

/// Step back, skipping over an end-of-line cell.
fn decl<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) -> Step {
    let step = dec(buf, pos);
    if step == Step::PrevLine && pos.col > 0 {
        return dec(buf, pos);
    }
    step
}

/// True when `pos` and everything before it on its line is blank.
fn in_indent<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> bool {
    let leading = buf
        .line_text(pos.line)
        .chars()
        .take_while(|&c| buf.classify(c) == CharClass::Space)
        .count();
    leading > pos.col
}

fn bracket_object<B: TextBuffer + ?Sized>(
    buf: &B,
    caret: Position,
    open: char,
    close: char,
    around: bool,
    count: usize,
) -> Result<OperatorRange, ResolveError> {
    let missing = ResolveError::NoEnclosingPair(open);
    let text: Vec<char> = buf.read(0..buf.len_chars()).chars().collect();
    let cur = buf.offset_of(caret);

    // Scan back for the `count`th unmatched opening delimiter. Sitting on
    // an opening delimiter counts as being inside it.
    let mut from = if text.get(cur) == Some(&open) {
        cur + 1
    } else {
        cur
    };
    let mut open_at = None;
    for _ in 0..count {
        let mut depth = 0usize;
        let mut found = None;
        for j in (0..from).rev() {
            if text[j] == close {
                depth += 1;
            } else if text[j] == open {
                if depth == 0 {
                    found = Some(j);
                    break;
                }
                depth -= 1;
            }
        }
        let o = found.ok_or(missing.clone())?;
        open_at = Some(o);
        from = o;
    }
    let open_at = open_at.ok_or(missing.clone())?;

    let mut depth = 0usize;
    let mut close_at = None;
    for (j, &c) in text.iter().enumerate().skip(open_at + 1) {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                close_at = Some(j);
                break;
            }
            depth -= 1;
        }
    }
    let close_at = close_at.ok_or(missing)?;
    let start = buf.position_of(open_at);
    let end = buf.position_of(close_at);

    if around {
        return Ok(OperatorRange::characterwise(
            start,
            end,
            Inclusivity::Inclusive,
        ));
    }

    // Inner: drop the line break after the opening delimiter and the
    // indentation before the closing one.
    let mut s = start;
    incl(buf, &mut s);
    let mut e = end;
    let mut sol = e.col == 0;
    decl(buf, &mut e);
    while in_indent(buf, e) {
        sol = true;
        if decl(buf, &mut e) != Step::Moved {
            break;
        }
    }
    let range = if sol {
        incl(buf, &mut e);
        OperatorRange::characterwise(s, e, Inclusivity::Exclusive)
    } else if s <= e {
        OperatorRange::characterwise(s, e, Inclusivity::Inclusive)
    } else {
        // Nothing between the delimiters.
        OperatorRange::characterwise(s, s, Inclusivity::Exclusive)
    };
    Ok(adjust_exclusive_end(buf, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn select(
        text: &str,
        caret: (usize, usize),
        kind: TextObjectKind,
        scope: ObjectScope,
    ) -> Result<String, ResolveError> {
        let b = Buffer::from_str("t", text).unwrap();
        let r = resolve_text_object(&b, Position::new(caret.0, caret.1), kind, scope, 1)?;
        Ok(b.read(r.char_range(&b)))
    }

    #[test]
    fn object_keys() {
        assert_eq!(
            TextObjectKind::from_key('b'),
            Some(TextObjectKind::Bracket {
                open: '(',
                close: ')'
            })
        );
        assert_eq!(TextObjectKind::from_key('`'), Some(TextObjectKind::Quote('`')));
        assert_eq!(TextObjectKind::from_key('p'), None);
    }

    #[test]
    fn inner_and_around_word() {
        let text = "foo bar.baz  qux\n";
        let w = TextObjectKind::Word;
        assert_eq!(select(text, (0, 5), w, ObjectScope::Inner).unwrap(), "bar");
        assert_eq!(select(text, (0, 7), w, ObjectScope::Inner).unwrap(), ".");
        assert_eq!(select(text, (0, 5), w, ObjectScope::Around).unwrap(), " bar");
        assert_eq!(select(text, (0, 1), w, ObjectScope::Around).unwrap(), "foo ");
        assert_eq!(select(text, (0, 9), w, ObjectScope::Around).unwrap(), "baz  ");
        // No trailing blank: take the leading run.
        assert_eq!(select(text, (0, 14), w, ObjectScope::Around).unwrap(), "  qux");
        // On a blank: the blanks plus the following word.
        assert_eq!(select(text, (0, 11), w, ObjectScope::Around).unwrap(), "  qux");
        assert_eq!(
            select(text, (0, 5), TextObjectKind::BigWord, ObjectScope::Inner).unwrap(),
            "bar.baz"
        );
    }

    #[test]
    fn word_object_keeps_indent_and_counts() {
        let b = Buffer::from_str("t", "    one two three\n").unwrap();
        let r = resolve_text_object(
            &b,
            Position::new(0, 4),
            TextObjectKind::Word,
            ObjectScope::Inner,
            3,
        )
        .unwrap();
        assert_eq!(b.read(r.char_range(&b)), "one two");
        assert_eq!(
            select("    one\n", (0, 5), TextObjectKind::Word, ObjectScope::Around).unwrap(),
            "one"
        );
        assert_eq!(
            select("\n", (0, 0), TextObjectKind::Word, ObjectScope::Inner),
            Err(ResolveError::NoWordUnderCaret)
        );
    }

    #[test]
    fn quotes_on_the_caret_line() {
        let text = "say \"hi \\\" there\" now\n";
        let q = TextObjectKind::Quote('"');
        assert_eq!(select(text, (0, 6), q, ObjectScope::Inner).unwrap(), "hi \\\" there");
        assert_eq!(
            select(text, (0, 4), q, ObjectScope::Around).unwrap(),
            "\"hi \\\" there\" "
        );
        // Before the first quote the first pair is used.
        assert_eq!(select(text, (0, 0), q, ObjectScope::Inner).unwrap(), "hi \\\" there");
        assert_eq!(
            select("x = 'a'\n", (0, 6), TextObjectKind::Quote('\''), ObjectScope::Around).unwrap(),
            " 'a'"
        );
        assert_eq!(select("f(\"\")\n", (0, 2), q, ObjectScope::Inner).unwrap(), "");
        assert_eq!(
            select("no quotes\n", (0, 2), q, ObjectScope::Inner),
            Err(ResolveError::NoEnclosingPair('"'))
        );
    }

    #[test]
    fn nested_brackets() {
        let text = "f(a, g(b), c)\n";
        let p = TextObjectKind::Bracket {
            open: '(',
            close: ')',
        };
        assert_eq!(select(text, (0, 7), p, ObjectScope::Inner).unwrap(), "b");
        assert_eq!(select(text, (0, 3), p, ObjectScope::Inner).unwrap(), "a, g(b), c");
        assert_eq!(select(text, (0, 6), p, ObjectScope::Around).unwrap(), "(b)");
        assert_eq!(select(text, (0, 12), p, ObjectScope::Around).unwrap(), "(a, g(b), c)");
        assert_eq!(select("f()\n", (0, 1), p, ObjectScope::Inner).unwrap(), "");
        assert_eq!(
            select("abc\n", (0, 1), p, ObjectScope::Inner),
            Err(ResolveError::NoEnclosingPair('('))
        );
    }

    #[test]
    fn count_selects_outer_pairs() {
        let b = Buffer::from_str("t", "[a [b [c] d] e]\n").unwrap();
        let r = resolve_text_object(
            &b,
            Position::new(0, 7),
            TextObjectKind::Bracket {
                open: '[',
                close: ']',
            },
            ObjectScope::Around,
            2,
        )
        .unwrap();
        assert_eq!(b.read(r.char_range(&b)), "[b [c] d]");
    }

    #[test]
    fn multi_line_inner_block_is_linewise() {
        let text = "fn x() {\n    a;\n    b;\n}\n";
        let b = Buffer::from_str("t", text).unwrap();
        let r = resolve_text_object(
            &b,
            Position::new(1, 5),
            TextObjectKind::Bracket {
                open: '{',
                close: '}',
            },
            ObjectScope::Inner,
            1,
        )
        .unwrap();
        assert!(r.is_linewise());
        assert_eq!(b.read(r.char_range(&b)), "    a;\n    b;\n");
    }

    #[test]
    fn multi_line_inner_block_sharing_lines() {
        let text = "foo(a,\n  b)\n";
        let p = TextObjectKind::Bracket {
            open: '(',
            close: ')',
        };
        assert_eq!(select(text, (1, 2), p, ObjectScope::Inner).unwrap(), "a,\n  b");
    }
}

//! Angle-bracket key notation (`ct(foo<Esc>`, `i<C-o>d2h`).
//!
//! Plain characters map to themselves; `<...>` groups name special keys or
//! chords. `<lt>` is the literal `<`. Names are case-insensitive.

use std::fmt;

use crate::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unterminated key group starting at byte {offset}")]
    Unterminated { offset: usize },
    #[error("unknown key name `<{name}>`")]
    UnknownName { name: String },
    #[error("empty key group at byte {offset}")]
    Empty { offset: usize },
}

/// Parse a notation string into the key sequence it denotes.
pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    let mut keys = Vec::with_capacity(input.len());
    let mut rest = input;
    let mut offset = 0usize;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let Some(close) = rest.find('>') else {
                return Err(KeyParseError::Unterminated { offset });
            };
            let name = &rest[1..close];
            if name.is_empty() {
                return Err(KeyParseError::Empty { offset });
            }
            keys.push(parse_group(name)?);
            rest = &rest[close + 1..];
            offset += close + 1;
        } else {
            keys.push(KeyEvent::char(c));
            rest = &rest[c.len_utf8()..];
            offset += c.len_utf8();
        }
    }
    Ok(keys)
}

fn parse_group(name: &str) -> Result<KeyEvent, KeyParseError> {
    let unknown = || KeyParseError::UnknownName {
        name: name.to_string(),
    };
    let mut mods = KeyModifiers::empty();
    let mut base = name;
    // Modifier prefixes: `C-`, `A-`/`M-`, `S-`; a trailing single `-` is a key.
    while base.len() > 2 && base.as_bytes()[1] == b'-' {
        match base.as_bytes()[0].to_ascii_lowercase() {
            b'c' => mods |= KeyModifiers::CTRL,
            b'a' | b'm' => mods |= KeyModifiers::ALT,
            b's' => mods |= KeyModifiers::SHIFT,
            _ => return Err(unknown()),
        }
        base = &base[2..];
    }
    let code = named_code(base).ok_or_else(unknown)?;
    let code = match code {
        KeyCode::Char(c) if mods.contains(KeyModifiers::CTRL) => {
            KeyCode::Char(c.to_ascii_lowercase())
        }
        other => other,
    };
    Ok(KeyEvent::new(code, mods))
}

fn named_code(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "del" | "delete" => KeyCode::Delete,
        "lt" => KeyCode::Char('<'),
        "gt" => KeyCode::Char('>'),
        "space" => KeyCode::Char(' '),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        _ => return None,
    };
    Some(code)
}

pub(crate) fn write_key(f: &mut fmt::Formatter<'_>, key: &KeyEvent) -> fmt::Result {
    let name = match key.code {
        KeyCode::Char('<') => "lt".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "CR".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "BS".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Delete => "Del".to_string(),
    };
    let mut prefix = String::new();
    if key.mods.contains(KeyModifiers::CTRL) {
        prefix.push_str("C-");
    }
    if key.mods.contains(KeyModifiers::ALT) {
        prefix.push_str("A-");
    }
    let plain_char = matches!(key.code, KeyCode::Char(c) if c != '<');
    if prefix.is_empty() && plain_char {
        f.write_str(&name)
    } else {
        write!(f, "<{prefix}{name}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_and_groups() {
        let keys = parse_keys("ct(for <Esc>").unwrap();
        assert_eq!(keys.len(), 8);
        assert_eq!(keys[0], KeyEvent::char('c'));
        assert_eq!(keys[2], KeyEvent::char('('));
        assert_eq!(keys[6], KeyEvent::char(' '));
        assert_eq!(keys[7], KeyEvent::named(KeyCode::Esc));
    }

    #[test]
    fn parses_ctrl_chords_case_insensitively() {
        let keys = parse_keys("<C-o><c-W><C-R>").unwrap();
        assert_eq!(
            keys,
            vec![KeyEvent::ctrl('o'), KeyEvent::ctrl('w'), KeyEvent::ctrl('r')]
        );
    }

    #[test]
    fn literal_angle_bracket() {
        let keys = parse_keys("di<lt>").unwrap();
        assert_eq!(keys[2], KeyEvent::char('<'));
    }

    #[test]
    fn errors_are_reported() {
        assert_eq!(
            parse_keys("ab<Esc"),
            Err(KeyParseError::Unterminated { offset: 2 })
        );
        assert!(matches!(
            parse_keys("<Nope>"),
            Err(KeyParseError::UnknownName { .. })
        ));
        assert_eq!(parse_keys("<>"), Err(KeyParseError::Empty { offset: 0 }));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let text = "i<C-o>d2h<lt>x<Esc><CR>";
        let keys = parse_keys(text).unwrap();
        let rendered: String = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, text);
    }
}

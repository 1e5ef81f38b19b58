#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{Engine, KeyOutcome};
use core_config::EngineSettings;
use core_state::Mode;
use core_text::{Buffer, Position, TextBuffer};

pub const CARET: &str = "<caret>";

/// Split a fixture written with a `<caret>` marker into text and position.
pub fn split_caret(fixture: &str) -> (String, Position) {
    let Some(at) = fixture.find(CARET) else {
        return (fixture.to_string(), Position::origin());
    };
    let before = &fixture[..at];
    let line = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count());
    let text = format!("{before}{}", &fixture[at + CARET.len()..]);
    (text, Position::new(line, col))
}

pub fn engine(fixture: &str) -> Engine<Buffer> {
    engine_with(fixture, EngineSettings::default())
}

pub fn engine_with(fixture: &str, settings: EngineSettings) -> Engine<Buffer> {
    let (text, caret) = split_caret(fixture);
    let mut e = Engine::from_text(&text, settings).unwrap();
    e.set_caret(caret);
    e
}

/// Feed `keys` to a fresh engine over `fixture`.
pub fn run(fixture: &str, keys: &str) -> Engine<Buffer> {
    let mut e = engine(fixture);
    e.feed_str(keys).unwrap();
    e
}

/// Buffer text with the caret marker put back in.
pub fn render(e: &Engine<Buffer>) -> String {
    let text = e.buffer().text();
    let offset = e.buffer().offset_of(e.caret());
    let mut out: String = text.chars().take(offset).collect();
    out.push_str(CARET);
    out.extend(text.chars().skip(offset));
    out
}

pub fn bells(outcomes: &[KeyOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| matches!(o, KeyOutcome::Bell(_)))
        .count()
}

pub fn assert_normal(e: &Engine<Buffer>) {
    assert_eq!(e.mode(), Mode::Normal);
    assert_eq!(e.pending_keys(), "");
}

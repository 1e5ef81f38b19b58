mod common;
use common::*;

use core_actions::KeyOutcome;
use core_state::{Mode, ModeObserver};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

struct Recorder(Rc<RefCell<Vec<(Mode, Mode)>>>);

impl ModeObserver for Recorder {
    fn on_mode_change(&mut self, from: Mode, to: Mode) {
        self.0.borrow_mut().push((from, to));
    }
}

#[test]
fn observers_see_every_transition() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut e = engine("<caret>abc\n");
    e.add_observer(Box::new(Recorder(seen.clone())));
    e.feed_str("dlix<Esc>").unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            (Mode::Normal, Mode::OperatorPending),
            (Mode::OperatorPending, Mode::Normal),
            (Mode::Normal, Mode::Insert),
            (Mode::Insert, Mode::Normal),
        ]
    );
}

#[test]
fn count_repeats_inserted_text() {
    let e = run("<caret>\n", "3ix<Esc>");
    assert_eq!(render(&e), "xx<caret>x\n");
    let e = run("<caret>top\n", "2oab<Esc>");
    assert_eq!(render(&e), "top\nab\na<caret>b\n");
}

#[test]
fn open_line_at_unterminated_end() {
    let e = run("<caret>abc", "ofoo<Esc>");
    assert_eq!(e.buffer().text(), "abc\nfoo\n");
    let e = run("abc\n<caret>def\n", "Ox<Esc>");
    assert_eq!(render(&e), "abc\n<caret>x\ndef\n");
}

#[test]
fn append_and_insert_at_line_edges() {
    let e = run("  mid<caret>dle\n", "A!<Esc>I<lt><Esc>");
    assert_eq!(render(&e), "  <caret><middle!\n");
}

#[test]
fn insert_editing_keys() {
    let e = run("<caret>\n", "iab<CR>cd<BS><BS><BS>e<Esc>");
    assert_eq!(render(&e), "ab<caret>e\n");
    let e = run("keep <caret>\n", "Atyped text<C-u>x<Esc>");
    assert_eq!(e.buffer().text(), "keep x\n");
}

#[test]
fn escape_steps_back_but_not_past_column_zero() {
    let e = run("<caret>abc\n", "i<Esc>");
    assert_eq!(render(&e), "<caret>abc\n");
    let e = run("<caret>abc\n", "A<Esc>");
    assert_eq!(render(&e), "ab<caret>c\n");
}

#[test]
fn delegated_command_runs_once_and_returns_to_insert() {
    let mut e = engine("<caret>abc\ndef\n");
    let out = e.feed_str("i<C-o>dd").unwrap();
    assert_eq!(
        out,
        vec![
            KeyOutcome::Done,
            KeyOutcome::Done,
            KeyOutcome::Pending,
            KeyOutcome::Done
        ]
    );
    assert_eq!(e.buffer().text(), "def\n");
    assert_eq!(e.mode(), Mode::Insert);
    // Typing continues in the same session.
    e.feed_str("X<Esc>").unwrap();
    assert_eq!(e.buffer().text(), "Xdef\n");
    assert_eq!(e.mode(), Mode::Normal);
}

#[test]
fn delegated_command_keeps_the_insert_count() {
    let mut e = engine("<caret>abc\n");
    e.feed_str("3ix<C-o>l").unwrap();
    assert_eq!(e.mode(), Mode::Insert);
    let session = e.state().insert.clone().unwrap();
    assert_eq!(session.repeat, 3);
    assert_eq!(session.typed, "x");
    e.feed_str("<Esc>").unwrap();
    // The two extra copies land where typing stopped.
    assert_eq!(render(&e), "xax<caret>xbc\n");
}

#[test]
fn delegated_command_keeps_the_insert_start() {
    let e = run("<caret>foo\n", "A bar baz<C-o>$<C-u>");
    assert_eq!(render(&e), "foo<caret>\n");
    assert_eq!(e.mode(), Mode::Insert);
    let e = run("<caret>foo\n", "A bar<C-o>$<C-w><C-w>");
    assert_eq!(e.buffer().text(), "foo\n");
}

#[test]
fn delegated_failure_still_returns_to_insert() {
    let mut e = engine("<caret>abc\n");
    let out = e.feed_str("i<C-o>fz").unwrap();
    assert_eq!(bells(&out), 1);
    assert_eq!(e.mode(), Mode::Insert);
    let out = e.feed_str("<C-o><Esc>").unwrap();
    assert_eq!(bells(&out), 0);
    assert_eq!(e.mode(), Mode::Insert);
}

#[test]
fn delegated_motion_at_line_end_resumes_after_last_char() {
    // `<C-o>` at the end of the line steps onto `c`; `h` then lands on `b`.
    let e = run("<caret>abc\n", "A<C-o>hx");
    assert_eq!(e.buffer().text(), "axbc\n");
    let e = run("<caret>abc def\n", "A<C-o>bx");
    assert_eq!(e.buffer().text(), "abc xdef\n");
    let e = run("<caret>abc\n", "A<C-o>0<C-o>$!");
    assert_eq!(e.buffer().text(), "abc!\n");
}

#[test]
fn delegated_visual_returns_to_insert_after_operator() {
    let e = run("<caret>abc def\n", "i<C-o>vey");
    assert_eq!(e.mode(), Mode::Insert);
    assert_eq!(e.registers().get('"').unwrap().text, "abc");
}

#[test]
fn visual_characterwise_delete_spans_lines() {
    let e = run("a<caret>bc\ndef\n", "vjd");
    assert_eq!(render(&e), "a<caret>f\n");
    assert_normal(&e);
}

#[test]
fn visual_linewise_operators() {
    let e = run("a\n<caret>b\nc\nd\n", "Vjd");
    assert_eq!(render(&e), "a\n<caret>d\n");
    let e = run("<caret>one\ntwo\n", "VjU");
    assert_eq!(e.buffer().text(), "ONE\nTWO\n");
    let e = run("<caret>one\n", "Vy");
    assert_eq!(e.registers().get('"').unwrap().text, "one\n");
}

#[test]
fn visual_text_object_and_swap() {
    let mut e = engine("call(fo<caret>o, bar)\n");
    e.feed_str("vi(").unwrap();
    let span = e.state().selection().unwrap();
    assert_eq!((span.start.col, span.end.col), (5, 12));
    e.feed_str("o").unwrap();
    assert_eq!(e.caret().col, 5);
    e.feed_str("c-<Esc>").unwrap();
    assert_eq!(e.buffer().text(), "call(-)\n");
}

#[test]
fn visual_toggle_and_escape() {
    let mut e = engine("<caret>abc\n");
    e.feed_str("vl").unwrap();
    assert_eq!(e.mode(), Mode::Visual);
    e.feed_str("v").unwrap();
    assert_normal(&e);
    e.feed_str("vl~").unwrap();
    assert_eq!(render(&e), "a<caret>BC\n");
    e.feed_str("v<Esc>").unwrap();
    assert_normal(&e);
    assert!(e.state().selection().is_none());
}

#[test]
fn text_object_needs_operator_or_visual() {
    let mut e = engine("(<caret>x)\n");
    // In Normal mode `i` starts an insert instead of an object.
    e.feed_str("i").unwrap();
    assert_eq!(e.mode(), Mode::Insert);
}

#[test]
fn undo_groups_whole_commands() {
    let mut e = engine("<caret>one two\n");
    e.feed_str("cwfoo bar<Esc>").unwrap();
    assert_eq!(e.buffer().text(), "foo bar two\n");
    e.feed_str("u").unwrap();
    assert_eq!(render(&e), "<caret>one two\n");
    e.feed_str("<C-r>").unwrap();
    assert_eq!(e.buffer().text(), "foo bar two\n");
    let out = e.feed_str("<C-r>").unwrap();
    assert_eq!(bells(&out), 1);
}

#[test]
fn delegation_splits_the_insert_undo_group() {
    let mut e = engine("<caret>\n");
    e.feed_str("ione<C-o>0two<Esc>").unwrap();
    assert_eq!(e.buffer().text(), "twoone\n");
    e.feed_str("u").unwrap();
    assert_eq!(e.buffer().text(), "one\n");
    e.feed_str("u").unwrap();
    assert_eq!(e.buffer().text(), "\n");
}

#[test]
fn undo_with_count() {
    let mut e = engine("<caret>abcdef\n");
    e.feed_str("xxx2u").unwrap();
    assert_eq!(e.buffer().text(), "bcdef\n");
}

mod common;
use common::*;

use core_actions::{CommandError, KeyOutcome, ResolveError};
use core_config::EngineSettings;
use core_state::{Mode, RegisterShape};
use pretty_assertions::assert_eq;

#[test]
fn dd_removes_line_and_fills_registers() {
    let e = run("a\n<caret>b\nc\n", "dd");
    assert_eq!(render(&e), "a\n<caret>c\n");
    let unnamed = e.registers().get('"').unwrap();
    assert_eq!(unnamed.text, "b\n");
    assert_eq!(unnamed.shape, RegisterShape::Linewise);
    assert_eq!(e.registers().get('1').unwrap().text, "b\n");
}

#[test]
fn dd_count_is_clamped_to_buffer_end() {
    let e = run("a\n<caret>b\nc\n", "5dd");
    assert_eq!(render(&e), "<caret>a\n");
}

#[test]
fn count_on_last_line_rings_the_bell() {
    let mut e = engine("a\n<caret>b\n");
    let out = e.feed_str("2dd").unwrap();
    assert_eq!(bells(&out), 1);
    assert_eq!(e.buffer().text(), "a\nb\n");
}

#[test]
fn counts_multiply_across_the_operator() {
    let e = run("<caret>a b c d e f g h\n", "2d3w");
    assert_eq!(e.buffer().text(), "g h\n");
}

#[test]
fn x_with_large_count_stops_at_line_end() {
    let e = run("a<caret>bc\nnext\n", "5x");
    assert_eq!(render(&e), "<caret>a\nnext\n");
    assert_eq!(e.registers().get('-').unwrap().text, "bc");
}

#[test]
fn x_at_column_zero_for_backwards_delete_bells() {
    let mut e = engine("<caret>abc\n");
    let out = e.feed_str("X").unwrap();
    assert_eq!(
        out,
        vec![KeyOutcome::Bell(CommandError::Resolution(
            ResolveError::AtBufferEdge
        ))]
    );
    assert_eq!(e.buffer().text(), "abc\n");
}

#[test]
fn shorthands_d_and_c_to_line_end() {
    let e = run("ab<caret>cd\n", "D");
    assert_eq!(render(&e), "a<caret>b\n");
    let e = run("ab<caret>cd\n", "CXY<Esc>");
    assert_eq!(render(&e), "abX<caret>Y\n");
}

#[test]
fn linewise_motions() {
    let e = run("<caret>a\nb\nc\n", "dj");
    assert_eq!(e.buffer().text(), "c\n");
    let e = run("a\n<caret>b\nc\n", "dG");
    assert_eq!(e.buffer().text(), "a\n");
    let e = run("a\nb\n<caret>c\n", "dgg");
    assert_eq!(e.buffer().text(), "");
}

#[test]
fn delete_to_word_end_is_inclusive() {
    let e = run("<caret>foo bar\n", "de");
    assert_eq!(e.buffer().text(), " bar\n");
}

#[test]
fn unknown_key_under_operator_aborts() {
    let mut e = engine("<caret>abc\n");
    let out = e.feed_str("dq").unwrap();
    assert_eq!(out[0], KeyOutcome::Pending);
    assert!(matches!(
        out[1],
        KeyOutcome::Bell(CommandError::ParseAbort { .. })
    ));
    assert_eq!(e.buffer().text(), "abc\n");
    assert_normal(&e);
}

#[test]
fn escape_cancels_pending_operator() {
    let mut e = engine("<caret>abc\n");
    let out = e.feed_str("2d<Esc>").unwrap();
    assert_eq!(out.last(), Some(&KeyOutcome::Done));
    assert_normal(&e);
    assert_eq!(e.buffer().text(), "abc\n");
}

#[test]
fn text_objects_under_operators() {
    let e = run("foo(b<caret>ar, baz) x\n", "ci(new<Esc>");
    assert_eq!(e.buffer().text(), "foo(new) x\n");
    let e = run("say \"h<caret>i\" now\n", "da\"");
    assert_eq!(e.buffer().text(), "say now\n");
    let e = run("one t<caret>wo three\n", "diw");
    assert_eq!(render(&e), "one <caret> three\n");
    let e = run("one t<caret>wo three\n", "daw");
    assert_eq!(render(&e), "one <caret>three\n");
}

#[test]
fn missing_pair_is_a_resolution_failure() {
    let mut e = engine("no <caret>brackets\n");
    let out = e.feed_str("di(").unwrap();
    assert_eq!(
        out.last(),
        Some(&KeyOutcome::Bell(CommandError::Resolution(
            ResolveError::NoEnclosingPair('(')
        )))
    );
    assert_eq!(e.buffer().text(), "no brackets\n");
    assert_normal(&e);
}

#[test]
fn case_operators() {
    let e = run("hel<caret>lo world\n", "gUiw");
    assert_eq!(render(&e), "<caret>HELLO world\n");
    let e = run("Hello <caret>World\n", "g~~");
    assert_eq!(e.buffer().text(), "hELLO wORLD\n");
    let e = run("ABC DEF\n", "guw");
    assert_eq!(e.buffer().text(), "abc DEF\n");
}

#[test]
fn shift_operators_use_configured_width() {
    let settings = EngineSettings {
        shift_width: 2,
        ..EngineSettings::default()
    };
    let mut e = engine_with("<caret>a\nb\n", settings);
    e.feed_str("2>>").unwrap();
    assert_eq!(e.buffer().text(), "  a\n  b\n");
    e.feed_str("<lt><lt>").unwrap();
    assert_eq!(e.buffer().text(), "a\n  b\n");
    assert_eq!(e.metrics().operator_shift, 2);
}

#[test]
fn yank_and_paste_through_named_registers() {
    let e = run("<caret>one\ntwo\n", "\"ayyj\"ap");
    assert_eq!(render(&e), "one\ntwo\n<caret>one\n");
    let e = run("<caret>one two\n", "\"ayww\"Ayw");
    assert_eq!(e.registers().get('a').unwrap().text, "one two");
    // Named yanks leave the yank register alone.
    assert!(e.registers().get('0').is_none());
}

#[test]
fn yank_does_not_change_text() {
    let e = run("abc d<caret>ef\n", "yb");
    assert_eq!(render(&e), "abc <caret>def\n");
    assert_eq!(e.registers().get('"').unwrap().text, "d");
}

#[test]
fn paste_before_with_count() {
    let e = run("<caret>ab\n", "yl2P");
    assert_eq!(render(&e), "a<caret>aab\n");
}

#[test]
fn replace_join_and_toggle() {
    let e = run("<caret>abcd\n", "3rx");
    assert_eq!(render(&e), "xx<caret>xd\n");
    let e = run("<caret>one\n   two\nthree\n", "3J");
    assert_eq!(render(&e), "one two<caret> three\n");
    let mut e = engine("ab<caret>c\n");
    let out = e.feed_str("5rx").unwrap();
    assert_eq!(bells(&out), 1);
    assert_eq!(e.buffer().text(), "abc\n");
}

#[test]
fn black_hole_register_keeps_unnamed() {
    let e = run("<caret>one two\n", "yw\"_dw");
    assert_eq!(e.buffer().text(), "two\n");
    assert_eq!(e.registers().get('"').unwrap().text, "one ");
}

#[test]
fn operator_pending_mode_is_visible_between_keys() {
    let mut e = engine("<caret>abc\n");
    e.feed_str("c").unwrap();
    assert_eq!(e.mode(), Mode::OperatorPending);
    e.feed_str("l").unwrap();
    assert_eq!(e.mode(), Mode::Insert);
    assert_eq!(e.buffer().text(), "bc\n");
}

mod common;
use common::*;

use core_state::Mode;
use pretty_assertions::assert_eq;

#[test]
fn change_till_forward() {
    let e = run("<caret>if (condition) {\n}\n", "ct(for <Esc>");
    assert_eq!(e.buffer().text(), "for (condition) {\n}\n");
    assert_normal(&e);
}

#[test]
fn change_till_backward_from_line_end() {
    let e = run("if (condition) {<caret>\n}\n", "cT(");
    assert_eq!(e.buffer().text(), "if (\n}\n");
    assert_eq!(e.mode(), Mode::Insert);
}

#[test]
fn change_to_char_backward_from_line_end() {
    let e = run("if (condition) {<caret>\n}\n", "cFc");
    assert_eq!(e.buffer().text(), "if (\n}\n");
    assert_eq!(e.mode(), Mode::Insert);
}

#[test]
fn insert_single_command() {
    let e = run("abc<caret>.\n", "idef<C-o>d2hx");
    assert_eq!(e.buffer().text(), "abcdx.\n");
    assert_eq!(e.mode(), Mode::Insert);
}

#[test]
fn delete_empty_range() {
    let e = run("<caret>hello\n", "d0");
    assert_eq!(e.buffer().text(), "hello\n");
    assert_normal(&e);
}

#[test]
fn insert_delete_previous_word() {
    let e = run("hello\n<caret>\n", "ione two three<C-w>");
    assert_eq!(e.buffer().text(), "hello\none two \n");
}

#[test]
fn toggle_char_case() {
    let e = run("<caret>hello world\n", "~~");
    assert_eq!(render(&e), "HE<caret>llo world\n");
}

#[test]
fn toggle_char_case_line_end() {
    let e = run("hello wor<caret>ld\n", "~~");
    assert_eq!(render(&e), "hello worL<caret>D\n");
}

#[test]
fn insert_at_previous_action() {
    let e = run("one\ntwo <caret>three\nfour\n", "ihello<Esc>gggi world! ");
    assert_eq!(e.buffer().text(), "one\ntwo hello world! three\nfour\n");
}

#[test]
fn delete_last_word_in_file() {
    let e = run("<caret>hello\n", "dw");
    assert_eq!(e.buffer().text(), "\n");
    assert_normal(&e);
}

#[test]
fn delete_last_word_before_eol() {
    let e = run("one <caret>two\nthree\n", "dw");
    assert_eq!(e.buffer().text(), "one \nthree\n");
}

#[test]
fn delete_last_word_before_blank_line() {
    let e = run("one <caret>two\n\nthree\n", "dw");
    assert_eq!(e.buffer().text(), "one \n\nthree\n");
}

#[test]
fn delete_last_word_before_indented_line() {
    let e = run("one <caret>two\n three\n", "dw");
    assert_eq!(e.buffer().text(), "one \n three\n");
}

#[test]
fn change_word_at_last_char() {
    let e = run("on<caret>e two three\n", "cw");
    assert_eq!(e.buffer().text(), "on two three\n");
    assert_eq!(e.mode(), Mode::Insert);
}

#[test]
fn change_word_two_words_without_whitespace() {
    let e = run("<caret>$value\n", "cw");
    assert_eq!(e.buffer().text(), "value\n");
    assert_eq!(e.mode(), Mode::Insert);
}

mod common;
use common::*;

use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing::subscriber::with_default;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(f: F) -> String {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    with_default(subscriber, f);
    let bytes = buf.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn bell_is_logged_with_its_cause() {
    let out = capture(|| {
        let mut e = engine("<caret>abc\n");
        e.feed_str("fz").unwrap();
        assert_eq!(e.metrics().bells, 1);
    });
    assert!(out.contains("actions.bell"), "log was: {out}");
    assert!(out.contains("bell"));
}

#[test]
fn operator_application_is_traced() {
    let out = capture(|| {
        run("<caret>one two\n", "dw");
    });
    assert!(out.contains("actions.operator"), "log was: {out}");
    assert!(out.contains("actions.translate"), "log was: {out}");
}

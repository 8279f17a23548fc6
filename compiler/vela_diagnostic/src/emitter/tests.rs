use super::*;
use crate::{Diagnostic, ErrorCode};
use vela_ir::Span;

const SOURCE: &str = "enamldef Foo(Base):\n    attr a = \n";

#[test]
fn terminal_renders_caret_under_column() {
    // Span of the dangling `=` on line 2.
    let span = Span::new(31, 32);
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("invalid syntax")
        .with_label(span, "here");

    let mut emitter = TerminalEmitter::new("view.enaml", SOURCE);
    emitter.emit(&diag);
    let out = emitter.finish();

    assert!(out.contains("File \"view.enaml\", line 2"), "{out}");
    assert!(out.contains("    attr a = "), "{out}");
    assert!(out.contains("error[E1001]: invalid syntax"), "{out}");
    // Caret sits under column 11 (0-based) of the rendered line.
    let caret_line = out
        .lines()
        .find(|l| l.trim_start().starts_with('^'))
        .unwrap_or("");
    assert_eq!(caret_line.len() - caret_line.trim_start().len(), 4 + 11);
}

#[test]
fn json_reports_one_based_columns() {
    let diag = Diagnostic::error(ErrorCode::E1002)
        .with_message("expected ':'")
        .with_label(Span::new(0, 8), "here");

    let mut emitter = JsonEmitter::new("view.enaml", SOURCE);
    emitter.emit(&diag);
    let out = emitter.finish();

    assert!(out.starts_with('[') && out.ends_with(']'));
    assert!(out.contains(r#""code":"E1002""#), "{out}");
    assert!(out.contains(r#""line":1,"col":1"#), "{out}");
}

#[test]
fn escape_json_handles_controls() {
    assert_eq!(escape_json("a\"b"), r#""a\"b""#);
    assert_eq!(escape_json("line\nnext"), r#""line\nnext""#);
}

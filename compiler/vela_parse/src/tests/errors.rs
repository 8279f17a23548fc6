//! Diagnostics tests: error positions, traceback rendering, lexer error
//! promotion, and the invalid-rule second pass.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use vela_diagnostic::ErrorCode;
use vela_ir::ast::decl::Module;

use crate::ErrorKind;

use super::{parse, parse_err, parse_ok, parse_with_version};

#[test]
fn test_error_position_fidelity() {
    // The error must point at the exact offending token, with the real
    // source line attached.
    let err = parse_err("d : = 1\n");
    assert_eq!(err.code, ErrorCode::E1002);
    assert_eq!(err.message, "expected annotation");
    assert_eq!(err.filename, "view.vela");
    assert_eq!(err.lineno, 1);
    assert_eq!(err.offset, 5);
    assert_eq!(err.text, "d : = 1");
}

#[test]
fn test_traceback_rendering() {
    let err = parse_err("d : = 1\n");
    assert_eq!(
        err.traceback(),
        "  File \"view.vela\", line 1\n    d : = 1\n        ^\nSyntaxError: expected annotation\n"
    );
}

#[test]
fn test_error_display() {
    let err = parse_err("d : = 1\n");
    assert_eq!(err.to_string(), "expected annotation (view.vela, line 1)");
}

#[test]
fn test_error_on_second_line() {
    let err = parse_err("x = 1\nd : = 1\n");
    assert_eq!(err.lineno, 2);
    assert_eq!(err.text, "d : = 1");
}

#[test]
fn test_print_statement_hint() {
    let err = parse_err("print 'hello'\n");
    assert_eq!(
        err.message,
        "Missing parentheses in call to 'print'. Did you mean print(...)?"
    );
}

#[test]
fn test_missing_comma_hint() {
    let err = parse_err("1 2\n");
    assert_eq!(err.message, "invalid syntax. Perhaps you forgot a comma?");
    assert_eq!(err.offset, 3);
}

#[test]
fn test_second_pass_keeps_plain_error_when_no_rule_matches() {
    let err = parse_err("x = = 1\n");
    assert_eq!(err.code, ErrorCode::E1002);
    assert!(err.message.starts_with("expected"));
}

#[test]
fn test_second_pass_never_replaces_deliberate_errors() {
    // A version gate is a precise diagnostic; the retry with recovery
    // rules must not trade it for a generic hint.
    let err = parse_with_version("type X = int\n", 11).unwrap_err();
    assert_eq!(err.code, ErrorCode::E2006);
    assert_eq!(
        err.message,
        "type statement is only supported in Python 3.12 and greater"
    );
}

#[test]
fn test_unindented_enamldef_body() {
    let err = parse_err("enamldef Main(Window):\npass\n");
    assert_eq!(err.kind, ErrorKind::Indentation);
    assert_eq!(err.kind.label(), "IndentationError");
    assert_eq!(err.message, "expected an indented block");
}

#[test]
fn test_unindented_function_body() {
    let err = parse_err("def f():\nx = 1\n");
    assert_eq!(err.code, ErrorCode::E1003);
    assert_eq!(err.message, "expected an indented block");
}

#[test]
fn test_unterminated_string() {
    let err = parse_err("x = 'abc\n");
    assert_eq!(err.code, ErrorCode::E0001);
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_unterminated_fstring() {
    let err = parse_err("x = f'abc\n");
    assert_eq!(err.code, ErrorCode::E0005);
}

#[test]
fn test_invalid_character() {
    let err = parse_err("x = ?\n");
    assert_eq!(err.code, ErrorCode::E0002);
    assert_eq!(err.lineno, 1);
}

#[test]
fn test_empty_module() {
    let parsed = parse_ok("");
    assert!(parsed.module.body.is_empty());
    assert!(parsed.module.docstring.is_none());
    assert_eq!(parsed.module.filename, "view.vela");

    let parsed = parse_ok("\n\n");
    assert!(parsed.module.body.is_empty());
}

#[test]
fn test_comment_only_module() {
    let parsed = parse_ok("# nothing here\n");
    assert!(parsed.module.body.is_empty());
}

#[test]
fn test_warnings_are_deterministic() {
    let source = "\
enamldef Foo(Base):
    Label: lbl:
        pass
    PushButton: lbl:
        pass
";
    let first = parse(source).unwrap();
    let second = parse(source).unwrap();
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.module, second.module);
}

#[test]
fn test_module_serialization_round_trip() {
    let source = "\
enamldef MyWidget(PushButton):
    attr clicked_count: int = 0
    clicked :: self.clicked_count += 1

template Field(label):
    Label:
        text << label.upper()
";
    let parsed = parse_ok(source);
    let json = serde_json::to_string(&parsed.module).unwrap();
    let restored: Module = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, parsed.module);
}

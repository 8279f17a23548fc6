#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use vela_diagnostic::{ErrorCode, LineOffsetTable};
use vela_ir::Span;

use super::{ErrorKind, SyntaxError};

#[test]
fn from_span_computes_one_based_coordinates() {
    let source = "pass\nattr x = = 1\n";
    let lines = LineOffsetTable::build(source);
    // Span of the second '=' on line 2.
    let start = source.find("= =").unwrap() as u32 + 2;
    let err = SyntaxError::from_span(
        ErrorKind::Syntax,
        ErrorCode::E1001,
        "invalid syntax",
        Span::new(start, start + 1),
        source,
        "view.vela",
        &lines,
    );
    assert_eq!(err.lineno, 2);
    assert_eq!(err.offset, 10);
    assert_eq!(err.text, "attr x = = 1");
}

#[test]
fn traceback_points_a_caret_at_the_error() {
    let err = SyntaxError {
        kind: ErrorKind::Syntax,
        code: ErrorCode::E1001,
        message: "invalid syntax".to_owned(),
        filename: "view.vela".to_owned(),
        lineno: 2,
        offset: 10,
        text: "attr x = = 1".to_owned(),
        end_lineno: 2,
        end_offset: 11,
    };
    assert_eq!(
        err.traceback(),
        "  File \"view.vela\", line 2\n    attr x = = 1\n             ^\nSyntaxError: invalid syntax\n"
    );
}

#[test]
fn indentation_errors_use_their_own_label() {
    let err = SyntaxError {
        kind: ErrorKind::Indentation,
        code: ErrorCode::E0006,
        message: "unexpected indent".to_owned(),
        filename: "m.vela".to_owned(),
        lineno: 1,
        offset: 1,
        text: String::new(),
        end_lineno: 1,
        end_offset: 1,
    };
    assert!(err.traceback().ends_with("IndentationError: unexpected indent\n"));
}

#[test]
fn display_mentions_file_and_line() {
    let err = SyntaxError {
        kind: ErrorKind::Syntax,
        code: ErrorCode::E1002,
        message: "expected ':'".to_owned(),
        filename: "m.vela".to_owned(),
        lineno: 7,
        offset: 3,
        text: "enamldef".to_owned(),
        end_lineno: 7,
        end_offset: 4,
    };
    assert_eq!(err.to_string(), "expected ':' (m.vela, line 7)");
}

#[test]
fn to_diagnostic_maps_back_to_byte_offsets() {
    let source = "pass\nattr x = = 1\n";
    let lines = LineOffsetTable::build(source);
    let start = source.find("= =").unwrap() as u32 + 2;
    let err = SyntaxError::from_span(
        ErrorKind::Syntax,
        ErrorCode::E1001,
        "invalid syntax",
        Span::new(start, start + 1),
        source,
        "view.vela",
        &lines,
    );
    let diagnostic = err.to_diagnostic(&lines);
    assert_eq!(diagnostic.code, ErrorCode::E1001);
    assert_eq!(diagnostic.message, "invalid syntax");
    assert_eq!(diagnostic.primary_span(), Some(Span::new(start, start + 1)));
}

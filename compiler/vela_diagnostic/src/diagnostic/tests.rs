use super::*;
use pretty_assertions::assert_eq;
use vela_ir::Span;

#[test]
fn builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E2002)
        .with_message("declaration of 'const x' shadows a parameter")
        .with_label(Span::new(10, 17), "shadowed here")
        .with_secondary_label(Span::new(2, 3), "parameter declared here")
        .with_note("rename the const or the parameter");

    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(10, 17)));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn warning_severity() {
    let diag = Diagnostic::warning(ErrorCode::E2001)
        .with_message("redeclaration of identifier 'lbl'");
    assert!(!diag.is_error());
    assert_eq!(diag.severity, Severity::Warning);
}

#[test]
fn default_message_is_code_description() {
    let diag = Diagnostic::error(ErrorCode::E1003);
    assert_eq!(diag.message, "expected an indented block");
}

#[test]
fn primary_span_falls_back_to_first_label() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_secondary_label(Span::new(1, 2), "context");
    assert_eq!(diag.primary_span(), Some(Span::new(1, 2)));
}

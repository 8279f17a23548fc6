#![allow(clippy::unwrap_used)]

use super::*;

fn tail(rest: &str, quote: u8, kind: QuoteKind, fstring: bool) -> Result<usize, ()> {
    skip_string_tail(rest, quote, kind, fstring)
}

#[test]
fn plain_single_quoted() {
    assert_eq!(tail("abc'", b'\'', QuoteKind::Single, false), Ok(4));
    assert_eq!(tail("'", b'\'', QuoteKind::Single, false), Ok(1));
}

#[test]
fn escaped_quote_does_not_close() {
    assert_eq!(tail(r#"a\"b" tail"#, b'"', QuoteKind::Single, false), Ok(5));
}

#[test]
fn newline_terminates_single_quoted() {
    assert_eq!(tail("abc\ndef'", b'\'', QuoteKind::Single, false), Err(()));
}

#[test]
fn triple_quoted_spans_lines() {
    assert_eq!(
        tail("line1\nline2\"\"\"", b'"', QuoteKind::Triple, false),
        Ok(14)
    );
}

#[test]
fn unterminated_is_err() {
    assert_eq!(tail("abc", b'\'', QuoteKind::Single, false), Err(()));
    assert_eq!(tail("abc\"\"", b'"', QuoteKind::Triple, false), Err(()));
}

#[test]
fn fstring_skips_interpolation() {
    // f"a{x}b" with the opening quote stripped.
    assert_eq!(tail("a{x}b\"", b'"', QuoteKind::Single, true), Ok(6));
}

#[test]
fn fstring_doubled_braces_are_literal() {
    assert_eq!(tail("{{}}\"", b'"', QuoteKind::Single, true), Ok(5));
}

#[test]
fn fstring_lone_close_brace_is_err() {
    assert_eq!(tail("a}b\"", b'"', QuoteKind::Single, true), Err(()));
}

#[test]
fn fstring_nested_quote_inside_expr() {
    // f"{d['k']}" — the inner quote must not close the outer string.
    assert_eq!(tail("{d['k']}\"", b'"', QuoteKind::Single, true), Ok(9));
}

#[test]
fn fstring_nested_fstring_inside_expr() {
    let rest = "{f'{y}'}\"";
    assert_eq!(tail(rest, b'"', QuoteKind::Single, true), Ok(rest.len()));
}

#[test]
fn fstring_format_spec_with_nested_field() {
    let rest = "{x:{width}.2f}\"";
    assert_eq!(tail(rest, b'"', QuoteKind::Single, true), Ok(rest.len()));
}

#[test]
fn fstring_brace_in_subscript_is_not_spec() {
    // The ':' inside the slice must not start a format spec.
    let rest = "{a[1:2]}\"";
    assert_eq!(tail(rest, b'"', QuoteKind::Single, true), Ok(rest.len()));
}

#[test]
fn opener_decodes_prefix_letters() {
    let o = Opener::from_slice("rb\"");
    assert!(o.prefix.raw);
    assert!(o.prefix.bytes);
    assert!(!o.prefix.fstring);
    assert_eq!(o.quote, b'"');

    let o = Opener::from_slice("F'");
    assert!(o.prefix.fstring);
    assert_eq!(o.quote, b'\'');
}

#[test]
fn quote_kind_detection() {
    assert_eq!(QuoteKind::detect(b'"', "\"\"rest"), QuoteKind::Triple);
    assert_eq!(QuoteKind::detect(b'"', "\"x"), QuoteKind::Single);
    assert_eq!(QuoteKind::detect(b'"', "rest"), QuoteKind::Single);
    assert_eq!(QuoteKind::detect(b'\'', "''"), QuoteKind::Triple);
}

#[test]
fn expr_extent_stops_at_close() {
    let b = b"x + y}rest";
    assert_eq!(expr_extent(b, 0), Ok((5, ExprStop::Close)));
}

#[test]
fn expr_extent_stops_at_conversion() {
    let b = b"value!r}";
    assert_eq!(expr_extent(b, 0), Ok((5, ExprStop::Conversion)));
}

#[test]
fn expr_extent_not_equal_is_not_conversion() {
    let b = b"a != b}";
    assert_eq!(expr_extent(b, 0), Ok((6, ExprStop::Close)));
}

#[test]
fn expr_extent_stops_at_spec_colon() {
    let b = b"value:>10}";
    assert_eq!(expr_extent(b, 0), Ok((5, ExprStop::Spec)));
}

#[test]
fn expr_extent_walrus_is_not_spec() {
    let b = b"(n := 3)}";
    assert_eq!(expr_extent(b, 0), Ok((8, ExprStop::Close)));
}

#[test]
fn expr_extent_colon_in_brackets_is_not_spec() {
    let b = b"a[1:2]}";
    assert_eq!(expr_extent(b, 0), Ok((6, ExprStop::Close)));
}

#[test]
fn expr_extent_dict_literal() {
    let b = b"{'k': 1}}";
    assert_eq!(expr_extent(b, 0), Ok((8, ExprStop::Close)));
}

#[test]
fn try_string_at_plain_and_prefixed() {
    let b = b"'ab' rest";
    assert_eq!(try_string_at(b, 0), Some(Ok(4)));

    let b = b"rb'\\x00' rest";
    assert_eq!(try_string_at(b, 0), Some(Ok(8)));

    let b = b"name";
    assert_eq!(try_string_at(b, 0), None);
}

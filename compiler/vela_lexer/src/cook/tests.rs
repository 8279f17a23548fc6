#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use vela_ir::{NumberValue, StringInterner};

use super::*;
use crate::strscan::QuoteKind;

#[test]
fn split_plain_literal() {
    let (prefix, kind, body) = split_literal("'abc'");
    assert!(!prefix.raw && !prefix.bytes && !prefix.fstring);
    assert_eq!(kind, QuoteKind::Single);
    assert_eq!(body, "abc");
}

#[test]
fn split_prefixed_triple() {
    let (prefix, kind, body) = split_literal("rb\"\"\"x\ny\"\"\"");
    assert!(prefix.raw && prefix.bytes);
    assert_eq!(kind, QuoteKind::Triple);
    assert_eq!(body, "x\ny");
}

#[test]
fn split_empty_literal() {
    let (_, kind, body) = split_literal("\"\"");
    assert_eq!(kind, QuoteKind::Single);
    assert_eq!(body, "");
}

#[test]
fn unescape_simple_escapes() {
    assert_eq!(unescape_str(r"a\nb\tc", false).unwrap(), "a\nb\tc");
    assert_eq!(unescape_str(r"\a\b\f\v", false).unwrap(), "\x07\x08\x0c\x0b");
    assert_eq!(unescape_str(r#"\'\"\\"#, false).unwrap(), "'\"\\");
}

#[test]
fn unescape_raw_keeps_backslashes() {
    assert_eq!(unescape_str(r"a\nb", true).unwrap(), "a\\nb");
}

#[test]
fn unescape_line_continuation_disappears() {
    assert_eq!(unescape_str("a\\\nb", false).unwrap(), "ab");
    assert_eq!(unescape_str("a\\\r\nb", false).unwrap(), "ab");
}

#[test]
fn unescape_hex_and_unicode() {
    assert_eq!(unescape_str(r"\x41é\U0001f600", false).unwrap(), "Aé😀");
}

#[test]
fn unescape_octal() {
    assert_eq!(unescape_str(r"\101\0\17", false).unwrap(), "A\0\x0f");
}

#[test]
fn unknown_escape_kept_verbatim() {
    assert_eq!(unescape_str(r"\d+\w", false).unwrap(), "\\d+\\w");
}

#[test]
fn truncated_hex_escape_is_error() {
    let err = unescape_str(r"ab\xZ", false).unwrap_err();
    assert_eq!(err.offset, 2);
    assert!(err.message.contains("\\xXX"));
}

#[test]
fn invalid_codepoint_is_error() {
    assert!(unescape_str(r"\ud800", false).is_err());
}

#[test]
fn bytes_escapes() {
    assert_eq!(unescape_bytes(r"\x00\xff", false).unwrap(), vec![0, 0xff]);
    assert_eq!(unescape_bytes(r"a\nb", false).unwrap(), b"a\nb".to_vec());
    assert_eq!(unescape_bytes(r"\d", false).unwrap(), b"\\d".to_vec());
}

#[test]
fn bytes_reject_non_ascii() {
    let err = unescape_bytes("héllo", false).unwrap_err();
    assert!(err.message.contains("ASCII"));
}

#[test]
fn int_cooking() {
    let interner = StringInterner::new();
    assert_eq!(int_value("42", &interner), NumberValue::Int(42));
    assert_eq!(int_value("0xFF", &interner), NumberValue::Int(255));
    assert_eq!(int_value("0o17", &interner), NumberValue::Int(15));
    assert_eq!(int_value("0b1010", &interner), NumberValue::Int(10));
    assert_eq!(int_value("1_000_000", &interner), NumberValue::Int(1_000_000));
}

#[test]
fn int_overflow_keeps_digits() {
    let interner = StringInterner::new();
    let digits = "123456789012345678901234567890";
    match int_value(digits, &interner) {
        NumberValue::BigInt(name) => assert_eq!(interner.resolve(name), digits),
        other => panic!("expected BigInt, got {other:?}"),
    }
}

#[test]
fn float_cooking() {
    assert_eq!(float_value("1.5"), NumberValue::Float(1.5f64.to_bits()));
    assert_eq!(float_value("1e3"), NumberValue::Float(1000.0f64.to_bits()));
    assert_eq!(float_value("1_0.5"), NumberValue::Float(10.5f64.to_bits()));
    assert_eq!(float_value("2."), NumberValue::Float(2.0f64.to_bits()));
    assert_eq!(float_value(".5"), NumberValue::Float(0.5f64.to_bits()));
}

#[test]
fn imaginary_cooking() {
    assert_eq!(imaginary_value("2j"), NumberValue::Complex(2.0f64.to_bits()));
    assert_eq!(
        imaginary_value("1.5J"),
        NumberValue::Complex(1.5f64.to_bits())
    );
}

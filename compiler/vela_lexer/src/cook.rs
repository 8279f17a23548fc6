//! Literal cooking: turn raw literal text into values.
//!
//! The scanner hands over whole literal slices (prefix and quotes included);
//! this module strips the quoting, processes escapes, and converts numeric
//! text into [`NumberValue`].

use vela_ir::{NumberValue, StringInterner};

use crate::strscan::{Prefix, QuoteKind};

/// A bad escape sequence, with its byte offset inside the literal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EscapeError {
    pub offset: usize,
    pub message: String,
}

/// Split a full literal slice into its prefix, quote kind, and body text
/// (the part between the quotes).
pub(crate) fn split_literal(slice: &str) -> (Prefix, QuoteKind, &str) {
    let b = slice.as_bytes();
    let mut i = 0;
    while b[i] != b'\'' && b[i] != b'"' {
        i += 1;
    }
    let opener = crate::strscan::Opener::from_slice(&slice[..=i]);
    let kind = QuoteKind::detect(opener.quote, &slice[i + 1..]);
    let open_len = if kind.is_triple() { 3 } else { 1 };
    let body = &slice[i + open_len..slice.len() - open_len];
    (opener.prefix, kind, body)
}

fn hex_digits(b: &[u8], start: usize, count: usize) -> Option<u32> {
    if start + count > b.len() {
        return None;
    }
    let mut value = 0u32;
    for &c in &b[start..start + count] {
        value = value * 16 + (c as char).to_digit(16)?;
    }
    Some(value)
}

/// Process escapes in a str literal body. Raw literals come back verbatim.
pub(crate) fn unescape_str(body: &str, raw: bool) -> Result<String, EscapeError> {
    if raw || !body.contains('\\') {
        return Ok(body.to_owned());
    }
    let b = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < b.len() {
        if b[i] != b'\\' {
            let ch_len = utf8_len(b[i]);
            out.push_str(&body[i..i + ch_len]);
            i += ch_len;
            continue;
        }
        let Some(&esc) = b.get(i + 1) else {
            // Trailing backslash cannot happen in a terminated literal.
            out.push('\\');
            break;
        };
        match esc {
            b'\n' => i += 2,
            b'\r' => {
                i += 2;
                if b.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\\' => {
                out.push('\\');
                i += 2;
            }
            b'\'' => {
                out.push('\'');
                i += 2;
            }
            b'"' => {
                out.push('"');
                i += 2;
            }
            b'a' => {
                out.push('\x07');
                i += 2;
            }
            b'b' => {
                out.push('\x08');
                i += 2;
            }
            b'f' => {
                out.push('\x0c');
                i += 2;
            }
            b'n' => {
                out.push('\n');
                i += 2;
            }
            b'r' => {
                out.push('\r');
                i += 2;
            }
            b't' => {
                out.push('\t');
                i += 2;
            }
            b'v' => {
                out.push('\x0b');
                i += 2;
            }
            b'0'..=b'7' => {
                let (value, used) = octal(b, i + 1);
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
                i += 1 + used;
            }
            b'x' => {
                let value = hex_digits(b, i + 2, 2).ok_or_else(|| EscapeError {
                    offset: i,
                    message: "truncated \\xXX escape".to_owned(),
                })?;
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
                i += 4;
            }
            b'u' => {
                let value = hex_digits(b, i + 2, 4).ok_or_else(|| EscapeError {
                    offset: i,
                    message: "truncated \\uXXXX escape".to_owned(),
                })?;
                let ch = char::from_u32(value).ok_or_else(|| EscapeError {
                    offset: i,
                    message: "invalid \\uXXXX escape".to_owned(),
                })?;
                out.push(ch);
                i += 6;
            }
            b'U' => {
                let value = hex_digits(b, i + 2, 8).ok_or_else(|| EscapeError {
                    offset: i,
                    message: "truncated \\UXXXXXXXX escape".to_owned(),
                })?;
                let ch = char::from_u32(value).ok_or_else(|| EscapeError {
                    offset: i,
                    message: "invalid \\UXXXXXXXX escape".to_owned(),
                })?;
                out.push(ch);
                i += 10;
            }
            _ => {
                // Unknown escape: kept verbatim, as CPython does.
                out.push('\\');
                let ch_len = utf8_len(esc);
                out.push_str(&body[i + 1..i + 1 + ch_len]);
                i += 1 + ch_len;
            }
        }
    }
    Ok(out)
}

/// Process escapes in a bytes literal body.
pub(crate) fn unescape_bytes(body: &str, raw: bool) -> Result<Vec<u8>, EscapeError> {
    let b = body.as_bytes();
    if let Some(pos) = b.iter().position(|&c| c >= 0x80) {
        return Err(EscapeError {
            offset: pos,
            message: "bytes can only contain ASCII literal characters".to_owned(),
        });
    }
    if raw || !body.contains('\\') {
        return Ok(b.to_vec());
    }
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    while i < b.len() {
        if b[i] != b'\\' {
            out.push(b[i]);
            i += 1;
            continue;
        }
        let Some(&esc) = b.get(i + 1) else {
            out.push(b'\\');
            break;
        };
        match esc {
            b'\n' => i += 2,
            b'\r' => {
                i += 2;
                if b.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\\' | b'\'' | b'"' => {
                out.push(esc);
                i += 2;
            }
            b'a' => {
                out.push(0x07);
                i += 2;
            }
            b'b' => {
                out.push(0x08);
                i += 2;
            }
            b'f' => {
                out.push(0x0c);
                i += 2;
            }
            b'n' => {
                out.push(b'\n');
                i += 2;
            }
            b'r' => {
                out.push(b'\r');
                i += 2;
            }
            b't' => {
                out.push(b'\t');
                i += 2;
            }
            b'v' => {
                out.push(0x0b);
                i += 2;
            }
            b'0'..=b'7' => {
                let (value, used) = octal(b, i + 1);
                out.push(value as u8);
                i += 1 + used;
            }
            b'x' => {
                let value = hex_digits(b, i + 2, 2).ok_or_else(|| EscapeError {
                    offset: i,
                    message: "truncated \\xXX escape".to_owned(),
                })?;
                out.push(value as u8);
                i += 4;
            }
            _ => {
                out.push(b'\\');
                out.push(esc);
                i += 2;
            }
        }
    }
    Ok(out)
}

/// Up to three octal digits starting at `start`. Returns (value, digits used).
fn octal(b: &[u8], start: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut used = 0;
    while used < 3 {
        match b.get(start + used) {
            Some(&c @ b'0'..=b'7') => {
                value = value * 8 + u32::from(c - b'0');
                used += 1;
            }
            _ => break,
        }
    }
    (value & 0xff, used)
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

/// Cook an integer literal. Values that do not fit an `i64` keep their
/// digit text interned.
pub(crate) fn int_value(text: &str, interner: &StringInterner) -> NumberValue {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (radix, digits) = match cleaned.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &cleaned[2..]),
        [b'0', b'o' | b'O', ..] => (8, &cleaned[2..]),
        [b'0', b'b' | b'B', ..] => (2, &cleaned[2..]),
        _ => (10, cleaned.as_str()),
    };
    match i64::from_str_radix(digits, radix) {
        Ok(value) => NumberValue::Int(value),
        Err(_) => NumberValue::BigInt(interner.intern(&cleaned)),
    }
}

/// Cook a float literal to its bit pattern.
pub(crate) fn float_value(text: &str) -> NumberValue {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let value: f64 = cleaned.parse().unwrap_or(f64::NAN);
    NumberValue::Float(value.to_bits())
}

/// Cook an imaginary literal (trailing `j` / `J`) to the bit pattern of its
/// imaginary part.
pub(crate) fn imaginary_value(text: &str) -> NumberValue {
    let trimmed = &text[..text.len() - 1];
    let cleaned: String = trimmed.chars().filter(|&c| c != '_').collect();
    let value: f64 = cleaned.parse().unwrap_or(f64::NAN);
    NumberValue::Complex(value.to_bits())
}

#[cfg(test)]
mod tests;

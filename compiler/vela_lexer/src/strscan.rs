//! Low-level string-extent scanning.
//!
//! Finds where a string literal ends without cooking it: shared by the logos
//! bump callbacks (which must consume whole literals in one token) and by the
//! f-string splitter (which re-walks the consumed text to emit the
//! START / MIDDLE / expression / END token structure).
//!
//! Everything here works on bytes and compares ASCII only, so multi-byte
//! UTF-8 sequences pass through untouched.

/// String prefix letters, decoded.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Prefix {
    pub raw: bool,
    pub bytes: bool,
    pub fstring: bool,
}

impl Prefix {
    fn from_letters(letters: &[u8]) -> Prefix {
        let mut p = Prefix::default();
        for &c in letters {
            match c {
                b'r' | b'R' => p.raw = true,
                b'b' | b'B' => p.bytes = true,
                b'f' | b'F' => p.fstring = true,
                _ => {}
            }
        }
        p
    }
}

/// The opening of a string literal: prefix letters plus one quote character.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Opener {
    pub prefix: Prefix,
    pub quote: u8,
}

impl Opener {
    /// Decode a logos slice of the form `prefix-letters quote`.
    pub fn from_slice(slice: &str) -> Opener {
        let b = slice.as_bytes();
        let quote = b[b.len() - 1];
        Opener {
            prefix: Prefix::from_letters(&b[..b.len() - 1]),
            quote,
        }
    }
}

/// Single- vs triple-quoted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum QuoteKind {
    Single,
    Triple,
}

impl QuoteKind {
    /// Given the quote character and the text after it, decide whether this
    /// is a triple-quoted literal.
    pub fn detect(quote: u8, rest: &str) -> QuoteKind {
        let b = rest.as_bytes();
        if b.len() >= 2 && b[0] == quote && b[1] == quote {
            QuoteKind::Triple
        } else {
            QuoteKind::Single
        }
    }

    pub fn is_triple(self) -> bool {
        self == QuoteKind::Triple
    }

    fn close_len(self) -> usize {
        match self {
            QuoteKind::Single => 1,
            QuoteKind::Triple => 3,
        }
    }
}

fn at_close(b: &[u8], i: usize, quote: u8, kind: QuoteKind) -> bool {
    match kind {
        QuoteKind::Single => b.get(i) == Some(&quote),
        QuoteKind::Triple => {
            b.len() >= i + 3 && b[i] == quote && b[i + 1] == quote && b[i + 2] == quote
        }
    }
}

/// Skip a string tail (text after the opening quotes) to just past the
/// closing quotes. Returns the number of bytes consumed. `Err` means the
/// literal never terminates.
pub(crate) fn skip_string_tail(
    rest: &str,
    quote: u8,
    kind: QuoteKind,
    fstring: bool,
) -> Result<usize, ()> {
    let b = rest.as_bytes();
    let mut i = 0;
    loop {
        if at_close(b, i, quote, kind) {
            return Ok(i + kind.close_len());
        }
        match b.get(i) {
            None => return Err(()),
            Some(b'\\') => i += 2,
            Some(b'\n') if !kind.is_triple() => return Err(()),
            Some(b'{') if fstring => {
                if b.get(i + 1) == Some(&b'{') {
                    i += 2;
                } else {
                    i = skip_interpolation(b, i + 1, quote, kind)?;
                }
            }
            Some(b'}') if fstring => {
                if b.get(i + 1) == Some(&b'}') {
                    i += 2;
                } else {
                    // Lone '}' in the literal part of an f-string.
                    return Err(());
                }
            }
            Some(_) => i += 1,
        }
    }
}

/// Skip one `{...}` interpolation body starting just after the `{`.
/// Returns the index just past the closing `}`.
fn skip_interpolation(b: &[u8], start: usize, quote: u8, kind: QuoteKind) -> Result<usize, ()> {
    let mut i = start;
    let mut depth = 0usize;
    loop {
        match b.get(i) {
            None => return Err(()),
            Some(b'(' | b'[') => {
                depth += 1;
                i += 1;
            }
            Some(b')' | b']') => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            Some(b'{') => {
                depth += 1;
                i += 1;
            }
            Some(b'}') => {
                if depth == 0 {
                    return Ok(i + 1);
                }
                depth -= 1;
                i += 1;
            }
            Some(b':') if depth == 0 => return skip_format_spec(b, i + 1, quote, kind),
            Some(b'\\') => i += 2,
            Some(c) if *c == b'\'' || *c == b'"' || is_prefix_letter(*c) => {
                match try_string_at(b, i) {
                    Some(end) => i = end?,
                    None => i += 1,
                }
            }
            Some(_) => i += 1,
        }
    }
}

/// Skip a format spec starting just after its `:` to just past the
/// interpolation's closing `}`.
fn skip_format_spec(b: &[u8], start: usize, quote: u8, kind: QuoteKind) -> Result<usize, ()> {
    let mut i = start;
    loop {
        if at_close(b, i, quote, kind) {
            // The enclosing string ended inside the spec.
            return Err(());
        }
        match b.get(i) {
            None => return Err(()),
            Some(b'}') => return Ok(i + 1),
            Some(b'{') => i = skip_interpolation(b, i + 1, quote, kind)?,
            Some(b'\n') if !kind.is_triple() => return Err(()),
            Some(_) => i += 1,
        }
    }
}

fn is_prefix_letter(c: u8) -> bool {
    matches!(c, b'r' | b'R' | b'b' | b'B' | b'u' | b'U' | b'f' | b'F')
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
}

/// If a (possibly prefixed) string literal starts at `i`, skip it entirely.
/// Returns `None` when `i` does not start a literal.
pub(crate) fn try_string_at(b: &[u8], i: usize) -> Option<Result<usize, ()>> {
    let mut j = i;
    while j < b.len() && is_prefix_letter(b[j]) && j - i < 2 {
        j += 1;
    }
    let quote = match b.get(j) {
        Some(&q @ (b'\'' | b'"')) => q,
        _ => return None,
    };
    if i > 0 && j > i && is_ident_continue(b[i - 1]) {
        return None;
    }
    let prefix = Prefix::from_letters(&b[i..j]);
    let after_open = j + 1;
    let kind = if b.len() >= after_open + 2 && b[after_open] == quote && b[after_open + 1] == quote
    {
        QuoteKind::Triple
    } else {
        QuoteKind::Single
    };
    let tail_start = after_open + if kind.is_triple() { 2 } else { 0 };
    let rest = match std::str::from_utf8(&b[tail_start..]) {
        Ok(s) => s,
        Err(_) => return Some(Err(())),
    };
    Some(
        skip_string_tail(rest, quote, kind, prefix.fstring).map(|consumed| tail_start + consumed),
    )
}

/// What terminated an interpolation expression.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ExprStop {
    /// `!r` / `!s` / `!a` conversion follows.
    Conversion,
    /// `:` format spec follows.
    Spec,
    /// Closing `}`.
    Close,
}

/// Find the extent of an interpolation expression starting at `start` (just
/// after the `{`). Returns the index of the terminator byte and what kind of
/// terminator it is.
pub(crate) fn expr_extent(b: &[u8], start: usize) -> Result<(usize, ExprStop), ()> {
    let mut i = start;
    let mut depth = 0usize;
    loop {
        match b.get(i) {
            None => return Err(()),
            Some(b'(' | b'[' | b'{') => {
                depth += 1;
                i += 1;
            }
            Some(b')' | b']') => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            Some(b'}') => {
                if depth == 0 {
                    return Ok((i, ExprStop::Close));
                }
                depth -= 1;
                i += 1;
            }
            Some(b':') if depth == 0 => {
                // `:=` walrus stays part of the expression.
                if b.get(i + 1) == Some(&b'=') {
                    i += 2;
                } else {
                    return Ok((i, ExprStop::Spec));
                }
            }
            Some(b'!') if depth == 0 => {
                let is_conversion = matches!(b.get(i + 1), Some(b'r' | b's' | b'a'))
                    && matches!(b.get(i + 2), Some(b'}' | b':'));
                if is_conversion {
                    return Ok((i, ExprStop::Conversion));
                }
                i += 1;
            }
            Some(b'\\') => i += 2,
            Some(c) if *c == b'\'' || *c == b'"' || is_prefix_letter(*c) => {
                match try_string_at(b, i) {
                    Some(end) => i = end?,
                    None => i += 1,
                }
            }
            Some(_) => i += 1,
        }
    }
}

#[cfg(test)]
mod tests;

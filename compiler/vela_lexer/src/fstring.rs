//! F-string splitting.
//!
//! Logos consumes an f-string as one raw token; this pass re-walks the slice
//! and emits the structured form the parser consumes:
//!
//! ```text
//! f"a{x!r:>10}b"  =>  FSTRING_START  FSTRING_MIDDLE("a")
//!                     LBRACE  NAME(x)  EXCLAIM  NAME(r)  COLON
//!                     FSTRING_MIDDLE(">10")  RBRACE
//!                     FSTRING_MIDDLE("b")  FSTRING_END
//! ```
//!
//! Interpolation expressions are handed to the fragment lexer so their
//! tokens carry source-absolute spans.

use vela_ir::{Span, StringInterner, Token, TokenKind, TokenList};

use crate::cook;
use crate::scanner;
use crate::strscan::{self, ExprStop};
use crate::LexError;

use vela_diagnostic::ErrorCode;

/// Split one whole f-string literal (prefix and quotes included) starting at
/// byte `offset` in the source, pushing its tokens onto `out`.
pub(crate) fn split_fstring(
    slice: &str,
    offset: u32,
    interner: &StringInterner,
    out: &mut TokenList,
) -> Result<(), LexError> {
    let (prefix, kind, body) = cook::split_literal(slice);
    let close_len = if kind.is_triple() { 3 } else { 1 };
    let opener_len = slice.len() - body.len() - close_len;
    let body_off = offset + opener_len as u32;

    out.push(Token::new(
        TokenKind::FStringStart,
        Span::new(offset, body_off),
    ));

    let splitter = Splitter {
        body,
        body_off,
        raw: prefix.raw,
        interner,
    };
    let end = splitter.emit_runs(out, 0, body.len())?;
    debug_assert_eq!(end, body.len());

    out.push(Token::new(
        TokenKind::FStringEnd,
        Span::new(body_off + body.len() as u32, offset + slice.len() as u32),
    ));
    Ok(())
}

struct Splitter<'a> {
    body: &'a str,
    body_off: u32,
    raw: bool,
    interner: &'a StringInterner,
}

impl Splitter<'_> {
    fn abs(&self, i: usize) -> u32 {
        self.body_off + i as u32
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.abs(start), self.abs(end))
    }

    /// Emit literal runs and interpolations from `start` to `limit`
    /// (exclusive). Returns the index actually reached, which is `limit`
    /// except when scanning a format spec that ends at `}`.
    fn emit_runs(&self, out: &mut TokenList, start: usize, limit: usize) -> Result<usize, LexError> {
        let b = self.body.as_bytes();
        let mut run = String::new();
        let mut run_start = start;
        let mut chunk_start = start;
        let mut i = start;
        while i < limit {
            match b[i] {
                b'\\' => i += 2,
                b'{' if b.get(i + 1) == Some(&b'{') => {
                    run.push_str(&self.body[chunk_start..=i]);
                    chunk_start = i + 2;
                    i += 2;
                }
                b'}' if b.get(i + 1) == Some(&b'}') => {
                    run.push_str(&self.body[chunk_start..=i]);
                    chunk_start = i + 2;
                    i += 2;
                }
                b'{' => {
                    run.push_str(&self.body[chunk_start..i]);
                    self.flush_middle(out, &mut run, run_start, i)?;
                    i = self.emit_interpolation(out, i)?;
                    run_start = i;
                    chunk_start = i;
                }
                b'}' => {
                    // Unbalanced '}' is rejected by the extent scan before
                    // we get here, so this is a spec terminator.
                    run.push_str(&self.body[chunk_start..i]);
                    self.flush_middle(out, &mut run, run_start, i)?;
                    return Ok(i);
                }
                _ => i += 1,
            }
        }
        run.push_str(&self.body[chunk_start..limit]);
        self.flush_middle(out, &mut run, run_start, limit)?;
        Ok(limit)
    }

    /// Emit one `{...}` interpolation starting at the `{`. Returns the index
    /// just past the closing `}`.
    fn emit_interpolation(&self, out: &mut TokenList, at: usize) -> Result<usize, LexError> {
        let b = self.body.as_bytes();
        out.push(Token::new(TokenKind::Lbrace, self.span(at, at + 1)));

        let (term, stop) = strscan::expr_extent(b, at + 1).map_err(|()| LexError {
            code: ErrorCode::E0005,
            message: "f-string: expecting '}'".to_owned(),
            span: self.span(at, at + 1),
        })?;
        let expr_text = &self.body[at + 1..term];
        if expr_text.trim().is_empty() {
            return Err(LexError {
                code: ErrorCode::E0005,
                message: "f-string: empty expression not allowed".to_owned(),
                span: self.span(at, term + 1),
            });
        }
        scanner::lex_fragment(expr_text, self.abs(at + 1), self.interner, out)?;

        let mut i = term;
        if stop == ExprStop::Conversion {
            out.push(Token::new(TokenKind::Exclaim, self.span(i, i + 1)));
            let conv = &self.body[i + 1..i + 2];
            out.push(Token::new(
                TokenKind::Name(self.interner.intern(conv)),
                self.span(i + 1, i + 2),
            ));
            i += 2;
        }
        if b.get(i) == Some(&b':') {
            out.push(Token::new(TokenKind::Colon, self.span(i, i + 1)));
            i = self.emit_runs(out, i + 1, self.body.len())?;
        }
        if b.get(i) != Some(&b'}') {
            return Err(LexError {
                code: ErrorCode::E0005,
                message: "f-string: expecting '}'".to_owned(),
                span: self.span(at, self.body.len()),
            });
        }
        out.push(Token::new(TokenKind::Rbrace, self.span(i, i + 1)));
        Ok(i + 1)
    }

    fn flush_middle(
        &self,
        out: &mut TokenList,
        run: &mut String,
        run_start: usize,
        run_end: usize,
    ) -> Result<(), LexError> {
        if run.is_empty() {
            return Ok(());
        }
        let cooked = cook::unescape_str(run, self.raw).map_err(|e| LexError {
            code: ErrorCode::E0004,
            message: e.message,
            span: self.span(run_start, run_end),
        })?;
        out.push(Token::new(
            TokenKind::FStringMiddle(self.interner.intern(&cooked)),
            self.span(run_start, run_end),
        ));
        run.clear();
        Ok(())
    }
}

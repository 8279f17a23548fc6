//! The scanner: raw logos tokens in, a structured [`TokenList`] out.
//!
//! This layer owns everything logos cannot express: NEWLINE suppression
//! inside brackets, the indentation stack with INDENT / DEDENT synthesis,
//! literal cooking, and f-string splitting.

use logos::Logos;
use smallvec::{smallvec, SmallVec};

use vela_diagnostic::ErrorCode;
use vela_ir::{Span, StringInterner, Token, TokenKind, TokenList};

use crate::cook;
use crate::fstring;
use crate::raw_token::RawToken;
use crate::LexError;

type IndentStack = SmallVec<[u32; 16]>;

/// Scan a whole module: cooked tokens plus NEWLINE / INDENT / DEDENT /
/// ENDMARKER block structure.
pub(crate) fn scan_module(
    source: &str,
    interner: &StringInterner,
) -> Result<TokenList, LexError> {
    let mut out = TokenList::with_capacity(source.len() / 4);
    let mut lexer = RawToken::lexer(source);
    let mut depth = 0usize;
    let mut had_content = false;
    // Indentation levels rarely nest past a handful deep.
    let mut indents: IndentStack = smallvec![0];

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        let raw = result.map_err(|()| classify_error(slice, span))?;

        match raw {
            RawToken::Comment | RawToken::LineJoin => continue,
            RawToken::Newline => {
                if depth == 0 && had_content {
                    out.push(Token::new(TokenKind::Newline, span));
                    had_content = false;
                }
                continue;
            }
            _ => {}
        }

        if depth == 0 && !had_content {
            sync_indentation(source, span.start, &mut indents, &mut out)?;
        }
        had_content = true;

        match raw {
            RawToken::Lpar | RawToken::Lsqb | RawToken::Lbrace => depth += 1,
            RawToken::Rpar | RawToken::Rsqb | RawToken::Rbrace => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
        emit(raw, slice, span, interner, &mut out)?;
    }

    let end = source.len() as u32;
    let eof = Span::new(end, end);
    if had_content {
        out.push(Token::new(TokenKind::Newline, eof));
    }
    while indents.len() > 1 {
        indents.pop();
        out.push(Token::new(TokenKind::Dedent, eof));
    }
    out.push(Token::new(TokenKind::EndMarker, eof));
    Ok(out)
}

/// Lex an f-string interpolation expression. The text is a slice of the
/// enclosing literal starting at source byte `offset`; emitted spans are
/// source-absolute. No block structure: newlines are whitespace here.
pub(crate) fn lex_fragment(
    text: &str,
    offset: u32,
    interner: &StringInterner,
    out: &mut TokenList,
) -> Result<(), LexError> {
    let mut lexer = RawToken::lexer(text);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(offset + range.start as u32, offset + range.end as u32);
        let slice = lexer.slice();
        let raw = result.map_err(|()| classify_error(slice, span))?;
        match raw {
            RawToken::Comment | RawToken::LineJoin | RawToken::Newline => continue,
            _ => emit(raw, slice, span, interner, out)?,
        }
    }
    Ok(())
}

/// A logos error token: either a literal whose bump callback failed, or an
/// unmatched character.
fn classify_error(slice: &str, span: Span) -> LexError {
    if slice.contains('\'') || slice.contains('"') {
        if slice.bytes().any(|c| c == b'f' || c == b'F') {
            LexError {
                code: ErrorCode::E0005,
                message: "unterminated f-string literal".to_owned(),
                span,
            }
        } else {
            LexError {
                code: ErrorCode::E0001,
                message: "unterminated string literal (detected at end of line or file)"
                    .to_owned(),
                span,
            }
        }
    } else {
        LexError {
            code: ErrorCode::E0002,
            message: format!("invalid character {slice:?}"),
            span,
        }
    }
}

/// Indentation column of the physical line containing `tok_start`, plus the
/// line's start offset. Tabs advance to the next multiple of eight.
fn indent_width(source: &str, tok_start: u32) -> (u32, u32) {
    let upto = &source[..tok_start as usize];
    let line_start = upto.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut col = 0u32;
    for &c in &source.as_bytes()[line_start..tok_start as usize] {
        match c {
            b' ' => col += 1,
            b'\t' => col = col / 8 * 8 + 8,
            b'\x0c' => col = 0,
            _ => break,
        }
    }
    (line_start as u32, col)
}

/// Compare the new logical line's indentation against the stack and emit
/// INDENT / DEDENT tokens.
fn sync_indentation(
    source: &str,
    tok_start: u32,
    indents: &mut IndentStack,
    out: &mut TokenList,
) -> Result<(), LexError> {
    let (line_start, col) = indent_width(source, tok_start);
    let current = indents.last().copied().unwrap_or(0);
    if col > current {
        indents.push(col);
        out.push(Token::new(
            TokenKind::Indent,
            Span::new(line_start, tok_start),
        ));
        return Ok(());
    }
    while col < indents.last().copied().unwrap_or(0) {
        indents.pop();
        out.push(Token::new(
            TokenKind::Dedent,
            Span::new(tok_start, tok_start),
        ));
    }
    if col != indents.last().copied().unwrap_or(0) {
        return Err(LexError {
            code: ErrorCode::E0006,
            message: "unindent does not match any outer indentation level".to_owned(),
            span: Span::new(line_start, tok_start),
        });
    }
    Ok(())
}

/// Cook one significant raw token and push its structured form.
fn emit(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
    out: &mut TokenList,
) -> Result<(), LexError> {
    let kind = match raw {
        RawToken::Comment | RawToken::LineJoin | RawToken::Newline => return Ok(()),

        RawToken::Ident => TokenKind::Name(interner.intern(slice)),
        RawToken::Int => TokenKind::Number(cook::int_value(slice, interner)),
        RawToken::Float => TokenKind::Number(cook::float_value(slice)),
        RawToken::Imaginary => TokenKind::Number(cook::imaginary_value(slice)),
        RawToken::StrLit => {
            let (prefix, _, body) = cook::split_literal(slice);
            let cooked = cook::unescape_str(body, prefix.raw).map_err(|e| LexError {
                code: ErrorCode::E0004,
                message: e.message,
                span,
            })?;
            TokenKind::Str(interner.intern(&cooked))
        }
        RawToken::BytesLit => {
            let (prefix, _, body) = cook::split_literal(slice);
            let cooked = cook::unescape_bytes(body, prefix.raw).map_err(|e| LexError {
                code: ErrorCode::E0004,
                message: e.message,
                span,
            })?;
            TokenKind::Bytes(cooked)
        }
        RawToken::FString => {
            return fstring::split_fstring(slice, span.start, interner, out);
        }

        RawToken::And => TokenKind::And,
        RawToken::As => TokenKind::As,
        RawToken::Assert => TokenKind::Assert,
        RawToken::Async => TokenKind::Async,
        RawToken::Await => TokenKind::Await,
        RawToken::Break => TokenKind::Break,
        RawToken::Class => TokenKind::Class,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Def => TokenKind::Def,
        RawToken::Del => TokenKind::Del,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::Except => TokenKind::Except,
        RawToken::False => TokenKind::False,
        RawToken::Finally => TokenKind::Finally,
        RawToken::For => TokenKind::For,
        RawToken::From => TokenKind::From,
        RawToken::Global => TokenKind::Global,
        RawToken::If => TokenKind::If,
        RawToken::Import => TokenKind::Import,
        RawToken::In => TokenKind::In,
        RawToken::Is => TokenKind::Is,
        RawToken::Lambda => TokenKind::Lambda,
        RawToken::None => TokenKind::None,
        RawToken::Nonlocal => TokenKind::Nonlocal,
        RawToken::Not => TokenKind::Not,
        RawToken::Or => TokenKind::Or,
        RawToken::Pass => TokenKind::Pass,
        RawToken::Raise => TokenKind::Raise,
        RawToken::Return => TokenKind::Return,
        RawToken::True => TokenKind::True,
        RawToken::Try => TokenKind::Try,
        RawToken::While => TokenKind::While,
        RawToken::With => TokenKind::With,
        RawToken::Yield => TokenKind::Yield,

        RawToken::PlusEqual => TokenKind::PlusEqual,
        RawToken::MinusEqual => TokenKind::MinusEqual,
        RawToken::StarEqual => TokenKind::StarEqual,
        RawToken::SlashEqual => TokenKind::SlashEqual,
        RawToken::DoubleSlashEqual => TokenKind::DoubleSlashEqual,
        RawToken::PercentEqual => TokenKind::PercentEqual,
        RawToken::AtEqual => TokenKind::AtEqual,
        RawToken::AmperEqual => TokenKind::AmperEqual,
        RawToken::PipeEqual => TokenKind::PipeEqual,
        RawToken::CaretEqual => TokenKind::CaretEqual,
        RawToken::LeftShiftEqual => TokenKind::LeftShiftEqual,
        RawToken::RightShiftEqual => TokenKind::RightShiftEqual,
        RawToken::DoubleStarEqual => TokenKind::DoubleStarEqual,
        RawToken::DoubleStar => TokenKind::DoubleStar,
        RawToken::DoubleSlash => TokenKind::DoubleSlash,
        RawToken::LeftShift => TokenKind::LeftShift,
        RawToken::RightShift => TokenKind::RightShift,
        RawToken::LessEqual => TokenKind::LessEqual,
        RawToken::GreaterEqual => TokenKind::GreaterEqual,
        RawToken::EqEqual => TokenKind::EqEqual,
        RawToken::NotEqual => TokenKind::NotEqual,
        RawToken::RArrow => TokenKind::RArrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::ColonEqual => TokenKind::ColonEqual,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::At => TokenKind::At,
        RawToken::Amper => TokenKind::Amper,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Less => TokenKind::Less,
        RawToken::Greater => TokenKind::Greater,
        RawToken::Exclaim => TokenKind::Exclaim,
        RawToken::Lpar => TokenKind::Lpar,
        RawToken::Rpar => TokenKind::Rpar,
        RawToken::Lsqb => TokenKind::Lsqb,
        RawToken::Rsqb => TokenKind::Rsqb,
        RawToken::Lbrace => TokenKind::Lbrace,
        RawToken::Rbrace => TokenKind::Rbrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Equal => TokenKind::Equal,
    };
    out.push(Token::new(kind, span));
    Ok(())
}

//! Raw tokens from logos (before cooking and block structure).
//!
//! A raw token stream knows nothing about indentation: NEWLINE / INDENT /
//! DEDENT synthesis happens in the [`scanner`](crate::scanner). String
//! literals (including whole f-strings) are consumed here in one piece via
//! bump callbacks so the scanner can cook or split them afterwards.

use logos::{Lexer, Logos};

use crate::strscan::{self, QuoteKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f]+")]
pub(crate) enum RawToken {
    #[regex(r"#[^\n]*")]
    Comment,

    /// Backslash line join: the following physical line continues this
    /// logical line.
    #[regex(r"\\\r?\n")]
    LineJoin,

    #[regex(r"\r?\n")]
    Newline,

    // String openers. The callback bumps past the entire literal, closing
    // quote included, so the token slice covers the whole thing.
    #[regex(r#"([fF][rR]?|[rR][fF])["']"#, scan_fstring)]
    FString,
    #[regex(r#"([bB][rR]?|[rR][bB])["']"#, scan_plain_string)]
    BytesLit,
    #[regex(r#"([rRuU])?["']"#, scan_plain_string)]
    StrLit,

    // Numeric literals. Cooked by `cook::number`.
    #[regex(r"0[xX][0-9a-fA-F](_?[0-9a-fA-F])*")]
    #[regex(r"0[oO][0-7](_?[0-7])*")]
    #[regex(r"0[bB][01](_?[01])*")]
    #[regex(r"[0-9](_?[0-9])*")]
    Int,
    #[regex(r"([0-9](_?[0-9])*)?\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"[0-9](_?[0-9])*\.([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*")]
    Float,
    #[regex(r"(([0-9](_?[0-9])*)?\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?|[0-9](_?[0-9])*\.?([eE][+-]?[0-9](_?[0-9])*)?)[jJ]")]
    Imaginary,

    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*")]
    Ident,

    // Hard keywords.
    #[token("and")]
    And,
    #[token("as")]
    As,
    #[token("assert")]
    Assert,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("break")]
    Break,
    #[token("class")]
    Class,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("del")]
    Del,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("except")]
    Except,
    #[token("False")]
    False,
    #[token("finally")]
    Finally,
    #[token("for")]
    For,
    #[token("from")]
    From,
    #[token("global")]
    Global,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("lambda")]
    Lambda,
    #[token("None")]
    None,
    #[token("nonlocal")]
    Nonlocal,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("pass")]
    Pass,
    #[token("raise")]
    Raise,
    #[token("return")]
    Return,
    #[token("True")]
    True,
    #[token("try")]
    Try,
    #[token("while")]
    While,
    #[token("with")]
    With,
    #[token("yield")]
    Yield,

    // Operators and delimiters, longest spelling first where it matters.
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("//=")]
    DoubleSlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("@=")]
    AtEqual,
    #[token("&=")]
    AmperEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("<<=")]
    LeftShiftEqual,
    #[token(">>=")]
    RightShiftEqual,
    #[token("**=")]
    DoubleStarEqual,
    #[token("**")]
    DoubleStar,
    #[token("//")]
    DoubleSlash,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqEqual,
    #[token("!=")]
    NotEqual,
    #[token("->")]
    RArrow,
    #[token("=>")]
    FatArrow,
    #[token(":=")]
    ColonEqual,
    #[token("::")]
    ColonColon,
    #[token("...")]
    Ellipsis,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("@")]
    At,
    #[token("&")]
    Amper,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("!")]
    Exclaim,
    #[token("(")]
    Lpar,
    #[token(")")]
    Rpar,
    #[token("[")]
    Lsqb,
    #[token("]")]
    Rsqb,
    #[token("{")]
    Lbrace,
    #[token("}")]
    Rbrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token("=")]
    Equal,
}

/// Bump a plain (possibly raw / bytes) string literal to its closing quote.
fn scan_plain_string(lex: &mut Lexer<RawToken>) -> Result<(), ()> {
    let opener = strscan::Opener::from_slice(lex.slice());
    let quote = QuoteKind::detect(opener.quote, lex.remainder());
    if quote.is_triple() {
        lex.bump(2);
    }
    let consumed = strscan::skip_string_tail(lex.remainder(), opener.quote, quote, false)?;
    lex.bump(consumed);
    Ok(())
}

/// Bump an entire f-string, interpolations and nested literals included.
fn scan_fstring(lex: &mut Lexer<RawToken>) -> Result<(), ()> {
    let opener = strscan::Opener::from_slice(lex.slice());
    let quote = QuoteKind::detect(opener.quote, lex.remainder());
    if quote.is_triple() {
        lex.bump(2);
    }
    let consumed = strscan::skip_string_tail(lex.remainder(), opener.quote, quote, true)?;
    lex.bump(consumed);
    Ok(())
}

//! Token types for the Vela lexer.
//!
//! The token surface is the host language's: hard keywords, operators and
//! delimiters, literals, plus the synthetic block-structure tokens
//! (NEWLINE / INDENT / DEDENT / ENDMARKER) the whitespace-sensitive grammar
//! requires. Soft keywords (`enamldef`, `attr`, `template`, `match`, ...)
//! are ordinary [`TokenKind::Name`] tokens; keyword-ness is decided by the
//! grammar rule that consumes them, never by the lexer.

use crate::{Name, Span};
use std::fmt;

/// A token with its byte span in the source.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Synthetic token with a dummy span, for tests.
    pub fn dummy(kind: TokenKind) -> Self {
        Token {
            kind,
            span: Span::DUMMY,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Cooked numeric literal value.
///
/// Floats are stored as bits so tokens stay `Eq + Hash`. Integers that do
/// not fit `i64` keep their digit text interned (the host language's integers
/// are unbounded).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumberValue {
    Int(i64),
    BigInt(Name),
    Float(u64),
    Complex(u64),
}

impl NumberValue {
    pub fn float(value: f64) -> Self {
        NumberValue::Float(value.to_bits())
    }

    pub fn complex(imag: f64) -> Self {
        NumberValue::Complex(imag.to_bits())
    }
}

/// String literal prefix flags that survive lexing.
///
/// Only the distinctions the parser acts on are kept: raw-ness is consumed
/// during cooking, so all that remains is whether the literal was a bytes
/// literal (concatenation legality) — and that is encoded structurally as
/// [`TokenKind::Bytes`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StrFlags {
    /// `u` prefix seen (accepted and ignored, host-language compatible).
    pub unicode: bool,
}

/// Token kinds for Vela.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    /// Identifier or soft keyword (interned).
    Name(Name),
    /// Numeric literal, cooked by the lexer with host-language semantics.
    Number(NumberValue),
    /// String literal, escapes already processed.
    Str(Name),
    /// Bytes literal, escapes already processed.
    Bytes(Vec<u8>),
    /// Opening quote of an f-string.
    FStringStart,
    /// Literal run inside an f-string, escapes already processed.
    FStringMiddle(Name),
    /// Closing quote of an f-string.
    FStringEnd,

    // Hard keywords.
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    False,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    None,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    True,
    Try,
    While,
    With,
    Yield,

    // Operators.
    Plus,          // +
    Minus,         // -
    Star,          // *
    DoubleStar,    // **
    Slash,         // /
    DoubleSlash,   // //
    Percent,       // %
    At,            // @
    Amper,         // &
    Pipe,          // |
    Caret,         // ^
    Tilde,         // ~
    LeftShift,     // <<  (also the subscription binding operator)
    RightShift,    // >>  (also the update binding operator)
    Less,          // <
    Greater,       // >
    LessEqual,     // <=
    GreaterEqual,  // >=
    EqEqual,       // ==
    NotEqual,      // !=
    Exclaim,       // !   (f-string conversions)

    // Delimiters.
    Lpar,          // (
    Rpar,          // )
    Lsqb,          // [
    Rsqb,          // ]
    Lbrace,        // {
    Rbrace,        // }
    Comma,         // ,
    Colon,         // :
    ColonColon,    // ::  (notification binding operator)
    ColonEqual,    // :=  (walrus; also the delegation binding operator)
    Dot,           // .
    Ellipsis,      // ...
    Semi,          // ;
    Equal,         // =
    RArrow,        // ->
    FatArrow,      // =>  (declarative func override)

    // Augmented assignment.
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    DoubleSlashEqual,
    PercentEqual,
    AtEqual,
    AmperEqual,
    PipeEqual,
    CaretEqual,
    LeftShiftEqual,
    RightShiftEqual,
    DoubleStarEqual,

    // Synthetic block-structure tokens.
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

/// Soft keywords: lexically names, keywords only in specific grammar
/// positions.
pub const SOFT_KEYWORDS: &[&str] = &[
    "_", "alias", "attr", "case", "const", "enamldef", "event", "func", "match", "pragma",
    "template", "type",
];

impl TokenKind {
    pub const TAG_NAME: u8 = 0;
    pub const TAG_NUMBER: u8 = 1;
    pub const TAG_STR: u8 = 2;
    pub const TAG_BYTES: u8 = 3;
    pub const TAG_FSTRING_START: u8 = 4;
    pub const TAG_FSTRING_MIDDLE: u8 = 5;
    pub const TAG_FSTRING_END: u8 = 6;
    pub const TAG_NEWLINE: u8 = 96;
    pub const TAG_INDENT: u8 = 97;
    pub const TAG_DEDENT: u8 = 98;
    pub const TAG_EOF: u8 = 99;

    /// Dense discriminant for the parallel tag array.
    pub const fn tag(&self) -> u8 {
        use TokenKind::*;
        match self {
            Name(_) => Self::TAG_NAME,
            Number(_) => Self::TAG_NUMBER,
            Str(_) => Self::TAG_STR,
            Bytes(_) => Self::TAG_BYTES,
            FStringStart => Self::TAG_FSTRING_START,
            FStringMiddle(_) => Self::TAG_FSTRING_MIDDLE,
            FStringEnd => Self::TAG_FSTRING_END,
            And => 7,
            As => 8,
            Assert => 9,
            Async => 10,
            Await => 11,
            Break => 12,
            Class => 13,
            Continue => 14,
            Def => 15,
            Del => 16,
            Elif => 17,
            Else => 18,
            Except => 19,
            False => 20,
            Finally => 21,
            For => 22,
            From => 23,
            Global => 24,
            If => 25,
            Import => 26,
            In => 27,
            Is => 28,
            Lambda => 29,
            None => 30,
            Nonlocal => 31,
            Not => 32,
            Or => 33,
            Pass => 34,
            Raise => 35,
            Return => 36,
            True => 37,
            Try => 38,
            While => 39,
            With => 40,
            Yield => 41,
            Plus => 42,
            Minus => 43,
            Star => 44,
            DoubleStar => 45,
            Slash => 46,
            DoubleSlash => 47,
            Percent => 48,
            At => 49,
            Amper => 50,
            Pipe => 51,
            Caret => 52,
            Tilde => 53,
            LeftShift => 54,
            RightShift => 55,
            Less => 56,
            Greater => 57,
            LessEqual => 58,
            GreaterEqual => 59,
            EqEqual => 60,
            NotEqual => 61,
            Exclaim => 62,
            Lpar => 63,
            Rpar => 64,
            Lsqb => 65,
            Rsqb => 66,
            Lbrace => 67,
            Rbrace => 68,
            Comma => 69,
            Colon => 70,
            ColonColon => 71,
            ColonEqual => 72,
            Dot => 73,
            Ellipsis => 74,
            Semi => 75,
            Equal => 76,
            RArrow => 77,
            FatArrow => 78,
            PlusEqual => 79,
            MinusEqual => 80,
            StarEqual => 81,
            SlashEqual => 82,
            DoubleSlashEqual => 83,
            PercentEqual => 84,
            AtEqual => 85,
            AmperEqual => 86,
            PipeEqual => 87,
            CaretEqual => 88,
            LeftShiftEqual => 89,
            RightShiftEqual => 90,
            DoubleStarEqual => 91,
            Newline => Self::TAG_NEWLINE,
            Indent => Self::TAG_INDENT,
            Dedent => Self::TAG_DEDENT,
            EndMarker => Self::TAG_EOF,
        }
    }

    /// Surface text for fixed-spelling tokens, used in "expected ..."
    /// messages.
    pub const fn text(&self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            And => "and",
            As => "as",
            Assert => "assert",
            Async => "async",
            Await => "await",
            Break => "break",
            Class => "class",
            Continue => "continue",
            Def => "def",
            Del => "del",
            Elif => "elif",
            Else => "else",
            Except => "except",
            False => "False",
            Finally => "finally",
            For => "for",
            From => "from",
            Global => "global",
            If => "if",
            Import => "import",
            In => "in",
            Is => "is",
            Lambda => "lambda",
            None => "None",
            Nonlocal => "nonlocal",
            Not => "not",
            Or => "or",
            Pass => "pass",
            Raise => "raise",
            Return => "return",
            True => "True",
            Try => "try",
            While => "while",
            With => "with",
            Yield => "yield",
            Plus => "+",
            Minus => "-",
            Star => "*",
            DoubleStar => "**",
            Slash => "/",
            DoubleSlash => "//",
            Percent => "%",
            At => "@",
            Amper => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            LeftShift => "<<",
            RightShift => ">>",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            EqEqual => "==",
            NotEqual => "!=",
            Exclaim => "!",
            Lpar => "(",
            Rpar => ")",
            Lsqb => "[",
            Rsqb => "]",
            Lbrace => "{",
            Rbrace => "}",
            Comma => ",",
            Colon => ":",
            ColonColon => "::",
            ColonEqual => ":=",
            Dot => ".",
            Ellipsis => "...",
            Semi => ";",
            Equal => "=",
            RArrow => "->",
            FatArrow => "=>",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            DoubleSlashEqual => "//=",
            PercentEqual => "%=",
            AtEqual => "@=",
            AmperEqual => "&=",
            PipeEqual => "|=",
            CaretEqual => "^=",
            LeftShiftEqual => "<<=",
            RightShiftEqual => ">>=",
            DoubleStarEqual => "**=",
            _ => return Option::None,
        })
    }

    /// True for the synthetic tokens that never carry source text.
    pub const fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndMarker
        )
    }
}

/// A lexed token stream with a parallel `u8` tag array for O(1) discriminant
/// checks without touching the full `TokenKind`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
    tags: Vec<u8>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        TokenList {
            tokens: Vec::with_capacity(cap),
            tags: Vec::with_capacity(cap),
        }
    }

    pub fn push(&mut self, token: Token) {
        self.tags.push(token.kind.tag());
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Dense discriminant tags, parallel to the token array.
    #[inline]
    pub fn tags(&self) -> &[u8] {
        &self.tags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    #[inline]
    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

#[cfg(test)]
mod tests;

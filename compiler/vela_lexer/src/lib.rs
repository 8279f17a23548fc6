//! Lexer for Vela source files.
//!
//! Tokenizes a Python-superset surface syntax: all of the host language's
//! tokens plus the binding operators (`<<`, `>>`, `::`, `:=` are shared
//! spellings) and `=>`. The output is a [`TokenList`] with synthetic
//! NEWLINE / INDENT / DEDENT / ENDMARKER tokens, ready for the parser.
//!
//! The pipeline has two layers: logos produces raw tokens (string literals
//! consumed whole via bump callbacks), then the [`scanner`] cooks literals,
//! splits f-strings, and synthesizes block structure.

mod cook;
mod fstring;
mod raw_token;
mod scanner;
mod strscan;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::{Span, StringInterner, TokenList};

/// Hard ceiling on source size: spans are `u32` byte offsets.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// A tokenization failure. Lexing stops at the first error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, "")
    }
}

/// Tokenize a module. Names and cooked string values are interned in
/// `interner`; the returned list always ends with ENDMARKER.
pub fn lex(source: &str, interner: &StringInterner) -> Result<TokenList, LexError> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(LexError {
            code: ErrorCode::E0007,
            message: format!("source file larger than {MAX_SOURCE_LEN} bytes"),
            span: Span::DUMMY,
        });
    }
    scanner::scan_module(source, interner)
}

//! Parse errors in the host language's reporting style.
//!
//! A [`SyntaxError`] carries everything needed to render the familiar
//! two-line traceback form: the offending source line, 1-based line and
//! column coordinates, and an end position for multi-column carets.

use vela_diagnostic::{Diagnostic, ErrorCode, LineOffsetTable};
use vela_ir::Span;
use vela_lexer::LexError;

/// Which reporting class the error belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Syntax,
    Indentation,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Indentation => "IndentationError",
        }
    }
}

/// A fatal parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({filename}, line {lineno})")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
    pub filename: String,
    /// 1-based line of the error start.
    pub lineno: u32,
    /// 1-based column of the error start.
    pub offset: u32,
    /// Text of the offending line, without its trailing newline.
    pub text: String,
    pub end_lineno: u32,
    /// 1-based column just past the error.
    pub end_offset: u32,
}

impl SyntaxError {
    /// Build an error from a byte span.
    pub(crate) fn from_span(
        kind: ErrorKind,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source: &str,
        filename: &str,
        lines: &LineOffsetTable,
    ) -> SyntaxError {
        let (lineno, col) = lines.line_col(source, span.start);
        let (end_lineno, end_col) = lines.line_col(source, span.end);
        SyntaxError {
            kind,
            code,
            message: message.into(),
            filename: filename.to_owned(),
            lineno,
            offset: col + 1,
            text: lines.line_text(source, lineno).to_owned(),
            end_lineno,
            end_offset: end_col + 1,
        }
    }

    /// Wrap a tokenization failure.
    pub fn from_lex(err: &LexError, source: &str, filename: &str) -> SyntaxError {
        let lines = LineOffsetTable::build(source);
        let kind = if err.code == ErrorCode::E0006 {
            ErrorKind::Indentation
        } else {
            ErrorKind::Syntax
        };
        SyntaxError::from_span(
            kind,
            err.code,
            err.message.clone(),
            err.span,
            source,
            filename,
            &lines,
        )
    }

    /// Render the traceback form:
    ///
    /// ```text
    ///   File "view.vela", line 3
    ///     attr height = = 10
    ///                   ^
    /// SyntaxError: invalid syntax
    /// ```
    pub fn traceback(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("  File \"{}\", line {}\n", self.filename, self.lineno));
        if !self.text.is_empty() {
            out.push_str(&format!("    {}\n", self.text));
            let width = if self.end_lineno == self.lineno && self.end_offset > self.offset {
                (self.end_offset - self.offset) as usize
            } else {
                1
            };
            let pad = " ".repeat(3 + self.offset as usize);
            out.push_str(&format!("{pad}{}\n", "^".repeat(width)));
        }
        out.push_str(&format!("{}: {}\n", self.kind.label(), self.message));
        out
    }

    pub fn to_diagnostic(&self, lines: &LineOffsetTable) -> Diagnostic {
        let start = lines
            .line_start_offset(self.lineno)
            .unwrap_or(0)
            .saturating_add(self.offset.saturating_sub(1));
        let end = lines
            .line_start_offset(self.end_lineno)
            .unwrap_or(start)
            .saturating_add(self.end_offset.saturating_sub(1));
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(Span::new(start, end.max(start)), "")
    }
}

#[cfg(test)]
mod tests;

//! Diagnosis-only productions.
//!
//! These rules never build AST. They exist to turn a bare "invalid syntax"
//! from the fast pass into a targeted message, and run only when
//! `call_invalid_rules` is set on the second pass. Each one is consulted at
//! the point where the fast pass would raise its generic error.

use vela_ir::TokenKind;

use vela_diagnostic::ErrorCode;

use crate::error::SyntaxError;
use crate::parser::Parser;

impl Parser<'_> {
    /// Consulted when a statement fails to parse at `start`. Returns the
    /// sharper error if one of the known bad shapes matches.
    pub(crate) fn invalid_statement(&mut self, start: usize) -> Option<SyntaxError> {
        if !self.call_invalid_rules {
            return None;
        }
        self.reset(start);
        if let Some(err) = self.invalid_print_call() {
            return Some(err);
        }
        self.reset(start);
        if let Some(err) = self.invalid_missing_comma() {
            return Some(err);
        }
        self.reset(start);
        None
    }

    /// `print foo` — the host language dropped the statement form long ago,
    /// but the mistake is common enough to deserve its own message.
    fn invalid_print_call(&mut self) -> Option<SyntaxError> {
        if !self.at_name("print") {
            return None;
        }
        let span = self.bump().span;
        if self.at(&TokenKind::Lpar) || self.at(&TokenKind::Newline) {
            return None;
        }
        if self.expression().ok().flatten().is_none() {
            return None;
        }
        Some(self.error_at(
            span,
            ErrorCode::E1001,
            "Missing parentheses in call to 'print'. Did you mean print(...)?",
        ))
    }

    /// Two complete expressions with nothing between them, as in `[1 2]`
    /// written at statement level: `x y`.
    fn invalid_missing_comma(&mut self) -> Option<SyntaxError> {
        self.expression().ok().flatten()?;
        let second = self.expression().ok().flatten()?;
        Some(self.error_at_node(
            second.span,
            ErrorCode::E1001,
            "invalid syntax. Perhaps you forgot a comma?",
        ))
    }
}

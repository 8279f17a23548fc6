//! Parser state and the backtracking machinery.
//!
//! The grammar modules drive a shared [`Parser`] whose contract mirrors a
//! PEG: every rule returns [`ParseResult`] where `Ok(None)` is a soft
//! failure (the rule did not match, the caller may try an alternative) and
//! `Err` is fatal (a committed construct is malformed; parsing stops).
//! Soft-failing rules restore the token position themselves via
//! [`Parser::mark`] / [`Parser::reset`].
//!
//! Expression-family results are memoized per `(position, rule)` so that
//! the heavy backtracking in statement dispatch stays linear, and
//! [`Parser::left_rec`] runs the classic seed-and-grow fixed point for the
//! left-recursive trailer chain (`x.y`, `x[i]`, `x(...)`).

use rustc_hash::FxHashMap;
use tracing::trace;

use vela_diagnostic::{Diagnostic, ErrorCode, LineOffsetTable};
use vela_ir::ast::py::Expr;
use vela_ir::{Name, NodeSpan, Span, StringInterner, Token, TokenKind, TokenList};

use crate::error::{ErrorKind, SyntaxError};

/// `Ok(Some(_))` match, `Ok(None)` soft failure, `Err` fatal.
pub(crate) type ParseResult<T> = Result<Option<T>, SyntaxError>;

/// Memoized rules.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum SyntaxRule {
    Expression,
    Disjunction,
    BitwiseOr,
    Primary,
}

type MemoKey = (usize, SyntaxRule);
type MemoValue = Option<(Expr, usize)>;

pub(crate) struct Parser<'a> {
    tokens: &'a TokenList,
    tags: &'a [u8],
    pos: usize,
    interner: &'a StringInterner,
    source: &'a str,
    pub(crate) filename: &'a str,
    lines: LineOffsetTable,
    memo: FxHashMap<MemoKey, MemoValue>,
    warnings: Vec<Diagnostic>,
    /// Second-pass flag: run the diagnosis-only rules that exist to turn a
    /// bare "invalid syntax" into a targeted message.
    pub(crate) call_invalid_rules: bool,
    /// Host minor version for gated syntax (10 enables `match`, 11
    /// `except*`, 12 `type` aliases).
    pub(crate) feature_version: u32,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        source: &'a str,
        filename: &'a str,
        tokens: &'a TokenList,
        interner: &'a StringInterner,
        feature_version: u32,
    ) -> Self {
        Parser {
            tokens,
            tags: tokens.tags(),
            pos: 0,
            interner,
            source,
            filename,
            lines: LineOffsetTable::build(source),
            memo: FxHashMap::default(),
            warnings: Vec::new(),
            call_invalid_rules: false,
            feature_version,
        }
    }

    pub(crate) fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    pub(crate) fn warn(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(code = %diagnostic.code, message = %diagnostic.message, "parse warning");
        self.warnings.push(diagnostic);
    }

    // ---- token navigation -------------------------------------------------

    /// Current position, for later [`reset`](Self::reset).
    #[inline]
    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn reset(&mut self, mark: usize) {
        debug_assert!(mark <= self.tokens.len());
        self.pos = mark;
    }

    /// Invariant: the token list ends with ENDMARKER and the position never
    /// moves past it.
    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub(crate) fn tag(&self) -> u8 {
        self.tags[self.pos]
    }

    #[inline]
    pub(crate) fn nth_tag(&self, n: usize) -> u8 {
        let idx = (self.pos + n).min(self.tags.len() - 1);
        self.tags[idx]
    }

    #[inline]
    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        self.tag() == kind.tag()
    }

    #[inline]
    pub(crate) fn at_tag(&self, tag: u8) -> bool {
        self.tag() == tag
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.tag() == TokenKind::TAG_EOF
    }

    /// Advance and return the consumed token.
    pub(crate) fn bump(&mut self) -> &Token {
        let token = &self.tokens[self.pos];
        trace!(
            pos = self.pos,
            tag = token.kind.tag(),
            span_start = token.span.start,
            span_end = token.span.end,
            "bump"
        );
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if its kind matches.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Option<Span> {
        if self.at(kind) {
            Some(self.bump().span)
        } else {
            None
        }
    }

    /// Consume a NAME token, returning its text.
    pub(crate) fn name(&mut self) -> Option<(String, Span)> {
        if let TokenKind::Name(name) = self.current().kind {
            let span = self.bump().span;
            Some((self.interner.resolve(name).to_owned(), span))
        } else {
            None
        }
    }

    /// True when the current token is the NAME `word`.
    pub(crate) fn at_name(&self, word: &str) -> bool {
        match self.current().kind {
            TokenKind::Name(name) => self.interner.resolve(name) == word,
            _ => false,
        }
    }

    /// True when the current token is the soft keyword `word`.
    pub(crate) fn at_soft(&self, word: &str) -> bool {
        debug_assert!(
            vela_ir::SOFT_KEYWORDS.contains(&word),
            "not a soft keyword: {word}"
        );
        self.at_name(word)
    }

    /// Consume the soft keyword `word` if present. Soft keywords stay plain
    /// names everywhere else in the grammar.
    pub(crate) fn soft(&mut self, word: &str) -> Option<Span> {
        if self.at_soft(word) {
            Some(self.bump().span)
        } else {
            None
        }
    }

    pub(crate) fn resolve(&self, name: Name) -> &'a str {
        self.interner.resolve(name)
    }

    // ---- expectations -----------------------------------------------------

    /// Commit point: the construct is decided, the token must be there.
    pub(crate) fn expect_forced(
        &mut self,
        kind: &TokenKind,
        what: &str,
    ) -> Result<Span, SyntaxError> {
        match self.eat(kind) {
            Some(span) => Ok(span),
            None => Err(self.expected(what)),
        }
    }

    pub(crate) fn expect_name(&mut self, what: &str) -> Result<(String, Span), SyntaxError> {
        self.name().ok_or_else(|| self.expected(what))
    }

    /// Run a rule that must match here: soft failure becomes a fatal
    /// "expected ..." error. This is the cut operator.
    pub(crate) fn require<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
        what: &str,
    ) -> Result<T, SyntaxError> {
        match rule(self)? {
            Some(value) => Ok(value),
            None => Err(self.expected(what)),
        }
    }

    pub(crate) fn expected(&self, what: &str) -> SyntaxError {
        self.error_at(
            self.current().span,
            ErrorCode::E1002,
            format!("expected {what}"),
        )
    }

    /// The catch-all failure at the current token.
    pub(crate) fn invalid_syntax(&self) -> SyntaxError {
        self.error_at(self.current().span, ErrorCode::E1001, "invalid syntax")
    }

    pub(crate) fn error_at(
        &self,
        span: Span,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> SyntaxError {
        SyntaxError::from_span(
            ErrorKind::Syntax,
            code,
            message,
            span,
            self.source,
            self.filename,
            &self.lines,
        )
    }

    /// Error positioned at an already-built node.
    pub(crate) fn error_at_node(
        &self,
        span: NodeSpan,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> SyntaxError {
        SyntaxError {
            kind: ErrorKind::Syntax,
            code,
            message: message.into(),
            filename: self.filename.to_owned(),
            lineno: span.lineno,
            offset: span.col_offset + 1,
            text: self.lines.line_text(self.source, span.lineno).to_owned(),
            end_lineno: span.end_lineno,
            end_offset: span.end_col_offset + 1,
        }
    }

    pub(crate) fn indentation_error_at(
        &self,
        span: Span,
        message: impl Into<String>,
    ) -> SyntaxError {
        SyntaxError::from_span(
            ErrorKind::Indentation,
            ErrorCode::E1003,
            message,
            span,
            self.source,
            self.filename,
            &self.lines,
        )
    }

    /// Reject syntax that needs a newer host version than configured.
    pub(crate) fn check_version(
        &self,
        min_minor: u32,
        feature: &str,
        span: Span,
    ) -> Result<(), SyntaxError> {
        if self.feature_version < min_minor {
            Err(self.error_at(
                span,
                ErrorCode::E2006,
                format!("{feature} is only supported in Python 3.{min_minor} and greater"),
            ))
        } else {
            Ok(())
        }
    }

    // ---- position bookkeeping ---------------------------------------------

    /// Node span from the token at `start_tok` through the previously
    /// consumed token.
    pub(crate) fn node_span(&self, start_tok: usize) -> NodeSpan {
        let start = self.tokens[start_tok].span.start;
        let end_tok = self.pos.saturating_sub(1).max(start_tok);
        let end = self.tokens[end_tok].span.end;
        self.byte_node_span(start, end)
    }

    pub(crate) fn byte_node_span(&self, start: u32, end: u32) -> NodeSpan {
        let (lineno, col) = self.lines.line_col(self.source, start);
        let (end_lineno, end_col) = self.lines.line_col(self.source, end);
        NodeSpan::new(lineno, col, end_lineno, end_col)
    }

    pub(crate) fn span_to_node(&self, span: Span) -> NodeSpan {
        self.byte_node_span(span.start, span.end)
    }

    /// Back-convert a node's line/column span into byte offsets, for
    /// diagnostics built after parsing.
    pub(crate) fn node_byte_span(&self, span: NodeSpan) -> Span {
        let start = self.byte_offset_of(span.lineno, span.col_offset);
        let end = self.byte_offset_of(span.end_lineno, span.end_col_offset);
        Span::new(start, end.max(start))
    }

    fn byte_offset_of(&self, lineno: u32, col: u32) -> u32 {
        let base = self.lines.line_start_offset(lineno).unwrap_or(0);
        let text = self.lines.line_text(self.source, lineno);
        let byte_col = text
            .char_indices()
            .nth(col as usize)
            .map_or(text.len(), |(i, _)| i) as u32;
        base + byte_col
    }

    // ---- memoization and left recursion -----------------------------------

    /// Packrat cache around an expression-family rule.
    pub(crate) fn memoized(
        &mut self,
        rule: SyntaxRule,
        f: impl FnOnce(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let start = self.pos;
        if let Some(cached) = self.memo.get(&(start, rule)) {
            return Ok(match cached {
                Some((node, end)) => {
                    let node = node.clone();
                    self.pos = *end;
                    Some(node)
                }
                None => None,
            });
        }
        let result = f(self)?;
        match &result {
            Some(node) => {
                self.memo.insert((start, rule), Some((node.clone(), self.pos)));
            }
            None => {
                self.pos = start;
                self.memo.insert((start, rule), None);
            }
        }
        Ok(result)
    }

    /// Seed-and-grow for a left-recursive rule: plant a failure in the memo
    /// so the recursive call inside `f` soft-fails, then re-run `f` until
    /// the match stops growing.
    pub(crate) fn left_rec(
        &mut self,
        rule: SyntaxRule,
        f: impl Fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let start = self.pos;
        if let Some(cached) = self.memo.get(&(start, rule)) {
            return Ok(match cached {
                Some((node, end)) => {
                    let node = node.clone();
                    self.pos = *end;
                    Some(node)
                }
                None => None,
            });
        }
        self.memo.insert((start, rule), None);
        let mut best: Option<(Expr, usize)> = None;
        loop {
            self.pos = start;
            let attempt = f(self)?;
            match attempt {
                Some(node) if best.as_ref().map_or(true, |(_, end)| self.pos > *end) => {
                    self.memo.insert((start, rule), Some((node.clone(), self.pos)));
                    best = Some((node, self.pos));
                }
                _ => break,
            }
        }
        match best {
            Some((node, end)) => {
                self.pos = end;
                Ok(Some(node))
            }
            None => {
                self.pos = start;
                Ok(None)
            }
        }
    }
}

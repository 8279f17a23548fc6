//! The `match` statement and its pattern subgrammar.
//!
//! `match` and `case` are soft keywords: the statement reading only wins
//! when the shape is a subject expression followed by a colon.

use vela_ir::ast::py::{
    Const, Expr, ExprContext, ExprKind, MatchCase, Operator, Pattern, PatternKind, Stmt, StmtKind,
    UnaryOpKind,
};
use vela_ir::TokenKind;

use crate::error::SyntaxError;
use crate::parser::{ParseResult, Parser};

impl Parser<'_> {
    pub(crate) fn match_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.mark();
        let Some(span) = self.soft("match") else {
            return Ok(None);
        };
        let subject = match self.star_expressions()? {
            Some(expr) => expr,
            None => {
                self.reset(start);
                return Ok(None);
            }
        };
        if self.eat(&TokenKind::Colon).is_none() {
            self.reset(start);
            return Ok(None);
        }
        self.check_version(10, "match statement", span)?;
        self.expect_forced(&TokenKind::Newline, "newline after ':'")?;
        if self.eat(&TokenKind::Indent).is_none() {
            return Err(self.indentation_error_at(self.current().span, "expected an indented block"));
        }
        let mut cases = Vec::new();
        while self.at_soft("case") {
            cases.push(self.match_case()?);
        }
        if cases.is_empty() {
            return Err(self.expected("'case' block"));
        }
        self.expect_forced(&TokenKind::Dedent, "dedent")?;
        Ok(Some(Stmt::new(
            StmtKind::Match {
                subject: Box::new(subject),
                cases,
            },
            self.node_span(start),
        )))
    }

    fn match_case(&mut self) -> Result<MatchCase, SyntaxError> {
        self.soft("case");
        let pattern = self.patterns()?;
        let guard = if self.eat(&TokenKind::If).is_some() {
            Some(self.require(Self::named_expression, "guard expression")?)
        } else {
            None
        };
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        Ok(MatchCase {
            pattern,
            guard,
            body,
        })
    }

    /// Top-level case pattern: an open sequence (`a, b`) or a single
    /// or-pattern.
    fn patterns(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        let first = self.or_pattern()?;
        if !self.at(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut patterns = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            if self.at(&TokenKind::Colon) || self.at(&TokenKind::If) {
                break;
            }
            patterns.push(self.or_pattern()?);
        }
        Ok(Pattern::new(
            PatternKind::MatchSequence { patterns },
            self.node_span(start),
        ))
    }

    /// `closed_pattern ('|' closed_pattern)* ['as' NAME]`
    fn or_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        let first = self.closed_pattern()?;
        let pattern = if self.at(&TokenKind::Pipe) {
            let mut patterns = vec![first];
            while self.eat(&TokenKind::Pipe).is_some() {
                patterns.push(self.closed_pattern()?);
            }
            Pattern::new(PatternKind::MatchOr { patterns }, self.node_span(start))
        } else {
            first
        };
        if self.eat(&TokenKind::As).is_some() {
            let (name, span) = self.expect_name("name after 'as'")?;
            if name == "_" {
                return Err(self.error_at(
                    span,
                    vela_diagnostic::ErrorCode::E1001,
                    "cannot use '_' as a target",
                ));
            }
            return Ok(Pattern::new(
                PatternKind::MatchAs {
                    pattern: Some(Box::new(pattern)),
                    name: Some(name),
                },
                self.node_span(start),
            ));
        }
        Ok(pattern)
    }

    fn closed_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        match self.tag() {
            tag if tag == TokenKind::Lpar.tag() => self.group_or_sequence_pattern(),
            tag if tag == TokenKind::Lsqb.tag() => self.bracket_sequence_pattern(),
            tag if tag == TokenKind::Lbrace.tag() => self.mapping_pattern(),
            tag if tag == TokenKind::Star.tag() => {
                self.bump();
                let (name, _) = self.expect_name("name after '*'")?;
                let name = if name == "_" { None } else { Some(name) };
                Ok(Pattern::new(
                    PatternKind::MatchStar { name },
                    self.node_span(start),
                ))
            }
            TokenKind::TAG_NAME => self.name_or_value_pattern(),
            _ => self.literal_pattern(),
        }
    }

    /// A bare name captures; a dotted or called name is a value or class
    /// pattern; `_` is the wildcard.
    fn name_or_value_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        let next = self.nth_tag(1);
        if next != TokenKind::Dot.tag() && next != TokenKind::Lpar.tag() {
            let Some((name, _)) = self.name() else {
                return Err(self.expected("pattern"));
            };
            let name = if name == "_" { None } else { Some(name) };
            return Ok(Pattern::new(
                PatternKind::MatchAs {
                    pattern: None,
                    name,
                },
                self.node_span(start),
            ));
        }
        // Dotted value: NAME ('.' NAME)+, optionally a class pattern.
        let (id, span) = self.expect_name("pattern")?;
        let mut value = Expr::new(
            ExprKind::Name {
                id,
                ctx: ExprContext::Load,
            },
            self.span_to_node(span),
        );
        while self.eat(&TokenKind::Dot).is_some() {
            let (attr, _) = self.expect_name("attribute name")?;
            value = Expr::new(
                ExprKind::Attribute {
                    value: Box::new(value),
                    attr,
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            );
        }
        if self.at(&TokenKind::Lpar) {
            return self.class_pattern(value, start);
        }
        Ok(Pattern::new(
            PatternKind::MatchValue {
                value: Box::new(value),
            },
            self.node_span(start),
        ))
    }

    /// `cls '(' [pattern (',' pattern)*] [NAME '=' pattern ...] ')'`
    fn class_pattern(&mut self, cls: Expr, start: usize) -> Result<Pattern, SyntaxError> {
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        let mut patterns = Vec::new();
        let mut kwd_attrs = Vec::new();
        let mut kwd_patterns = Vec::new();
        while !self.at(&TokenKind::Rpar) {
            if self.at_tag(TokenKind::TAG_NAME) && self.nth_tag(1) == TokenKind::Equal.tag() {
                let (attr, _) = self.expect_name("attribute name")?;
                self.bump();
                kwd_attrs.push(attr);
                kwd_patterns.push(self.or_pattern()?);
            } else {
                if !kwd_attrs.is_empty() {
                    return Err(self.error_at(
                        self.current().span,
                        vela_diagnostic::ErrorCode::E1005,
                        "positional patterns follow keyword patterns",
                    ));
                }
                patterns.push(self.or_pattern()?);
            }
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        Ok(Pattern::new(
            PatternKind::MatchClass {
                cls: Box::new(cls),
                patterns,
                kwd_attrs,
                kwd_patterns,
            },
            self.node_span(start),
        ))
    }

    /// `'(' pattern ')'` is a group; `'(' [patterns] ')'` with a comma or
    /// empty parens is a sequence.
    fn group_or_sequence_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        if self.eat(&TokenKind::Rpar).is_some() {
            return Ok(Pattern::new(
                PatternKind::MatchSequence {
                    patterns: Vec::new(),
                },
                self.node_span(start),
            ));
        }
        let first = self.or_pattern()?;
        if self.eat(&TokenKind::Rpar).is_some() {
            return Ok(first);
        }
        let mut patterns = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            if self.at(&TokenKind::Rpar) {
                break;
            }
            patterns.push(self.or_pattern()?);
        }
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        Ok(Pattern::new(
            PatternKind::MatchSequence { patterns },
            self.node_span(start),
        ))
    }

    fn bracket_sequence_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Lsqb, "'['")?;
        let mut patterns = Vec::new();
        while !self.at(&TokenKind::Rsqb) {
            patterns.push(self.or_pattern()?);
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_forced(&TokenKind::Rsqb, "']'")?;
        Ok(Pattern::new(
            PatternKind::MatchSequence { patterns },
            self.node_span(start),
        ))
    }

    /// `'{' (key ':' pattern | '**' NAME) ... '}'`
    fn mapping_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Lbrace, "'{'")?;
        let mut keys = Vec::new();
        let mut patterns = Vec::new();
        let mut rest = None;
        while !self.at(&TokenKind::Rbrace) {
            if let Some(span) = self.eat(&TokenKind::DoubleStar) {
                if rest.is_some() {
                    return Err(self.error_at(
                        span,
                        vela_diagnostic::ErrorCode::E1001,
                        "only one double star pattern is accepted",
                    ));
                }
                rest = Some(self.expect_name("name after '**'")?.0);
            } else {
                keys.push(self.mapping_key()?);
                self.expect_forced(&TokenKind::Colon, "':'")?;
                patterns.push(self.or_pattern()?);
            }
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_forced(&TokenKind::Rbrace, "'}'")?;
        Ok(Pattern::new(
            PatternKind::MatchMapping {
                keys,
                patterns,
                rest,
            },
            self.node_span(start),
        ))
    }

    /// A mapping key is a literal or a dotted value.
    fn mapping_key(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.mark();
        if self.at_tag(TokenKind::TAG_NAME) {
            let (id, span) = self.expect_name("key")?;
            let mut value = Expr::new(
                ExprKind::Name {
                    id,
                    ctx: ExprContext::Load,
                },
                self.span_to_node(span),
            );
            if !self.at(&TokenKind::Dot) {
                return Err(self.error_at_node(
                    value.span,
                    vela_diagnostic::ErrorCode::E1001,
                    "mapping pattern keys may only be literals or attribute lookups",
                ));
            }
            while self.eat(&TokenKind::Dot).is_some() {
                let (attr, _) = self.expect_name("attribute name")?;
                value = Expr::new(
                    ExprKind::Attribute {
                        value: Box::new(value),
                        attr,
                        ctx: ExprContext::Load,
                    },
                    self.node_span(start),
                );
            }
            return Ok(value);
        }
        match self.literal_expr()? {
            Some(expr) => Ok(expr),
            None => Err(self.expected("mapping pattern key")),
        }
    }

    /// Literal patterns: signed numbers, complex sums, strings, and the
    /// singleton constants.
    fn literal_pattern(&mut self) -> Result<Pattern, SyntaxError> {
        let start = self.mark();
        if self.eat(&TokenKind::None).is_some() {
            return Ok(Pattern::new(
                PatternKind::MatchSingleton { value: Const::None },
                self.node_span(start),
            ));
        }
        if self.eat(&TokenKind::True).is_some() {
            return Ok(Pattern::new(
                PatternKind::MatchSingleton {
                    value: Const::Bool { value: true },
                },
                self.node_span(start),
            ));
        }
        if self.eat(&TokenKind::False).is_some() {
            return Ok(Pattern::new(
                PatternKind::MatchSingleton {
                    value: Const::Bool { value: false },
                },
                self.node_span(start),
            ));
        }
        match self.literal_expr()? {
            Some(value) => Ok(Pattern::new(
                PatternKind::MatchValue {
                    value: Box::new(value),
                },
                self.node_span(start),
            )),
            None => Err(self.expected("pattern")),
        }
    }

    /// `['-'] NUMBER ['+' | '-' NUMBER] | strings` as a pattern value.
    fn literal_expr(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.at_tag(TokenKind::TAG_STR) || self.at_tag(TokenKind::TAG_FSTRING_START) {
            // f-strings are rejected as patterns after parsing, for the
            // clearer message.
            let Some(expr) = self.atom()? else {
                return Ok(None);
            };
            if matches!(expr.kind, ExprKind::JoinedStr { .. }) {
                return Err(self.error_at_node(
                    expr.span,
                    vela_diagnostic::ErrorCode::E1001,
                    "patterns may only match literals and attribute lookups",
                ));
            }
            return Ok(Some(expr));
        }
        let negated = self.eat(&TokenKind::Minus).is_some();
        if !self.at_tag(TokenKind::TAG_NUMBER) {
            if negated {
                return Err(self.expected("number after '-'"));
            }
            return Ok(None);
        }
        let Some(number) = self.atom()? else {
            return Ok(None);
        };
        let mut value = if negated {
            Expr::new(
                ExprKind::UnaryOp {
                    op: UnaryOpKind::USub,
                    operand: Box::new(number),
                },
                self.node_span(start),
            )
        } else {
            number
        };
        // Complex literal: real ± imaginary.
        let op = if self.at(&TokenKind::Plus) {
            Some(Operator::Add)
        } else if self.at(&TokenKind::Minus) {
            Some(Operator::Sub)
        } else {
            None
        };
        if let Some(op) = op {
            if self.nth_tag(1) == TokenKind::TAG_NUMBER {
                self.bump();
                let Some(imag) = self.atom()? else {
                    return Err(self.expected("number"));
                };
                value = Expr::new(
                    ExprKind::BinOp {
                        left: Box::new(value),
                        op,
                        right: Box::new(imag),
                    },
                    self.node_span(start),
                );
            }
        }
        Ok(Some(value))
    }
}

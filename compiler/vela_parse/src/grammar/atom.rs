//! Atoms and display forms: names, literals, parenthesized groups, list /
//! set / dict displays, comprehensions, yield expressions, and the
//! string-concatenation and f-string assembly rules.

use vela_ir::ast::py::{Comprehension, Const, Expr, ExprContext, ExprKind};
use vela_ir::{NumberValue, TokenKind};

use vela_diagnostic::ErrorCode;

use crate::error::SyntaxError;
use crate::parser::{ParseResult, Parser};

impl Parser<'_> {
    pub(crate) fn atom(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        match self.tag() {
            TokenKind::TAG_NAME => {
                let Some((id, span)) = self.name() else {
                    return Ok(None);
                };
                Ok(Some(Expr::new(
                    ExprKind::Name {
                        id,
                        ctx: ExprContext::Load,
                    },
                    self.span_to_node(span),
                )))
            }
            TokenKind::TAG_NUMBER => {
                let TokenKind::Number(value) = self.bump().kind.clone() else {
                    return Ok(None);
                };
                let value = self.cook_number(&value);
                Ok(Some(Expr::new(
                    ExprKind::Constant { value },
                    self.node_span(start),
                )))
            }
            TokenKind::TAG_STR | TokenKind::TAG_BYTES | TokenKind::TAG_FSTRING_START => {
                self.strings()
            }
            _ => {
                if self.eat(&TokenKind::True).is_some() {
                    return Ok(Some(Expr::new(
                        ExprKind::Constant {
                            value: Const::Bool { value: true },
                        },
                        self.node_span(start),
                    )));
                }
                if self.eat(&TokenKind::False).is_some() {
                    return Ok(Some(Expr::new(
                        ExprKind::Constant {
                            value: Const::Bool { value: false },
                        },
                        self.node_span(start),
                    )));
                }
                if self.eat(&TokenKind::None).is_some() {
                    return Ok(Some(Expr::new(
                        ExprKind::Constant { value: Const::None },
                        self.node_span(start),
                    )));
                }
                if self.eat(&TokenKind::Ellipsis).is_some() {
                    return Ok(Some(Expr::new(
                        ExprKind::Constant {
                            value: Const::Ellipsis,
                        },
                        self.node_span(start),
                    )));
                }
                if self.at(&TokenKind::Lpar) {
                    return self.group();
                }
                if self.at(&TokenKind::Lsqb) {
                    return self.list_display();
                }
                if self.at(&TokenKind::Lbrace) {
                    return self.dict_or_set_display();
                }
                Ok(None)
            }
        }
    }

    fn cook_number(&mut self, value: &NumberValue) -> Const {
        match value {
            NumberValue::Int(v) => Const::Int { value: *v },
            NumberValue::BigInt(name) => Const::BigInt {
                digits: self.resolve(*name).to_owned(),
            },
            NumberValue::Float(bits) => Const::Float {
                value: f64::from_bits(*bits),
            },
            NumberValue::Complex(bits) => Const::Complex {
                imag: f64::from_bits(*bits),
            },
        }
    }

    /// `'(' ')' | '(' yield_expr ')' | group | tuple | genexp`
    fn group(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Lpar).is_none() {
            return Ok(None);
        }
        if self.eat(&TokenKind::Rpar).is_some() {
            return Ok(Some(Expr::new(
                ExprKind::Tuple {
                    elts: Vec::new(),
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        if self.at(&TokenKind::Yield) {
            let inner = self.require(Self::yield_expr, "yield expression")?;
            self.expect_forced(&TokenKind::Rpar, "')'")?;
            return Ok(Some(inner));
        }
        let first = self.require(Self::star_named_expression, "expression")?;
        if self.at(&TokenKind::For) || self.at(&TokenKind::Async) {
            if let Some(generators) = self.for_if_clauses()? {
                self.expect_forced(&TokenKind::Rpar, "')'")?;
                return Ok(Some(Expr::new(
                    ExprKind::GeneratorExp {
                        elt: Box::new(first),
                        generators,
                    },
                    self.node_span(start),
                )));
            }
        }
        if self.at(&TokenKind::Comma) {
            let mut elts = vec![first];
            while self.eat(&TokenKind::Comma).is_some() {
                if self.at(&TokenKind::Rpar) {
                    break;
                }
                elts.push(self.require(Self::star_named_expression, "expression")?);
            }
            self.expect_forced(&TokenKind::Rpar, "')'")?;
            return Ok(Some(Expr::new(
                ExprKind::Tuple {
                    elts,
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        Ok(Some(first))
    }

    /// `'[' ... ']'`: list display or list comprehension.
    fn list_display(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Lsqb).is_none() {
            return Ok(None);
        }
        if self.eat(&TokenKind::Rsqb).is_some() {
            return Ok(Some(Expr::new(
                ExprKind::List {
                    elts: Vec::new(),
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        let first = self.require(Self::star_named_expression, "expression")?;
        if self.at(&TokenKind::For) || self.at(&TokenKind::Async) {
            if let Some(generators) = self.for_if_clauses()? {
                self.expect_forced(&TokenKind::Rsqb, "']'")?;
                return Ok(Some(Expr::new(
                    ExprKind::ListComp {
                        elt: Box::new(first),
                        generators,
                    },
                    self.node_span(start),
                )));
            }
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            if self.at(&TokenKind::Rsqb) {
                break;
            }
            elts.push(self.require(Self::star_named_expression, "expression")?);
        }
        self.expect_forced(&TokenKind::Rsqb, "']'")?;
        Ok(Some(Expr::new(
            ExprKind::List {
                elts,
                ctx: ExprContext::Load,
            },
            self.node_span(start),
        )))
    }

    /// `'{' ... '}'`: dict / set display or comprehension.
    fn dict_or_set_display(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Lbrace).is_none() {
            return Ok(None);
        }
        if self.eat(&TokenKind::Rbrace).is_some() {
            return Ok(Some(Expr::new(
                ExprKind::Dict {
                    keys: Vec::new(),
                    values: Vec::new(),
                },
                self.node_span(start),
            )));
        }
        // `**mapping` commits to a dict display.
        if self.eat(&TokenKind::DoubleStar).is_some() {
            let value = self.require(Self::bitwise_or, "expression after '**'")?;
            let mut keys = vec![None];
            let mut values = vec![value];
            self.dict_tail(&mut keys, &mut values)?;
            self.expect_forced(&TokenKind::Rbrace, "'}'")?;
            return Ok(Some(Expr::new(
                ExprKind::Dict { keys, values },
                self.node_span(start),
            )));
        }
        let first = self.require(Self::star_named_expression, "expression")?;
        if self.eat(&TokenKind::Colon).is_some() {
            let value = self.require(Self::expression, "expression after ':'")?;
            if self.at(&TokenKind::For) || self.at(&TokenKind::Async) {
                if let Some(generators) = self.for_if_clauses()? {
                    self.expect_forced(&TokenKind::Rbrace, "'}'")?;
                    return Ok(Some(Expr::new(
                        ExprKind::DictComp {
                            key: Box::new(first),
                            value: Box::new(value),
                            generators,
                        },
                        self.node_span(start),
                    )));
                }
            }
            let mut keys = vec![Some(first)];
            let mut values = vec![value];
            if self.eat(&TokenKind::Comma).is_some() {
                self.dict_entries(&mut keys, &mut values)?;
            }
            self.expect_forced(&TokenKind::Rbrace, "'}'")?;
            return Ok(Some(Expr::new(
                ExprKind::Dict { keys, values },
                self.node_span(start),
            )));
        }
        if self.at(&TokenKind::For) || self.at(&TokenKind::Async) {
            if let Some(generators) = self.for_if_clauses()? {
                self.expect_forced(&TokenKind::Rbrace, "'}'")?;
                return Ok(Some(Expr::new(
                    ExprKind::SetComp {
                        elt: Box::new(first),
                        generators,
                    },
                    self.node_span(start),
                )));
            }
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            if self.at(&TokenKind::Rbrace) {
                break;
            }
            elts.push(self.require(Self::star_named_expression, "expression")?);
        }
        self.expect_forced(&TokenKind::Rbrace, "'}'")?;
        Ok(Some(Expr::new(
            ExprKind::Set { elts },
            self.node_span(start),
        )))
    }

    /// A `,`-led continuation of dict entries after the first one.
    fn dict_tail(
        &mut self,
        keys: &mut Vec<Option<Expr>>,
        values: &mut Vec<Expr>,
    ) -> Result<(), SyntaxError> {
        if self.eat(&TokenKind::Comma).is_some() {
            self.dict_entries(keys, values)?;
        }
        Ok(())
    }

    fn dict_entries(
        &mut self,
        keys: &mut Vec<Option<Expr>>,
        values: &mut Vec<Expr>,
    ) -> Result<(), SyntaxError> {
        loop {
            if self.at(&TokenKind::Rbrace) {
                return Ok(());
            }
            if self.eat(&TokenKind::DoubleStar).is_some() {
                let value = self.require(Self::bitwise_or, "expression after '**'")?;
                keys.push(None);
                values.push(value);
            } else {
                let key = self.require(Self::expression, "expression")?;
                self.expect_forced(&TokenKind::Colon, "':'")?;
                let value = self.require(Self::expression, "expression after ':'")?;
                keys.push(Some(key));
                values.push(value);
            }
            if self.eat(&TokenKind::Comma).is_none() {
                return Ok(());
            }
        }
    }

    /// `('async'? 'for' star_targets 'in' disjunction ('if' disjunction)*)+`
    pub(crate) fn for_if_clauses(&mut self) -> ParseResult<Vec<Comprehension>> {
        let mut out = Vec::new();
        loop {
            let clause_start = self.mark();
            let is_async = self.eat(&TokenKind::Async).is_some();
            if self.eat(&TokenKind::For).is_none() {
                self.reset(clause_start);
                break;
            }
            let target = self.require(Self::star_targets, "comprehension target")?;
            self.expect_forced(&TokenKind::In, "'in'")?;
            let iter = self.require(Self::disjunction, "expression after 'in'")?;
            let mut ifs = Vec::new();
            while self.eat(&TokenKind::If).is_some() {
                ifs.push(self.require(Self::disjunction, "expression after 'if'")?);
            }
            out.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        if out.is_empty() {
            Ok(None)
        } else {
            Ok(Some(out))
        }
    }

    /// `'yield' ['from' expression | star_expressions]`
    pub(crate) fn yield_expr(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Yield).is_none() {
            return Ok(None);
        }
        if self.eat(&TokenKind::From).is_some() {
            let value = self.require(Self::expression, "expression after 'yield from'")?;
            return Ok(Some(Expr::new(
                ExprKind::YieldFrom {
                    value: Box::new(value),
                },
                self.node_span(start),
            )));
        }
        let value = self.star_expressions()?;
        Ok(Some(Expr::new(
            ExprKind::Yield {
                value: value.map(Box::new),
            },
            self.node_span(start),
        )))
    }

    // ---- string assembly --------------------------------------------------

    /// Adjacent string, bytes, and f-string literals concatenate into a
    /// single node. Mixing bytes and non-bytes is rejected; one formatted
    /// piece makes the whole result a JoinedStr.
    fn strings(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let mut text = String::new();
        let mut bytes: Vec<u8> = Vec::new();
        let mut joined: Vec<Expr> = Vec::new();
        let mut saw_str = false;
        let mut saw_bytes = false;
        let mut saw_fstring = false;
        loop {
            match self.tag() {
                TokenKind::TAG_STR => {
                    let piece_start = self.mark();
                    let TokenKind::Str(name) = self.bump().kind.clone() else {
                        break;
                    };
                    saw_str = true;
                    text.push_str(self.resolve(name));
                    let span = self.node_span(piece_start);
                    joined.push(Expr::new(
                        ExprKind::Constant {
                            value: Const::Str {
                                value: self.resolve(name).to_owned(),
                            },
                        },
                        span,
                    ));
                }
                TokenKind::TAG_BYTES => {
                    let TokenKind::Bytes(piece) = self.bump().kind.clone() else {
                        break;
                    };
                    saw_bytes = true;
                    bytes.extend_from_slice(&piece);
                }
                TokenKind::TAG_FSTRING_START => {
                    saw_fstring = true;
                    let values = self.fstring_literal()?;
                    joined.extend(values);
                }
                _ => break,
            }
        }
        if !saw_str && !saw_bytes && !saw_fstring {
            return Ok(None);
        }
        if saw_bytes && (saw_str || saw_fstring) {
            return Err(self.error_at(
                self.current().span,
                ErrorCode::E1007,
                "cannot mix bytes and nonbytes literals",
            ));
        }
        let span = self.node_span(start);
        if saw_bytes {
            return Ok(Some(Expr::new(
                ExprKind::Constant {
                    value: Const::Bytes { value: bytes },
                },
                span,
            )));
        }
        if saw_fstring {
            return Ok(Some(Expr::new(
                ExprKind::JoinedStr {
                    values: merge_constant_runs(joined),
                },
                span,
            )));
        }
        Ok(Some(Expr::new(
            ExprKind::Constant {
                value: Const::Str { value: text },
            },
            span,
        )))
    }

    /// One f-string literal: FSTRING_START, middles and replacement fields,
    /// FSTRING_END. Returns the value sequence for a JoinedStr.
    fn fstring_literal(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect_forced(&TokenKind::FStringStart, "f-string")?;
        let mut values = Vec::new();
        loop {
            match self.tag() {
                TokenKind::TAG_FSTRING_MIDDLE => {
                    let piece_start = self.mark();
                    let TokenKind::FStringMiddle(name) = self.bump().kind.clone() else {
                        return Err(self.invalid_syntax());
                    };
                    let span = self.node_span(piece_start);
                    values.push(Expr::new(
                        ExprKind::Constant {
                            value: Const::Str {
                                value: self.resolve(name).to_owned(),
                            },
                        },
                        span,
                    ));
                }
                tag if tag == TokenKind::Lbrace.tag() => {
                    values.push(self.formatted_value()?);
                }
                TokenKind::TAG_FSTRING_END => {
                    self.bump();
                    return Ok(values);
                }
                _ => return Err(self.invalid_syntax()),
            }
        }
    }

    /// `'{' expression ['!' conversion] [':' format_spec] '}'`
    fn formatted_value(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Lbrace, "'{'")?;
        let value = self.require(Self::star_expressions, "expression in f-string")?;
        let mut conversion: i8 = -1;
        if self.eat(&TokenKind::Exclaim).is_some() {
            let (conv, span) = self.expect_name("conversion character")?;
            conversion = match conv.as_str() {
                "s" => b's' as i8,
                "r" => b'r' as i8,
                "a" => b'a' as i8,
                _ => {
                    return Err(self.error_at(
                        span,
                        ErrorCode::E1001,
                        "f-string: invalid conversion character: expected 's', 'r', or 'a'",
                    ));
                }
            };
        }
        let format_spec = if self.eat(&TokenKind::Colon).is_some() {
            let spec_start = self.mark();
            let mut pieces = Vec::new();
            loop {
                match self.tag() {
                    TokenKind::TAG_FSTRING_MIDDLE => {
                        let piece_start = self.mark();
                        let TokenKind::FStringMiddle(name) = self.bump().kind.clone() else {
                            return Err(self.invalid_syntax());
                        };
                        let span = self.node_span(piece_start);
                        pieces.push(Expr::new(
                            ExprKind::Constant {
                                value: Const::Str {
                                    value: self.resolve(name).to_owned(),
                                },
                            },
                            span,
                        ));
                    }
                    tag if tag == TokenKind::Lbrace.tag() => {
                        pieces.push(self.formatted_value()?);
                    }
                    _ => break,
                }
            }
            Some(Box::new(Expr::new(
                ExprKind::JoinedStr { values: pieces },
                self.node_span(spec_start),
            )))
        } else {
            None
        };
        self.expect_forced(&TokenKind::Rbrace, "'}'")?;
        Ok(Expr::new(
            ExprKind::FormattedValue {
                value: Box::new(value),
                conversion,
                format_spec,
            },
            self.node_span(start),
        ))
    }
}

/// Merge adjacent `Constant` strings in a JoinedStr value list.
fn merge_constant_runs(values: Vec<Expr>) -> Vec<Expr> {
    let mut out: Vec<Expr> = Vec::with_capacity(values.len());
    for value in values {
        let merged = match (out.last_mut(), &value.kind) {
            (
                Some(Expr {
                    kind:
                        ExprKind::Constant {
                            value: Const::Str { value: prev },
                        },
                    span: prev_span,
                }),
                ExprKind::Constant {
                    value: Const::Str { value: next },
                },
            ) => {
                prev.push_str(next);
                *prev_span = prev_span.to(value.span);
                true
            }
            _ => false,
        };
        if !merged {
            out.push(value);
        }
    }
    out
}

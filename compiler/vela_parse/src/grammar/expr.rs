//! Expression grammar.
//!
//! Precedence is encoded structurally, one rule per level, mirroring the
//! host grammar: ternary / lambda at the top, then `or`, `and`, `not`,
//! comparisons, the bitwise and arithmetic ladders, unary operators, power,
//! `await`, and finally the left-recursive trailer chain (attribute access,
//! calls, subscripts) over atoms.

use vela_ir::ast::py::{
    BoolOpKind, CmpOp, Expr, ExprContext, ExprKind, Keyword, Operator, UnaryOpKind,
};
use vela_ir::TokenKind;

use crate::error::SyntaxError;
use crate::parser::{ParseResult, Parser, SyntaxRule};
use crate::stack::ensure_sufficient_stack;

impl Parser<'_> {
    /// `expression: lambda | disjunction 'if' disjunction 'else' expression
    /// | disjunction`
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| {
            self.memoized(SyntaxRule::Expression, |p| p.expression_inner())
        })
    }

    fn expression_inner(&mut self) -> ParseResult<Expr> {
        if self.at(&TokenKind::Lambda) {
            return self.lambda_expr();
        }
        let start = self.mark();
        let Some(body) = self.disjunction()? else {
            return Ok(None);
        };
        // The ternary alternative: backtracks when no 'else' follows, so
        // comprehension filters (`... if cond`) still parse.
        let before_if = self.mark();
        if self.eat(&TokenKind::If).is_some() {
            if let Some(test) = self.disjunction()? {
                if self.eat(&TokenKind::Else).is_some() {
                    let orelse = self.require(Self::expression, "expression after 'else'")?;
                    return Ok(Some(Expr::new(
                        ExprKind::IfExp {
                            test: Box::new(test),
                            body: Box::new(body),
                            orelse: Box::new(orelse),
                        },
                        self.node_span(start),
                    )));
                }
            }
            self.reset(before_if);
        }
        Ok(Some(body))
    }

    /// `lambda params ':' expression` — parameters without annotations.
    fn lambda_expr(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Lambda).is_none() {
            return Ok(None);
        }
        let args = self.parameter_list(false)?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.require(Self::expression, "expression")?;
        Ok(Some(Expr::new(
            ExprKind::Lambda {
                args: Box::new(args),
                body: Box::new(body),
            },
            self.node_span(start),
        )))
    }

    /// `NAME ':=' expression | expression`
    pub(crate) fn named_expression(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.at_tag(TokenKind::TAG_NAME) && self.nth_tag(1) == TokenKind::ColonEqual.tag() {
            let Some((id, span)) = self.name() else {
                return Ok(None);
            };
            let target = Expr::new(
                ExprKind::Name {
                    id,
                    ctx: ExprContext::Store,
                },
                self.span_to_node(span),
            );
            self.bump();
            let value = self.require(Self::expression, "expression after ':='")?;
            return Ok(Some(Expr::new(
                ExprKind::NamedExpr {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                self.node_span(start),
            )));
        }
        self.expression()
    }

    /// `'*' bitwise_or | expression`
    pub(crate) fn star_expression(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Star).is_some() {
            let value = self.require(Self::bitwise_or, "expression after '*'")?;
            return Ok(Some(Expr::new(
                ExprKind::Starred {
                    value: Box::new(value),
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        self.expression()
    }

    /// `'*' bitwise_or | named_expression`
    pub(crate) fn star_named_expression(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Star).is_some() {
            let value = self.require(Self::bitwise_or, "expression after '*'")?;
            return Ok(Some(Expr::new(
                ExprKind::Starred {
                    value: Box::new(value),
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        self.named_expression()
    }

    /// Statement-level expression list: a bare comma builds a tuple.
    pub(crate) fn star_expressions(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(first) = self.star_expression()? else {
            return Ok(None);
        };
        if !self.at(&TokenKind::Comma) {
            return Ok(Some(first));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            match self.star_expression()? {
                Some(e) => elts.push(e),
                None => break,
            }
        }
        Ok(Some(Expr::new(
            ExprKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            self.node_span(start),
        )))
    }

    pub(crate) fn disjunction(&mut self) -> ParseResult<Expr> {
        self.memoized(SyntaxRule::Disjunction, |p| p.disjunction_inner())
    }

    fn disjunction_inner(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(first) = self.conjunction()? else {
            return Ok(None);
        };
        if !self.at(&TokenKind::Or) {
            return Ok(Some(first));
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::Or).is_some() {
            values.push(self.require(Self::conjunction, "expression after 'or'")?);
        }
        Ok(Some(Expr::new(
            ExprKind::BoolOp {
                op: BoolOpKind::Or,
                values,
            },
            self.node_span(start),
        )))
    }

    fn conjunction(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(first) = self.inversion()? else {
            return Ok(None);
        };
        if !self.at(&TokenKind::And) {
            return Ok(Some(first));
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::And).is_some() {
            values.push(self.require(Self::inversion, "expression after 'and'")?);
        }
        Ok(Some(Expr::new(
            ExprKind::BoolOp {
                op: BoolOpKind::And,
                values,
            },
            self.node_span(start),
        )))
    }

    fn inversion(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Not).is_some() {
            let operand = self.require(Self::inversion, "expression after 'not'")?;
            return Ok(Some(Expr::new(
                ExprKind::UnaryOp {
                    op: UnaryOpKind::Not,
                    operand: Box::new(operand),
                },
                self.node_span(start),
            )));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(left) = self.bitwise_or()? else {
            return Ok(None);
        };
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.comparison_op() {
            comparators.push(self.require(Self::bitwise_or, "expression")?);
            ops.push(op);
        }
        if ops.is_empty() {
            return Ok(Some(left));
        }
        Ok(Some(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            self.node_span(start),
        )))
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.current().kind {
            TokenKind::EqEqual => CmpOp::Eq,
            TokenKind::NotEqual => CmpOp::NotEq,
            TokenKind::Less => CmpOp::Lt,
            TokenKind::LessEqual => CmpOp::LtE,
            TokenKind::Greater => CmpOp::Gt,
            TokenKind::GreaterEqual => CmpOp::GtE,
            TokenKind::In => CmpOp::In,
            TokenKind::Is => {
                self.bump();
                if self.eat(&TokenKind::Not).is_some() {
                    return Some(CmpOp::IsNot);
                }
                return Some(CmpOp::Is);
            }
            TokenKind::Not if self.nth_tag(1) == TokenKind::In.tag() => {
                self.bump();
                self.bump();
                return Some(CmpOp::NotIn);
            }
            _ => return None,
        };
        self.bump();
        Some(op)
    }

    /// Left-recursive: `bitwise_or '|' bitwise_xor | bitwise_xor`, resolved
    /// with the seed/grow fixed point so `a | b | c` associates left.
    pub(crate) fn bitwise_or(&mut self) -> ParseResult<Expr> {
        self.left_rec(SyntaxRule::BitwiseOr, |p| {
            let start = p.mark();
            if let Some(left) = p.bitwise_or()? {
                if p.eat(&TokenKind::Pipe).is_some() {
                    let right = p.require(Self::bitwise_xor, "expression after '|'")?;
                    return Ok(Some(Expr::new(
                        ExprKind::BinOp {
                            left: Box::new(left),
                            op: Operator::BitOr,
                            right: Box::new(right),
                        },
                        p.node_span(start),
                    )));
                }
                p.reset(start);
            }
            p.bitwise_xor()
        })
    }

    fn bitwise_xor(&mut self) -> ParseResult<Expr> {
        self.binary_chain(Self::bitwise_and, &[(TokenKind::Caret, Operator::BitXor)])
    }

    fn bitwise_and(&mut self) -> ParseResult<Expr> {
        self.binary_chain(Self::shift_expr, &[(TokenKind::Amper, Operator::BitAnd)])
    }

    fn shift_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            Self::sum,
            &[
                (TokenKind::LeftShift, Operator::LShift),
                (TokenKind::RightShift, Operator::RShift),
            ],
        )
    }

    fn sum(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            Self::term,
            &[
                (TokenKind::Plus, Operator::Add),
                (TokenKind::Minus, Operator::Sub),
            ],
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            Self::factor,
            &[
                (TokenKind::Star, Operator::Mult),
                (TokenKind::Slash, Operator::Div),
                (TokenKind::DoubleSlash, Operator::FloorDiv),
                (TokenKind::Percent, Operator::Mod),
                (TokenKind::At, Operator::MatMult),
            ],
        )
    }

    /// Left-associative loop over one precedence level.
    fn binary_chain(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        table: &[(TokenKind, Operator)],
    ) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(mut left) = operand(self)? else {
            return Ok(None);
        };
        'outer: loop {
            for (token, op) in table {
                if self.eat(token).is_some() {
                    let right = self.require(operand, "expression")?;
                    left = Expr::new(
                        ExprKind::BinOp {
                            left: Box::new(left),
                            op: *op,
                            right: Box::new(right),
                        },
                        self.node_span(start),
                    );
                    continue 'outer;
                }
            }
            break;
        }
        Ok(Some(left))
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| {
            let start = self.mark();
            let op = match self.current().kind {
                TokenKind::Plus => Some(UnaryOpKind::UAdd),
                TokenKind::Minus => Some(UnaryOpKind::USub),
                TokenKind::Tilde => Some(UnaryOpKind::Invert),
                _ => None,
            };
            if let Some(op) = op {
                self.bump();
                let operand = self.require(Self::factor, "expression")?;
                return Ok(Some(Expr::new(
                    ExprKind::UnaryOp {
                        op,
                        operand: Box::new(operand),
                    },
                    self.node_span(start),
                )));
            }
            self.power()
        })
    }

    /// `await_primary ['**' factor]` — right associative.
    fn power(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(base) = self.await_primary()? else {
            return Ok(None);
        };
        if self.eat(&TokenKind::DoubleStar).is_some() {
            let exp = self.require(Self::factor, "expression after '**'")?;
            return Ok(Some(Expr::new(
                ExprKind::BinOp {
                    left: Box::new(base),
                    op: Operator::Pow,
                    right: Box::new(exp),
                },
                self.node_span(start),
            )));
        }
        Ok(Some(base))
    }

    fn await_primary(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Await).is_some() {
            let value = self.require(Self::primary, "expression after 'await'")?;
            return Ok(Some(Expr::new(
                ExprKind::Await {
                    value: Box::new(value),
                },
                self.node_span(start),
            )));
        }
        self.primary()
    }

    /// The trailer chain, genuinely left-recursive:
    /// `primary '.' NAME | primary '(' args ')' | primary '[' slices ']' |
    /// atom`
    pub(crate) fn primary(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| {
            self.left_rec(SyntaxRule::Primary, |p| {
                let start = p.mark();
                if let Some(value) = p.primary()? {
                    if let Some(trailed) = p.trailer(value, start)? {
                        return Ok(Some(trailed));
                    }
                    p.reset(start);
                }
                p.atom()
            })
        })
    }

    /// One trailer applied to an already-parsed `primary`.
    fn trailer(&mut self, value: Expr, start: usize) -> ParseResult<Expr> {
        if self.eat(&TokenKind::Dot).is_some() {
            let (attr, _) = self.expect_name("attribute name after '.'")?;
            return Ok(Some(Expr::new(
                ExprKind::Attribute {
                    value: Box::new(value),
                    attr,
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        if self.at(&TokenKind::Lpar) {
            let (args, keywords) = self.call_arguments()?;
            return Ok(Some(Expr::new(
                ExprKind::Call {
                    func: Box::new(value),
                    args,
                    keywords,
                },
                self.node_span(start),
            )));
        }
        if self.eat(&TokenKind::Lsqb).is_some() {
            let slice = self.require(Self::slices, "subscript")?;
            self.expect_forced(&TokenKind::Rsqb, "']'")?;
            return Ok(Some(Expr::new(
                ExprKind::Subscript {
                    value: Box::new(value),
                    slice: Box::new(slice),
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        Ok(None)
    }

    /// `'(' [arguments] ')'` including the sole-argument generator form
    /// `f(x for x in xs)`.
    pub(crate) fn call_arguments(&mut self) -> Result<(Vec<Expr>, Vec<Keyword>), SyntaxError> {
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        if self.eat(&TokenKind::Rpar).is_some() {
            return Ok((Vec::new(), Vec::new()));
        }
        // Sole unparenthesized generator argument.
        let gen_mark = self.mark();
        if let Some(elt) = self.named_expression()? {
            if self.at(&TokenKind::For) || self.at(&TokenKind::Async) {
                if let Some(generators) = self.for_if_clauses()? {
                    let genexp = Expr::new(
                        ExprKind::GeneratorExp {
                            elt: Box::new(elt),
                            generators,
                        },
                        self.node_span(gen_mark),
                    );
                    if self.at(&TokenKind::Comma) {
                        return Err(self.error_at(
                            self.current().span,
                            vela_diagnostic::ErrorCode::E1006,
                            "Generator expression must be parenthesized",
                        ));
                    }
                    self.expect_forced(&TokenKind::Rpar, "')'")?;
                    return Ok((vec![genexp], Vec::new()));
                }
            }
        }
        self.reset(gen_mark);
        let (args, keywords) = self.argument_list()?;
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        Ok((args, keywords))
    }

    /// Comma-separated arguments up to the closing paren: positional and
    /// starred into `args`, `name=value` and `**kwargs` into `keywords`,
    /// rejecting positional-after-keyword.
    fn argument_list(&mut self) -> Result<(Vec<Expr>, Vec<Keyword>), SyntaxError> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();
        loop {
            if self.at(&TokenKind::Rpar) {
                break;
            }
            let item_start = self.mark();
            if self.eat(&TokenKind::DoubleStar).is_some() {
                let value = self.require(Self::expression, "expression after '**'")?;
                let span = self.node_span(item_start);
                keywords.push(Keyword {
                    arg: None,
                    value,
                    span,
                });
            } else if self.eat(&TokenKind::Star).is_some() {
                let value = self.require(Self::expression, "expression after '*'")?;
                if keywords.iter().any(|k| k.arg.is_none()) {
                    return Err(self.error_at(
                        self.current().span,
                        vela_diagnostic::ErrorCode::E1005,
                        "iterable argument unpacking follows keyword argument unpacking",
                    ));
                }
                let span = self.node_span(item_start);
                args.push(Expr::new(
                    ExprKind::Starred {
                        value: Box::new(value),
                        ctx: ExprContext::Load,
                    },
                    span,
                ));
            } else if self.at_tag(TokenKind::TAG_NAME)
                && self.nth_tag(1) == TokenKind::Equal.tag()
            {
                let Some((arg, _)) = self.name() else {
                    return Err(self.invalid_syntax());
                };
                self.bump();
                let value = self.require(Self::expression, "expression after '='")?;
                let span = self.node_span(item_start);
                keywords.push(Keyword {
                    arg: Some(arg),
                    value,
                    span,
                });
            } else {
                let value = self.require(Self::named_expression, "expression")?;
                if !keywords.is_empty() {
                    return Err(self.error_at(
                        self.current().span,
                        vela_diagnostic::ErrorCode::E1005,
                        "positional argument follows keyword argument",
                    ));
                }
                args.push(value);
            }
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok((args, keywords))
    }

    /// `slices: slice (',' slice)* [',']` — a comma builds a tuple slice.
    fn slices(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(first) = self.slice()? else {
            return Ok(None);
        };
        if !self.at(&TokenKind::Comma) {
            return Ok(Some(first));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            match self.slice()? {
                Some(e) => elts.push(e),
                None => break,
            }
        }
        Ok(Some(Expr::new(
            ExprKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            self.node_span(start),
        )))
    }

    /// `[expr] ':' [expr] [':' [expr]] | named_expression | '*' expr`
    fn slice(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Star).is_some() {
            let value = self.require(Self::expression, "expression after '*'")?;
            return Ok(Some(Expr::new(
                ExprKind::Starred {
                    value: Box::new(value),
                    ctx: ExprContext::Load,
                },
                self.node_span(start),
            )));
        }
        let lower = self.expression()?;
        if self.at(&TokenKind::Colon) {
            self.bump();
            let upper = self.expression()?;
            let step = if self.eat(&TokenKind::Colon).is_some() {
                self.expression()?
            } else {
                None
            };
            return Ok(Some(Expr::new(
                ExprKind::Slice {
                    lower: lower.map(Box::new),
                    upper: upper.map(Box::new),
                    step: step.map(Box::new),
                },
                self.node_span(start),
            )));
        }
        if lower.is_some() {
            // Rewind and re-parse as a full named expression so walrus
            // targets inside subscripts work.
            self.reset(start);
            return self.named_expression();
        }
        Ok(None)
    }

    // ---- assignment-target conversion -------------------------------------

    /// Flip Load contexts to `ctx` in place, rejecting shapes that cannot
    /// be assignment or deletion targets.
    pub(crate) fn set_context(
        &self,
        expr: &mut Expr,
        ctx: ExprContext,
    ) -> Result<(), SyntaxError> {
        let verb = if ctx == ExprContext::Del {
            "delete"
        } else {
            "assign to"
        };
        match &mut expr.kind {
            ExprKind::Name { ctx: c, .. }
            | ExprKind::Attribute { ctx: c, .. }
            | ExprKind::Subscript { ctx: c, .. } => {
                *c = ctx;
                Ok(())
            }
            ExprKind::Starred { value, ctx: c } => {
                *c = ctx;
                self.set_context(value, ctx)
            }
            ExprKind::Tuple { elts, ctx: c } | ExprKind::List { elts, ctx: c } => {
                *c = ctx;
                for elt in elts {
                    self.set_context(elt, ctx)?;
                }
                Ok(())
            }
            other => {
                let what = describe_expr(other);
                Err(self.error_at_node(
                    expr.span,
                    vela_diagnostic::ErrorCode::E1004,
                    format!("cannot {verb} {what}"),
                ))
            }
        }
    }
}

/// Host-style noun for an expression kind, used in "cannot assign to X".
pub(crate) fn describe_expr(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::BoolOp { .. } | ExprKind::BinOp { .. } | ExprKind::UnaryOp { .. } => {
            "operator"
        }
        ExprKind::NamedExpr { .. } => "named expression",
        ExprKind::Lambda { .. } => "lambda",
        ExprKind::IfExp { .. } => "conditional expression",
        ExprKind::Dict { .. } => "dict literal",
        ExprKind::Set { .. } => "set literal",
        ExprKind::ListComp { .. } => "list comprehension",
        ExprKind::SetComp { .. } => "set comprehension",
        ExprKind::DictComp { .. } => "dict comprehension",
        ExprKind::GeneratorExp { .. } => "generator expression",
        ExprKind::Await { .. } => "await expression",
        ExprKind::Yield { .. } | ExprKind::YieldFrom { .. } => "yield expression",
        ExprKind::Compare { .. } => "comparison",
        ExprKind::Call { .. } => "function call",
        ExprKind::FormattedValue { .. } | ExprKind::JoinedStr { .. } => "f-string expression",
        ExprKind::Constant { .. } => "literal",
        ExprKind::Slice { .. } => "slice",
        ExprKind::Name { .. }
        | ExprKind::Attribute { .. }
        | ExprKind::Subscript { .. }
        | ExprKind::Starred { .. }
        | ExprKind::Tuple { .. }
        | ExprKind::List { .. } => "expression",
    }
}

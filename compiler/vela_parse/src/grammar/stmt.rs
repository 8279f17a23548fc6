//! Statement grammar: simple and compound statements, suites, assignment
//! targets, and function parameter lists.

use rustc_hash::FxHashSet;

use vela_ir::ast::py::{
    Arg, Arguments, Expr, ExprContext, ExprKind, ImportAlias, Operator, Stmt, StmtKind, TypeParam,
    TypeParamKind, WithItem,
};
use vela_ir::TokenKind;

use vela_diagnostic::ErrorCode;

use crate::error::SyntaxError;
use crate::parser::{ParseResult, Parser};
use crate::stack::ensure_sufficient_stack;

impl Parser<'_> {
    /// A run of statements, ending at DEDENT or ENDMARKER.
    pub(crate) fn statements(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut out = Vec::new();
        while !self.at(&TokenKind::Dedent) && !self.at_end() {
            if self.eat(&TokenKind::Newline).is_some() {
                continue;
            }
            out.append(&mut self.statement()?);
        }
        Ok(out)
    }

    /// One logical statement: a compound statement or a `;`-separated run of
    /// simple statements on a single line.
    pub(crate) fn statement(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        ensure_sufficient_stack(|| {
            let start = self.mark();
            if let Some(stmt) = self.compound_stmt()? {
                return Ok(vec![stmt]);
            }
            match self.simple_stmts() {
                Ok(stmts) => Ok(stmts),
                // Only a bare invalid-syntax failure is worth sharpening;
                // deliberate diagnostics (version gates, expectation
                // failures) always win.
                Err(err) if err.code == ErrorCode::E1001 => {
                    match self.invalid_statement(start) {
                        Some(sharper) => Err(sharper),
                        None => Err(err),
                    }
                }
                Err(err) => Err(err),
            }
        })
    }

    /// The suite after a `:` — statements on the same line, or a NEWLINE
    /// INDENT statements DEDENT block.
    pub(crate) fn block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.eat(&TokenKind::Newline).is_some() {
            if self.eat(&TokenKind::Indent).is_none() {
                return Err(self
                    .indentation_error_at(self.current().span, "expected an indented block"));
            }
            let body = self.statements()?;
            self.expect_forced(&TokenKind::Dedent, "dedent")?;
            if body.is_empty() {
                return Err(self
                    .indentation_error_at(self.current().span, "expected an indented block"));
            }
            Ok(body)
        } else {
            self.simple_stmts()
        }
    }

    fn simple_stmts(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut out = vec![self.simple_stmt()?];
        while self.eat(&TokenKind::Semi).is_some() {
            if self.at(&TokenKind::Newline) || self.at_end() {
                break;
            }
            out.push(self.simple_stmt()?);
        }
        if self.eat(&TokenKind::Newline).is_none() && !self.at_end() {
            return Err(self.invalid_syntax());
        }
        Ok(out)
    }

    fn simple_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        match self.current().kind {
            TokenKind::Pass => {
                self.bump();
                return Ok(Stmt::new(StmtKind::Pass, self.node_span(start)));
            }
            TokenKind::Break => {
                self.bump();
                return Ok(Stmt::new(StmtKind::Break, self.node_span(start)));
            }
            TokenKind::Continue => {
                self.bump();
                return Ok(Stmt::new(StmtKind::Continue, self.node_span(start)));
            }
            TokenKind::Return => {
                self.bump();
                let value = self.star_expressions()?;
                return Ok(Stmt::new(
                    StmtKind::Return {
                        value: value.map(Box::new),
                    },
                    self.node_span(start),
                ));
            }
            TokenKind::Raise => {
                self.bump();
                let exc = self.expression()?;
                let cause = if exc.is_some() && self.eat(&TokenKind::From).is_some() {
                    Some(Box::new(self.require(Self::expression, "expression after 'from'")?))
                } else {
                    None
                };
                return Ok(Stmt::new(
                    StmtKind::Raise {
                        exc: exc.map(Box::new),
                        cause,
                    },
                    self.node_span(start),
                ));
            }
            TokenKind::Del => {
                self.bump();
                let targets = self.del_targets()?;
                return Ok(Stmt::new(StmtKind::Delete { targets }, self.node_span(start)));
            }
            TokenKind::Assert => {
                self.bump();
                let test = self.require(Self::expression, "expression")?;
                let msg = if self.eat(&TokenKind::Comma).is_some() {
                    Some(Box::new(self.require(Self::expression, "expression")?))
                } else {
                    None
                };
                return Ok(Stmt::new(
                    StmtKind::Assert {
                        test: Box::new(test),
                        msg,
                    },
                    self.node_span(start),
                ));
            }
            TokenKind::Global => {
                self.bump();
                let names = self.name_list()?;
                return Ok(Stmt::new(StmtKind::Global { names }, self.node_span(start)));
            }
            TokenKind::Nonlocal => {
                self.bump();
                let names = self.name_list()?;
                return Ok(Stmt::new(StmtKind::Nonlocal { names }, self.node_span(start)));
            }
            TokenKind::Import => return self.import_stmt(),
            TokenKind::From => return self.import_from_stmt(),
            _ => {}
        }
        if let Some(stmt) = self.type_alias_stmt()? {
            return Ok(stmt);
        }
        self.assignment_or_expr()
    }

    fn name_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut names = vec![self.expect_name("name")?.0];
        while self.eat(&TokenKind::Comma).is_some() {
            names.push(self.expect_name("name")?.0);
        }
        Ok(names)
    }

    // ---- imports ----------------------------------------------------------

    fn dotted_name(&mut self) -> Result<String, SyntaxError> {
        let mut name = self.expect_name("module name")?.0;
        while self.at(&TokenKind::Dot) && self.nth_tag(1) == TokenKind::TAG_NAME {
            self.bump();
            name.push('.');
            name.push_str(&self.expect_name("module name")?.0);
        }
        Ok(name)
    }

    fn import_alias(&mut self, dotted: bool) -> Result<ImportAlias, SyntaxError> {
        let start = self.mark();
        let name = if dotted {
            self.dotted_name()?
        } else {
            self.expect_name("name")?.0
        };
        let asname = if self.eat(&TokenKind::As).is_some() {
            Some(self.expect_name("name after 'as'")?.0)
        } else {
            None
        };
        Ok(ImportAlias {
            name,
            asname,
            span: self.node_span(start),
        })
    }

    fn import_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Import, "'import'")?;
        let mut names = vec![self.import_alias(true)?];
        while self.eat(&TokenKind::Comma).is_some() {
            names.push(self.import_alias(true)?);
        }
        Ok(Stmt::new(StmtKind::Import { names }, self.node_span(start)))
    }

    fn import_from_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::From, "'from'")?;
        let mut level = 0u32;
        loop {
            if self.eat(&TokenKind::Dot).is_some() {
                level += 1;
            } else if self.eat(&TokenKind::Ellipsis).is_some() {
                level += 3;
            } else {
                break;
            }
        }
        let module = if self.at_tag(TokenKind::TAG_NAME) {
            Some(self.dotted_name()?)
        } else if level == 0 {
            return Err(self.expected("module name"));
        } else {
            None
        };
        self.expect_forced(&TokenKind::Import, "'import'")?;
        let names = if let Some(span) = self.eat(&TokenKind::Star) {
            vec![ImportAlias {
                name: "*".to_owned(),
                asname: None,
                span: self.span_to_node(span),
            }]
        } else if self.eat(&TokenKind::Lpar).is_some() {
            let mut names = vec![self.import_alias(false)?];
            while self.eat(&TokenKind::Comma).is_some() {
                if self.at(&TokenKind::Rpar) {
                    break;
                }
                names.push(self.import_alias(false)?);
            }
            self.expect_forced(&TokenKind::Rpar, "')'")?;
            names
        } else {
            let mut names = vec![self.import_alias(false)?];
            while self.eat(&TokenKind::Comma).is_some() {
                names.push(self.import_alias(false)?);
            }
            names
        };
        Ok(Stmt::new(
            StmtKind::ImportFrom {
                module,
                names,
                level,
            },
            self.node_span(start),
        ))
    }

    // ---- type aliases -----------------------------------------------------

    /// `type NAME [type_params] '=' expression` — `type` is a soft keyword,
    /// recognized only when the shape is unambiguous.
    fn type_alias_stmt(&mut self) -> ParseResult<Stmt> {
        if !self.at_soft("type")
            || self.nth_tag(1) != TokenKind::TAG_NAME
            || (self.nth_tag(2) != TokenKind::Equal.tag()
                && self.nth_tag(2) != TokenKind::Lsqb.tag())
        {
            return Ok(None);
        }
        let start = self.mark();
        let span = self.current().span;
        self.bump();
        self.check_version(12, "type statement", span)?;
        let (id, name_span) = self.expect_name("name")?;
        let name = Expr::new(
            ExprKind::Name {
                id,
                ctx: ExprContext::Store,
            },
            self.span_to_node(name_span),
        );
        let type_params = self.type_params()?;
        self.expect_forced(&TokenKind::Equal, "'='")?;
        let value = self.require(Self::expression, "expression")?;
        Ok(Some(Stmt::new(
            StmtKind::TypeAlias {
                name: Box::new(name),
                type_params,
                value: Box::new(value),
            },
            self.node_span(start),
        )))
    }

    /// `'[' type_param (',' type_param)* ']'`, gated on the host version.
    fn type_params(&mut self) -> Result<Vec<TypeParam>, SyntaxError> {
        let Some(span) = self.eat(&TokenKind::Lsqb) else {
            return Ok(Vec::new());
        };
        self.check_version(12, "type parameter lists", span)?;
        let mut params = vec![self.type_param()?];
        while self.eat(&TokenKind::Comma).is_some() {
            if self.at(&TokenKind::Rsqb) {
                break;
            }
            params.push(self.type_param()?);
        }
        self.expect_forced(&TokenKind::Rsqb, "']'")?;
        Ok(params)
    }

    fn type_param(&mut self) -> Result<TypeParam, SyntaxError> {
        let start = self.mark();
        if self.eat(&TokenKind::Star).is_some() {
            let name = self.expect_name("type parameter name")?.0;
            return Ok(TypeParam {
                kind: TypeParamKind::TypeVarTuple { name },
                span: self.node_span(start),
            });
        }
        if self.eat(&TokenKind::DoubleStar).is_some() {
            let name = self.expect_name("type parameter name")?.0;
            return Ok(TypeParam {
                kind: TypeParamKind::ParamSpec { name },
                span: self.node_span(start),
            });
        }
        let name = self.expect_name("type parameter name")?.0;
        let bound = if self.eat(&TokenKind::Colon).is_some() {
            Some(Box::new(self.require(Self::expression, "bound")?))
        } else {
            None
        };
        Ok(TypeParam {
            kind: TypeParamKind::TypeVar { name, bound },
            span: self.node_span(start),
        })
    }

    // ---- assignments ------------------------------------------------------

    fn assignment_or_expr(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        if let Some(stmt) = self.ann_assign()? {
            return Ok(stmt);
        }
        let first = match self.yield_expr()? {
            Some(expr) => expr,
            None => self.require(Self::star_expressions, "statement")?,
        };
        if self.at(&TokenKind::Equal) {
            let mut targets = Vec::new();
            let mut value = first;
            while self.eat(&TokenKind::Equal).is_some() {
                self.set_context(&mut value, ExprContext::Store)?;
                targets.push(value);
                value = match self.yield_expr()? {
                    Some(expr) => expr,
                    None => self.require(Self::star_expressions, "expression after '='")?,
                };
            }
            return Ok(Stmt::new(
                StmtKind::Assign {
                    targets,
                    value: Box::new(value),
                },
                self.node_span(start),
            ));
        }
        if let Some(op) = self.aug_op() {
            let mut target = first;
            match target.kind {
                ExprKind::Name { ref mut ctx, .. }
                | ExprKind::Attribute { ref mut ctx, .. }
                | ExprKind::Subscript { ref mut ctx, .. } => *ctx = ExprContext::Store,
                ref other => {
                    let what = super::expr::describe_expr(other);
                    return Err(self.error_at_node(
                        target.span,
                        ErrorCode::E1004,
                        format!("'{what}' is an illegal expression for augmented assignment"),
                    ));
                }
            }
            self.bump();
            let value = match self.yield_expr()? {
                Some(expr) => expr,
                None => self.require(Self::star_expressions, "expression")?,
            };
            return Ok(Stmt::new(
                StmtKind::AugAssign {
                    target: Box::new(target),
                    op,
                    value: Box::new(value),
                },
                self.node_span(start),
            ));
        }
        Ok(Stmt::new(
            StmtKind::Expr {
                value: Box::new(first),
            },
            self.node_span(start),
        ))
    }

    /// `single_target ':' expression ['=' value]`
    fn ann_assign(&mut self) -> ParseResult<Stmt> {
        let start = self.mark();
        let Some((target, simple)) = self.single_ann_target()? else {
            return Ok(None);
        };
        if self.eat(&TokenKind::Colon).is_none() {
            self.reset(start);
            return Ok(None);
        }
        let annotation = self.require(Self::expression, "annotation")?;
        let value = if self.eat(&TokenKind::Equal).is_some() {
            let value = match self.yield_expr()? {
                Some(expr) => expr,
                None => self.require(Self::star_expressions, "expression after '='")?,
            };
            Some(Box::new(value))
        } else {
            None
        };
        Ok(Some(Stmt::new(
            StmtKind::AnnAssign {
                target: Box::new(target),
                annotation: Box::new(annotation),
                value,
                simple,
            },
            self.node_span(start),
        )))
    }

    /// A single annotated-assignment target: a name (simple), or an
    /// attribute / subscript / parenthesized name (not simple).
    fn single_ann_target(&mut self) -> ParseResult<(Expr, bool)> {
        let start = self.mark();
        if self.eat(&TokenKind::Lpar).is_some() {
            let Some((inner, _)) = self.single_ann_target()? else {
                self.reset(start);
                return Ok(None);
            };
            if self.eat(&TokenKind::Rpar).is_none() {
                self.reset(start);
                return Ok(None);
            }
            return Ok(Some((inner, false)));
        }
        let Some(mut expr) = self.primary()? else {
            return Ok(None);
        };
        // Only these shapes can carry an annotation; following `:` decides
        // whether this really is an annotated assignment.
        match expr.kind {
            ExprKind::Name { .. } if self.at(&TokenKind::Colon) => {
                self.set_context(&mut expr, ExprContext::Store)?;
                Ok(Some((expr, true)))
            }
            ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
                if self.at(&TokenKind::Colon) =>
            {
                self.set_context(&mut expr, ExprContext::Store)?;
                Ok(Some((expr, false)))
            }
            _ => {
                self.reset(start);
                Ok(None)
            }
        }
    }

    fn aug_op(&self) -> Option<Operator> {
        Some(match self.current().kind {
            TokenKind::PlusEqual => Operator::Add,
            TokenKind::MinusEqual => Operator::Sub,
            TokenKind::StarEqual => Operator::Mult,
            TokenKind::AtEqual => Operator::MatMult,
            TokenKind::SlashEqual => Operator::Div,
            TokenKind::DoubleSlashEqual => Operator::FloorDiv,
            TokenKind::PercentEqual => Operator::Mod,
            TokenKind::DoubleStarEqual => Operator::Pow,
            TokenKind::LeftShiftEqual => Operator::LShift,
            TokenKind::RightShiftEqual => Operator::RShift,
            TokenKind::AmperEqual => Operator::BitAnd,
            TokenKind::PipeEqual => Operator::BitOr,
            TokenKind::CaretEqual => Operator::BitXor,
            _ => return None,
        })
    }

    // ---- assignment targets -----------------------------------------------

    /// `star_target (',' star_target)* [',']` with Store context.
    pub(crate) fn star_targets(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        let Some(first) = self.star_target()? else {
            return Ok(None);
        };
        if !self.at(&TokenKind::Comma) {
            return Ok(Some(first));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma).is_some() {
            match self.star_target()? {
                Some(target) => elts.push(target),
                None => break,
            }
        }
        Ok(Some(Expr::new(
            ExprKind::Tuple {
                elts,
                ctx: ExprContext::Store,
            },
            self.node_span(start),
        )))
    }

    fn star_target(&mut self) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Star).is_some() {
            let inner = self.require(Self::star_target, "target after '*'")?;
            return Ok(Some(Expr::new(
                ExprKind::Starred {
                    value: Box::new(inner),
                    ctx: ExprContext::Store,
                },
                self.node_span(start),
            )));
        }
        self.target_atom(ExprContext::Store)
    }

    /// `'del' target (',' target)* [',']` with Del context.
    fn del_targets(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut targets = vec![self.require(
            |p: &mut Self| p.target_atom(ExprContext::Del),
            "name to delete",
        )?];
        while self.eat(&TokenKind::Comma).is_some() {
            match self.target_atom(ExprContext::Del)? {
                Some(target) => targets.push(target),
                None => break,
            }
        }
        Ok(targets)
    }

    /// One target: a parenthesized or bracketed target list, or a primary
    /// whose final shape allows assignment.
    fn target_atom(&mut self, ctx: ExprContext) -> ParseResult<Expr> {
        let start = self.mark();
        if self.eat(&TokenKind::Lpar).is_some() {
            if self.eat(&TokenKind::Rpar).is_some() {
                return Ok(Some(Expr::new(
                    ExprKind::Tuple {
                        elts: Vec::new(),
                        ctx,
                    },
                    self.node_span(start),
                )));
            }
            let inner = match ctx {
                ExprContext::Del => {
                    let elts = self.del_targets()?;
                    if elts.len() == 1 && !self.at(&TokenKind::Comma) {
                        elts.into_iter().next()
                    } else {
                        Some(Expr::new(
                            ExprKind::Tuple { elts, ctx },
                            self.node_span(start),
                        ))
                    }
                }
                _ => self.star_targets()?,
            };
            let Some(inner) = inner else {
                self.reset(start);
                return Ok(None);
            };
            self.expect_forced(&TokenKind::Rpar, "')'")?;
            return Ok(Some(inner));
        }
        if self.eat(&TokenKind::Lsqb).is_some() {
            let mut elts = Vec::new();
            if !self.at(&TokenKind::Rsqb) {
                loop {
                    match self.star_target()? {
                        Some(target) => elts.push(target),
                        None => break,
                    }
                    if self.eat(&TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            self.expect_forced(&TokenKind::Rsqb, "']'")?;
            return Ok(Some(Expr::new(
                ExprKind::List { elts, ctx },
                self.node_span(start),
            )));
        }
        let Some(mut expr) = self.primary()? else {
            return Ok(None);
        };
        self.set_context(&mut expr, ctx)?;
        Ok(Some(expr))
    }

    // ---- compound statements ----------------------------------------------

    fn compound_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current().kind {
            TokenKind::If => self.if_stmt().map(Some),
            TokenKind::While => self.while_stmt().map(Some),
            TokenKind::For => self.for_stmt(false).map(Some),
            TokenKind::With => self.with_stmt(false).map(Some),
            TokenKind::Try => self.try_stmt().map(Some),
            TokenKind::Def => self.func_def(Vec::new(), false).map(Some),
            TokenKind::Class => self.class_def(Vec::new()).map(Some),
            TokenKind::At => self.decorated().map(Some),
            TokenKind::Async => self.async_stmt().map(Some),
            _ => self.match_stmt(),
        }
    }

    fn async_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Async, "'async'")?;
        match self.current().kind {
            TokenKind::Def => {
                self.reset(start);
                self.func_def(Vec::new(), false)
            }
            TokenKind::For => {
                self.reset(start);
                self.for_stmt(true)
            }
            TokenKind::With => {
                self.reset(start);
                self.with_stmt(true)
            }
            _ => Err(self.expected("'def', 'for' or 'with' after 'async'")),
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::If, "'if'")?;
        let test = self.require(Self::named_expression, "expression")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        let orelse = self.elif_or_else()?;
        Ok(Stmt::new(
            StmtKind::If {
                test: Box::new(test),
                body,
                orelse,
            },
            self.node_span(start),
        ))
    }

    fn elif_or_else(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.at(&TokenKind::Elif) {
            let start = self.mark();
            self.bump();
            let test = self.require(Self::named_expression, "expression")?;
            self.expect_forced(&TokenKind::Colon, "':'")?;
            let body = self.block()?;
            let orelse = self.elif_or_else()?;
            return Ok(vec![Stmt::new(
                StmtKind::If {
                    test: Box::new(test),
                    body,
                    orelse,
                },
                self.node_span(start),
            )]);
        }
        self.else_block()
    }

    fn else_block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.eat(&TokenKind::Else).is_some() {
            self.expect_forced(&TokenKind::Colon, "':'")?;
            self.block()
        } else {
            Ok(Vec::new())
        }
    }

    fn while_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::While, "'while'")?;
        let test = self.require(Self::named_expression, "expression")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        let orelse = self.else_block()?;
        Ok(Stmt::new(
            StmtKind::While {
                test: Box::new(test),
                body,
                orelse,
            },
            self.node_span(start),
        ))
    }

    fn for_stmt(&mut self, is_async: bool) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        if is_async {
            self.expect_forced(&TokenKind::Async, "'async'")?;
        }
        self.expect_forced(&TokenKind::For, "'for'")?;
        let target = self.require(Self::star_targets, "target")?;
        self.expect_forced(&TokenKind::In, "'in'")?;
        let iter = self.require(Self::star_expressions, "expression after 'in'")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        let orelse = self.else_block()?;
        let kind = if is_async {
            StmtKind::AsyncFor {
                target: Box::new(target),
                iter: Box::new(iter),
                body,
                orelse,
            }
        } else {
            StmtKind::For {
                target: Box::new(target),
                iter: Box::new(iter),
                body,
                orelse,
            }
        };
        Ok(Stmt::new(kind, self.node_span(start)))
    }

    fn with_stmt(&mut self, is_async: bool) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        if is_async {
            self.expect_forced(&TokenKind::Async, "'async'")?;
        }
        self.expect_forced(&TokenKind::With, "'with'")?;
        let items = self.with_items()?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        let kind = if is_async {
            StmtKind::AsyncWith { items, body }
        } else {
            StmtKind::With { items, body }
        };
        Ok(Stmt::new(kind, self.node_span(start)))
    }

    fn with_items(&mut self) -> Result<Vec<WithItem>, SyntaxError> {
        // `with (a as b, c as d):` — a parenthesized item list looks like a
        // tuple until the `as` or the `):`, so try that reading first.
        if self.at(&TokenKind::Lpar) {
            let start = self.mark();
            self.bump();
            if let Ok(items) = self.parenthesized_with_items() {
                if self.at(&TokenKind::Colon) {
                    return Ok(items);
                }
            }
            self.reset(start);
        }
        let mut items = vec![self.with_item()?];
        while self.eat(&TokenKind::Comma).is_some() {
            items.push(self.with_item()?);
        }
        Ok(items)
    }

    fn parenthesized_with_items(&mut self) -> Result<Vec<WithItem>, SyntaxError> {
        let mut items = vec![self.with_item()?];
        while self.eat(&TokenKind::Comma).is_some() {
            if self.at(&TokenKind::Rpar) {
                break;
            }
            items.push(self.with_item()?);
        }
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        Ok(items)
    }

    fn with_item(&mut self) -> Result<WithItem, SyntaxError> {
        let context_expr = self.require(Self::expression, "expression")?;
        let optional_vars = if self.eat(&TokenKind::As).is_some() {
            Some(self.require(Self::star_target, "target after 'as'")?)
        } else {
            None
        };
        Ok(WithItem {
            context_expr,
            optional_vars,
        })
    }

    fn try_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Try, "'try'")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        let mut handlers = Vec::new();
        let mut is_star: Option<bool> = None;
        while self.at(&TokenKind::Except) {
            let handler_start = self.mark();
            self.bump();
            let starred = if let Some(span) = self.eat(&TokenKind::Star) {
                self.check_version(11, "except* syntax", span)?;
                true
            } else {
                false
            };
            if let Some(prev) = is_star {
                if prev != starred {
                    return Err(self.error_at(
                        self.current().span,
                        ErrorCode::E1001,
                        "cannot have both 'except' and 'except*' on the same 'try'",
                    ));
                }
            }
            is_star = Some(starred);
            let r#type = if self.at(&TokenKind::Colon) {
                if starred {
                    return Err(self.expected("exception type after 'except*'"));
                }
                None
            } else {
                Some(Box::new(self.require(Self::expression, "exception type")?))
            };
            let name = if self.eat(&TokenKind::As).is_some() {
                Some(self.expect_name("name after 'as'")?.0)
            } else {
                None
            };
            self.expect_forced(&TokenKind::Colon, "':'")?;
            let handler_body = self.block()?;
            if r#type.is_none() && self.at(&TokenKind::Except) {
                return Err(self.error_at(
                    self.current().span,
                    ErrorCode::E1001,
                    "default 'except:' must be last",
                ));
            }
            handlers.push(vela_ir::ast::py::ExceptHandler {
                r#type,
                name,
                body: handler_body,
                span: self.node_span(handler_start),
            });
        }
        let orelse = if !handlers.is_empty() {
            self.else_block()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat(&TokenKind::Finally).is_some() {
            self.expect_forced(&TokenKind::Colon, "':'")?;
            self.block()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.expected("'except' or 'finally' block"));
        }
        let kind = if is_star == Some(true) {
            StmtKind::TryStar {
                body,
                handlers,
                orelse,
                finalbody,
            }
        } else {
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            }
        };
        Ok(Stmt::new(kind, self.node_span(start)))
    }

    // ---- definitions ------------------------------------------------------

    /// `('@' named_expression NEWLINE)+`
    pub(crate) fn decorator_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut decorator_list = Vec::new();
        while self.eat(&TokenKind::At).is_some() {
            decorator_list.push(self.require(Self::named_expression, "decorator expression")?);
            self.expect_forced(&TokenKind::Newline, "newline after decorator")?;
        }
        Ok(decorator_list)
    }

    fn decorated(&mut self) -> Result<Stmt, SyntaxError> {
        let decorator_list = self.decorator_list()?;
        self.decorated_def(decorator_list)
    }

    /// The `def` / `class` / `async def` a decorator list attaches to.
    pub(crate) fn decorated_def(&mut self, decorator_list: Vec<Expr>) -> Result<Stmt, SyntaxError> {
        match self.current().kind {
            TokenKind::Def => self.func_def(decorator_list, false),
            TokenKind::Class => self.class_def(decorator_list),
            TokenKind::Async => {
                self.bump();
                if self.at(&TokenKind::Def) {
                    self.func_def(decorator_list, true)
                } else {
                    Err(self.expected("'def' after 'async'"))
                }
            }
            _ => Err(self.expected("class or function definition after decorators")),
        }
    }

    /// `['async'] 'def' NAME [type_params] '(' params ')' ['->' expr] ':' block`
    ///
    /// When `async_consumed` is set the caller already ate the `async`
    /// keyword (the decorated-statement path).
    pub(crate) fn func_def(
        &mut self,
        decorator_list: Vec<Expr>,
        async_consumed: bool,
    ) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        let is_async = async_consumed || self.eat(&TokenKind::Async).is_some();
        self.expect_forced(&TokenKind::Def, "'def'")?;
        let name = self.expect_name("function name")?.0;
        let type_params = self.type_params()?;
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        let args = self.parameter_list(true)?;
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        let returns = if self.eat(&TokenKind::RArrow).is_some() {
            Some(Box::new(self.require(Self::expression, "return annotation")?))
        } else {
            None
        };
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        let kind = if is_async {
            StmtKind::AsyncFunctionDef {
                name,
                type_params,
                args: Box::new(args),
                body,
                decorator_list,
                returns,
            }
        } else {
            StmtKind::FunctionDef {
                name,
                type_params,
                args: Box::new(args),
                body,
                decorator_list,
                returns,
            }
        };
        Ok(Stmt::new(kind, self.node_span(start)))
    }

    fn class_def(&mut self, decorator_list: Vec<Expr>) -> Result<Stmt, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Class, "'class'")?;
        let name = self.expect_name("class name")?.0;
        let type_params = self.type_params()?;
        let (bases, keywords) = if self.at(&TokenKind::Lpar) {
            self.call_arguments()?
        } else {
            (Vec::new(), Vec::new())
        };
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let body = self.block()?;
        Ok(Stmt::new(
            StmtKind::ClassDef {
                name,
                type_params,
                bases,
                keywords,
                body,
                decorator_list,
            },
            self.node_span(start),
        ))
    }

    // ---- parameter lists --------------------------------------------------

    /// Shared between `def` and `lambda`; annotations only in `def`.
    pub(crate) fn parameter_list(
        &mut self,
        allow_annotations: bool,
    ) -> Result<Arguments, SyntaxError> {
        let mut posonlyargs = Vec::new();
        let mut args: Vec<Arg> = Vec::new();
        let mut vararg = None;
        let mut kwonlyargs = Vec::new();
        let mut kw_defaults = Vec::new();
        let mut kwarg = None;
        let mut defaults = Vec::new();
        let mut seen = FxHashSet::default();
        let mut star_seen = false;
        let mut slash_seen = false;
        let mut default_seen = false;
        loop {
            if self.eat(&TokenKind::DoubleStar).is_some() {
                kwarg = Some(self.parameter(allow_annotations, &mut seen)?);
                self.eat(&TokenKind::Comma);
                break;
            }
            if let Some(span) = self.eat(&TokenKind::Star) {
                if star_seen {
                    return Err(self.error_at(
                        span,
                        ErrorCode::E1001,
                        "* argument may appear only once",
                    ));
                }
                star_seen = true;
                if self.at_tag(TokenKind::TAG_NAME) {
                    vararg = Some(self.parameter(allow_annotations, &mut seen)?);
                }
                if self.eat(&TokenKind::Comma).is_none() {
                    break;
                }
                continue;
            }
            if let Some(span) = self.eat(&TokenKind::Slash) {
                if slash_seen || star_seen || args.is_empty() {
                    return Err(self.error_at(span, ErrorCode::E1001, "invalid syntax"));
                }
                slash_seen = true;
                posonlyargs = std::mem::take(&mut args);
                if self.eat(&TokenKind::Comma).is_none() {
                    break;
                }
                continue;
            }
            if !self.at_tag(TokenKind::TAG_NAME) {
                break;
            }
            let param = self.parameter(allow_annotations, &mut seen)?;
            let default = if self.eat(&TokenKind::Equal).is_some() {
                Some(self.require(Self::expression, "default value")?)
            } else {
                None
            };
            if star_seen {
                kwonlyargs.push(param);
                kw_defaults.push(default);
            } else {
                match default {
                    Some(value) => {
                        default_seen = true;
                        defaults.push(value);
                    }
                    None if default_seen => {
                        return Err(self.error_at_node(
                            param.span,
                            ErrorCode::E1005,
                            "parameter without a default follows parameter with a default",
                        ));
                    }
                    None => {}
                }
                args.push(param);
            }
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        if star_seen && vararg.is_none() && kwonlyargs.is_empty() {
            return Err(self.error_at(
                self.current().span,
                ErrorCode::E1001,
                "named arguments must follow bare *",
            ));
        }
        Ok(Arguments {
            posonlyargs,
            args,
            vararg,
            kwonlyargs,
            kw_defaults,
            kwarg,
            defaults,
        })
    }

    fn parameter(
        &mut self,
        allow_annotations: bool,
        seen: &mut FxHashSet<String>,
    ) -> Result<Arg, SyntaxError> {
        let start = self.mark();
        let (name, span) = self.expect_name("parameter name")?;
        if !seen.insert(name.clone()) {
            return Err(self.error_at(
                span,
                ErrorCode::E1001,
                format!("duplicate argument '{name}' in function definition"),
            ));
        }
        let annotation = if allow_annotations && self.eat(&TokenKind::Colon).is_some() {
            Some(Box::new(self.require(Self::expression, "annotation")?))
        } else {
            None
        };
        Ok(Arg {
            arg: name,
            annotation,
            span: self.node_span(start),
        })
    }
}

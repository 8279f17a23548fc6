//! The declarative extension grammar: modules, `enamldef` definitions,
//! child definitions, storage, aliases, bindings and pragmas.
//!
//! Declarative introducer words (`enamldef`, `attr`, `event`, `alias`,
//! `const`, `func`, `pragma`, `template`) are soft keywords: they only act
//! as keywords in the positions this module tests them, and stay ordinary
//! names everywhere in the host grammar.

use vela_ir::ast::decl::{
    AliasExpr, Binding, BindingOperator, ChildDef, ConstExpr, DefItem, EnamlDef, ExBinding,
    FuncDef, Module, ModuleItem, OperatorExpr, OperatorValue, Pragma, PragmaArg, PragmaArgValue,
    PythonExpression, PythonModule, StorageExpr, StorageKind,
};
use vela_ir::ast::py::{Arguments, Expr, ExprKind, Stmt, StmtKind};
use vela_ir::{NodeSpan, NumberValue, TokenKind};

use vela_diagnostic::ErrorCode;

use crate::error::SyntaxError;
use crate::parser::{ParseResult, Parser};

/// Which kind of object body is being parsed; decides which items are
/// grammatical.
#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) enum BodyKind {
    EnamlDef,
    ChildDef,
}

impl Parser<'_> {
    /// The start rule: a whole source module.
    pub(crate) fn module(&mut self) -> Result<Module, SyntaxError> {
        let start = self.mark();
        let docstring = self.docstring()?;
        let mut body = Vec::new();
        let mut chunk: Vec<Stmt> = Vec::new();
        while !self.at_end() {
            if self.eat(&TokenKind::Newline).is_some() {
                continue;
            }
            if let Some(item) = self.declarative_item()? {
                flush_python(&mut chunk, &mut body);
                body.push(item);
                continue;
            }
            chunk.append(&mut self.statement()?);
        }
        flush_python(&mut chunk, &mut body);
        Ok(Module {
            filename: self.filename.to_owned(),
            docstring,
            body,
            span: self.node_span(start),
        })
    }

    /// `STRING NEWLINE` at the head of a module or definition body.
    fn docstring(&mut self) -> Result<Option<String>, SyntaxError> {
        if !self.at_tag(TokenKind::TAG_STR) || self.nth_tag(1) != TokenKind::Newline.tag() {
            return Ok(None);
        }
        let TokenKind::Str(name) = self.bump().kind.clone() else {
            return Ok(None);
        };
        self.bump();
        Ok(Some(self.resolve(name).to_owned()))
    }

    /// A top-level declarative construct, or `None` when the current tokens
    /// belong to the host language.
    fn declarative_item(&mut self) -> ParseResult<ModuleItem> {
        if self.at_soft("enamldef") {
            return Ok(Some(ModuleItem::EnamlDef(
                self.enamldef(Vec::new(), Vec::new())?,
            )));
        }
        if self.at_soft("template") && self.nth_tag(1) == TokenKind::TAG_NAME {
            return Ok(Some(ModuleItem::Template(self.template(Vec::new())?)));
        }
        if self.at_soft("pragma") && self.nth_tag(1) == TokenKind::TAG_NAME {
            let pragmas = self.pragmas()?;
            if self.at_soft("enamldef") {
                return Ok(Some(ModuleItem::EnamlDef(
                    self.enamldef(pragmas, Vec::new())?,
                )));
            }
            if self.at_soft("template") {
                return Ok(Some(ModuleItem::Template(self.template(pragmas)?)));
            }
            return Err(self.error_at(
                self.current().span,
                ErrorCode::E1008,
                "expected 'enamldef' or 'template' after pragmas",
            ));
        }
        if self.at(&TokenKind::At) {
            let decorators = self.decorator_list()?;
            if self.at_soft("enamldef") {
                let decorators = decorators
                    .into_iter()
                    .map(|ast| PythonExpression {
                        span: ast.span,
                        ast,
                    })
                    .collect();
                return Ok(Some(ModuleItem::EnamlDef(
                    self.enamldef(Vec::new(), decorators)?,
                )));
            }
            // Plain decorated def or class; hand back to the host grammar.
            let stmt = self.decorated_def(decorators)?;
            return Ok(Some(ModuleItem::Python(PythonModule {
                span: stmt.span,
                ast: vec![stmt],
            })));
        }
        Ok(None)
    }

    // ---- pragmas ----------------------------------------------------------

    /// `('pragma' NAME ['(' args ')'] NEWLINE)+`
    pub(crate) fn pragmas(&mut self) -> Result<Vec<Pragma>, SyntaxError> {
        let mut out = Vec::new();
        while self.at_soft("pragma") && self.nth_tag(1) == TokenKind::TAG_NAME {
            let start = self.mark();
            self.bump();
            let (command, _) = self.expect_name("pragma name")?;
            let mut arguments = Vec::new();
            if self.eat(&TokenKind::Lpar).is_some() {
                while !self.at(&TokenKind::Rpar) {
                    arguments.push(self.pragma_arg()?);
                    if self.eat(&TokenKind::Comma).is_none() {
                        break;
                    }
                }
                self.expect_forced(&TokenKind::Rpar, "')'")?;
            }
            self.expect_forced(&TokenKind::Newline, "newline")?;
            out.push(Pragma {
                command,
                arguments,
                span: self.node_span(start),
            });
        }
        Ok(out)
    }

    fn pragma_arg(&mut self) -> Result<PragmaArg, SyntaxError> {
        let start = self.mark();
        let value = match self.current().kind.clone() {
            TokenKind::Name(name) => {
                self.bump();
                PragmaArgValue::Token {
                    value: self.resolve(name).to_owned(),
                }
            }
            TokenKind::Str(name) => {
                self.bump();
                PragmaArgValue::Str {
                    value: self.resolve(name).to_owned(),
                }
            }
            TokenKind::Number(number) => {
                self.bump();
                let value = match number {
                    NumberValue::Int(v) => v as f64,
                    NumberValue::Float(bits) => f64::from_bits(bits),
                    _ => {
                        return Err(self.error_at(
                            self.current().span,
                            ErrorCode::E1008,
                            "invalid pragma argument",
                        ));
                    }
                };
                PragmaArgValue::Number { value }
            }
            _ => {
                return Err(self.expected("pragma argument"));
            }
        };
        Ok(PragmaArg {
            value,
            span: self.node_span(start),
        })
    }

    // ---- enamldef ---------------------------------------------------------

    /// `'enamldef' NAME '(' NAME ')' [':' NAME] ':' suite`
    fn enamldef(
        &mut self,
        pragmas: Vec<Pragma>,
        decorators: Vec<PythonExpression>,
    ) -> Result<EnamlDef, SyntaxError> {
        let start = self.mark();
        self.bump();
        let (typename, _) = self.expect_name("type name after 'enamldef'")?;
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        let (base, _) = self.expect_name("base type name")?;
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let identifier = if self.at_tag(TokenKind::TAG_NAME)
            && self.nth_tag(1) == TokenKind::Colon.tag()
        {
            let (name, _) = self.expect_name("identifier")?;
            self.bump();
            Some(name)
        } else {
            None
        };
        let (docstring, body) = self.def_suite(BodyKind::EnamlDef)?;
        Ok(EnamlDef {
            typename,
            base,
            identifier,
            docstring,
            pragmas,
            decorators,
            body,
            span: self.node_span(start),
        })
    }

    /// `NAME ':' [NAME ':'] suite` — a nested child definition.
    pub(crate) fn child_def(&mut self) -> Result<ChildDef, SyntaxError> {
        let start = self.mark();
        let (typename, _) = self.expect_name("type name")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let identifier = if self.at_tag(TokenKind::TAG_NAME)
            && self.nth_tag(1) == TokenKind::Colon.tag()
        {
            let (name, _) = self.expect_name("identifier")?;
            self.bump();
            Some(name)
        } else {
            None
        };
        let (_, body) = self.def_suite(BodyKind::ChildDef)?;
        Ok(ChildDef {
            typename,
            identifier,
            body,
            span: self.node_span(start),
        })
    }

    /// An object-definition suite: one inline item, or NEWLINE INDENT
    /// [docstring] item+ DEDENT. `pass` items are dropped from the body.
    fn def_suite(
        &mut self,
        kind: BodyKind,
    ) -> Result<(Option<String>, Vec<DefItem>), SyntaxError> {
        if self.eat(&TokenKind::Newline).is_some() {
            if self.eat(&TokenKind::Indent).is_none() {
                return Err(
                    self.indentation_error_at(self.current().span, "expected an indented block")
                );
            }
            let docstring = if kind == BodyKind::EnamlDef {
                self.docstring()?
            } else {
                None
            };
            let mut body = Vec::new();
            while !self.at(&TokenKind::Dedent) && !self.at_end() {
                if let Some(item) = self.def_item(kind)? {
                    body.push(item);
                }
            }
            self.expect_forced(&TokenKind::Dedent, "dedent")?;
            Ok((docstring, body))
        } else {
            let mut body = Vec::new();
            if let Some(item) = self.def_item(kind)? {
                body.push(item);
            }
            Ok((None, body))
        }
    }

    /// One body item; `None` means a filtered `pass`.
    fn def_item(&mut self, kind: BodyKind) -> ParseResult<DefItem> {
        if self.eat(&TokenKind::Pass).is_some() {
            self.expect_forced(&TokenKind::Newline, "newline")?;
            return Ok(None);
        }
        if self.at_soft("attr") && self.nth_tag(1) == TokenKind::TAG_NAME {
            return Ok(Some(DefItem::Storage(self.storage(StorageKind::Attr)?)));
        }
        if self.at_soft("event") && self.nth_tag(1) == TokenKind::TAG_NAME {
            return Ok(Some(DefItem::Storage(self.storage(StorageKind::Event)?)));
        }
        if self.at_soft("alias") && self.nth_tag(1) == TokenKind::TAG_NAME {
            return Ok(Some(DefItem::Alias(self.alias()?)));
        }
        if self.at_soft("const") && self.nth_tag(1) == TokenKind::TAG_NAME {
            if kind == BodyKind::ChildDef {
                return Err(self.error_at(
                    self.current().span,
                    ErrorCode::E1008,
                    "const declarations are not allowed in child definitions",
                ));
            }
            return Ok(Some(DefItem::Const(self.const_expr()?)));
        }
        if self.at_soft("func") && self.nth_tag(1) == TokenKind::TAG_NAME {
            return Ok(Some(DefItem::Func(self.decl_funcdef(false)?)));
        }
        if self.at(&TokenKind::Async) && self.nth_tag(1) == TokenKind::TAG_NAME {
            // `async func name(...)`
            return Ok(Some(DefItem::Func(self.decl_funcdef(true)?)));
        }
        if !self.at_tag(TokenKind::TAG_NAME) {
            return Err(self.expected("an object-body item"));
        }
        match item_lead(self.nth_tag(1)) {
            ItemLead::Call => Ok(Some(DefItem::TemplateInst(self.template_inst()?))),
            ItemLead::Block => Ok(Some(DefItem::Child(self.child_def()?))),
            ItemLead::Dotted => Ok(Some(DefItem::ExBinding(self.ex_binding()?))),
            ItemLead::Override => Ok(Some(DefItem::Func(self.override_funcdef()?))),
            ItemLead::Operator => Ok(Some(DefItem::Binding(self.binding()?))),
            ItemLead::Other => Err(self.error_at(
                self.current().span,
                ErrorCode::E1008,
                "expected a binding operator, ':' or '(' after the name",
            )),
        }
    }

    // ---- storage, alias, const --------------------------------------------

    /// `('attr'|'event') NAME [':' dotted_typename] [operator value]`
    fn storage(&mut self, kind: StorageKind) -> Result<StorageExpr, SyntaxError> {
        let start = self.mark();
        self.bump();
        let (name, _) = self.expect_name("attribute name")?;
        let typename = if self.eat(&TokenKind::Colon).is_some() {
            Some(self.dotted_typename()?)
        } else {
            None
        };
        let expr = if self.at(&TokenKind::Newline) {
            self.bump();
            None
        } else {
            Some(self.operator_expr(&name)?)
        };
        Ok(StorageExpr {
            kind,
            name,
            typename,
            expr,
            span: self.node_span(start),
        })
    }

    fn dotted_typename(&mut self) -> Result<String, SyntaxError> {
        let mut name = self.expect_name("type name")?.0;
        while self.at(&TokenKind::Dot) && self.nth_tag(1) == TokenKind::TAG_NAME {
            self.bump();
            name.push('.');
            name.push_str(&self.expect_name("type name")?.0);
        }
        Ok(name)
    }

    /// `'alias' NAME [':' NAME ('.' NAME)*] NEWLINE`
    fn alias(&mut self) -> Result<AliasExpr, SyntaxError> {
        let start = self.mark();
        self.bump();
        let (name, _) = self.expect_name("alias name")?;
        let (target, chain) = if self.eat(&TokenKind::Colon).is_some() {
            let (target, _) = self.expect_name("alias target")?;
            let mut chain = Vec::new();
            while self.eat(&TokenKind::Dot).is_some() {
                chain.push(self.expect_name("attribute name")?.0);
            }
            (target, chain)
        } else {
            (name.clone(), Vec::new())
        };
        self.expect_forced(&TokenKind::Newline, "newline")?;
        Ok(AliasExpr {
            name,
            target,
            chain,
            span: self.node_span(start),
        })
    }

    /// `'const' NAME [':' dotted_typename] '=' expression NEWLINE`
    pub(crate) fn const_expr(&mut self) -> Result<ConstExpr, SyntaxError> {
        let start = self.mark();
        self.bump();
        let (name, _) = self.expect_name("const name")?;
        let typename = if self.eat(&TokenKind::Colon).is_some() {
            Some(self.dotted_typename()?)
        } else {
            None
        };
        self.expect_forced(&TokenKind::Equal, "'='")?;
        let ast = self.require(Self::expression, "expression")?;
        self.expect_forced(&TokenKind::Newline, "newline")?;
        Ok(ConstExpr {
            name,
            typename,
            expr: PythonExpression {
                span: ast.span,
                ast,
            },
            span: self.node_span(start),
        })
    }

    // ---- declarative functions --------------------------------------------

    /// `['async'] 'func' NAME '(' params ')' ['->' expr] ':' block`
    fn decl_funcdef(&mut self, is_async: bool) -> Result<FuncDef, SyntaxError> {
        let start = self.mark();
        if is_async {
            self.expect_forced(&TokenKind::Async, "'async'")?;
        }
        if self.soft("func").is_none() {
            return Err(self.expected("'func'"));
        }
        let funcdef = self.funcdef_tail(is_async, None, start)?;
        Ok(FuncDef {
            funcdef,
            is_override: false,
            span: self.node_span(start),
        })
    }

    /// `NAME '=>' '(' params ')' ['->' expr] ':' block`
    fn override_funcdef(&mut self) -> Result<FuncDef, SyntaxError> {
        let start = self.mark();
        let (name, _) = self.expect_name("function name")?;
        self.expect_forced(&TokenKind::FatArrow, "'=>'")?;
        let funcdef = self.funcdef_tail(false, Some(name), start)?;
        Ok(FuncDef {
            funcdef,
            is_override: true,
            span: self.node_span(start),
        })
    }

    /// Shared tail of both declarative function forms, from the name (or
    /// already-consumed name for overrides) through the body.
    fn funcdef_tail(
        &mut self,
        is_async: bool,
        name: Option<String>,
        start: usize,
    ) -> Result<Stmt, SyntaxError> {
        let name = match name {
            Some(name) => name,
            None => self.expect_name("function name")?.0,
        };
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
                type_params: Vec::new(),
                args: Box::new(args),
                body,
                decorator_list: Vec::new(),
                returns,
            }
        } else {
            StmtKind::FunctionDef {
                name,
                type_params: Vec::new(),
                args: Box::new(args),
                body,
                decorator_list: Vec::new(),
                returns,
            }
        };
        Ok(Stmt::new(kind, self.node_span(start)))
    }

    // ---- bindings ---------------------------------------------------------

    /// `NAME operator value`
    fn binding(&mut self) -> Result<Binding, SyntaxError> {
        let start = self.mark();
        let (name, _) = self.expect_name("attribute name")?;
        let expr = self.operator_expr(&name)?;
        Ok(Binding {
            name,
            expr,
            span: self.node_span(start),
        })
    }

    /// `NAME ('.' NAME)+ operator value`
    fn ex_binding(&mut self) -> Result<ExBinding, SyntaxError> {
        let start = self.mark();
        let mut chain = vec![self.expect_name("attribute name")?.0];
        while self.eat(&TokenKind::Dot).is_some() {
            chain.push(self.expect_name("attribute name")?.0);
        }
        let last = chain.last().cloned().unwrap_or_default();
        let expr = self.operator_expr(&last)?;
        Ok(ExBinding {
            chain,
            expr,
            span: self.node_span(start),
        })
    }

    /// The operator and its right-hand side, consuming the trailing NEWLINE
    /// (or indented block). `name` seeds the synthetic function for the
    /// block forms.
    pub(crate) fn operator_expr(&mut self, name: &str) -> Result<OperatorExpr, SyntaxError> {
        let start = self.mark();
        let operator = match self.current().kind {
            TokenKind::Equal => BindingOperator::Eq,
            TokenKind::LeftShift => BindingOperator::Subscribe,
            TokenKind::RightShift => BindingOperator::Update,
            TokenKind::ColonEqual => BindingOperator::Delegate,
            TokenKind::ColonColon => BindingOperator::Notify,
            _ => return Err(self.expected("a binding operator")),
        };
        self.bump();
        let value = match operator {
            BindingOperator::Eq => OperatorValue::Expr(self.binding_expression()?),
            BindingOperator::Subscribe => {
                if self.at(&TokenKind::Newline) {
                    self.operator_block(name, "subscription")?
                } else {
                    OperatorValue::Expr(self.binding_expression()?)
                }
            }
            BindingOperator::Update | BindingOperator::Delegate => {
                let expr = self.binding_expression()?;
                if !is_invertible(&expr.ast) {
                    return Err(self.error_at_node(
                        expr.ast.span,
                        ErrorCode::E2004,
                        format!(
                            "invalid target for the '{}' operator; expected a name, \
                             attribute, call or subscript",
                            operator.symbol()
                        ),
                    ));
                }
                OperatorValue::Expr(expr)
            }
            BindingOperator::Notify => self.operator_block(name, "notification")?,
        };
        Ok(OperatorExpr {
            operator,
            value,
            span: self.node_span(start),
        })
    }

    /// An expression right-hand side terminated by NEWLINE.
    fn binding_expression(&mut self) -> Result<PythonExpression, SyntaxError> {
        let ast = self.require(Self::star_expressions, "expression")?;
        self.expect_forced(&TokenKind::Newline, "newline")?;
        Ok(PythonExpression {
            span: ast.span,
            ast,
        })
    }

    /// A statement block right-hand side: inline simple statements, or an
    /// indented suite. The statements are wrapped into a synthetic zero-arg
    /// function so the downstream compiler can compile-and-call it.
    fn operator_block(
        &mut self,
        name: &str,
        context: &'static str,
    ) -> Result<OperatorValue, SyntaxError> {
        let start = self.mark();
        let body = self.block()?;
        if let Some((what, span)) = first_forbidden(&body) {
            return Err(self.error_at_node(
                span,
                ErrorCode::E2003,
                format!("{what} not allowed in a {context} block"),
            ));
        }
        let span = self.node_span(start);
        let funcdef = Stmt::new(
            StmtKind::FunctionDef {
                name: name.to_owned(),
                type_params: Vec::new(),
                args: Box::new(Arguments::default()),
                body,
                decorator_list: Vec::new(),
                returns: None,
            },
            span,
        );
        Ok(OperatorValue::Func(PythonModule {
            ast: vec![funcdef],
            span,
        }))
    }
}

fn flush_python(chunk: &mut Vec<Stmt>, body: &mut Vec<ModuleItem>) {
    if chunk.is_empty() {
        return;
    }
    let stmts = std::mem::take(chunk);
    let span = stmts
        .first()
        .map(|first| {
            let last = stmts.last().map_or(first.span, |s| s.span);
            first.span.to(last)
        })
        .unwrap_or(NodeSpan::DUMMY);
    body.push(ModuleItem::Python(PythonModule { ast: stmts, span }));
}

/// Target shapes the update/delegate operators can write back through.
fn is_invertible(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Name { .. }
            | ExprKind::Attribute { .. }
            | ExprKind::Call { .. }
            | ExprKind::Subscript { .. }
    )
}


/// What the token after a leading NAME implies for an object-body item.
pub(crate) enum ItemLead {
    Call,
    Block,
    Dotted,
    Override,
    Operator,
    Other,
}

pub(crate) fn item_lead(tag: u8) -> ItemLead {
    if tag == TokenKind::Lpar.tag() {
        ItemLead::Call
    } else if tag == TokenKind::Colon.tag() {
        ItemLead::Block
    } else if tag == TokenKind::Dot.tag() {
        ItemLead::Dotted
    } else if tag == TokenKind::FatArrow.tag() {
        ItemLead::Override
    } else if tag == TokenKind::Equal.tag()
        || tag == TokenKind::LeftShift.tag()
        || tag == TokenKind::RightShift.tag()
        || tag == TokenKind::ColonEqual.tag()
        || tag == TokenKind::ColonColon.tag()
    {
        ItemLead::Operator
    } else {
        ItemLead::Other
    }
}

// ---- forbidden-construct scan ---------------------------------------------

enum Node<'a> {
    S(&'a Stmt),
    E(&'a Expr),
}

/// Find the first construct a binding block may not contain, walking the
/// whole subtree with an explicit stack.
pub(crate) fn first_forbidden(stmts: &[Stmt]) -> Option<(&'static str, NodeSpan)> {
    let mut stack: Vec<Node<'_>> = stmts.iter().rev().map(Node::S).collect();
    while let Some(node) = stack.pop() {
        match node {
            Node::S(stmt) => match &stmt.kind {
                StmtKind::FunctionDef { .. } | StmtKind::AsyncFunctionDef { .. } => {
                    return Some(("function definition", stmt.span));
                }
                StmtKind::ClassDef { .. } => return Some(("class definition", stmt.span)),
                StmtKind::Return { .. } => return Some(("return statement", stmt.span)),
                kind => push_stmt_children(kind, &mut stack),
            },
            Node::E(expr) => match &expr.kind {
                ExprKind::Yield { .. } | ExprKind::YieldFrom { .. } => {
                    return Some(("yield statement", expr.span));
                }
                ExprKind::GeneratorExp { .. } => {
                    return Some(("generator expression", expr.span));
                }
                kind => push_expr_children(kind, &mut stack),
            },
        }
    }
    None
}

fn push_stmt_children<'a>(kind: &'a StmtKind, stack: &mut Vec<Node<'a>>) {
    use Node::{E, S};
    match kind {
        StmtKind::Delete { targets } => stack.extend(targets.iter().rev().map(E)),
        StmtKind::Assign { targets, value } => {
            stack.push(E(value));
            stack.extend(targets.iter().rev().map(E));
        }
        StmtKind::AugAssign { target, value, .. } => {
            stack.push(E(value));
            stack.push(E(target));
        }
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
            ..
        } => {
            if let Some(value) = value {
                stack.push(E(value));
            }
            stack.push(E(annotation));
            stack.push(E(target));
        }
        StmtKind::TypeAlias { name, value, .. } => {
            stack.push(E(value));
            stack.push(E(name));
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        }
        | StmtKind::AsyncFor {
            target,
            iter,
            body,
            orelse,
        } => {
            stack.extend(orelse.iter().rev().map(S));
            stack.extend(body.iter().rev().map(S));
            stack.push(E(iter));
            stack.push(E(target));
        }
        StmtKind::While { test, body, orelse } | StmtKind::If { test, body, orelse } => {
            stack.extend(orelse.iter().rev().map(S));
            stack.extend(body.iter().rev().map(S));
            stack.push(E(test));
        }
        StmtKind::With { items, body } | StmtKind::AsyncWith { items, body } => {
            stack.extend(body.iter().rev().map(S));
            for item in items.iter().rev() {
                if let Some(vars) = &item.optional_vars {
                    stack.push(E(vars));
                }
                stack.push(E(&item.context_expr));
            }
        }
        StmtKind::Match { subject, cases } => {
            for case in cases.iter().rev() {
                stack.extend(case.body.iter().rev().map(S));
                if let Some(guard) = &case.guard {
                    stack.push(E(guard));
                }
            }
            stack.push(E(subject));
        }
        StmtKind::Raise { exc, cause } => {
            if let Some(cause) = cause {
                stack.push(E(cause));
            }
            if let Some(exc) = exc {
                stack.push(E(exc));
            }
        }
        StmtKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        }
        | StmtKind::TryStar {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            stack.extend(finalbody.iter().rev().map(S));
            stack.extend(orelse.iter().rev().map(S));
            for handler in handlers.iter().rev() {
                stack.extend(handler.body.iter().rev().map(S));
                if let Some(ty) = &handler.r#type {
                    stack.push(E(ty));
                }
            }
            stack.extend(body.iter().rev().map(S));
        }
        StmtKind::Assert { test, msg } => {
            if let Some(msg) = msg {
                stack.push(E(msg));
            }
            stack.push(E(test));
        }
        StmtKind::Expr { value } => stack.push(E(value)),
        StmtKind::Return { value } => {
            if let Some(value) = value {
                stack.push(E(value));
            }
        }
        _ => {}
    }
}

fn push_expr_children<'a>(kind: &'a ExprKind, stack: &mut Vec<Node<'a>>) {
    use Node::E;
    match kind {
        ExprKind::BoolOp { values, .. } => stack.extend(values.iter().rev().map(E)),
        ExprKind::NamedExpr { target, value } => {
            stack.push(E(value));
            stack.push(E(target));
        }
        ExprKind::BinOp { left, right, .. } => {
            stack.push(E(right));
            stack.push(E(left));
        }
        ExprKind::UnaryOp { operand, .. } => stack.push(E(operand)),
        ExprKind::Lambda { body, .. } => stack.push(E(body)),
        ExprKind::IfExp { test, body, orelse } => {
            stack.push(E(orelse));
            stack.push(E(body));
            stack.push(E(test));
        }
        ExprKind::Dict { keys, values } => {
            stack.extend(values.iter().rev().map(E));
            stack.extend(keys.iter().rev().flatten().map(E));
        }
        ExprKind::Set { elts } => stack.extend(elts.iter().rev().map(E)),
        ExprKind::ListComp { elt, generators } | ExprKind::SetComp { elt, generators } => {
            for generator in generators.iter().rev() {
                stack.extend(generator.ifs.iter().rev().map(E));
                stack.push(E(&generator.iter));
                stack.push(E(&generator.target));
            }
            stack.push(E(elt));
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => {
            for generator in generators.iter().rev() {
                stack.extend(generator.ifs.iter().rev().map(E));
                stack.push(E(&generator.iter));
                stack.push(E(&generator.target));
            }
            stack.push(E(value));
            stack.push(E(key));
        }
        ExprKind::Await { value } => stack.push(E(value)),
        ExprKind::Compare {
            left, comparators, ..
        } => {
            stack.extend(comparators.iter().rev().map(E));
            stack.push(E(left));
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            stack.extend(keywords.iter().rev().map(|kw| E(&kw.value)));
            stack.extend(args.iter().rev().map(E));
            stack.push(E(func));
        }
        ExprKind::FormattedValue {
            value, format_spec, ..
        } => {
            if let Some(spec) = format_spec {
                stack.push(E(spec));
            }
            stack.push(E(value));
        }
        ExprKind::JoinedStr { values } => stack.extend(values.iter().rev().map(E)),
        ExprKind::Attribute { value, .. } | ExprKind::Starred { value, .. } => {
            stack.push(E(value));
        }
        ExprKind::Subscript { value, slice, .. } => {
            stack.push(E(slice));
            stack.push(E(value));
        }
        ExprKind::List { elts, .. } | ExprKind::Tuple { elts, .. } => {
            stack.extend(elts.iter().rev().map(E));
        }
        ExprKind::Slice { lower, upper, step } => {
            for part in [step, upper, lower].into_iter().flatten() {
                stack.push(E(part));
            }
        }
        _ => {}
    }
}

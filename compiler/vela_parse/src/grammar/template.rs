//! Template definitions and template instantiations.

use rustc_hash::FxHashSet;

use vela_ir::ast::decl::{
    KeywordParameter, PositionalParameter, Pragma, PythonExpression, Template, TemplateArguments,
    TemplateIdentifiers, TemplateInst, TemplateInstBinding, TemplateItem, TemplateParameters,
};
use vela_ir::ast::py::{Expr, ExprKind};
use vela_ir::TokenKind;

use vela_diagnostic::ErrorCode;

use crate::error::SyntaxError;
use crate::parser::Parser;

impl Parser<'_> {
    /// `'template' NAME '(' parameters ')' ':' suite`
    pub(crate) fn template(&mut self, pragmas: Vec<Pragma>) -> Result<Template, SyntaxError> {
        let start = self.mark();
        self.bump();
        let (name, _) = self.expect_name("template name")?;
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        let parameters = self.template_parameters()?;
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        self.expect_forced(&TokenKind::Newline, "newline")?;
        if self.eat(&TokenKind::Indent).is_none() {
            return Err(self.indentation_error_at(self.current().span, "expected an indented block"));
        }
        let docstring = self.template_docstring()?;
        let mut body = Vec::new();
        let mut consts: FxHashSet<String> = FxHashSet::default();
        while !self.at(&TokenKind::Dedent) && !self.at_end() {
            if let Some(item) = self.template_item(&parameters, &mut consts)? {
                body.push(item);
            }
        }
        self.expect_forced(&TokenKind::Dedent, "dedent")?;
        Ok(Template {
            name,
            parameters,
            docstring,
            pragmas,
            body,
            span: self.node_span(start),
        })
    }

    fn template_docstring(&mut self) -> Result<Option<String>, SyntaxError> {
        if !self.at_tag(TokenKind::TAG_STR) || self.nth_tag(1) != TokenKind::Newline.tag() {
            return Ok(None);
        }
        let TokenKind::Str(name) = self.bump().kind.clone() else {
            return Ok(None);
        };
        self.bump();
        Ok(Some(self.resolve(name).to_owned()))
    }

    /// Positional parameters (optionally specialized), then keyword
    /// parameters (with defaults), then an optional `*star` parameter.
    fn template_parameters(&mut self) -> Result<TemplateParameters, SyntaxError> {
        let start = self.mark();
        let mut positional = Vec::new();
        let mut keywords: Vec<KeywordParameter> = Vec::new();
        let mut starparam = None;
        let mut seen: FxHashSet<String> = FxHashSet::default();
        loop {
            if self.at(&TokenKind::Rpar) {
                break;
            }
            if self.eat(&TokenKind::Star).is_some() {
                let (name, span) = self.expect_name("parameter name after '*'")?;
                if !seen.insert(name.clone()) {
                    return Err(self.duplicate_parameter(&name, span));
                }
                starparam = Some(name);
                self.eat(&TokenKind::Comma);
                break;
            }
            let param_start = self.mark();
            let (name, span) = self.expect_name("parameter name")?;
            if !seen.insert(name.clone()) {
                return Err(self.duplicate_parameter(&name, span));
            }
            if self.eat(&TokenKind::Equal).is_some() {
                let ast = self.require(Self::expression, "default expression")?;
                keywords.push(KeywordParameter {
                    name,
                    default: PythonExpression {
                        span: ast.span,
                        ast,
                    },
                    span: self.node_span(param_start),
                });
            } else {
                if !keywords.is_empty() {
                    return Err(self.error_at(
                        span,
                        ErrorCode::E1005,
                        "a positional parameter may not follow a keyword parameter",
                    ));
                }
                let specialization = if self.eat(&TokenKind::Colon).is_some() {
                    let ast = self.require(Self::expression, "specialization")?;
                    Some(PythonExpression {
                        span: ast.span,
                        ast,
                    })
                } else {
                    None
                };
                positional.push(PositionalParameter {
                    name,
                    specialization,
                    span: self.node_span(param_start),
                });
            }
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(TemplateParameters {
            positional,
            keywords,
            starparam,
            span: self.node_span(start),
        })
    }

    fn duplicate_parameter(&self, name: &str, span: vela_ir::Span) -> SyntaxError {
        self.error_at(
            span,
            ErrorCode::E2001,
            format!("duplicate parameter name '{name}'"),
        )
    }

    /// One template-body item; `None` means a filtered `pass`.
    fn template_item(
        &mut self,
        parameters: &TemplateParameters,
        consts: &mut FxHashSet<String>,
    ) -> Result<Option<TemplateItem>, SyntaxError> {
        if self.eat(&TokenKind::Pass).is_some() {
            self.expect_forced(&TokenKind::Newline, "newline")?;
            return Ok(None);
        }
        if self.at_soft("const") && self.nth_tag(1) == TokenKind::TAG_NAME {
            let item = self.const_expr()?;
            if parameters.names().any(|p| p == item.name) {
                return Err(self.error_at_node(
                    item.span,
                    ErrorCode::E2002,
                    format!("declaration of 'const {}' shadows a parameter", item.name),
                ));
            }
            if !consts.insert(item.name.clone()) {
                return Err(self.error_at_node(
                    item.span,
                    ErrorCode::E2002,
                    format!(
                        "declaration of 'const {}' shadows a previous declaration",
                        item.name
                    ),
                ));
            }
            return Ok(Some(TemplateItem::Const(item)));
        }
        if !self.at_tag(TokenKind::TAG_NAME) {
            return Err(self.expected("a template-body item"));
        }
        if self.nth_tag(1) == TokenKind::Lpar.tag() {
            return Ok(Some(TemplateItem::TemplateInst(self.template_inst()?)));
        }
        Ok(Some(TemplateItem::Child(self.child_def()?)))
    }

    // ---- instantiation ----------------------------------------------------

    /// `NAME '(' arguments ')' [':' identifiers] ':' suite`
    pub(crate) fn template_inst(&mut self) -> Result<TemplateInst, SyntaxError> {
        let start = self.mark();
        let pragmas = Vec::new();
        let (name, _) = self.expect_name("template name")?;
        let arguments = self.template_arguments()?;
        self.expect_forced(&TokenKind::Colon, "':'")?;
        let identifiers = if self.at_tag(TokenKind::TAG_NAME) || self.at(&TokenKind::Star) {
            let identifiers = self.template_identifiers()?;
            self.expect_forced(&TokenKind::Colon, "':'")?;
            Some(identifiers)
        } else {
            None
        };
        let body = self.template_inst_body(identifiers.as_ref())?;
        Ok(TemplateInst {
            name,
            arguments,
            identifiers,
            pragmas,
            body,
            span: self.node_span(start),
        })
    }

    /// `'(' [expr (',' expr)*] ['*' expr] ')'`
    fn template_arguments(&mut self) -> Result<TemplateArguments, SyntaxError> {
        let start = self.mark();
        self.expect_forced(&TokenKind::Lpar, "'('")?;
        let mut args = Vec::new();
        let mut stararg = None;
        while !self.at(&TokenKind::Rpar) {
            if self.eat(&TokenKind::Star).is_some() {
                let ast = self.require(Self::expression, "expression after '*'")?;
                stararg = Some(PythonExpression {
                    span: ast.span,
                    ast,
                });
                break;
            }
            let arg_start = self.mark();
            let mut ast = self.require(Self::expression, "argument expression")?;
            // Unparenthesized generator arguments are allowed here.
            if self.at(&TokenKind::For) || self.at(&TokenKind::Async) {
                if let Some(generators) = self.for_if_clauses()? {
                    ast = Expr::new(
                        ExprKind::GeneratorExp {
                            elt: Box::new(ast),
                            generators,
                        },
                        self.node_span(arg_start),
                    );
                }
            }
            args.push(PythonExpression {
                span: ast.span,
                ast,
            });
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_forced(&TokenKind::Rpar, "')'")?;
        Ok(TemplateArguments {
            args,
            stararg,
            span: self.node_span(start),
        })
    }

    /// `NAME (',' NAME)* [',' '*' NAME] | '*' NAME`
    fn template_identifiers(&mut self) -> Result<TemplateIdentifiers, SyntaxError> {
        let start = self.mark();
        let mut names = Vec::new();
        let mut starname = None;
        loop {
            if self.eat(&TokenKind::Star).is_some() {
                starname = Some(self.expect_name("name after '*'")?.0);
                break;
            }
            names.push(self.expect_name("identifier")?.0);
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(TemplateIdentifiers {
            names,
            starname,
            span: self.node_span(start),
        })
    }

    /// The instantiation suite: `pass` or bindings targeting names declared
    /// in the identifiers clause.
    fn template_inst_body(
        &mut self,
        identifiers: Option<&TemplateIdentifiers>,
    ) -> Result<Vec<TemplateInstBinding>, SyntaxError> {
        if self.eat(&TokenKind::Newline).is_none() {
            // Inline form: only `pass` is useful here.
            self.expect_forced(&TokenKind::Pass, "'pass'")?;
            self.expect_forced(&TokenKind::Newline, "newline")?;
            return Ok(Vec::new());
        }
        if self.eat(&TokenKind::Indent).is_none() {
            return Err(self.indentation_error_at(self.current().span, "expected an indented block"));
        }
        let mut body = Vec::new();
        while !self.at(&TokenKind::Dedent) && !self.at_end() {
            if self.eat(&TokenKind::Pass).is_some() {
                self.expect_forced(&TokenKind::Newline, "newline")?;
                continue;
            }
            body.push(self.template_inst_binding(identifiers)?);
        }
        self.expect_forced(&TokenKind::Dedent, "dedent")?;
        Ok(body)
    }

    /// `NAME ('.' NAME)+ operator value`, where NAME must come from the
    /// instantiation's identifiers clause.
    fn template_inst_binding(
        &mut self,
        identifiers: Option<&TemplateIdentifiers>,
    ) -> Result<TemplateInstBinding, SyntaxError> {
        let start = self.mark();
        let (name, span) = self.expect_name("identifier")?;
        if !identifiers.is_some_and(|ids| ids.declares(&name)) {
            return Err(self.error_at(
                span,
                ErrorCode::E2005,
                format!("unknown template instantiation identifier '{name}'"),
            ));
        }
        let mut chain = Vec::new();
        while self.eat(&TokenKind::Dot).is_some() {
            chain.push(self.expect_name("attribute name")?.0);
        }
        if chain.is_empty() {
            return Err(self.expected("'.' after the identifier"));
        }
        let last = chain.last().cloned().unwrap_or_default();
        let expr = self.operator_expr(&last)?;
        Ok(TemplateInstBinding {
            name,
            chain,
            expr,
            span: self.node_span(start),
        })
    }
}

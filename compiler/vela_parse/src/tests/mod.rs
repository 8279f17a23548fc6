//! Parser tests.
//!
//! Tests are organized into modules by category:
//! - `expr`: host-language expression grammar and precedence
//! - `stmt`: host-language statement grammar
//! - `decl`: `enamldef` blocks, storage declarations, and binding operators
//! - `template`: template definitions and instantiations
//! - `errors`: error positions, tracebacks, and the invalid-rule second pass
//! - `props`: property tests over arbitrary input

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod errors;
mod expr;
mod props;
mod stmt;
mod template;

use crate::{parse_module, ParseOptions, Parsed, SyntaxError};
use vela_ir::ast::decl::ModuleItem;
use vela_ir::ast::py;
use vela_ir::StringInterner;

fn parse(source: &str) -> Result<Parsed, SyntaxError> {
    let interner = StringInterner::new();
    parse_module(source, "view.vela", &interner, ParseOptions::default())
}

fn parse_with_version(source: &str, feature_version: u32) -> Result<Parsed, SyntaxError> {
    let interner = StringInterner::new();
    parse_module(source, "view.vela", &interner, ParseOptions { feature_version })
}

fn parse_ok(source: &str) -> Parsed {
    match parse(source) {
        Ok(parsed) => parsed,
        Err(err) => panic!("parse failed:\n{}", err.traceback()),
    }
}

fn parse_err(source: &str) -> SyntaxError {
    match parse(source) {
        Ok(_) => panic!("expected a syntax error for {source:?}"),
        Err(err) => err,
    }
}

/// First statement of the module, which must start with a python chunk.
fn first_stmt(parsed: &Parsed) -> &py::Stmt {
    match &parsed.module.body[0] {
        ModuleItem::Python(module) => &module.ast[0],
        other => panic!("expected a python item, got {other:?}"),
    }
}

/// Parse a single expression statement and hand back its expression.
fn first_expr(source: &str) -> py::Expr {
    let parsed = parse_ok(source);
    match &first_stmt(&parsed).kind {
        py::StmtKind::Expr { value } => (**value).clone(),
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

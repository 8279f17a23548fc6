//! Analysis helper tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use vela_ir::ast::decl::{
    Binding, BindingOperator, ChildDef, DefItem, EnamlDef, OperatorExpr, OperatorValue,
    PythonExpression, StorageExpr, StorageKind, Template, TemplateArguments, TemplateIdentifiers,
    TemplateInst, TemplateItem, TemplateParameters,
};
use vela_ir::ast::py::{Const, Expr, ExprKind};
use vela_ir::NodeSpan;

use crate::{
    has_identifiers, needs_engine, needs_subclass, template_has_identifiers, VarPool,
};

fn literal_operator_expr() -> OperatorExpr {
    let ast = Expr::new(
        ExprKind::Constant { value: Const::Int { value: 1 } },
        NodeSpan::DUMMY,
    );
    OperatorExpr {
        operator: BindingOperator::Eq,
        value: OperatorValue::Expr(PythonExpression { span: ast.span, ast }),
        span: NodeSpan::DUMMY,
    }
}

fn binding(name: &str) -> DefItem {
    DefItem::Binding(Binding {
        name: name.to_owned(),
        expr: literal_operator_expr(),
        span: NodeSpan::DUMMY,
    })
}

fn storage(name: &str, with_default: bool) -> DefItem {
    DefItem::Storage(StorageExpr {
        kind: StorageKind::Attr,
        name: name.to_owned(),
        typename: None,
        expr: with_default.then(literal_operator_expr),
        span: NodeSpan::DUMMY,
    })
}

fn child(identifier: Option<&str>, body: Vec<DefItem>) -> ChildDef {
    ChildDef {
        typename: "Container".to_owned(),
        identifier: identifier.map(str::to_owned),
        body,
        span: NodeSpan::DUMMY,
    }
}

fn enamldef(identifier: Option<&str>, body: Vec<DefItem>) -> EnamlDef {
    EnamlDef {
        typename: "Main".to_owned(),
        base: "Window".to_owned(),
        identifier: identifier.map(str::to_owned),
        docstring: None,
        pragmas: Vec::new(),
        decorators: Vec::new(),
        body,
        span: NodeSpan::DUMMY,
    }
}

fn inst(with_identifiers: bool) -> TemplateInst {
    TemplateInst {
        name: "Field".to_owned(),
        arguments: TemplateArguments {
            args: Vec::new(),
            stararg: None,
            span: NodeSpan::DUMMY,
        },
        identifiers: with_identifiers.then(|| TemplateIdentifiers {
            names: vec!["fld".to_owned()],
            starname: None,
            span: NodeSpan::DUMMY,
        }),
        pragmas: Vec::new(),
        body: Vec::new(),
        span: NodeSpan::DUMMY,
    }
}

#[test]
fn test_has_identifiers_on_the_definition_itself() {
    assert!(has_identifiers(&enamldef(Some("main"), Vec::new())));
    assert!(!has_identifiers(&enamldef(None, Vec::new())));
}

#[test]
fn test_has_identifiers_deeply_nested() {
    let inner = child(Some("lbl"), Vec::new());
    let middle = child(None, vec![DefItem::Child(inner)]);
    let outer = child(None, vec![DefItem::Child(middle)]);
    let def = enamldef(None, vec![DefItem::Child(outer)]);
    assert!(has_identifiers(&def));
}

#[test]
fn test_has_identifiers_from_instantiation_clause() {
    let def = enamldef(None, vec![DefItem::TemplateInst(inst(true))]);
    assert!(has_identifiers(&def));

    let def = enamldef(None, vec![DefItem::TemplateInst(inst(false))]);
    assert!(!has_identifiers(&def));
}

#[test]
fn test_template_has_identifiers() {
    let template = Template {
        name: "Field".to_owned(),
        parameters: TemplateParameters::default(),
        docstring: None,
        pragmas: Vec::new(),
        body: vec![TemplateItem::Child(child(
            None,
            vec![DefItem::Child(child(Some("lbl"), Vec::new()))],
        ))],
        span: NodeSpan::DUMMY,
    };
    assert!(template_has_identifiers(&template));
}

#[test]
fn test_needs_engine() {
    assert!(!needs_engine(&[]));
    assert!(!needs_engine(&[storage("x", false)]));
    assert!(needs_engine(&[storage("x", true)]));
    assert!(needs_engine(&[binding("text")]));
    // Nested bindings do not count; only the direct body matters.
    let nested = child(None, vec![binding("text")]);
    assert!(!needs_engine(&[DefItem::Child(nested)]));
}

#[test]
fn test_needs_subclass() {
    assert!(!needs_subclass(&child(None, Vec::new())));
    assert!(needs_subclass(&child(None, vec![storage("x", false)])));
    assert!(needs_subclass(&child(None, vec![binding("text")])));
    let only_children = child(None, vec![DefItem::Child(child(Some("lbl"), Vec::new()))]);
    assert!(!needs_subclass(&only_children));
}

#[test]
fn test_var_pool_counts_up() {
    let mut pool = VarPool::new();
    assert_eq!(pool.new_name(), "_[var_0]");
    assert_eq!(pool.new_name(), "_[var_1]");
    assert_eq!(pool.new_name(), "_[var_2]");
    assert_eq!(pool.outstanding(), 3);
}

#[test]
fn test_var_pool_reuses_smallest_released_first() {
    let mut pool = VarPool::new();
    let a = pool.new_name();
    let b = pool.new_name();
    let _c = pool.new_name();
    pool.release(&b);
    pool.release(&a);
    assert_eq!(pool.new_name(), "_[var_0]");
    assert_eq!(pool.new_name(), "_[var_1]");
    assert_eq!(pool.new_name(), "_[var_3]");
}

#[test]
fn test_var_pool_ignores_foreign_and_double_release() {
    let mut pool = VarPool::new();
    let a = pool.new_name();
    pool.release("user_name");
    pool.release(&a);
    pool.release(&a);
    assert_eq!(pool.outstanding(), 0);
    assert_eq!(pool.new_name(), "_[var_0]");
    assert_eq!(pool.new_name(), "_[var_1]");
}

//! Post-parse identifier-uniqueness validation.
//!
//! Each `enamldef` and `template` opens one identifier scope: the local
//! identifiers declared on the definition itself, on nested child defs,
//! and in template-instantiation identifier clauses must all be distinct
//! within it. A repeat is reported as a warning rather than a hard error,
//! matching long-standing tooling that treats redeclaration as suspect
//! but loadable.
//!
//! The walk is iterative with an explicit stack so deeply nested child
//! trees cannot overflow the call stack, and it only reads the tree, so
//! running it twice over the same module reports the same warnings.

use rustc_hash::FxHashSet;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::decl::{ChildDef, DefItem, Module, ModuleItem, TemplateItem, TemplateInst};
use vela_ir::NodeSpan;

use crate::parser::Parser;

/// Check identifier uniqueness in every `enamldef` and `template` of the
/// module, pushing a warning for each redeclaration.
pub(crate) fn validate_module(parser: &mut Parser<'_>, module: &Module) {
    for item in &module.body {
        match item {
            ModuleItem::EnamlDef(def) => {
                let mut scope = Scope::default();
                if let Some(name) = &def.identifier {
                    scope.declare(parser, name, def.span);
                }
                let mut stack: Vec<&DefItem> = def.body.iter().rev().collect();
                while let Some(item) = stack.pop() {
                    walk_def_item(parser, &mut scope, &mut stack, item);
                }
            }
            ModuleItem::Template(template) => {
                let mut scope = Scope::default();
                for item in &template.body {
                    let mut stack: Vec<&DefItem> = Vec::new();
                    match item {
                        TemplateItem::Const(_) => {}
                        TemplateItem::Child(child) => {
                            check_child(parser, &mut scope, &mut stack, child);
                        }
                        TemplateItem::TemplateInst(inst) => check_inst(parser, &mut scope, inst),
                    }
                    while let Some(item) = stack.pop() {
                        walk_def_item(parser, &mut scope, &mut stack, item);
                    }
                }
            }
            ModuleItem::Python(_) => {}
        }
    }
}

#[derive(Default)]
struct Scope {
    seen: FxHashSet<String>,
}

impl Scope {
    fn declare(&mut self, parser: &mut Parser<'_>, name: &str, span: NodeSpan) {
        if !self.seen.insert(name.to_owned()) {
            let byte_span = parser.node_byte_span(span);
            parser.warn(
                Diagnostic::warning(ErrorCode::E2001)
                    .with_message(format!("redefinition of identifier '{name}'"))
                    .with_label(byte_span, "already declared in this scope"),
            );
        }
    }
}

fn walk_def_item<'m>(
    parser: &mut Parser<'_>,
    scope: &mut Scope,
    stack: &mut Vec<&'m DefItem>,
    item: &'m DefItem,
) {
    match item {
        DefItem::Child(child) => check_child(parser, scope, stack, child),
        DefItem::TemplateInst(inst) => check_inst(parser, scope, inst),
        DefItem::Binding(_)
        | DefItem::ExBinding(_)
        | DefItem::Storage(_)
        | DefItem::Alias(_)
        | DefItem::Const(_)
        | DefItem::Func(_) => {}
    }
}

fn check_child<'m>(
    parser: &mut Parser<'_>,
    scope: &mut Scope,
    stack: &mut Vec<&'m DefItem>,
    child: &'m ChildDef,
) {
    if let Some(name) = &child.identifier {
        scope.declare(parser, name, child.span);
    }
    // Pre-order: nested items are checked in document order.
    stack.extend(child.body.iter().rev());
}

fn check_inst(parser: &mut Parser<'_>, scope: &mut Scope, inst: &TemplateInst) {
    if let Some(identifiers) = &inst.identifiers {
        for name in &identifiers.names {
            scope.declare(parser, name, identifiers.span);
        }
        if let Some(star) = &identifiers.starname {
            scope.declare(parser, star, identifiers.span);
        }
    }
}

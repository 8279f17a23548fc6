//! Declarative AST analysis helpers.
//!
//! These answer the structural questions a code generator asks about a
//! parsed object tree: does a definition introduce local identifiers
//! anywhere in its subtree, does a body need a binding engine, and does a
//! child definition need its own subclass. [`VarPool`] hands out the
//! private variable names generated code uses for intermediate objects.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;

use vela_ir::ast::decl::{ChildDef, DefItem, EnamlDef, Template, TemplateItem};

#[cfg(test)]
mod tests;

/// True when the definition or anything nested below it introduces a
/// local identifier.
///
/// Identifiers come from three places: the definition's own `: name:`
/// clause, a nested child def's clause, and a template instantiation's
/// identifiers clause. The walk is an explicit-stack pre-order traversal
/// so arbitrarily deep trees cannot overflow the call stack.
pub fn has_identifiers(def: &EnamlDef) -> bool {
    def.identifier.is_some() || items_have_identifiers(&def.body)
}

/// [`has_identifiers`] for a template body.
pub fn template_has_identifiers(template: &Template) -> bool {
    let mut stack: Vec<&DefItem> = Vec::new();
    for item in &template.body {
        match item {
            TemplateItem::Const(_) => {}
            TemplateItem::Child(child) => {
                if child.identifier.is_some() {
                    return true;
                }
                stack.extend(child.body.iter());
            }
            TemplateItem::TemplateInst(inst) => {
                if inst.identifiers.is_some() {
                    return true;
                }
            }
        }
    }
    drain_identifier_stack(stack)
}

fn items_have_identifiers(body: &[DefItem]) -> bool {
    drain_identifier_stack(body.iter().collect())
}

fn drain_identifier_stack(mut stack: Vec<&DefItem>) -> bool {
    while let Some(item) = stack.pop() {
        match item {
            DefItem::Child(child) => {
                if child.identifier.is_some() {
                    return true;
                }
                stack.extend(child.body.iter());
            }
            DefItem::TemplateInst(inst) => {
                if inst.identifiers.is_some() {
                    return true;
                }
            }
            DefItem::Binding(_)
            | DefItem::ExBinding(_)
            | DefItem::Storage(_)
            | DefItem::Alias(_)
            | DefItem::Const(_)
            | DefItem::Func(_) => {}
        }
    }
    false
}

/// True when the direct body items require a binding engine at runtime:
/// any operator binding, or a storage declaration carrying a default.
pub fn needs_engine(body: &[DefItem]) -> bool {
    body.iter().any(|item| match item {
        DefItem::Binding(_) | DefItem::ExBinding(_) => true,
        DefItem::Storage(storage) => storage.expr.is_some(),
        _ => false,
    })
}

/// True when a child definition changes the class body of its type and so
/// must be generated as a subclass rather than a plain instantiation.
pub fn needs_subclass(child: &ChildDef) -> bool {
    child.body.iter().any(|item| {
        matches!(
            item,
            DefItem::Binding(_)
                | DefItem::ExBinding(_)
                | DefItem::Storage(_)
                | DefItem::Alias(_)
                | DefItem::Func(_)
        )
    })
}

/// An allocator for the private `_[var_N]` names used by generated code.
///
/// The bracketed form can never collide with a user identifier. Released
/// names are reused smallest-index-first, keeping generated name sets
/// compact; a name is guaranteed unique for as long as it is outstanding.
#[derive(Default, Debug)]
pub struct VarPool {
    next: u32,
    released: BinaryHeap<Reverse<u32>>,
    outstanding: FxHashSet<u32>,
}

impl VarPool {
    pub fn new() -> Self {
        VarPool::default()
    }

    /// Hand out a fresh private name.
    pub fn new_name(&mut self) -> String {
        let index = match self.released.pop() {
            Some(Reverse(index)) => index,
            None => {
                let index = self.next;
                self.next += 1;
                index
            }
        };
        self.outstanding.insert(index);
        format!("_[var_{index}]")
    }

    /// Return a name to the pool. Names that did not come from this pool,
    /// or were already released, are ignored.
    pub fn release(&mut self, name: &str) {
        let Some(index) = parse_pool_name(name) else {
            return;
        };
        if self.outstanding.remove(&index) {
            self.released.push(Reverse(index));
        }
    }

    /// Number of names currently handed out.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}

fn parse_pool_name(name: &str) -> Option<u32> {
    name.strip_prefix("_[var_")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

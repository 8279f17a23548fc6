//! Declarative AST.
//!
//! The node set for the object-tree layer of Vela: `enamldef` definitions,
//! nested child definitions, storage declarations, data bindings, aliases,
//! consts, pragmas, templates and template instantiations. Host-language
//! fragments are wrapped in [`PythonExpression`] / [`PythonModule`] so the
//! downstream compiler can hand them to a host-language code generator
//! unchanged.
//!
//! Ownership is a strict tree: every child node has exactly one parent.
//! Nodes are built bottom-up during parsing and never mutated afterwards,
//! with one exception: decorators are spliced onto an [`EnamlDef`] after its
//! header has been parsed.

use super::py;
use crate::NodeSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed Vela module: host-language statement chunks interleaved with
/// declarative definitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub filename: String,
    pub docstring: Option<String>,
    pub body: Vec<ModuleItem>,
    pub span: NodeSpan,
}

/// Top-level items of a [`Module`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodetype")]
pub enum ModuleItem {
    Python(PythonModule),
    EnamlDef(EnamlDef),
    Template(Template),
}

/// A chunk of host-language statements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PythonModule {
    pub ast: Vec<py::Stmt>,
    pub span: NodeSpan,
}

/// A single host-language expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PythonExpression {
    pub ast: py::Expr,
    pub span: NodeSpan,
}

/// `enamldef TypeName(BaseName)[: identifier]:` — a new declarative type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnamlDef {
    pub typename: String,
    pub base: String,
    pub identifier: Option<String>,
    pub docstring: Option<String>,
    pub pragmas: Vec<Pragma>,
    pub decorators: Vec<PythonExpression>,
    pub body: Vec<DefItem>,
    pub span: NodeSpan,
}

/// An inline nested object instance inside an `enamldef` or template body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildDef {
    pub typename: String,
    pub identifier: Option<String>,
    pub body: Vec<DefItem>,
    pub span: NodeSpan,
}

/// Items allowed in an object-definition body.
///
/// Which variants are grammatical in which block kind (enamldef vs child
/// def) is enforced by the parser; the AST carries one closed set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodetype")]
pub enum DefItem {
    Binding(Binding),
    ExBinding(ExBinding),
    Storage(StorageExpr),
    Alias(AliasExpr),
    Const(ConstExpr),
    Func(FuncDef),
    Child(ChildDef),
    TemplateInst(TemplateInst),
}

/// The four binding-operator flavors (five surface spellings).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BindingOperator {
    /// `=` — assign once at construction.
    Eq,
    /// `<<` — re-evaluate on dependency change, push into the attribute.
    Subscribe,
    /// `>>` — attribute changes push back into the expression.
    Update,
    /// `:=` — bidirectional `<<` + `>>`.
    Delegate,
    /// `::` — run a statement block on change.
    Notify,
}

impl BindingOperator {
    /// Surface spelling of the operator.
    pub const fn symbol(self) -> &'static str {
        match self {
            BindingOperator::Eq => "=",
            BindingOperator::Subscribe => "<<",
            BindingOperator::Update => ">>",
            BindingOperator::Delegate => ":=",
            BindingOperator::Notify => "::",
        }
    }
}

impl fmt::Display for BindingOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The right-hand side of a binding operator.
///
/// Block-form operators (`<<` with an indented body, `::`) carry their
/// statements pre-wrapped in a synthetic zero-argument host function so the
/// downstream compiler can compile-and-call it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodetype")]
pub enum OperatorValue {
    Expr(PythonExpression),
    Func(PythonModule),
}

/// An operator plus its bound value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatorExpr {
    pub operator: BindingOperator,
    pub value: OperatorValue,
    pub span: NodeSpan,
}

/// `name <op> value` — bind an attribute of the enclosing object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub expr: OperatorExpr,
    pub span: NodeSpan,
}

/// `a.b.c <op> value` — extended binding through a dotted chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExBinding {
    pub chain: Vec<String>,
    pub expr: OperatorExpr,
    pub span: NodeSpan,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    Attr,
    Event,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Attr => f.write_str("attr"),
            StorageKind::Event => f.write_str("event"),
        }
    }
}

/// `attr name[: Type] [<op> value]` / `event name[: Type] ...` — a storage
/// declaration with an optional default binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageExpr {
    pub kind: StorageKind,
    pub name: String,
    pub typename: Option<String>,
    pub expr: Option<OperatorExpr>,
    pub span: NodeSpan,
}

/// `alias name[: target[.attr]*]` — re-export an identifier (or an attribute
/// reachable through one) under a new name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AliasExpr {
    pub name: String,
    pub target: String,
    pub chain: Vec<String>,
    pub span: NodeSpan,
}

/// `const name[: Type] = expr` — a scope-level constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstExpr {
    pub name: String,
    pub typename: Option<String>,
    pub expr: PythonExpression,
    pub span: NodeSpan,
}

/// A declarative function: `func name(...)` or the override form
/// `name => (...)`, plus their async variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    /// The host `FunctionDef` / `AsyncFunctionDef` statement.
    pub funcdef: py::Stmt,
    pub is_override: bool,
    pub span: NodeSpan,
}

impl FuncDef {
    /// Declared function name.
    pub fn name(&self) -> &str {
        match &self.funcdef.kind {
            py::StmtKind::FunctionDef { name, .. } | py::StmtKind::AsyncFunctionDef { name, .. } => {
                name
            }
            _ => "",
        }
    }
}

/// `template Name(params): ...` — a parameterized declarative fragment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub parameters: TemplateParameters,
    pub docstring: Option<String>,
    pub pragmas: Vec<Pragma>,
    pub body: Vec<TemplateItem>,
    pub span: NodeSpan,
}

/// Items allowed in a template body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodetype")]
pub enum TemplateItem {
    Const(ConstExpr),
    Child(ChildDef),
    TemplateInst(TemplateInst),
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateParameters {
    pub positional: Vec<PositionalParameter>,
    pub keywords: Vec<KeywordParameter>,
    pub starparam: Option<String>,
    pub span: NodeSpan,
}

impl TemplateParameters {
    /// Iterate all declared parameter names, positional first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positional
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.keywords.iter().map(|p| p.name.as_str()))
            .chain(self.starparam.as_deref())
    }
}

/// A positional template parameter with an optional specialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionalParameter {
    pub name: String,
    pub specialization: Option<PythonExpression>,
    pub span: NodeSpan,
}

/// A keyword template parameter with its default expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordParameter {
    pub name: String,
    pub default: PythonExpression,
    pub span: NodeSpan,
}

/// `Name(args)[: identifiers]:` — instantiate a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateInst {
    pub name: String,
    pub arguments: TemplateArguments,
    pub identifiers: Option<TemplateIdentifiers>,
    pub pragmas: Vec<Pragma>,
    pub body: Vec<TemplateInstBinding>,
    pub span: NodeSpan,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateArguments {
    pub args: Vec<PythonExpression>,
    pub stararg: Option<PythonExpression>,
    pub span: NodeSpan,
}

/// The `: a, b, *rest` clause naming the instantiated items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateIdentifiers {
    pub names: Vec<String>,
    pub starname: Option<String>,
    pub span: NodeSpan,
}

impl TemplateIdentifiers {
    /// Check whether `name` is declared by this clause.
    pub fn declares(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name) || self.starname.as_deref() == Some(name)
    }
}

/// `ident.attr <op> value` inside a template-instantiation body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateInstBinding {
    /// The instance identifier the binding targets.
    pub name: String,
    /// The dotted attribute path after the identifier.
    pub chain: Vec<String>,
    pub expr: OperatorExpr,
    pub span: NodeSpan,
}

/// `pragma name(arg, ...)` — a compiler directive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pragma {
    pub command: String,
    pub arguments: Vec<PragmaArg>,
    pub span: NodeSpan,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PragmaArg {
    pub value: PragmaArgValue,
    pub span: NodeSpan,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodetype")]
pub enum PragmaArgValue {
    Token { value: String },
    Number { value: f64 },
    Str { value: String },
}

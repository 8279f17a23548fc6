//! Core data types for the Vela compiler front-end.
//!
//! Vela source is a superset of a Python-style scripting language, extended
//! with declarative object-tree definitions and data bindings. This crate
//! holds everything the lexer and parser agree on: byte-offset spans,
//! interned names, the token model (including the synthetic INDENT/DEDENT
//! block-structure tokens), and the two AST layers:
//!
//! - [`ast::py`] — the host-language AST for embedded expressions and
//!   statement blocks;
//! - [`ast::decl`] — the declarative AST (`enamldef`, child definitions,
//!   bindings, templates) that wraps host fragments.

pub mod ast;
mod interner;
mod name;
mod span;
mod token;

pub use interner::StringInterner;
pub use name::Name;
pub use span::{NodeSpan, Span};
pub use token::{NumberValue, StrFlags, Token, TokenKind, TokenList, SOFT_KEYWORDS};

//! Grammar rules, grouped by area.
//!
//! Each module extends [`crate::parser::Parser`] with `impl` blocks: the
//! host-language expression and statement grammars, the pattern grammar
//! for `match`, the declarative extension grammar, templates, and the
//! second-pass invalid-construct rules used to sharpen error messages.

pub(crate) mod atom;
pub(crate) mod decl;
pub(crate) mod expr;
pub(crate) mod invalid;
pub(crate) mod pattern;
pub(crate) mod stmt;
pub(crate) mod template;

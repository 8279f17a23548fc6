//! The two AST layers.
//!
//! [`py`] is the host-language AST: the Python-style expressions and
//! statement blocks embedded inside declarative constructs (and the plain
//! top-level code a Vela module may contain). [`decl`] is the declarative
//! AST: `enamldef` object trees, bindings, storage declarations, templates.
//!
//! Every node type round-trips through a plain nested mapping (a
//! `serde_json::Value` object keyed by field name plus a `nodetype`
//! discriminator) via [`mapping`]. The dispatch over node kinds is closed:
//! serde's internally-tagged enum representation, never a dynamic
//! name-to-type lookup.

pub mod decl;
pub mod mapping;
pub mod py;

pub use mapping::{AstMapping, MappingError};

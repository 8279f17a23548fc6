//! Structural round-trip between AST nodes and a plain nested mapping.
//!
//! The mapping form (`serde_json::Value` objects keyed by field name, with a
//! `nodetype` discriminator wherever a closed variant set is serialized) is
//! used for caching parsed modules and for debugging. Dispatch back to the
//! concrete node type happens through serde's internally-tagged enum
//! representation — a closed set, no dynamic name lookup.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure to reconstruct a node from its mapping form.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("malformed node mapping: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Structural serialization to and from the plain mapping form.
///
/// Blanket-implemented for every AST node type; the round-trip property
/// `from_mapping(to_mapping(n)) == n` holds structurally, position metadata
/// included.
pub trait AstMapping: Sized {
    fn to_mapping(&self) -> Value;
    fn from_mapping(value: Value) -> Result<Self, MappingError>;
}

impl<T> AstMapping for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_mapping(&self) -> Value {
        // Serialization of in-memory AST nodes cannot fail: no maps with
        // non-string keys, no non-finite-only types.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn from_mapping(value: Value) -> Result<Self, MappingError> {
        Ok(serde_json::from_value(value)?)
    }
}

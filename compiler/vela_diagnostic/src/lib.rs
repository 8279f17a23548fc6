//! Diagnostic system for rich error reporting.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Context labels (why it's wrong)
//!
//! Syntax errors from the parser render in the host language's own
//! `SyntaxError` layout (file, line, caret under the offending column), so
//! editors and REPLs display Vela errors identically to native ones.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use span_utils::LineOffsetTable;

//! Source location spans.
//!
//! Two representations are used across the front-end:
//!
//! - [`Span`] — compact byte-offset pair, produced by the lexer and carried
//!   on every token;
//! - [`NodeSpan`] — 1-based line / 0-based column positions, carried on every
//!   AST node so that diagnostics and the mapping round-trip never need the
//!   original source buffer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte-offset source span.
///
/// Layout: 8 bytes. `start` is the byte offset from file start, `end` is
/// exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized tokens.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range.
    ///
    /// # Panics
    /// Panics if the range exceeds `u32::MAX` bytes. Source files that large
    /// are rejected by the lexer before any span is built.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        debug_assert!(range.end <= u32::MAX as usize, "source exceeds u32::MAX bytes");
        Span {
            start: range.start as u32,
            end: range.end as u32,
        }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line/column position metadata carried on every AST node.
///
/// Lines are 1-based; columns are 0-based internally and rendered 1-based at
/// the error-reporting boundary, matching the host language's `SyntaxError`
/// convention.
///
/// Invariant: `(end_lineno, end_col_offset) >= (lineno, col_offset)`
/// lexicographically.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct NodeSpan {
    pub lineno: u32,
    pub col_offset: u32,
    pub end_lineno: u32,
    pub end_col_offset: u32,
}

impl NodeSpan {
    pub const DUMMY: NodeSpan = NodeSpan {
        lineno: 1,
        col_offset: 0,
        end_lineno: 1,
        end_col_offset: 0,
    };

    pub const fn new(lineno: u32, col_offset: u32, end_lineno: u32, end_col_offset: u32) -> Self {
        NodeSpan {
            lineno,
            col_offset,
            end_lineno,
            end_col_offset,
        }
    }

    /// Start position as a `(line, col)` pair.
    #[inline]
    pub const fn start(&self) -> (u32, u32) {
        (self.lineno, self.col_offset)
    }

    /// End position as a `(line, col)` pair.
    #[inline]
    pub const fn end(&self) -> (u32, u32) {
        (self.end_lineno, self.end_col_offset)
    }

    /// Extend this span to cover `other` as well.
    #[must_use]
    pub fn to(self, other: NodeSpan) -> NodeSpan {
        let (lineno, col_offset) = self.start().min(other.start());
        let (end_lineno, end_col_offset) = self.end().max(other.end());
        NodeSpan {
            lineno,
            col_offset,
            end_lineno,
            end_col_offset,
        }
    }

    /// Check the lexicographic ordering invariant.
    pub fn is_well_formed(&self) -> bool {
        self.end() >= self.start()
    }
}

impl fmt::Debug for NodeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.lineno, self.col_offset, self.end_lineno, self.end_col_offset
        )
    }
}

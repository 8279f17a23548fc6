use std::fmt;

/// Error codes for all front-end diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Semantic / validation errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Invalid escape sequence
    E0004,
    /// Unterminated f-string or f-string expression
    E0005,
    /// Inconsistent indentation
    E0006,
    /// Source file too large
    E0007,

    // Parser Errors (E1xxx)
    /// Unexpected token / invalid syntax
    E1001,
    /// Expected a specific token
    E1002,
    /// Expected an indented block
    E1003,
    /// Invalid assignment target
    E1004,
    /// Invalid argument order
    E1005,
    /// Unparenthesized generator expression
    E1006,
    /// Mixed bytes and string literal concatenation
    E1007,
    /// Malformed declarative construct
    E1008,

    // Semantic / validation Errors (E2xxx)
    /// Duplicate identifier in object or template scope
    E2001,
    /// Template parameter or const shadowing
    E2002,
    /// Forbidden construct inside a binding block
    E2003,
    /// Invalid binding operator for this declaration
    E2004,
    /// Unknown template-instantiation identifier
    E2005,
    /// Feature requires a newer target version
    E2006,
}

impl ErrorCode {
    /// One-line description of the error class.
    pub const fn description(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated string literal",
            ErrorCode::E0002 => "invalid character",
            ErrorCode::E0003 => "invalid number literal",
            ErrorCode::E0004 => "invalid escape sequence",
            ErrorCode::E0005 => "unterminated f-string",
            ErrorCode::E0006 => "inconsistent indentation",
            ErrorCode::E0007 => "source file too large",
            ErrorCode::E1001 => "invalid syntax",
            ErrorCode::E1002 => "expected token",
            ErrorCode::E1003 => "expected an indented block",
            ErrorCode::E1004 => "invalid assignment target",
            ErrorCode::E1005 => "invalid argument order",
            ErrorCode::E1006 => "unparenthesized generator expression",
            ErrorCode::E1007 => "mixed bytes and string literals",
            ErrorCode::E1008 => "malformed declarative construct",
            ErrorCode::E2001 => "duplicate identifier",
            ErrorCode::E2002 => "shadowed declaration",
            ErrorCode::E2003 => "forbidden construct in binding block",
            ErrorCode::E2004 => "invalid binding operator",
            ErrorCode::E2005 => "unknown template-instantiation identifier",
            ErrorCode::E2006 => "feature requires a newer target version",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

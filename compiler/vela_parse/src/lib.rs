//! Packrat recursive-descent parser for Vela source files.
//!
//! A Vela module is a superset of a Python module: alongside ordinary
//! host-language statements it may contain `enamldef` blocks, `template`
//! definitions, and `pragma` directives. [`parse_module`] lexes and parses
//! a whole file into a [`vela_ir::ast::decl::Module`].
//!
//! Errors follow the two-pass strategy used by PEG grammars with invalid
//! rules: the first pass parses with only the valid grammar, and when it
//! fails a second pass re-parses with extra rules that match known-bad
//! shapes to produce a sharper message. The second pass never changes
//! whether parsing fails, only what the failure says.

mod error;
mod grammar;
mod parser;
mod stack;
#[cfg(test)]
mod tests;
mod validate;

pub use error::{ErrorKind, SyntaxError};

use vela_diagnostic::Diagnostic;
use vela_ir::ast::decl::Module;
use vela_ir::StringInterner;

use parser::Parser;

/// Knobs for a parse run.
#[derive(Copy, Clone, Debug)]
pub struct ParseOptions {
    /// Minor version of the Python 3 grammar to accept, e.g. `12` for
    /// 3.12. Version-gated constructs (`match`, `except*`, `type`) below
    /// this level raise a syntax error.
    pub feature_version: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { feature_version: 12 }
    }
}

/// A successfully parsed module plus any non-fatal diagnostics.
#[derive(Debug)]
pub struct Parsed {
    pub module: Module,
    pub warnings: Vec<Diagnostic>,
}

/// Lex and parse `source` into a declarative module AST.
///
/// `filename` is only used in diagnostics. Identifier and string payloads
/// are interned into `interner`, which may be shared across files.
pub fn parse_module(
    source: &str,
    filename: &str,
    interner: &StringInterner,
    options: ParseOptions,
) -> Result<Parsed, SyntaxError> {
    let tokens = vela_lexer::lex(source, interner)
        .map_err(|err| SyntaxError::from_lex(&err, source, filename))?;

    let mut parser = Parser::new(source, filename, &tokens, interner, options.feature_version);
    match parser.module() {
        Ok(module) => {
            validate::validate_module(&mut parser, &module);
            Ok(Parsed { module, warnings: parser.take_warnings() })
        }
        Err(first) => {
            // Second pass with the invalid rules enabled. Its error is
            // preferred; if it unexpectedly succeeds, the first error
            // stands.
            tracing::debug!(filename, line = first.lineno, "re-parsing with invalid rules");
            let mut retry = Parser::new(source, filename, &tokens, interner, options.feature_version);
            retry.call_invalid_rules = true;
            match retry.module() {
                Err(second) => Err(second),
                Ok(_) => Err(first),
            }
        }
    }
}

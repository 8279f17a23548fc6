//! Diagnostic emitters.
//!
//! - Terminal: human-readable output with a caret line pointing at the
//!   offending column, matching the host language's error layout;
//! - JSON: machine-readable output for tooling.

use std::fmt::Write;

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Finish and return the rendered output.
    fn finish(self) -> String;
}

/// Renders diagnostics for a terminal, one block per diagnostic:
///
/// ```text
///   File "view.enaml", line 3
///     clicked :: return self.count
///                ^^^^^^
/// SyntaxError: return statement not allowed in a notification block
/// ```
pub struct TerminalEmitter<'s> {
    filename: &'s str,
    source: &'s str,
    table: LineOffsetTable,
    out: String,
}

impl<'s> TerminalEmitter<'s> {
    pub fn new(filename: &'s str, source: &'s str) -> Self {
        TerminalEmitter {
            filename,
            source,
            table: LineOffsetTable::build(source),
            out: String::new(),
        }
    }
}

impl DiagnosticEmitter for TerminalEmitter<'_> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let Some(span) = diagnostic.primary_span() else {
            let _ = writeln!(
                self.out,
                "{}[{}]: {}",
                diagnostic.severity, diagnostic.code, diagnostic.message
            );
            return;
        };
        let (line, col) = self.table.line_col(self.source, span.start);
        let (end_line, end_col) = self.table.line_col(self.source, span.end);
        let text = self.table.line_text(self.source, line);
        let _ = writeln!(self.out, "  File \"{}\", line {}", self.filename, line);
        let _ = writeln!(self.out, "    {text}");
        let width = if end_line == line && end_col > col {
            (end_col - col) as usize
        } else {
            1
        };
        let _ = writeln!(
            self.out,
            "    {}{}",
            " ".repeat(col as usize),
            "^".repeat(width.max(1))
        );
        let _ = writeln!(
            self.out,
            "{}[{}]: {}",
            diagnostic.severity, diagnostic.code, diagnostic.message
        );
        for note in &diagnostic.notes {
            let _ = writeln!(self.out, "note: {note}");
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Renders diagnostics as a JSON array of objects.
pub struct JsonEmitter<'s> {
    filename: &'s str,
    source: &'s str,
    table: LineOffsetTable,
    items: Vec<String>,
}

impl<'s> JsonEmitter<'s> {
    pub fn new(filename: &'s str, source: &'s str) -> Self {
        JsonEmitter {
            filename,
            source,
            table: LineOffsetTable::build(source),
            items: Vec::new(),
        }
    }
}

impl DiagnosticEmitter for JsonEmitter<'_> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let (line, col, end_line, end_col) = match diagnostic.primary_span() {
            Some(span) => {
                let (l, c) = self.table.line_col(self.source, span.start);
                let (el, ec) = self.table.line_col(self.source, span.end);
                (l, c + 1, el, ec + 1)
            }
            None => (0, 0, 0, 0),
        };
        let mut item = String::new();
        let _ = write!(
            item,
            r#"{{"file":{},"severity":"{}","code":"{}","message":{},"line":{line},"col":{col},"end_line":{end_line},"end_col":{end_col}}}"#,
            escape_json(self.filename),
            diagnostic.severity,
            diagnostic.code,
            escape_json(&diagnostic.message),
        );
        self.items.push(item);
    }

    fn finish(self) -> String {
        format!("[{}]", self.items.join(","))
    }
}

/// Escape a string for JSON output, surrounding quotes included.
pub(crate) fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests;

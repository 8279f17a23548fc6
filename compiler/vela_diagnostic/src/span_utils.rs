//! Span utility functions for diagnostic processing.
//!
//! Byte-offset spans are the lexer's native currency; everything
//! user-facing wants 1-based lines and columns plus the offending source
//! line. [`LineOffsetTable`] pre-computes line starts for O(log L) lookups.

/// Pre-computed line offset table for efficient line/column lookup.
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start. `offsets[0] == 0`.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text. O(n) construction for
    /// O(log L) lookups.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push((i + 1) as u32);
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line number containing the given byte offset.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        (line_idx as u32) + 1
    }

    /// 1-based line, 0-based column (in characters) for a byte offset.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get((line - 1) as usize).copied().unwrap_or(0) as usize;
        let offset = (offset as usize).min(source.len());
        let col = source[line_start..offset].chars().count() as u32;
        (line, col)
    }

    /// The text of a 1-based line, without its trailing newline.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> &'s str {
        if line == 0 {
            return "";
        }
        let start = match self.offsets.get((line - 1) as usize) {
            Some(&s) => s as usize,
            None => return "",
        };
        let end = self
            .offsets
            .get(line as usize)
            .map_or(source.len(), |&e| e as usize);
        source[start..end].trim_end_matches(['\n', '\r'])
    }

    /// Byte offset of a 1-based line start.
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

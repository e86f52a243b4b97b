//! Line and column lookup for document offsets.
//!
//! Examples report 1-based lines and columns computed from the byte offset
//! where their region starts. Documents are scanned once for newlines and
//! lookups binary-search the resulting table.

/// Byte offset of every line start in a document.
#[derive(Clone, Debug, Default)]
pub struct LineIndex {
    /// `offsets[0] == 0`; `offsets[n]` is the byte after the n-th `\n`.
    offsets: Vec<usize>,
}

impl LineIndex {
    pub fn build(text: &str) -> Self {
        let mut offsets = vec![0];
        offsets.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, byte)| byte == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line(&self, offset: usize) -> usize {
        match self.offsets.binary_search(&offset) {
            Ok(exact) => exact + 1,
            Err(insert) => insert.max(1),
        }
    }

    /// 1-based `(line, column)` of `offset`; the column counts characters.
    pub fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let start = self.offsets[line - 1];
        let column = text
            .get(start..offset.min(text.len()))
            .map_or(offset - start, |prefix| prefix.chars().count());
        (line, column + 1)
    }

    /// Byte offset where 1-based `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.offsets.get(i).copied())
    }

    /// Number of newlines before `offset`.
    pub fn newlines_before(&self, offset: usize) -> usize {
        self.line(offset) - 1
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

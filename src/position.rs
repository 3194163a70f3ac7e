//! Byte offsets to editor positions.
//!
//! oxc spans are UTF-8 byte offsets. Positions handed to and from the locator
//! use 1-indexed lines and 0-indexed UTF-16 columns, which is what browser
//! tooling and the framework's debug metadata report.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

pub struct LineIndex<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a byte offset. Offsets past the end clamp to the last position.
    pub fn position(&self, offset: u32) -> SourcePosition {
        let offset = (offset as usize).min(self.source.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line_idx];
        let column = self
            .source
            .get(start..offset)
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or(offset - start);
        SourcePosition {
            line: line_idx as u32 + 1,
            column: column as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let idx = LineIndex::new("const a = <div/>;");
        assert_eq!(idx.position(10), SourcePosition { line: 1, column: 10 });
    }

    #[test]
    fn test_multiple_lines_and_crlf() {
        let src = "a\nbb\r\nccc";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.position(2), SourcePosition { line: 2, column: 0 });
        assert_eq!(idx.position(3), SourcePosition { line: 2, column: 1 });
        assert_eq!(idx.position(6), SourcePosition { line: 3, column: 0 });
        assert_eq!(idx.position(8), SourcePosition { line: 3, column: 2 });
    }

    #[test]
    fn test_utf16_columns() {
        // "é" is two bytes but one UTF-16 unit; the emoji is four bytes and two units.
        let src = "é😀<a/>";
        let idx = LineIndex::new(src);
        let offset = src.find('<').unwrap() as u32;
        assert_eq!(idx.position(offset), SourcePosition { line: 1, column: 3 });
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.position(99), SourcePosition { line: 2, column: 2 });
    }
}

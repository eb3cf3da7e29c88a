//! Line-oriented addressing of a source unit.
//!
//! The parser reports byte offsets; detection and splicing work in lines and
//! columns. `Locator` bridges the two and remembers each line's terminator so
//! a rewritten unit keeps its original line endings.

use ruff_text_size::{TextRange, TextSize};

use crate::types::{Position, Span};

/// Byte extents of one line
#[derive(Debug, Clone, Copy)]
struct LineExtent {
    start: usize,
    content_end: usize,
    end: usize,
}

/// Maps byte offsets of a source unit to `Position`s and back to line text
#[derive(Debug)]
pub struct Locator<'a> {
    source: &'a str,
    lines: Vec<LineExtent>,
}

impl<'a> Locator<'a> {
    /// Split `source` into lines on `\n`, `\r\n` and `\r`
    pub fn new(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut offset = 0;

        while offset < bytes.len() {
            match bytes[offset] {
                b'\n' => {
                    lines.push(LineExtent {
                        start,
                        content_end: offset,
                        end: offset + 1,
                    });
                    offset += 1;
                    start = offset;
                }
                b'\r' => {
                    let end = if bytes.get(offset + 1) == Some(&b'\n') {
                        offset + 2
                    } else {
                        offset + 1
                    };
                    lines.push(LineExtent {
                        start,
                        content_end: offset,
                        end,
                    });
                    offset = end;
                    start = end;
                }
                _ => offset += 1,
            }
        }

        // Trailing line: the unterminated remainder, or empty after a final newline
        lines.push(LineExtent {
            start,
            content_end: bytes.len(),
            end: bytes.len(),
        });

        Self { source, lines }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Position of a byte offset
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = offset.to_usize();
        let index = self
            .lines
            .partition_point(|line| line.start <= offset)
            .saturating_sub(1);
        Position::new(index + 1, offset - self.lines[index].start)
    }

    /// Span of a byte range
    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    /// Text of a 1-indexed line without its terminator
    pub fn line(&self, line: usize) -> &'a str {
        self.extent(line)
            .map_or("", |extent| &self.source[extent.start..extent.content_end])
    }

    /// Byte offset at which a 1-indexed line starts
    pub fn line_offset(&self, line: usize) -> usize {
        self.extent(line).map_or(self.source.len(), |extent| extent.start)
    }

    /// Iterate `(text, terminator)` for every line in order
    pub fn lines(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.lines.iter().map(|extent| {
            (
                &self.source[extent.start..extent.content_end],
                &self.source[extent.content_end..extent.end],
            )
        })
    }

    fn extent(&self, line: usize) -> Option<&LineExtent> {
        line.checked_sub(1).and_then(|index| self.lines.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_indexed_lines_zero_indexed_columns() {
        let locator = Locator::new("def foo():\n    a = 0\n");
        assert_eq!(locator.position(TextSize::new(0)), Position::new(1, 0));
        assert_eq!(locator.position(TextSize::new(15)), Position::new(2, 4));
        assert_eq!(locator.line(2), "    a = 0");
        assert_eq!(locator.line_offset(2), 11);
    }

    #[test]
    fn test_mixed_line_endings_are_preserved() {
        let source = "a\r\nb\rc\nd";
        let locator = Locator::new(source);
        let lines: Vec<_> = locator.lines().collect();
        assert_eq!(
            lines,
            vec![("a", "\r\n"), ("b", "\r"), ("c", "\n"), ("d", "")]
        );
        assert_eq!(locator.position(TextSize::new(5)), Position::new(3, 0));
        let rebuilt: String = locator
            .lines()
            .flat_map(|(text, terminator)| [text, terminator])
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_trailing_newline_yields_empty_last_line() {
        let locator = Locator::new("x = 1\n");
        let lines: Vec<_> = locator.lines().collect();
        assert_eq!(lines, vec![("x = 1", "\n"), ("", "")]);
        assert_eq!(locator.line(2), "");
    }

    #[test]
    fn test_out_of_range_lines_are_empty() {
        let locator = Locator::new("x = 1");
        assert_eq!(locator.line(0), "");
        assert_eq!(locator.line(7), "");
    }

    #[test]
    fn test_span_of_multiline_range() {
        let locator = Locator::new("a = (\n    0,)\n");
        let span = locator.span(TextRange::new(TextSize::new(0), TextSize::new(13)));
        assert_eq!(span.start, Position::new(1, 0));
        assert_eq!(span.end, Position::new(2, 7));
        assert!(!span.is_single_line());
    }
}

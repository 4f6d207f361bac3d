//! Source location tracking.
//!
//! Every token and every AST node carries a [`Span`]. Positions are
//! 0-based line/column pairs; columns count characters, not bytes.

use serde::Serialize;
use std::fmt;

/// A location in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns the position reached after walking over `text`.
    ///
    /// `\r\n`, `\n` and a lone `\r` each count as one line break.
    pub fn advance(self, text: &str) -> Position {
        let mut pos = self;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    pos.line += 1;
                    pos.column = 0;
                }
                '\n' => {
                    pos.line += 1;
                    pos.column = 0;
                }
                _ => pos.column += 1,
            }
        }
        pos
    }

    /// Maps a position measured inside a fragment of text onto the
    /// enclosing text, where the fragment starts at `origin`.
    pub fn shifted(self, origin: Position) -> Position {
        if self.line == 0 {
            Position::new(origin.line, origin.column + self.column)
        } else {
            Position::new(origin.line + self.line, self.column)
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humans count from one.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

impl From<(u32, u32)> for Position {
    fn from((line, column): (u32, u32)) -> Self {
        Self::new(line, column)
    }
}

/// A half-open range of source text, `start..end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty span at `pos`.
    pub const fn point(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Creates a span that covers both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if `other` is fully contained within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn shifted(&self, origin: Position) -> Span {
        Span::new(self.start.shifted(origin), self.end.shifted(origin))
    }

    /// Returns true if `pos` falls inside the span.
    pub fn contains_position(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Maps line/column positions back to byte offsets of one source text.
///
/// Needed by renderers that work on byte ranges (codespan).
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                    line_starts.push(i);
                }
                b'\r' | b'\n' => {
                    i += 1;
                    line_starts.push(i);
                }
                _ => i += 1,
            }
        }
        Self { line_starts }
    }

    /// Byte offset of `pos` in `text`, clamped to the text length.
    pub fn offset(&self, text: &str, pos: Position) -> usize {
        let Some(&line_start) = self.line_starts.get(pos.line as usize) else {
            return text.len();
        };
        text[line_start..]
            .char_indices()
            .nth(pos.column as usize)
            .map(|(i, _)| line_start + i)
            .unwrap_or(text.len())
    }

    /// Byte range of `span` in `text`.
    pub fn range(&self, text: &str, span: Span) -> std::ops::Range<usize> {
        let start = self.offset(text, span.start);
        let end = self.offset(text, span.end).max(start);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_single_line() {
        let pos = Position::new(2, 4).advance("abc");
        assert_eq!(pos, Position::new(2, 7));
    }

    #[test]
    fn test_advance_line_breaks() {
        let pos = Position::new(0, 5).advance("a\r\nbc\nd");
        assert_eq!(pos, Position::new(2, 1));
    }

    #[test]
    fn test_shifted() {
        let origin = Position::new(3, 10);
        assert_eq!(Position::new(0, 2).shifted(origin), Position::new(3, 12));
        assert_eq!(Position::new(1, 2).shifted(origin), Position::new(4, 2));
    }

    #[test]
    fn test_merge_and_contains() {
        let a = Span::new(Position::new(0, 0), Position::new(0, 3));
        let b = Span::new(Position::new(1, 2), Position::new(1, 5));
        let m = a.merge(&b);
        assert_eq!(m.start, a.start);
        assert_eq!(m.end, b.end);
        assert!(m.contains(&a));
        assert!(m.contains(&b));
        assert!(!a.contains(&b));
    }

    #[test]
    fn test_line_index_offsets() {
        let text = "ab\ncdé\r\nf";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(text, Position::new(0, 1)), 1);
        assert_eq!(index.offset(text, Position::new(1, 0)), 3);
        assert_eq!(index.offset(text, Position::new(1, 3)), 7);
        assert_eq!(index.offset(text, Position::new(2, 0)), 9);
        assert_eq!(index.offset(text, Position::new(7, 0)), text.len());
    }
}

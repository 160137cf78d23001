//! Source positions.

use std::fmt;

use serde::Serialize;

/// A 1-based line and column in the decoded source text.
///
/// Columns count characters, not bytes. A tab advances the column by one;
/// expanding tabs is a presentation concern left to whoever renders the
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourcePos {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl SourcePos {
    /// The position of the first character of any input.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Create a position from a line and column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Advance past `c`, moving to the next line on LF.
    pub const fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for SourcePos {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut pos = SourcePos::START;
        for c in "ab\ncd".chars() {
            pos.advance(c);
        }
        assert_eq!(pos, SourcePos::new(2, 3));
    }

    #[test]
    fn display_reads_like_a_diagnostic_prefix() {
        assert_eq!(SourcePos::new(3, 14).to_string(), "line 3 column 14");
    }
}

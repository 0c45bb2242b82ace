//! Source location primitives: byte spans and line/column positions.

use std::fmt;
use std::ops::Range;

/// A byte range in source text.
/// This is the canonical span type used throughout the front end.
pub type Span = Range<usize>;

/// A 1-indexed line/column position in source text.
///
/// Columns count characters, not bytes, so a consuming editor can address the
/// same character the tokenizer saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The position of the first character of any source text.
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

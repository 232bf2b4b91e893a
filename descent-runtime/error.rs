//! Parse error reporting

use std::fmt::{self, Display};

/// A position in the input, 1-based.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
    /// Byte offset from the start of the input.
    pub offset: usize,
}

impl LineCol {
    /// Locate the start of `remaining`, a suffix of `original`.
    pub fn of(original: &str, remaining: &str) -> LineCol {
        let offset = original.len().saturating_sub(remaining.len());
        let before = &original[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
        let column = before[line_start..].chars().count() + 1;
        LineCol { line, column, offset }
    }
}

impl Display for LineCol {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}:{}", self.line, self.column)
    }
}

/// A parse failure, positioned in the original input.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ParseError {
    /// Where the failing matcher stopped.
    pub location: LineCol,

    /// What the failing matcher wanted to see there.
    pub expected: String,
}

impl Display for ParseError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Line {}: {}", self.location.line, self.expected)
    }
}

impl std::error::Error for ParseError {}

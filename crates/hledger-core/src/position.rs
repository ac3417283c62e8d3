//! Source positions.
//!
//! A [`Position`] points at a single byte in a named source file. Line and
//! column are materialised eagerly while lexing so that nothing downstream
//! has to recompute them from the byte offset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A location in a source file.
///
/// Lines and columns are 1-based, the byte offset is 0-based. Columns count
/// characters, not bytes.
///
/// # Examples
///
/// ```
/// use hledger_core::Position;
///
/// let pos = Position::start("main.journal").advance('a').advance('\n');
/// assert_eq!((pos.line, pos.column, pos.offset), (2, 1, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Name of the file this position refers to.
    pub filename: Arc<str>,
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number (in characters), starting at 1.
    pub column: usize,
    /// Byte offset from the start of the file, starting at 0.
    pub offset: usize,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub fn new(filename: impl Into<Arc<str>>, line: usize, column: usize, offset: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
            offset,
        }
    }

    /// The position of the first byte of `filename`.
    #[must_use]
    pub fn start(filename: impl Into<Arc<str>>) -> Self {
        Self::new(filename, 1, 1, 0)
    }

    /// Move this position past `ch`, assuming `ch` starts here.
    pub fn step(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// The position just past `ch`, assuming `ch` starts at `self`.
    #[must_use]
    pub fn advance(mut self, ch: char) -> Self {
        self.step(ch);
        self
    }

    /// The position just past `text`, assuming `text` starts at `self`.
    #[must_use]
    pub fn advance_str(self, text: &str) -> Self {
        text.chars().fold(self, Self::advance)
    }

    /// Check whether this is the very first byte of the file.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        self.offset == 0
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start("")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

//! Parse error types.

use hledger_core::Position;
use std::fmt;

use crate::lexer::LexError;

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Where the error occurred.
    pub pos: Position,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    /// Get the error message, without the position.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match &self.kind {
            ParseErrorKind::Lex(_) => "lexical error",
            ParseErrorKind::UnexpectedToken { .. } => "unexpected token",
            ParseErrorKind::UnexpectedEof { .. } => "unexpected end of file",
            ParseErrorKind::Io(_) => "read error",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.kind)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self::new(ParseErrorKind::Lex(err.message()), err.pos().clone())
    }
}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer rejected the input.
    Lex(String),
    /// The grammar did not allow the token found.
    UnexpectedToken {
        /// The offending token, as displayed.
        found: String,
        /// What would have been accepted instead.
        expected: Vec<String>,
    },
    /// The input ended while the grammar needed more.
    UnexpectedEof {
        /// What would have been accepted instead.
        expected: Vec<String>,
    },
    /// The source could not be read.
    Io(String),
}

struct ExpectedList<'a>(&'a [String]);

impl fmt::Display for ExpectedList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("something else");
        }
        for (i, item) in self.0.iter().enumerate() {
            if i + 1 == self.0.len() && i > 0 {
                f.write_str(" or ")?;
            } else if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(item)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(msg) => write!(f, "{msg}"),
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token {found} (expected {})", ExpectedList(expected))
            }
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of file (expected {})", ExpectedList(expected))
            }
            Self::Io(msg) => write!(f, "read error: {msg}"),
        }
    }
}

//! Tokens produced by the lexer framework.

use hledger_core::Position;
use std::fmt;

/// Identifies the kind of a token.
///
/// Identifiers are handed out by a [`LexerDefinition`](crate::LexerDefinition):
/// the reserved kinds below occupy 0 to 2 and user kinds start at
/// [`TokenKind::FIRST_USER_ID`] in definition order. The name is kept next
/// to the id so that tokens can be printed without the definition at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenKind {
    id: u16,
    name: &'static str,
}

impl TokenKind {
    /// A lexical error; the token value is the error message.
    pub const ERROR: Self = Self::new(0, "Error");
    /// End of input.
    pub const EOF: Self = Self::new(1, "EOF");
    /// Reserved for internal use.
    pub const PLACEHOLDER: Self = Self::new(2, "Placeholder");
    /// First id assigned to user-supplied kinds.
    pub const FIRST_USER_ID: u16 = 3;

    /// Create a token kind.
    #[must_use]
    pub const fn new(id: u16, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The numeric identifier.
    #[must_use]
    pub const fn id(self) -> u16 {
        self.id
    }

    /// The symbolic name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A token: a kind, the exact input text it covers, and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The input text covered by the token.
    pub value: String,
    /// Position of the first character of the token.
    pub pos: Position,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            pos,
        }
    }

    /// Check the token kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Check for the end-of-input token.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EOF
    }

    /// Position one past the last character of the token.
    #[must_use]
    pub fn end_pos(&self) -> Position {
        self.pos.clone().advance_str(&self.value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {:?}", self.kind, self.value)
        }
    }
}

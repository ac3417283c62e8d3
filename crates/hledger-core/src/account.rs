//! Hierarchical account names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::Position;

/// Separator between account name segments.
pub const SEPARATOR: char = ':';

/// A `:`-separated account name such as `assets:Cash:Checking`.
///
/// Equality and hashing only look at the segments; the source span is
/// carried along for cursor lookups and text edits.
///
/// # Examples
///
/// ```
/// use hledger_core::AccountName;
///
/// let name = AccountName::from_segments(["assets", "Cash"]);
/// let prefixes: Vec<String> = name.prefixes().iter().map(ToString::to_string).collect();
/// assert_eq!(prefixes, ["assets", "assets:Cash"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountName {
    /// The segments, never empty in a parsed journal.
    pub segments: Vec<String>,
    /// Position of the first character of the name.
    pub pos: Position,
    /// Position one past the last character of the name.
    pub end_pos: Position,
}

impl AccountName {
    /// Create an account name from its segments and source span.
    #[must_use]
    pub const fn new(segments: Vec<String>, pos: Position, end_pos: Position) -> Self {
        Self {
            segments,
            pos,
            end_pos,
        }
    }

    /// Create an account name that is not tied to a source file.
    ///
    /// The span starts at the beginning of an unnamed file and covers the
    /// joined name.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let pos = Position::default();
        let end_pos = pos.clone().advance_str(&segments.join(":"));
        Self::new(segments, pos, end_pos)
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the name has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All prefixes of this name, shortest first.
    ///
    /// A name with N segments yields N names; the i-th holds the first i+1
    /// segments. Every prefix keeps the start position of the original and
    /// ends right after its last segment.
    #[must_use]
    pub fn prefixes(&self) -> Vec<Self> {
        (1..=self.segments.len())
            .map(|n| {
                let segments = self.segments[..n].to_vec();
                let end_pos = self.pos.clone().advance_str(&segments.join(":"));
                Self::new(segments, self.pos.clone(), end_pos)
            })
            .collect()
    }

    /// Check if `column` lies within this name on its line (inclusive on both ends).
    #[must_use]
    pub const fn spans_column(&self, column: usize) -> bool {
        self.pos.column <= column && column <= self.end_pos.column
    }
}

impl PartialEq for AccountName {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for AccountName {}

impl Hash for AccountName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

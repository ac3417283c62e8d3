//! Journal entries.
//!
//! Only the parts of the hledger format that carry account names are
//! modelled:
//!
//! - [`IncludeDirective`] - `include path/to/other.journal`
//! - [`AccountDirective`] - `account assets:Cash`
//! - [`Posting`] - an indented transaction line, in three flavours
//!   (real, virtual `(...)`, virtual balanced `[...]`)
//!
//! Everything else (transaction headers, comments, prices, periodic rules)
//! is skipped by the parser. Amounts are kept as opaque text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AccountName;

/// The clearing status of a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostingStatus {
    /// No status mark.
    #[default]
    Unmarked,
    /// `!`
    Pending,
    /// `*`
    Cleared,
}

impl PostingStatus {
    /// Parse a status indicator (`""`, `"!"` or `"*"`).
    #[must_use]
    pub fn from_indicator(s: &str) -> Option<Self> {
        match s {
            "" => Some(Self::Unmarked),
            "!" => Some(Self::Pending),
            "*" => Some(Self::Cleared),
            _ => None,
        }
    }

    /// The indicator as written in the journal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmarked => "",
            Self::Pending => "!",
            Self::Cleared => "*",
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `include` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDirective {
    /// The path exactly as written, including any trailing comment text.
    pub include_path: String,
}

/// An `account` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDirective {
    /// The declared account.
    pub account_name: AccountName,
}

/// A posting line of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Clearing status.
    pub status: PostingStatus,
    /// The posted account.
    pub account_name: AccountName,
    /// The amount text, empty when the amount is omitted.
    pub amount: String,
}

/// A single entry of a journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// `include` directive.
    Include(IncludeDirective),
    /// `account` directive.
    Account(AccountDirective),
    /// Posting to a plain account.
    RealPosting(Posting),
    /// Posting to a `(virtual)` account.
    VirtualPosting(Posting),
    /// Posting to a `[virtual balanced]` account.
    VirtualBalancedPosting(Posting),
}

impl Entry {
    /// The account name carried by this entry, if any.
    #[must_use]
    pub const fn account_name(&self) -> Option<&AccountName> {
        match self {
            Self::Include(_) => None,
            Self::Account(directive) => Some(&directive.account_name),
            Self::RealPosting(posting)
            | Self::VirtualPosting(posting)
            | Self::VirtualBalancedPosting(posting) => Some(&posting.account_name),
        }
    }

    /// The posting, if this entry is one.
    #[must_use]
    pub const fn posting(&self) -> Option<&Posting> {
        match self {
            Self::RealPosting(posting)
            | Self::VirtualPosting(posting)
            | Self::VirtualBalancedPosting(posting) => Some(posting),
            Self::Include(_) | Self::Account(_) => None,
        }
    }

    /// Get the entry type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Include(_) => "include",
            Self::Account(_) => "account",
            Self::RealPosting(_) => "posting",
            Self::VirtualPosting(_) => "virtual posting",
            Self::VirtualBalancedPosting(_) => "virtual balanced posting",
        }
    }
}

/// A parsed journal file.
///
/// Entries appear in file order. Includes are not expanded here; see the
/// loader's include resolver for that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// The entries, in file order.
    pub entries: Vec<Entry>,
}

impl Journal {
    /// Create a journal from its entries.
    #[must_use]
    pub const fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Iterate over every account name in the journal, in entry order.
    pub fn account_names(&self) -> impl Iterator<Item = &AccountName> {
        self.entries.iter().filter_map(Entry::account_name)
    }

    /// Iterate over the include paths, in entry order.
    pub fn include_paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Include(include) => Some(include.include_path.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(name: &[&str]) -> Posting {
        Posting {
            status: PostingStatus::Unmarked,
            account_name: AccountName::from_segments(name.iter().copied()),
            amount: String::new(),
        }
    }

    #[test]
    fn test_status_round_trips_indicator() {
        for status in [
            PostingStatus::Unmarked,
            PostingStatus::Pending,
            PostingStatus::Cleared,
        ] {
            assert_eq!(PostingStatus::from_indicator(status.as_str()), Some(status));
        }
        assert_eq!(PostingStatus::from_indicator("?"), None);
    }

    #[test]
    fn test_account_name_per_variant() {
        let include = Entry::Include(IncludeDirective {
            include_path: "x.journal".to_string(),
        });
        assert!(include.account_name().is_none());
        assert!(include.posting().is_none());

        let virtual_posting = Entry::VirtualPosting(posting(&["a", "b"]));
        assert_eq!(
            virtual_posting.account_name().map(ToString::to_string),
            Some("a:b".to_string())
        );
        assert_eq!(virtual_posting.type_name(), "virtual posting");
    }

    #[test]
    fn test_journal_iterators() {
        let journal = Journal::new(vec![
            Entry::Include(IncludeDirective {
                include_path: "other.journal".to_string(),
            }),
            Entry::Account(AccountDirective {
                account_name: AccountName::from_segments(["assets"]),
            }),
            Entry::VirtualBalancedPosting(posting(&["equity"])),
        ]);
        let names: Vec<String> = journal.account_names().map(ToString::to_string).collect();
        assert_eq!(names, ["assets", "equity"]);
        assert_eq!(journal.include_paths().collect::<Vec<_>>(), ["other.journal"]);
    }

    #[test]
    fn test_journal_serializes_with_positions() {
        let journal = Journal::new(vec![Entry::RealPosting(Posting {
            status: PostingStatus::Cleared,
            account_name: AccountName::new(
                vec!["assets".to_string()],
                crate::Position::new("main.journal", 2, 7, 30),
                crate::Position::new("main.journal", 2, 13, 36),
            ),
            amount: "$5".to_string(),
        })]);

        let json = serde_json::to_value(&journal).unwrap();
        let posting = &json["entries"][0]["RealPosting"];
        assert_eq!(posting["status"], "Cleared");
        assert_eq!(posting["account_name"]["pos"]["filename"], "main.journal");
        assert_eq!(posting["account_name"]["end_pos"]["offset"], 36);

        let back: Journal = serde_json::from_value(json).unwrap();
        let name = back.account_names().next().unwrap();
        assert_eq!(name.pos.line, 2);
        assert_eq!(&*name.end_pos.filename, "main.journal");
    }
}

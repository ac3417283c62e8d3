//! Queries over a (flattened) journal.
//!
//! These back the editor features: completion lists every known account
//! name and narrows it by what is under the cursor, hover looks up the name
//! under the cursor.

use std::collections::HashSet;

use crate::{AccountName, Journal};

/// Collect every account name known to `journal`, including all prefixes.
///
/// `expenses:Food` contributes both `expenses` and `expenses:Food`. Names
/// are de-duplicated on their `:`-joined form. The result is in first-seen
/// order, although callers should not depend on any particular order.
#[must_use]
pub fn account_names(journal: &Journal) -> Vec<AccountName> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for name in journal.account_names() {
        for prefix in name.prefixes() {
            if seen.insert(prefix.to_string()) {
                names.push(prefix);
            }
        }
    }

    names
}

/// Find the first account name in `filename` whose span contains the cursor.
///
/// `line` and `column` are 1-based. A cursor placed right after the last
/// character of a name still counts as being on it.
#[must_use]
pub fn find_account_name_under_cursor<'a>(
    journal: &'a Journal,
    filename: &str,
    line: usize,
    column: usize,
) -> Option<&'a AccountName> {
    journal.account_names().find(|name| {
        &*name.pos.filename == filename && name.pos.line == line && name.spans_column(column)
    })
}

/// Narrow `names` down to the completion candidates for `query`.
///
/// Without a query only top-level names (one segment) are returned. With a
/// query of `k` segments, a candidate must have `k` or `k + 1` segments and
/// each of its first `k` segments must start with the query segment at the
/// same position (case-sensitive). Input order is preserved.
///
/// # Examples
///
/// ```
/// use hledger_core::{filter_account_names_by_prefix, AccountName};
///
/// let names = vec![
///     AccountName::from_segments(["assets"]),
///     AccountName::from_segments(["assets", "Cash"]),
///     AccountName::from_segments(["revenue"]),
/// ];
/// let query = AccountName::from_segments(["ass"]);
/// let matches = filter_account_names_by_prefix(&names, Some(&query));
/// assert_eq!(matches.len(), 2);
/// ```
#[must_use]
pub fn filter_account_names_by_prefix(
    names: &[AccountName],
    query: Option<&AccountName>,
) -> Vec<AccountName> {
    let Some(query) = query else {
        return names.iter().filter(|name| name.len() == 1).cloned().collect();
    };

    let k = query.len();
    names
        .iter()
        .filter(|name| (k..=k + 1).contains(&name.len()))
        .filter(|name| {
            query
                .segments
                .iter()
                .zip(&name.segments)
                .all(|(wanted, segment)| segment.starts_with(wanted.as_str()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountDirective, Entry, Position, Posting, PostingStatus};

    fn declare(segments: &[&str]) -> Entry {
        Entry::Account(AccountDirective {
            account_name: AccountName::from_segments(segments.iter().copied()),
        })
    }

    fn names(list: &[&[&str]]) -> Vec<AccountName> {
        list.iter()
            .map(|segments| AccountName::from_segments(segments.iter().copied()))
            .collect()
    }

    fn joined(names: &[AccountName]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_account_names_include_prefixes_once() {
        let journal = Journal::new(vec![
            declare(&["assets", "Cash", "Checking"]),
            declare(&["assets", "Capital"]),
            declare(&["revenue", "Salary"]),
        ]);
        assert_eq!(
            joined(&account_names(&journal)),
            [
                "assets",
                "assets:Cash",
                "assets:Cash:Checking",
                "assets:Capital",
                "revenue",
                "revenue:Salary",
            ]
        );
    }

    #[test]
    fn test_account_names_of_empty_journal() {
        assert!(account_names(&Journal::default()).is_empty());
    }

    #[test]
    fn test_filter_without_query_returns_top_level() {
        let all = names(&[&["assets"], &["assets", "Cash"], &["revenue"]]);
        assert_eq!(
            joined(&filter_account_names_by_prefix(&all, None)),
            ["assets", "revenue"]
        );
    }

    #[test]
    fn test_filter_by_single_segment_prefix() {
        let all = names(&[
            &["assets"],
            &["assets", "Cash"],
            &["assets", "Cash", "Checking"],
            &["assets", "Capital"],
            &["revenue"],
            &["revenue", "Salary"],
        ]);
        let query = AccountName::from_segments(["ass"]);
        assert_eq!(
            joined(&filter_account_names_by_prefix(&all, Some(&query))),
            ["assets", "assets:Cash", "assets:Capital"]
        );
    }

    #[test]
    fn test_filter_is_positional() {
        let all = names(&[
            &["assets", "Cash", "Various"],
            &["assets", "Various"],
            &["assets", "Vault", "Gold"],
        ]);
        let query = AccountName::from_segments(["ass", "Var"]);
        assert_eq!(
            joined(&filter_account_names_by_prefix(&all, Some(&query))),
            ["assets:Various"]
        );
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let all = names(&[&["Assets"], &["assets"]]);
        let query = AccountName::from_segments(["a"]);
        assert_eq!(
            joined(&filter_account_names_by_prefix(&all, Some(&query))),
            ["assets"]
        );
    }

    #[test]
    fn test_filter_rejects_shorter_candidates() {
        let all = names(&[&["assets"], &["assets", "Cash", "Checking"]]);
        let query = AccountName::from_segments(["assets", "Cash"]);
        assert_eq!(
            joined(&filter_account_names_by_prefix(&all, Some(&query))),
            ["assets:Cash:Checking"]
        );
    }

    #[test]
    fn test_find_under_cursor() {
        let name = AccountName::new(
            vec!["expenses".to_string(), "Food".to_string()],
            Position::new("main.journal", 3, 5, 40),
            Position::new("main.journal", 3, 18, 53),
        );
        let journal = Journal::new(vec![
            declare(&["assets"]),
            Entry::RealPosting(Posting {
                status: PostingStatus::Unmarked,
                account_name: name,
                amount: "10 EUR".to_string(),
            }),
        ]);

        let hit = find_account_name_under_cursor(&journal, "main.journal", 3, 18);
        assert_eq!(hit.map(ToString::to_string), Some("expenses:Food".to_string()));

        assert!(find_account_name_under_cursor(&journal, "main.journal", 3, 19).is_none());
        assert!(find_account_name_under_cursor(&journal, "main.journal", 2, 5).is_none());
        assert!(find_account_name_under_cursor(&journal, "other.journal", 3, 5).is_none());
    }

    #[test]
    fn test_find_under_cursor_first_hit_wins() {
        let first = AccountName::new(
            vec!["a".to_string()],
            Position::new("f", 1, 1, 0),
            Position::new("f", 1, 2, 1),
        );
        let second = AccountName::new(
            vec!["b".to_string()],
            Position::new("f", 1, 1, 0),
            Position::new("f", 1, 2, 1),
        );
        let journal = Journal::new(vec![
            Entry::Account(AccountDirective {
                account_name: first,
            }),
            Entry::Account(AccountDirective {
                account_name: second,
            }),
        ]);
        let hit = find_account_name_under_cursor(&journal, "f", 1, 1);
        assert_eq!(hit.map(ToString::to_string), Some("a".to_string()));
    }
}

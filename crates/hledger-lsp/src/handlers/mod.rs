//! LSP request handlers.
//!
//! Each handler loads the requested journal with its includes resolved and
//! answers from the flattened result.

pub mod completion;
pub mod hover;

use std::path::Path;

use hledger_core::{AccountName, Journal, Position as SourcePosition};
use hledger_loader::{Context, LoadError, ParserCache};
use lsp_types::{Position, Range};

/// Parse the journal at `path` and splice in everything it includes.
pub fn load_journal(cache: &ParserCache, ctx: &Context, path: &Path) -> Result<Journal, LoadError> {
    let journal = cache.parse(ctx, path)?;
    cache.resolve_includes(ctx, &journal, path)
}

/// The account name at an LSP cursor in the file at `path`, if any.
pub fn account_name_at<'a>(
    journal: &'a Journal,
    path: &Path,
    position: Position,
) -> Option<&'a AccountName> {
    let filename = path.to_string_lossy();
    hledger_core::find_account_name_under_cursor(
        journal,
        &filename,
        position.line as usize + 1,
        position.character as usize + 1,
    )
}

/// Convert a 1-based source position into a 0-based LSP position.
pub fn to_lsp_position(pos: &SourcePosition) -> Position {
    Position::new(
        pos.line.saturating_sub(1) as u32,
        pos.column.saturating_sub(1) as u32,
    )
}

/// The LSP range covered by an account name.
pub fn account_name_range(name: &AccountName) -> Range {
    Range::new(to_lsp_position(&name.pos), to_lsp_position(&name.end_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lsp_position_is_zero_based() {
        let pos = SourcePosition::new("main.journal", 3, 5, 40);
        assert_eq!(to_lsp_position(&pos), Position::new(2, 4));
    }

    #[test]
    fn test_account_name_range() {
        let name = AccountName::new(
            vec!["assets".to_string(), "Cash".to_string()],
            SourcePosition::new("main.journal", 2, 5, 14),
            SourcePosition::new("main.journal", 2, 16, 25),
        );
        assert_eq!(
            account_name_range(&name),
            Range::new(Position::new(1, 4), Position::new(1, 15))
        );
    }

    #[test]
    fn test_account_name_at_matches_filename() {
        let journal = hledger_parser::parse("main.journal", "account assets:Cash\n").unwrap();

        let found = account_name_at(&journal, Path::new("main.journal"), Position::new(0, 10));
        assert_eq!(found.map(ToString::to_string).as_deref(), Some("assets:Cash"));

        let other = Path::new("other.journal");
        assert!(account_name_at(&journal, other, Position::new(0, 10)).is_none());
        let main = Path::new("main.journal");
        assert!(account_name_at(&journal, main, Position::new(0, 2)).is_none());
    }
}

//! Completion handler for account names.
//!
//! Candidates are every account name in the journal and its includes,
//! including the parents of each name. When the cursor sits on an account
//! name, that name narrows the candidates and is replaced by the chosen item.

use std::path::Path;

use hledger_core::{account_names, filter_account_names_by_prefix};
use hledger_loader::{Context, LoadError, ParserCache};
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionTextEdit, Position, Range,
    TextEdit,
};

use super::{account_name_at, account_name_range, load_journal};

/// Characters that make the client ask for completions.
pub fn trigger_characters() -> Vec<String> {
    ('a'..='z')
        .chain('A'..='Z')
        .chain('0'..='9')
        .chain([' ', ':'])
        .map(String::from)
        .collect()
}

/// Handle a completion request at `position` in the journal at `path`.
pub fn handle_completion(
    cache: &ParserCache,
    ctx: &Context,
    path: &Path,
    position: Position,
) -> Result<CompletionList, LoadError> {
    let journal = load_journal(cache, ctx, path)?;
    let names = account_names(&journal);
    let under_cursor = account_name_at(&journal, path, position);

    let range = under_cursor.map_or_else(|| Range::new(position, position), account_name_range);
    let matches = filter_account_names_by_prefix(&names, under_cursor);

    tracing::debug!(
        "Completion at {}:{}:{} offers {} account names",
        path.display(),
        position.line,
        position.character,
        matches.len()
    );

    let items = matches
        .iter()
        .map(|name| {
            let label = name.to_string();
            CompletionItem {
                label: label.clone(),
                kind: Some(CompletionItemKind::FIELD),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(range, label))),
                ..Default::default()
            }
        })
        .collect();

    Ok(CompletionList {
        is_incomplete: true,
        items,
    })
}

//! Hover handler for account names.

use std::path::Path;

use hledger_loader::{Context, LoadError, ParserCache};
use lsp_types::{Hover, HoverContents, MarkedString, MarkupContent, MarkupKind, Position};

use super::{account_name_at, account_name_range, load_journal};

/// Shown when the cursor is not on an account name.
pub const NO_ACCOUNT_NAME: &str = "No account name under cursor";

/// Handle a hover request at `position` in the journal at `path`.
pub fn handle_hover(
    cache: &ParserCache,
    ctx: &Context,
    path: &Path,
    position: Position,
) -> Result<Hover, LoadError> {
    let journal = load_journal(cache, ctx, path)?;

    let Some(name) = account_name_at(&journal, path, position) else {
        return Ok(Hover {
            contents: HoverContents::Scalar(MarkedString::String(NO_ACCOUNT_NAME.to_string())),
            range: None,
        });
    };

    tracing::debug!("Hover over account name {}", name);

    Ok(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("You're hovering over \"{name}\""),
        }),
        range: Some(account_name_range(name)),
    })
}

//! The hledger journal lexer.
//!
//! Journal syntax is whitespace sensitive: indentation starts a posting, a
//! single space may appear inside an account name while two spaces end it,
//! and an inline comment starts with two spaces followed by `;` or `#`.
//! The state functions below encode those rules on top of the
//! [`lexer`](crate::lexer) framework.
//!
//! Every byte of the input ends up in exactly one token, so concatenating
//! the token values yields the input again.

use std::sync::OnceLock;

use crate::lexer::{Lexer, LexerDefinition, State, StateResult};
use crate::token::TokenKind;

/// Text the lexer chose not to interpret (comments, transaction headers, ...).
pub const GARBAGE: TokenKind = TokenKind::new(3, "Garbage");
/// A `\n`.
pub const NEWLINE: TokenKind = TokenKind::new(4, "Newline");
/// A run of spaces between meaningful tokens.
pub const WHITESPACE: TokenKind = TokenKind::new(5, "Whitespace");
/// Leading spaces of an indented line.
pub const INDENT: TokenKind = TokenKind::new(6, "Indent");
/// The `include` keyword.
pub const INCLUDE_DIRECTIVE: TokenKind = TokenKind::new(7, "IncludeDirective");
/// The rest of an `include` line.
pub const INCLUDE_PATH: TokenKind = TokenKind::new(8, "IncludePath");
/// The `account` keyword.
pub const ACCOUNT_DIRECTIVE: TokenKind = TokenKind::new(9, "AccountDirective");
/// One segment of an account name.
pub const ACCOUNT_NAME_SEGMENT: TokenKind = TokenKind::new(10, "AccountNameSegment");
/// The `:` between account name segments.
pub const ACCOUNT_NAME_SEPARATOR: TokenKind = TokenKind::new(11, "AccountNameSeparator");
/// `(`, `)`, `[` or `]` around a virtual posting's account.
pub const ACCOUNT_NAME_DELIMITER: TokenKind = TokenKind::new(12, "AccountNameDelimiter");
/// A posting amount, kept verbatim.
pub const AMOUNT: TokenKind = TokenKind::new(13, "Amount");
/// `!` or `*` before a posting's account.
pub const POSTING_STATUS_INDICATOR: TokenKind = TokenKind::new(14, "PostingStatusIndicator");
/// Two spaces and `;` or `#` opening an inline comment.
pub const INLINE_COMMENT_INDICATOR: TokenKind = TokenKind::new(15, "InlineCommentIndicator");

const SYMBOL_NAMES: [&str; 13] = [
    GARBAGE.name(),
    NEWLINE.name(),
    WHITESPACE.name(),
    INDENT.name(),
    INCLUDE_DIRECTIVE.name(),
    INCLUDE_PATH.name(),
    ACCOUNT_DIRECTIVE.name(),
    ACCOUNT_NAME_SEGMENT.name(),
    ACCOUNT_NAME_SEPARATOR.name(),
    ACCOUNT_NAME_DELIMITER.name(),
    AMOUNT.name(),
    POSTING_STATUS_INDICATOR.name(),
    INLINE_COMMENT_INDICATOR.name(),
];

/// Characters that end an account name segment.
const NAME_TERMINATORS: &str = "()[]:\n";
/// Characters that end an amount.
const AMOUNT_TERMINATORS: &str = "()[]\n";

/// The shared journal lexer definition.
pub fn journal_lexer() -> &'static LexerDefinition {
    static DEFINITION: OnceLock<LexerDefinition> = OnceLock::new();
    DEFINITION.get_or_init(|| LexerDefinition::new(State(root), &SYMBOL_NAMES))
}

fn root(l: &mut Lexer<'_>) -> StateResult {
    let Some(next) = l.peek() else {
        return Ok(None);
    };

    if next == '\n' {
        l.next_rune();
        l.emit(NEWLINE);
        return Ok(Some(State(root)));
    }

    if l.assert_at_start() || l.assert_after("\n") {
        if accept_keyword(l, "include") {
            l.emit(INCLUDE_DIRECTIVE);
            l.accept_run(" ");
            l.emit(WHITESPACE);
            return Ok(Some(State(include_directive)));
        }

        if accept_keyword(l, "account") {
            l.emit(ACCOUNT_DIRECTIVE);
            l.accept_run(" ");
            l.emit(WHITESPACE);
            return Ok(Some(State(account_directive)));
        }

        if next == ' ' {
            l.accept_run(" ");
            l.emit(INDENT);
            return Ok(Some(indented_line(l)));
        }
    }

    l.accept_until("\n");
    l.emit(GARBAGE);
    Ok(Some(State(root)))
}

/// Decide what follows an Indent token.
fn indented_line(l: &mut Lexer<'_>) -> State {
    match l.peek() {
        None | Some('\n') => return State(root),
        Some(';' | '#') => {
            l.accept_until("\n");
            l.emit(GARBAGE);
            return State(root);
        }
        Some(_) => {}
    }

    // format subdirective
    if accept_keyword(l, "format") {
        l.accept_until("\n");
        l.emit(GARBAGE);
        return State(root);
    }

    State(posting)
}

/// Match a line-leading keyword that is followed by a space.
fn accept_keyword(l: &mut Lexer<'_>, keyword: &str) -> bool {
    let backup = l.save();
    if matches!(l.accept_string(keyword), Ok(true)) && l.peek() == Some(' ') {
        return true;
    }
    l.restore(backup);
    false
}

fn include_directive(l: &mut Lexer<'_>) -> StateResult {
    if l.accept_until("\n") {
        l.emit(INCLUDE_PATH);
    }
    end_of_line(l)
}

fn account_directive(l: &mut Lexer<'_>) -> StateResult {
    if !accept_account_name(l) {
        return Err(l.errorf(format_args!("expected account name")));
    }
    accept_inline_comment(l);
    end_of_line(l)
}

fn posting(l: &mut Lexer<'_>) -> StateResult {
    if matches!(l.accept("!*"), Ok(Some(_))) {
        l.emit(POSTING_STATUS_INDICATOR);
        if !matches!(l.accept(" "), Ok(Some(_))) {
            return Err(l.errorf(format_args!("expected space after posting status")));
        }
        l.emit(WHITESPACE);
    }

    let closing = match l.peek() {
        Some('(') => Some(')'),
        Some('[') => Some(']'),
        _ => None,
    };
    if closing.is_some() {
        l.next_rune();
        l.emit(ACCOUNT_NAME_DELIMITER);
    }

    if !accept_account_name(l) {
        return Err(l.errorf(format_args!("expected account name")));
    }

    if let Some(closing) = closing {
        if l.peek() == Some(closing) {
            l.next_rune();
            l.emit(ACCOUNT_NAME_DELIMITER);
        }
    }

    if !accept_inline_comment(l) {
        if l.accept_run(" ").is_some() {
            l.emit(WHITESPACE);
        }
        if accept_amount(l) {
            l.emit(AMOUNT);
        }
        accept_inline_comment(l);
    }

    end_of_line(l)
}

/// Finish a line: optional trailing spaces, then a newline or end of input.
fn end_of_line(l: &mut Lexer<'_>) -> StateResult {
    if l.accept_run(" ").is_some() {
        l.emit(WHITESPACE);
    }
    match l.next_rune() {
        (None, _) => Ok(Some(State(root))),
        (Some('\n'), _) => {
            l.emit(NEWLINE);
            Ok(Some(State(root)))
        }
        (Some(_), backup) => {
            l.restore(backup);
            Err(l.errorf(format_args!("expected newline")))
        }
    }
}

/// Lex `segment (: segment)*`, emitting each part.
///
/// Returns whether at least one segment was seen. Separators are accepted
/// anywhere, including first; rejecting empty segments is up to the parser.
fn accept_account_name(l: &mut Lexer<'_>) -> bool {
    let mut any_segment = false;
    loop {
        if l.peek() == Some(':') {
            l.next_rune();
            l.emit(ACCOUNT_NAME_SEPARATOR);
        } else if accept_segment(l) {
            l.emit(ACCOUNT_NAME_SEGMENT);
            any_segment = true;
        } else {
            return any_segment;
        }
    }
}

/// A single space may sit inside a segment, but only between two
/// segment characters.
fn accept_segment(l: &mut Lexer<'_>) -> bool {
    let mut consumed = false;
    while let Some(ch) = l.peek() {
        if NAME_TERMINATORS.contains(ch) {
            break;
        }
        if ch == ' ' && !inner_space(l.rest(), NAME_TERMINATORS) {
            break;
        }
        l.next_rune();
        consumed = true;
    }
    consumed
}

/// Amounts run up to a bracket, a newline, or a space that is not
/// followed by more amount text.
fn accept_amount(l: &mut Lexer<'_>) -> bool {
    let mut consumed = false;
    while let Some(ch) = l.peek() {
        if AMOUNT_TERMINATORS.contains(ch) {
            break;
        }
        if ch == ' ' && !inner_space(l.rest(), AMOUNT_TERMINATORS) {
            break;
        }
        l.next_rune();
        consumed = true;
    }
    consumed
}

/// `rest` starts with a space; check that the next character continues
/// the current word.
fn inner_space(rest: &str, terminators: &str) -> bool {
    rest.chars()
        .nth(1)
        .is_some_and(|next| next != ' ' && !terminators.contains(next))
}

fn at_inline_comment_indicator(rest: &str) -> bool {
    rest.starts_with("  ;") || rest.starts_with("  #")
}

/// Match exactly `"  ;"` or `"  #"`. Leaves the position alone otherwise.
fn accept_inline_comment_indicator(l: &mut Lexer<'_>) -> bool {
    let matched = matches!(l.accept_string("  ;"), Ok(true))
        || matches!(l.accept_string("  #"), Ok(true));
    if matched {
        l.emit(INLINE_COMMENT_INDICATOR);
    }
    matched
}

/// Lex an inline comment: extra leading spaces as Whitespace, then the
/// indicator, then the comment text as Garbage.
fn accept_inline_comment(l: &mut Lexer<'_>) -> bool {
    let backup = l.save();
    while l.peek() == Some(' ') && !at_inline_comment_indicator(l.rest()) {
        l.next_rune();
    }
    if !at_inline_comment_indicator(l.rest()) {
        l.restore(backup);
        return false;
    }
    if l.pos().offset > backup.pos().offset {
        l.emit(WHITESPACE);
    }

    accept_inline_comment_indicator(l);
    if l.accept_until("\n") {
        l.emit(GARBAGE);
    }
    true
}

//! Journal parser: journal lexer + Chumsky.
//!
//! # Architecture
//!
//! ```text
//! Source → journal_lexer() → TokenStream → Vec<Token> (no Whitespace)
//!        → Chumsky → Journal
//! ```
//!
//! The lexer already settles the hard questions (where account names end,
//! what is a comment), so the grammar only has to assemble tokens:
//!
//! ```text
//! Journal     := (Entry | Indent? (Newline | Garbage) | Indent EOF)*
//! Entry       := Include | Account | Posting
//! Include     := IncludeDirective IncludePath LineEnd
//! Account     := AccountDirective AccountName Comment? LineEnd
//! Posting     := Indent Status? ( AccountName | "(" AccountName ")" | "[" AccountName "]" )
//!                Amount? Comment? LineEnd
//! AccountName := Segment (Separator Segment)* Separator?
//! Comment     := InlineCommentIndicator Garbage?
//! LineEnd     := Newline | EOF
//! ```

use chumsky::error::RichPattern;
use chumsky::input::InputRef;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::util::Maybe;
use hledger_core::{
    AccountDirective, AccountName, Entry, IncludeDirective, Journal, Position, Posting,
    PostingStatus,
};
use std::io::Read;

use crate::error::{ParseError, ParseErrorKind};
use crate::journal_lexer::{
    journal_lexer, ACCOUNT_DIRECTIVE, ACCOUNT_NAME_DELIMITER, ACCOUNT_NAME_SEGMENT,
    ACCOUNT_NAME_SEPARATOR, AMOUNT, GARBAGE, INCLUDE_DIRECTIVE, INCLUDE_PATH, INDENT,
    INLINE_COMMENT_INDICATOR, NEWLINE, POSTING_STATUS_INDICATOR, WHITESPACE,
};
use crate::lexer::TokenStream;
use crate::token::{Token, TokenKind};

/// Type alias for parser extra with our token type.
type TokExtra<'src> = extra::Err<Rich<'src, Token>>;

/// Type alias for the parser input.
type TokInput<'src> = &'src [Token];

// ============================================================================
// Token Matchers (Primitives)
// ============================================================================

/// Match a single token accepted by `accepts`.
///
/// A mismatch reports the token found and `label` as the expectation, so
/// that failures of alternatives at the same token add up to one list.
fn tok_matching<'src>(
    label: &'static str,
    accepts: impl Fn(&Token) -> bool + Clone,
) -> impl Parser<'src, TokInput<'src>, Token, TokExtra<'src>> + Clone {
    custom(
        move |inp: &mut InputRef<'src, '_, TokInput<'src>, TokExtra<'src>>| {
            let before = inp.cursor();
            match inp.peek_ref() {
                Some(token) if accepts(token) => {
                    inp.skip();
                    Ok(token.clone())
                }
                found => {
                    let span = inp.span_since(&before);
                    Err(<Rich<'src, Token> as LabelError<
                        'src,
                        TokInput<'src>,
                        RichPattern<'src, Token>,
                    >>::expected_found(
                        [RichPattern::from(label)],
                        found.map(Maybe::Ref),
                        span,
                    ))
                }
            }
        },
    )
}

/// Match a single token of `kind`.
fn tok<'src>(
    kind: TokenKind,
) -> impl Parser<'src, TokInput<'src>, Token, TokExtra<'src>> + Clone {
    tok_matching(kind.name(), move |t| t.kind == kind)
}

/// Match an account name delimiter with the given text.
fn tok_delimiter<'src>(
    value: &'static str,
) -> impl Parser<'src, TokInput<'src>, Token, TokExtra<'src>> + Clone {
    tok_matching(value, move |t| t.kind == ACCOUNT_NAME_DELIMITER && t.value == value)
}

/// A newline, or the end of the input on the last line.
fn tok_line_end<'src>() -> impl Parser<'src, TokInput<'src>, (), TokExtra<'src>> + Clone {
    tok(NEWLINE).ignored().or(end())
}

fn tok_inline_comment<'src>() -> impl Parser<'src, TokInput<'src>, (), TokExtra<'src>> + Clone {
    tok(INLINE_COMMENT_INDICATOR)
        .then(tok(GARBAGE).or_not())
        .ignored()
}

// ============================================================================
// Rules
// ============================================================================

/// Parse an account name, keeping the span of its tokens.
fn tok_account_name<'src>(
) -> impl Parser<'src, TokInput<'src>, AccountName, TokExtra<'src>> + Clone {
    tok(ACCOUNT_NAME_SEGMENT)
        .then(
            tok(ACCOUNT_NAME_SEPARATOR)
                .ignore_then(tok(ACCOUNT_NAME_SEGMENT))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then(tok(ACCOUNT_NAME_SEPARATOR).or_not())
        .map(|((first, rest), trailing)| {
            let pos = first.pos.clone();
            let last = trailing.as_ref().or_else(|| rest.last()).unwrap_or(&first);
            let end_pos = last.end_pos();
            let segments = std::iter::once(first)
                .chain(rest)
                .map(|segment| segment.value)
                .collect();
            AccountName::new(segments, pos, end_pos)
        })
}

fn tok_posting_status<'src>(
) -> impl Parser<'src, TokInput<'src>, PostingStatus, TokExtra<'src>> + Clone {
    tok(POSTING_STATUS_INDICATOR)
        .map(|t: Token| PostingStatus::from_indicator(&t.value).unwrap_or_default())
        .or_not()
        .map(Option::unwrap_or_default)
}

/// Amount, inline comment and line end shared by every posting variant.
fn tok_posting_tail<'src>() -> impl Parser<'src, TokInput<'src>, String, TokExtra<'src>> + Clone
{
    tok(AMOUNT)
        .map(|t: Token| t.value)
        .or_not()
        .map(Option::unwrap_or_default)
        .then_ignore(tok_inline_comment().or_not())
        .then_ignore(tok_line_end())
}

fn make_posting(
    ((status, account_name), amount): ((PostingStatus, AccountName), String),
) -> Posting {
    Posting {
        status,
        account_name,
        amount,
    }
}

/// Parse a posting line in any of its three forms.
fn tok_posting<'src>() -> impl Parser<'src, TokInput<'src>, Entry, TokExtra<'src>> + Clone {
    let head = tok(INDENT).ignore_then(tok_posting_status());

    let real = head
        .clone()
        .then(tok_account_name())
        .then(tok_posting_tail())
        .map(|p| Entry::RealPosting(make_posting(p)));

    let virtual_posting = head
        .clone()
        .then_ignore(tok_delimiter("("))
        .then(tok_account_name())
        .then_ignore(tok_delimiter(")"))
        .then(tok_posting_tail())
        .map(|p| Entry::VirtualPosting(make_posting(p)));

    let virtual_balanced = head
        .then_ignore(tok_delimiter("["))
        .then(tok_account_name())
        .then_ignore(tok_delimiter("]"))
        .then(tok_posting_tail())
        .map(|p| Entry::VirtualBalancedPosting(make_posting(p)));

    choice((real, virtual_posting, virtual_balanced))
}

fn tok_include_directive<'src>() -> impl Parser<'src, TokInput<'src>, Entry, TokExtra<'src>> + Clone
{
    tok(INCLUDE_DIRECTIVE)
        .ignore_then(tok(INCLUDE_PATH))
        .then_ignore(tok_line_end())
        .map(|t: Token| {
            Entry::Include(IncludeDirective {
                include_path: t.value,
            })
        })
}

fn tok_account_directive<'src>() -> impl Parser<'src, TokInput<'src>, Entry, TokExtra<'src>> + Clone
{
    tok(ACCOUNT_DIRECTIVE)
        .ignore_then(tok_account_name())
        .then_ignore(tok_inline_comment().or_not())
        .then_ignore(tok_line_end())
        .map(|account_name| Entry::Account(AccountDirective { account_name }))
}

/// Lines that carry no entry: blank lines, comments, transaction headers.
fn tok_skipped_line<'src>() -> impl Parser<'src, TokInput<'src>, (), TokExtra<'src>> + Clone {
    choice((
        tok(INDENT)
            .or_not()
            .ignore_then(choice((tok(NEWLINE), tok(GARBAGE))))
            .ignored(),
        tok(INDENT).ignore_then(end()),
    ))
}

/// Parse a complete journal.
fn tok_journal_parser<'src>() -> impl Parser<'src, TokInput<'src>, Journal, TokExtra<'src>> {
    let entry = choice((
        tok_include_directive(),
        tok_account_directive(),
        tok_posting(),
    ));

    choice((entry.map(Some), tok_skipped_line().to(None)))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|items| Journal::new(items.into_iter().flatten().collect()))
}

fn to_parse_error(tokens: &[Token], eof: &Position, err: &Rich<'_, Token>) -> ParseError {
    let mut expected: Vec<String> = err.expected().map(ToString::to_string).collect();
    expected.sort();
    expected.dedup();

    // A failed match never consumes, so the span starts at the offending token
    let (kind, pos) = match tokens.get(err.span().start) {
        Some(found) => (
            ParseErrorKind::UnexpectedToken {
                found: found.to_string(),
                expected,
            },
            found.pos.clone(),
        ),
        None => (ParseErrorKind::UnexpectedEof { expected }, eof.clone()),
    };
    ParseError::new(kind, pos)
}

// ============================================================================
// Public API
// ============================================================================

/// Parse a journal from a token stream.
///
/// Drains the stream (a lexical error ends parsing right away), drops
/// Whitespace tokens and runs the grammar. Only the first grammar error is
/// reported.
pub fn parse_tokens(mut stream: TokenStream) -> Result<Journal, ParseError> {
    let mut tokens = Vec::new();
    let eof = loop {
        let token = stream.next_token()?;
        if token.is_eof() {
            break token.pos;
        }
        if !token.is(WHITESPACE) {
            tokens.push(token);
        }
    };

    let parsed = tok_journal_parser().parse(tokens.as_slice()).into_result();
    parsed.map_err(|errors| match errors.first() {
        Some(err) => to_parse_error(&tokens, &eof, err),
        None => ParseError::new(
            ParseErrorKind::UnexpectedEof {
                expected: Vec::new(),
            },
            eof.clone(),
        ),
    })
}

/// Parse journal source text.
///
/// `filename` ends up in every position of the result.
///
/// # Example
///
/// ```
/// use hledger_parser::parse;
///
/// let journal = parse("main.journal", "account assets:Cash\n").unwrap();
/// let name = journal.entries[0].account_name().unwrap();
/// assert_eq!(name.to_string(), "assets:Cash");
/// assert_eq!(name.pos.column, 9);
/// ```
pub fn parse(filename: &str, source: &str) -> Result<Journal, ParseError> {
    parse_tokens(journal_lexer().lex_string(filename, source))
}

/// Read and parse a journal.
pub fn parse_reader(filename: &str, reader: impl Read) -> Result<Journal, ParseError> {
    let stream = journal_lexer().lex_reader(filename, reader).map_err(|err| {
        ParseError::new(
            ParseErrorKind::Io(err.to_string()),
            Position::start(filename),
        )
    })?;
    parse_tokens(stream)
}

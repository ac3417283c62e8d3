//! hledger journal lexer and parser.
//!
//! This crate turns hledger journal text into a [`Journal`](hledger_core::Journal)
//! in three layers:
//!
//! - [`lexer`] - a generic framework for hand-written state-machine lexers
//!   that stream tokens from a worker thread
//! - [`journal_lexer`] - the state machine for hledger journals
//! - [`parse`] / [`parse_reader`] - a Chumsky grammar over the journal tokens
//!
//! Only the parts of a journal needed for account name completion are
//! understood: `include` and `account` directives and posting lines.
//! Everything else is kept as Garbage tokens and skipped.
//!
//! # Example
//!
//! ```
//! use hledger_parser::parse;
//!
//! let source = "\
//! account assets:Cash
//! 2024-01-15 Coffee
//!     expenses:Coffee      5.00 EUR
//!     assets:Cash
//! ";
//!
//! let journal = parse("main.journal", source).unwrap();
//! assert_eq!(journal.entries.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod journal_lexer;
pub mod lexer;
mod parser;
mod token;

pub use error::{ParseError, ParseErrorKind};
pub use journal_lexer::journal_lexer;
pub use lexer::{Backup, LexError, Lexer, LexerDefinition, State, StateResult, TokenStream};
pub use parser::{parse, parse_reader, parse_tokens};
pub use token::{Token, TokenKind};

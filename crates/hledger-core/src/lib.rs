//! Core types for hledger-lsp
//!
//! This crate provides the data model shared by the parser, the loader and
//! the language server:
//!
//! - [`Position`] - A filename/line/column/offset location
//! - [`AccountName`] - A `:`-separated hierarchical account name with its span
//! - [`Entry`] - Include, account and posting entries of a journal
//! - [`Journal`] - The ordered entries of one file (or of a flattened tree)
//!
//! plus the [`query`] functions used for completion and hover.
//!
//! # Example
//!
//! ```
//! use hledger_core::{account_names, AccountDirective, AccountName, Entry, Journal};
//!
//! let journal = Journal::new(vec![Entry::Account(AccountDirective {
//!     account_name: AccountName::from_segments(["assets", "Cash"]),
//! })]);
//!
//! let names: Vec<String> = account_names(&journal).iter().map(ToString::to_string).collect();
//! assert_eq!(names, ["assets", "assets:Cash"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod directive;
pub mod position;
pub mod query;

pub use account::AccountName;
pub use directive::{AccountDirective, Entry, IncludeDirective, Journal, Posting, PostingStatus};
pub use position::Position;
pub use query::{account_names, filter_account_names_by_prefix, find_account_name_under_cursor};

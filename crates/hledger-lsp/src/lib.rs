//! Language Server Protocol implementation for hledger journals.
//!
//! This crate provides an LSP server for hledger files with two features:
//! - Completion of account names, narrowed by the name under the cursor
//! - Hover over account names
//!
//! Both features see every account declared or posted to in the journal
//! and in the files it includes.
//!
//! # Architecture
//!
//! - **Main loop**: Handles LSP messages, keeps the document cache in sync
//!   with the editor and dispatches requests
//! - **Handlers**: Answer requests against a journal with its includes
//!   resolved, loaded through [`hledger_loader::ParserCache`]
//!
//! # Example
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = hledger_lsp::start_stdio() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod main_loop;

mod error;
mod server;

pub use config::Config;
pub use error::RequestError;
pub use main_loop::{run_main_loop, uri_to_path, MainLoopState};
pub use server::{serve, server_capabilities, start_stdio, Server};

/// LSP server version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Document and parser caches with include resolution for hledger journals.
//!
//! This crate sits between the editor and the parser:
//!
//! - [`DocumentCache`] - contents of open editor buffers, falling back to a
//!   [`FileSystem`] for everything else
//! - [`ParserCache`] - parsed journals by path, including cached parse errors
//! - [`ParserCache::resolve_includes`] - flattens `include` directives into
//!   a single journal
//! - [`Context`] / [`RevisionCounter`] - cancellation of outdated work
//!
//! # Example
//!
//! ```
//! use hledger_loader::{Context, DocumentCache, MemoryFileSystem, ParserCache};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new();
//! fs.insert("books/accounts.journal", "account assets:Cash\n");
//!
//! let documents = Arc::new(DocumentCache::new(fs));
//! documents.set("books/main.journal", "include accounts.journal\n");
//!
//! let parsers = ParserCache::new(documents);
//! let ctx = Context::background();
//! let root = Path::new("books/main.journal");
//! let journal = parsers.parse(&ctx, root)?;
//! let flat = parsers.resolve_includes(&ctx, &journal, root)?;
//! assert_eq!(flat.entries.len(), 1);
//! # Ok::<(), hledger_loader::LoadError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod document_cache;
mod fs;
mod parser_cache;

pub use context::{Context, RevisionCounter};
pub use document_cache::DocumentCache;
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use parser_cache::{normalize_path, ParserCache, DEFAULT_MAX_INCLUDE_DEPTH};

use hledger_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {}: {source}", path.display())]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but does not parse.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Include cycle detected.
    #[error("include cycle detected: {}", .cycle.join(" -> "))]
    IncludeCycle {
        /// The cycle of file paths.
        cycle: Vec<String>,
    },

    /// Includes nested deeper than allowed.
    #[error("includes nested deeper than {limit} levels at {}", path.display())]
    IncludeDepthExceeded {
        /// The include that went too deep.
        path: PathBuf,
        /// The configured limit.
        limit: usize,
    },

    /// The context was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

//! Parser cache and include resolution.

use hledger_core::{Entry, Journal, Position};
use hledger_parser::{parse, ParseError, ParseErrorKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::document_cache::DocumentCache;
use crate::{Context, LoadError};

/// Default limit on include nesting.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

type ParseOutcome = Result<Arc<Journal>, ParseError>;

/// Parsed journals by path.
///
/// Both successful parses and parse errors are cached until
/// [`remove`](Self::remove) is called; failures to read a document are not.
/// Two threads missing the same path at once may both parse it; either
/// result ends up cached.
#[derive(Debug)]
pub struct ParserCache {
    documents: Arc<DocumentCache>,
    results: RwLock<HashMap<PathBuf, ParseOutcome>>,
    max_include_depth: usize,
}

impl ParserCache {
    /// Create an empty cache reading documents from `documents`.
    pub fn new(documents: Arc<DocumentCache>) -> Self {
        Self {
            documents,
            results: RwLock::new(HashMap::new()),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Set the include nesting limit used by [`resolve_includes`](Self::resolve_includes).
    #[must_use]
    pub const fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// The document cache parses read from.
    pub const fn documents(&self) -> &Arc<DocumentCache> {
        &self.documents
    }

    /// Parse `path`, or return the cached result.
    pub fn parse(&self, ctx: &Context, path: &Path) -> Result<Arc<Journal>, LoadError> {
        ctx.check()?;
        if let Some(cached) = self.results.read().get(path) {
            debug!(path = %path.display(), "parser cache hit");
            return cached.clone().map_err(LoadError::Parse);
        }
        debug!(path = %path.display(), "parser cache miss");

        let mut reader = self.documents.open(ctx, path)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let filename = path.to_string_lossy();
        let outcome = match String::from_utf8(bytes) {
            Ok(source) => parse(&filename, &source).map(Arc::new),
            Err(err) => Err(ParseError::new(
                ParseErrorKind::Io(err.to_string()),
                Position::start(filename.as_ref()),
            )),
        };

        self.results
            .write()
            .insert(path.to_path_buf(), outcome.clone());
        outcome.map_err(LoadError::Parse)
    }

    /// Invalidate the cached result for `path`, returning whether there was one.
    pub fn remove(&self, path: &Path) -> bool {
        self.results.write().remove(path).is_some()
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.results.read().len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.results.read().is_empty()
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.results.write().clear();
    }

    /// Expand the include directives of `journal` in place, recursively.
    ///
    /// Relative include paths are resolved against the directory of
    /// `journal_file_path`; absolute ones lose their leading `/`. Nested
    /// includes are resolved against the same root directory, not against
    /// the directory of the file that contains them.
    ///
    /// # Errors
    ///
    /// Fails on the first included file that cannot be read or parsed, on
    /// an include cycle, when nesting exceeds the configured depth, or when
    /// `ctx` is cancelled.
    pub fn resolve_includes(
        &self,
        ctx: &Context,
        journal: &Journal,
        journal_file_path: &Path,
    ) -> Result<Journal, LoadError> {
        let mut stack = vec![normalize_path(journal_file_path)];
        self.resolve_recursive(ctx, journal, journal_file_path, &mut stack)
    }

    fn resolve_recursive(
        &self,
        ctx: &Context,
        journal: &Journal,
        root: &Path,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Journal, LoadError> {
        ctx.check()?;
        let journal_dir = root.parent().unwrap_or_else(|| Path::new(""));

        let mut entries = Vec::with_capacity(journal.entries.len());
        for entry in &journal.entries {
            let Entry::Include(include) = entry else {
                entries.push(entry.clone());
                continue;
            };

            let path = include_target(journal_dir, &include.include_path);
            if stack.contains(&path) {
                let mut cycle: Vec<String> =
                    stack.iter().map(|p| p.display().to_string()).collect();
                cycle.push(path.display().to_string());
                return Err(LoadError::IncludeCycle { cycle });
            }
            if stack.len() > self.max_include_depth {
                return Err(LoadError::IncludeDepthExceeded {
                    path,
                    limit: self.max_include_depth,
                });
            }

            debug!(include = %path.display(), "expanding include");
            let included = self.parse(ctx, &path)?;
            stack.push(path);
            let resolved = self.resolve_recursive(ctx, &included, root, stack);
            stack.pop();
            entries.extend(resolved?.entries);
        }

        Ok(Journal::new(entries))
    }
}

/// Where an include directive in a file under `journal_dir` points to.
fn include_target(journal_dir: &Path, include_path: &str) -> PathBuf {
    let target = match include_path.strip_prefix('/') {
        Some(stripped) => PathBuf::from(stripped),
        None => journal_dir.join(include_path),
    };
    normalize_path(&target)
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

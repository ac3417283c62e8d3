//! Document cache: editor buffers in front of the filesystem.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::fs::FileSystem;
use crate::{Context, LoadError};

/// Contents of open documents, falling back to a [`FileSystem`].
///
/// Many readers, one writer. The editor-sync layer keeps the cache in step
/// with `didOpen` / `didChange` / `didClose`; everything not open in the
/// editor is read from the filesystem on demand.
pub struct DocumentCache {
    documents: RwLock<HashMap<PathBuf, Arc<[u8]>>>,
    fs: Box<dyn FileSystem>,
}

impl DocumentCache {
    /// Create an empty cache over `fs`.
    pub fn new(fs: impl FileSystem + 'static) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            fs: Box::new(fs),
        }
    }

    /// The cached contents of `path`, if any.
    pub fn get(&self, path: &Path) -> Option<Arc<[u8]>> {
        self.documents.read().get(path).cloned()
    }

    /// Store the contents of `path`.
    pub fn set(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .insert(path.into(), Arc::from(contents.into()));
    }

    /// Forget `path`, returning whether it was cached.
    pub fn delete(&self, path: &Path) -> bool {
        self.documents.write().remove(path).is_some()
    }

    /// Open `path`: the cached contents if present, the filesystem otherwise.
    pub fn open(&self, ctx: &Context, path: &Path) -> Result<Box<dyn Read + Send>, LoadError> {
        ctx.check()?;
        if let Some(contents) = self.get(path) {
            return Ok(Box::new(Cursor::new(contents)));
        }

        debug!(path = %path.display(), "document not open, reading from filesystem");
        self.fs.open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if no document is cached.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("documents", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::RevisionCounter;

    fn read_all(mut reader: Box<dyn Read + Send>) -> String {
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_get_set_delete() {
        let cache = DocumentCache::new(MemoryFileSystem::new());
        let path = Path::new("a.journal");
        assert!(cache.get(path).is_none());

        cache.set(path, "account a\n");
        assert_eq!(cache.get(path).as_deref(), Some(&b"account a\n"[..]));
        assert_eq!(cache.len(), 1);

        assert!(cache.delete(path));
        assert!(!cache.delete(path));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_open_prefers_cached_contents() {
        let fs = MemoryFileSystem::new();
        fs.insert("a.journal", "on disk\n");
        let cache = DocumentCache::new(fs);
        let ctx = Context::background();
        let path = Path::new("a.journal");

        assert_eq!(read_all(cache.open(&ctx, path).unwrap()), "on disk\n");
        cache.set(path, "in editor\n");
        assert_eq!(read_all(cache.open(&ctx, path).unwrap()), "in editor\n");
    }

    #[test]
    fn test_open_missing_is_io_error() {
        let cache = DocumentCache::new(MemoryFileSystem::new());
        let err = cache
            .open(&Context::background(), Path::new("nope.journal"))
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_open_checks_cancellation() {
        let cache = DocumentCache::new(MemoryFileSystem::new());
        cache.set("a.journal", "x\n");
        let counter = RevisionCounter::new();
        let ctx = counter.context();
        counter.bump();
        let err = cache.open(&ctx, Path::new("a.journal")).err().unwrap();
        assert!(matches!(err, LoadError::Cancelled));
    }
}

//! Filesystem abstraction behind the document cache.
//!
//! Paths handed to a [`FileSystem`] never start with `/`: absolute document
//! paths are stored with the leading slash stripped and resolved against a
//! root directory here.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read access to journal files.
pub trait FileSystem: Send + Sync {
    /// Open `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// The operating system's filesystem, rooted at a directory.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    /// Resolve paths against `root` (usually `/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSystem for OsFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let relative = path.strip_prefix("/").unwrap_or(path);
        let file = File::open(self.root.join(relative))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// An in-memory filesystem.
///
/// Clones share the same files, so a test can keep a handle and add files
/// after giving one to a cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, Arc<[u8]>>>>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert(path.into(), Arc::from(contents.into()));
    }

    /// Remove a file, returning whether it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.files.write().remove(path).is_some()
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        match self.files.read().get(path) {
            Some(contents) => Ok(Box::new(Cursor::new(Arc::clone(contents)))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file", path.display()),
            )),
        }
    }
}

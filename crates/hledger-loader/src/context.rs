//! Cancellation for parse and include resolution.
//!
//! Every change to the editor state bumps a [`RevisionCounter`]. A
//! [`Context`] remembers the revision it was created at and counts as
//! cancelled once the counter has moved on, so long-running work started
//! for an outdated state can stop early.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::LoadError;

/// Shared revision counter that hands out [`Context`]s.
#[derive(Debug, Clone, Default)]
pub struct RevisionCounter {
    revision: Arc<AtomicU64>,
}

impl RevisionCounter {
    /// Create a counter at revision 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current revision.
    pub fn current(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Move to the next revision, cancelling every outstanding context.
    pub fn bump(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// A context tied to the current revision.
    pub fn context(&self) -> Context {
        Context {
            revision: self.current(),
            counter: Some(Arc::clone(&self.revision)),
        }
    }
}

/// A cancellation token checked at I/O and recursion boundaries.
#[derive(Debug, Clone)]
pub struct Context {
    revision: u64,
    counter: Option<Arc<AtomicU64>>,
}

impl Context {
    /// A context that is never cancelled.
    #[must_use]
    pub const fn background() -> Self {
        Self {
            revision: 0,
            counter: None,
        }
    }

    /// The revision this context was created at.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Check if the revision has moved on since this context was created.
    pub fn is_cancelled(&self) -> bool {
        self.counter
            .as_ref()
            .is_some_and(|counter| counter.load(Ordering::SeqCst) != self.revision)
    }

    /// Fail with [`LoadError::Cancelled`] if cancelled.
    pub fn check(&self) -> Result<(), LoadError> {
        if self.is_cancelled() {
            Err(LoadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

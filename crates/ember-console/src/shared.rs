//! Mutex-guarded console handle for cross-thread ingestion.

use std::sync::Arc;

use ember_ring::Result;
use parking_lot::Mutex;

use crate::log::ConsoleLog;
use crate::message::{ConsoleMessage, Severity};

/// Cheap-to-clone handle serializing all access to a [`ConsoleLog`].
///
/// The log itself is single-threaded; this wrapper is the single
/// mutual-exclusion guard that lets background log writers feed the same
/// buffer a UI thread reads.
#[derive(Clone)]
pub struct SharedConsole {
    inner: Arc<Mutex<ConsoleLog>>,
}

impl SharedConsole {
    /// Create a shared log with the given message capacity.
    ///
    /// # Errors
    ///
    /// Capacity must be a non-zero power of two.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(ConsoleLog::new(capacity)?)),
        })
    }

    /// Append a message stamped with the current wall-clock time.
    ///
    /// Returns `true` iff an older entry was evicted.
    pub fn push(&self, severity: Severity, text: impl Into<String>) -> bool {
        self.push_message(ConsoleMessage::now(severity, text))
    }

    /// Append a prebuilt message.
    pub fn push_message(&self, message: ConsoleMessage) -> bool {
        self.inner.lock().push(message)
    }

    /// Number of visible messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check whether the log holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Total display lines across the visible window.
    #[must_use]
    pub fn total_lines(&self) -> u32 {
        self.inner.lock().total_lines()
    }

    /// Run `reader` against the log while holding the guard.
    ///
    /// Scroll views use this to resolve a visible line range to messages
    /// under a single lock acquisition.
    pub fn read<R>(&self, reader: impl FnOnce(&ConsoleLog) -> R) -> R {
        reader(&self.inner.lock())
    }
}

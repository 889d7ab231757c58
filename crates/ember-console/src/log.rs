//! Line-indexed scrollback log.
//!
//! Maps logical display lines to messages in O(log n) so a virtualized
//! scroll view can ask "which message owns line N" without walking the
//! whole window. A prefix-sum array runs parallel to the backing ring,
//! aligned by physical slot; a base offset absorbs the lines that leave
//! the window as old messages are overwritten.

use ember_ring::{Result, RingBuffer};

use crate::message::ConsoleMessage;

/// Console message buffer with per-slot cumulative line counts.
///
/// Single-threaded by design; wrap in [`SharedConsole`](crate::SharedConsole)
/// when log producers live on other threads.
pub struct ConsoleLog {
    messages: RingBuffer<ConsoleMessage>,
    /// Cumulative line counts, indexed by physical slot.
    line_prefix: Vec<u32>,
    /// Subtracted from stored prefix values to get window-relative lines.
    base_line_offset: u32,
}

impl ConsoleLog {
    /// Create an empty log.
    ///
    /// # Errors
    ///
    /// Capacity must be a non-zero power of two.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            messages: RingBuffer::new(capacity)?,
            line_prefix: vec![0; capacity],
            base_line_offset: 0,
        })
    }

    /// Build and append a message; the write entry point used by upstream
    /// log sinks. Returns `true` iff an entry was evicted.
    pub fn add(
        &mut self,
        severity: crate::Severity,
        text: impl Into<String>,
        timestamp: std::time::SystemTime,
    ) -> bool {
        self.push(ConsoleMessage::new(severity, text, timestamp))
    }

    /// Append a message, evicting the oldest entry once the window is at
    /// capacity. Returns `true` iff an entry was evicted.
    pub fn push(&mut self, message: ConsoleMessage) -> bool {
        let lines = message.line_count();
        if self.last_prefix().saturating_add(lines) > u32::MAX / 2 {
            self.rebuild_line_index();
        }
        let slot = self.messages.next_slot();
        if self.messages.is_full() {
            // The evicted message's accumulated count leaves the window;
            // fold it into the base offset before the slot is rewritten.
            self.base_line_offset = self.line_prefix[slot];
        }
        self.line_prefix[slot] = self.last_prefix() + lines;
        self.messages.push(message)
    }

    /// 0-based first display line of the message at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is outside the visible window.
    #[must_use]
    pub fn line_offset(&self, index: usize) -> u32 {
        assert!(
            index < self.messages.len(),
            "message index {index} out of range (len {})",
            self.messages.len()
        );
        if index == 0 {
            0
        } else {
            self.line_prefix[self.messages.physical_index(index - 1)] - self.base_line_offset
        }
    }

    /// Index of the message owning display line `target_line`.
    ///
    /// Lower-bound binary search over the visible window; out-of-range
    /// lines clamp to the nearest end. Returns 0 for an empty log.
    #[must_use]
    pub fn index_for_line(&self, target_line: u32) -> usize {
        let count = self.messages.len();
        if count == 0 {
            return 0;
        }
        let mut low = 0_usize;
        let mut high = count;
        while low < high {
            let mid = low + (high - low) / 2;
            let prefix =
                self.line_prefix[self.messages.physical_index(mid)] - self.base_line_offset;
            if prefix <= target_line {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low.min(count - 1)
    }

    /// Total display lines across the visible window.
    #[must_use]
    pub fn total_lines(&self) -> u32 {
        self.last_prefix() - self.base_line_offset
    }

    /// Message at logical index (0 = oldest), or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ConsoleMessage> {
        self.messages.get(index)
    }

    /// Number of visible messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check whether the log holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Fixed message capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.messages.capacity()
    }

    /// Iterate messages oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ConsoleMessage> {
        self.messages.iter()
    }

    /// Iterate newest to oldest as `(logical index, physical slot, message)`.
    pub fn iter_rev(&self) -> impl Iterator<Item = (usize, usize, &ConsoleMessage)> {
        self.messages.iter_rev()
    }

    /// Drop all messages and reset the line accounting.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.base_line_offset = 0;
    }

    /// Prefix value of the newest live slot, or the base offset when empty.
    fn last_prefix(&self) -> u32 {
        if self.messages.is_empty() {
            self.base_line_offset
        } else {
            self.line_prefix[self.messages.physical_index(self.messages.len() - 1)]
        }
    }

    /// Recompute the prefix array from the live window and zero the base
    /// offset. Keeps stored values clear of the u32 ceiling; window-relative
    /// results are unchanged.
    fn rebuild_line_index(&mut self) {
        tracing::debug!(
            messages = self.messages.len(),
            base = self.base_line_offset,
            "rebuilding console line index"
        );
        self.base_line_offset = 0;
        let mut running = 0_u32;
        for index in 0..self.messages.len() {
            let slot = self.messages.physical_index(index);
            running += self.messages[index].line_count();
            self.line_prefix[slot] = running;
        }
    }
}

impl std::ops::Index<usize> for ConsoleLog {
    type Output = ConsoleMessage;

    fn index(&self, index: usize) -> &ConsoleMessage {
        &self.messages[index]
    }
}

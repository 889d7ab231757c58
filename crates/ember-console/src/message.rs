//! Console message model.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Severity classes for console messages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// Verbose diagnostics.
    Trace,
    /// Developer diagnostics.
    Debug,
    /// Normal operation.
    Info,
    /// Something suspicious but recoverable.
    Warning,
    /// Operation failed.
    Error,
}

impl Severity {
    /// Get a display name for this severity.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trace => "Trace",
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// A single console entry as received from an upstream log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Message severity.
    pub severity: Severity,
    /// Message body; may span multiple display lines.
    pub text: String,
    /// Wall-clock time the message was produced.
    pub timestamp: SystemTime,
}

impl ConsoleMessage {
    /// Create a message with an explicit timestamp.
    pub fn new(severity: Severity, text: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            severity,
            text: text.into(),
            timestamp,
        }
    }

    /// Create a message stamped with the current wall-clock time.
    pub fn now(severity: Severity, text: impl Into<String>) -> Self {
        Self::new(severity, text, SystemTime::now())
    }

    /// Number of display lines: embedded line breaks plus one.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.text.matches('\n').count() as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_counts_breaks_plus_one() {
        assert_eq!(ConsoleMessage::now(Severity::Info, "").line_count(), 1);
        assert_eq!(ConsoleMessage::now(Severity::Info, "one").line_count(), 1);
        assert_eq!(
            ConsoleMessage::now(Severity::Info, "a\nb\nc").line_count(),
            3
        );
        assert_eq!(
            ConsoleMessage::now(Severity::Error, "trailing\n").line_count(),
            2
        );
    }

    #[test]
    fn severity_names() {
        assert_eq!(Severity::Warning.name(), "Warning");
        assert!(Severity::Error > Severity::Info);
    }
}

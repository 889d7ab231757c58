//! Console message buffer for the Ember telemetry core.
//!
//! This crate provides the scrollback storage behind an in-app console:
//! a fixed-capacity message window plus a line index that maps visible
//! display lines back to messages, so a virtualized scroll view only
//! materializes the rows it draws.
//!
//! # Usage
//!
//! ```
//! use ember_console::{ConsoleLog, ConsoleMessage, Severity};
//!
//! let mut log = ConsoleLog::new(1024)?;
//! log.push(ConsoleMessage::now(Severity::Info, "engine started"));
//! log.push(ConsoleMessage::now(Severity::Error, "shader failed:\nline 12"));
//!
//! // The scroll view asks which message owns display line 2.
//! let index = log.index_for_line(2);
//! assert_eq!(log[index].severity, Severity::Error);
//! # Ok::<(), ember_ring::RingError>(())
//! ```
//!
//! Background log writers wrap the log in [`SharedConsole`], the single
//! mutual-exclusion guard the core otherwise does not take.

mod log;
mod message;
mod shared;

pub use log::ConsoleLog;
pub use message::{ConsoleMessage, Severity};
pub use shared::SharedConsole;

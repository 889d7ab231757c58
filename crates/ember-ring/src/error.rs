//! Error types for the ring primitives.

use thiserror::Error;

/// Errors reported by the ring containers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Requested capacity cannot back a masked ring.
    #[error("invalid ring capacity {0}: must be a non-zero power of two")]
    InvalidCapacity(usize),
}

/// Result type alias using [`RingError`].
pub type Result<T> = std::result::Result<T, RingError>;

//! Fixed-capacity ring primitives for the Ember telemetry core.
//!
//! This crate provides the storage building blocks the profiler and
//! console are built on:
//!
//! - [`RingBuffer`]: power-of-two circular container that overwrites its
//!   oldest element once full
//! - [`AveragingBuffer`]: numeric window that precomputes a running
//!   average per inserted sample
//! - [`largest_triangle_three_buckets`]: down-sampling for plot views
//!
//! # Usage
//!
//! ```
//! use ember_ring::{AveragingBuffer, RingBuffer, SampleView};
//!
//! let mut history = RingBuffer::new(4)?;
//! for frame in 0..6 {
//!     history.push(frame);
//! }
//! assert_eq!(history.len(), 4);
//! assert_eq!(history[0], 2); // oldest visible frame
//!
//! let mut frame_ms = AveragingBuffer::new(64);
//! frame_ms.push(16.7_f32);
//! frame_ms.push(16.9_f32);
//! let smoothed = frame_ms.head_value(SampleView::Averaged);
//! assert!(smoothed > 16.7 && smoothed < 16.9);
//! # Ok::<(), ember_ring::RingError>(())
//! ```

mod averaging;
mod downsample;
mod error;
mod ring;

pub use averaging::{AveragingBuffer, Sample, SampleView};
pub use downsample::largest_triangle_three_buckets;
pub use error::{Result, RingError};
pub use ring::RingBuffer;

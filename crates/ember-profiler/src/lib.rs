//! CPU frame profiling for the Ember telemetry core.
//!
//! This crate measures named, nestable intervals inside a frame-driven
//! loop and keeps a rolling window of frame snapshots a flame-graph
//! widget can draw from.
//!
//! The profiler is single-threaded by design: call
//! [`FlameProfiler::begin_frame`], any number of nested
//! [`begin`](FlameProfiler::begin)/[`end`](FlameProfiler::end) pairs, then
//! [`end_frame`](FlameProfiler::end_frame), once per frame, from one
//! thread. Stages register themselves on first use and retire
//! automatically after a frame in which they did not run, so conditional
//! or one-off scopes need no explicit cleanup.
//!
//! # Usage
//!
//! ```
//! use ember_profiler::{FlameProfiler, ProfilerConfig};
//! use ember_ring::SampleView;
//!
//! let mut profiler = FlameProfiler::new(&ProfilerConfig::default())?;
//!
//! profiler.begin_frame();
//! profiler.begin("update");
//! profiler.begin("physics");
//! // ... simulation work
//! profiler.end("physics");
//! profiler.end("update");
//! profiler.end_frame();
//! profiler.begin_frame();
//!
//! // The renderer pulls flat values per interval.
//! let mut index = 0;
//! while let Some(view) = profiler.interval_view(index, SampleView::Averaged) {
//!     println!("{} [{}] {:.2}..{:.2} ms", view.name, view.level, view.start_ms, view.end_ms);
//!     index += 1;
//! }
//! # Ok::<(), ember_profiler::ProfilerError>(())
//! ```

mod frame;
mod profiler;
mod rate;
mod stage;

pub use frame::FrameSnapshot;
pub use profiler::{
    FlameProfiler, IntervalView, ProfilerConfig, ProfilerError, ScopeGuard, MAX_NESTING,
};
pub use rate::FrameRateTracker;
pub use stage::{StageId, StageInterval};

// Re-export the view selector; every read path takes it.
pub use ember_ring::SampleView;

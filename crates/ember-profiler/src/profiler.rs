//! Nested-interval frame profiler.

use std::time::Instant;

use ember_ring::SampleView;
use hashbrown::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::frame::FrameSnapshot;
use crate::stage::{StageId, StageInterval};

/// Maximum stage nesting depth within one frame.
pub const MAX_NESTING: u8 = u8::MAX;

/// Errors reported at profiler construction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilerError {
    /// The frame window cannot hold a rolling history.
    #[error("invalid frame window {0}: at least two frame slots are required")]
    InvalidConfiguration(usize),

    /// The per-interval sample window cannot hold a sample.
    #[error("invalid sample window: at least one slot is required")]
    InvalidSampleWindow,
}

/// Profiler configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfilerConfig {
    /// Number of frame slots in the rolling window. Must be at least two:
    /// one in-flight frame plus history, otherwise every frame overwrites
    /// the only slot and the window degenerates.
    pub frame_slots: usize,
    /// Length of each interval's start/end sample window.
    pub sample_window: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            frame_slots: 8,
            sample_window: 64,
        }
    }
}

impl ProfilerConfig {
    /// Set the number of frame slots.
    #[must_use]
    pub const fn with_frame_slots(mut self, frame_slots: usize) -> Self {
        self.frame_slots = frame_slots;
        self
    }

    /// Set the per-interval sample window length.
    #[must_use]
    pub const fn with_sample_window(mut self, sample_window: usize) -> Self {
        self.sample_window = sample_window;
        self
    }
}

/// Flat per-interval values handed to a flame-graph renderer.
///
/// The renderer positions a rectangle by time and nesting depth; it never
/// sees the buffer layout behind these values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalView<'a> {
    /// Offset of the interval start from frame start, milliseconds.
    pub start_ms: f32,
    /// Offset of the interval end from frame start, milliseconds.
    pub end_ms: f32,
    /// Nesting depth of the interval.
    pub level: u8,
    /// Stage display name.
    pub name: &'a str,
}

/// CPU profiler for nested per-frame timing intervals.
///
/// Frames run through `begin_frame` / `begin` / `end` / `end_frame` on a
/// single thread, once per frame, with no overlap. Stages register
/// themselves on first use and retire automatically after a frame in
/// which they did not run.
pub struct FlameProfiler {
    frames: Vec<FrameSnapshot>,
    name_to_id: HashMap<String, StageId>,
    id_to_name: HashMap<StageId, String>,
    /// Stage slot positions, identical across all frame snapshots.
    positions: HashMap<StageId, usize>,
    destroy_queue: Vec<StageId>,
    current_entry: usize,
    current_level: u8,
    next_id: u32,
    sample_window: usize,
}

impl FlameProfiler {
    /// Create a profiler with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::InvalidConfiguration`] when the frame
    /// window holds fewer than two slots.
    pub fn new(config: &ProfilerConfig) -> Result<Self, ProfilerError> {
        if config.frame_slots < 2 {
            return Err(ProfilerError::InvalidConfiguration(config.frame_slots));
        }
        if config.sample_window == 0 {
            return Err(ProfilerError::InvalidSampleWindow);
        }
        let mut frames = Vec::with_capacity(config.frame_slots);
        frames.resize_with(config.frame_slots, FrameSnapshot::new);
        Ok(Self {
            frames,
            name_to_id: HashMap::new(),
            id_to_name: HashMap::new(),
            positions: HashMap::new(),
            destroy_queue: Vec::new(),
            current_entry: 0,
            current_level: 0,
            next_id: 0,
            sample_window: config.sample_window,
        })
    }

    /// Open the next frame.
    ///
    /// Closes the previous entry and starts the new one at the same
    /// timestamp; frame boundaries are back-to-back with no gap.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.frames[self.current_entry].end = now;
        self.current_entry = (self.current_entry + 1) % self.frames.len();
        let entry = &mut self.frames[self.current_entry];
        entry.start = now;
        entry.end = now;
    }

    /// Begin a named interval at the current nesting depth.
    ///
    /// An unseen name registers a new stage.
    ///
    /// # Panics
    ///
    /// Panics when the nesting depth would exceed [`MAX_NESTING`].
    pub fn begin(&mut self, name: &str) {
        assert!(
            self.current_level < MAX_NESTING,
            "begin(\"{name}\"): stage nesting deeper than {MAX_NESTING} levels"
        );
        let id = self.resolve_or_create(name);
        let position = self.positions[&id];
        let now = Instant::now();
        let interval = &mut self.frames[self.current_entry].intervals[position];
        interval.level = self.current_level;
        interval.start = now;
        interval.finalized = false;
        interval.used = true;
        self.current_level += 1;
    }

    /// End the named interval opened at the matching depth.
    ///
    /// # Panics
    ///
    /// Panics when no interval is open, when the interval already ended
    /// this frame, or when the nesting depth does not match the interval's
    /// recorded level (mismatched begin/end pairs).
    pub fn end(&mut self, name: &str) {
        assert!(
            self.current_level > 0,
            "end(\"{name}\") without a matching begin"
        );
        let id = self.resolve_or_create(name);
        let position = self.positions[&id];
        let now = Instant::now();
        let interval = &mut self.frames[self.current_entry].intervals[position];
        assert!(
            !interval.finalized,
            "stage \"{name}\" already ended this frame"
        );
        self.current_level -= 1;
        assert_eq!(
            self.current_level, interval.level,
            "mismatched begin/end nesting for stage \"{name}\""
        );
        interval.end = now;
        interval.duration = now.saturating_duration_since(interval.start).as_secs_f64();
        interval.finalized = true;
    }

    /// Open a scoped interval that ends when the guard drops.
    pub fn scope<'a>(&'a mut self, name: &'a str) -> ScopeGuard<'a> {
        self.begin(name);
        ScopeGuard {
            profiler: self,
            name,
        }
    }

    /// Close the current frame.
    ///
    /// Folds every used interval's start/end offsets into its sample
    /// windows, then retires stages that did not run this frame.
    ///
    /// # Panics
    ///
    /// Panics when intervals are still open (unmatched `begin`).
    pub fn end_frame(&mut self) {
        assert_eq!(
            self.current_level, 0,
            "frame ended with unclosed stage intervals"
        );
        let entry = self.current_entry;
        let frame_start = self.frames[entry].start;
        for interval in &mut self.frames[entry].intervals {
            if !interval.used {
                self.destroy_queue.push(interval.id);
                continue;
            }
            interval.used = false;
            let start_ms =
                interval.start.saturating_duration_since(frame_start).as_secs_f32() * 1_000.0;
            let end_ms =
                interval.end.saturating_duration_since(frame_start).as_secs_f32() * 1_000.0;
            interval.start_samples.push(start_ms);
            interval.end_samples.push(end_ms);
        }
        for id in std::mem::take(&mut self.destroy_queue) {
            self.destroy_stage_id(id);
        }
    }

    /// Register a stage ahead of its first `begin`.
    ///
    /// A fresh interval is appended to every frame slot so positions stay
    /// aligned across the whole window. Returns the existing id when the
    /// name is already registered.
    pub fn create_stage(&mut self, name: &str) -> StageId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = StageId(self.next_id);
        self.next_id += 1;
        self.name_to_id.insert(name.to_owned(), id);
        self.id_to_name.insert(id, name.to_owned());
        let position = self.frames[0].intervals.len();
        for frame in &mut self.frames {
            frame
                .intervals
                .push(StageInterval::new(id, name, self.sample_window));
        }
        self.positions.insert(id, position);
        debug!(stage = name, id = id.0, "registered profiling stage");
        id
    }

    /// Remove a stage by name from every frame slot and both name maps.
    pub fn destroy_stage(&mut self, name: &str) {
        if let Some(&id) = self.name_to_id.get(name) {
            self.destroy_stage_id(id);
        }
    }

    /// Remove a stage by id from every frame slot and both name maps.
    pub fn destroy_stage_id(&mut self, id: StageId) {
        let Some(name) = self.id_to_name.remove(&id) else {
            return;
        };
        self.name_to_id.remove(&name);
        if let Some(position) = self.positions.remove(&id) {
            for frame in &mut self.frames {
                frame.intervals.remove(position);
            }
            for other in self.positions.values_mut() {
                if *other > position {
                    *other -= 1;
                }
            }
        }
        debug!(stage = %name, id = id.0, "retired profiling stage");
    }

    /// The frame snapshot currently being recorded.
    #[must_use]
    pub fn current(&self) -> &FrameSnapshot {
        &self.frames[self.current_entry]
    }

    /// Slot index of the most recently completed frame.
    #[must_use]
    pub fn completed_entry_index(&self) -> usize {
        (self.current_entry + self.frames.len() - 1) % self.frames.len()
    }

    /// The most recently completed frame snapshot.
    #[must_use]
    pub fn completed(&self) -> &FrameSnapshot {
        &self.frames[self.completed_entry_index()]
    }

    /// Flat renderer values for one interval of the most recently
    /// completed entry.
    ///
    /// Offsets come from the interval's sample windows, averaged or raw
    /// per `view`. Returns `None` past the interval list.
    #[must_use]
    pub fn interval_view(&self, index: usize, view: SampleView) -> Option<IntervalView<'_>> {
        let interval = self.completed().intervals.get(index)?;
        Some(IntervalView {
            start_ms: interval.start_offset_ms(view),
            end_ms: interval.end_offset_ms(view),
            level: interval.level,
            name: &interval.name,
        })
    }

    /// Number of registered stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.positions.len()
    }

    /// Id registered for `name`, if any.
    #[must_use]
    pub fn stage_id(&self, name: &str) -> Option<StageId> {
        self.name_to_id.get(name).copied()
    }

    /// Name registered for `id`, if any.
    #[must_use]
    pub fn stage_name(&self, id: StageId) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// Current nesting depth.
    #[must_use]
    pub const fn nesting_level(&self) -> u8 {
        self.current_level
    }

    fn resolve_or_create(&mut self, name: &str) -> StageId {
        match self.name_to_id.get(name) {
            Some(&id) => id,
            None => self.create_stage(name),
        }
    }
}

/// RAII guard that ends its interval on drop.
pub struct ScopeGuard<'a> {
    profiler: &'a mut FlameProfiler,
    name: &'a str,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.profiler.end(self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiler() -> FlameProfiler {
        FlameProfiler::new(&ProfilerConfig::default()).unwrap()
    }

    #[test]
    fn rejects_degenerate_frame_window() {
        for frame_slots in [0, 1] {
            let config = ProfilerConfig::default().with_frame_slots(frame_slots);
            assert_eq!(
                FlameProfiler::new(&config).err(),
                Some(ProfilerError::InvalidConfiguration(frame_slots))
            );
        }
    }

    #[test]
    fn nested_intervals_record_levels() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("update");
        profiler.begin("physics");
        std::thread::sleep(std::time::Duration::from_millis(1));
        profiler.end("physics");
        profiler.end("update");

        let intervals = profiler.current().intervals();
        assert_eq!(intervals.len(), 2);
        let update = &intervals[0];
        let physics = &intervals[1];
        assert_eq!(update.name(), "update");
        assert_eq!(update.level(), 0);
        assert_eq!(physics.level(), 1);
        assert!(update.is_finalized());
        assert!(physics.is_finalized());
        assert!(update.duration() >= physics.duration());
    }

    #[test]
    #[should_panic(expected = "without a matching begin")]
    fn end_at_depth_zero_panics() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.end("update");
    }

    #[test]
    #[should_panic(expected = "nesting deeper than")]
    fn begin_past_max_depth_panics() {
        let mut profiler = profiler();
        profiler.begin_frame();
        for i in 0..=u32::from(MAX_NESTING) {
            profiler.begin(&format!("stage-{i}"));
        }
    }

    #[test]
    #[should_panic(expected = "already ended this frame")]
    fn double_end_panics() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("update");
        profiler.end("update");
        profiler.begin("render");
        profiler.end("update");
    }

    #[test]
    #[should_panic(expected = "mismatched begin/end nesting")]
    fn interleaved_pairs_panic() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("outer");
        profiler.begin("inner");
        profiler.end("outer");
    }

    #[test]
    #[should_panic(expected = "unclosed stage intervals")]
    fn unmatched_begin_surfaces_at_frame_end() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("update");
        profiler.end_frame();
    }

    #[test]
    fn stages_register_in_every_frame_slot() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("update");
        profiler.end("update");
        profiler.begin("render");
        profiler.end("render");
        profiler.end_frame();

        let update = profiler.stage_id("update").unwrap();
        let render = profiler.stage_id("render").unwrap();
        for slot in &profiler.frames {
            assert_eq!(slot.index_of(update), Some(0));
            assert_eq!(slot.index_of(render), Some(1));
        }
    }

    #[test]
    fn idle_stages_retire_after_one_frame() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("one-shot");
        profiler.end("one-shot");
        profiler.end_frame();
        assert_eq!(profiler.stage_count(), 1);

        // The stage exists but does not run this frame.
        profiler.begin_frame();
        profiler.end_frame();
        assert_eq!(profiler.stage_count(), 0);
        assert_eq!(profiler.stage_id("one-shot"), None);
        for slot in &profiler.frames {
            assert!(slot.intervals().is_empty());
        }
    }

    #[test]
    fn retirement_shifts_later_positions() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("a");
        profiler.end("a");
        profiler.begin("b");
        profiler.end("b");
        profiler.end_frame();

        // Only "b" runs; "a" retires and "b" shifts to position 0.
        profiler.begin_frame();
        profiler.begin("b");
        profiler.end("b");
        profiler.end_frame();
        assert_eq!(profiler.stage_count(), 1);
        let b = profiler.stage_id("b").unwrap();
        assert_eq!(profiler.positions[&b], 0);

        profiler.begin_frame();
        profiler.begin("b");
        profiler.end("b");
        profiler.end_frame();
        assert_eq!(profiler.stage_count(), 1);
    }

    #[test]
    fn frame_boundaries_are_back_to_back() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin_frame();
        assert_eq!(profiler.completed().end(), profiler.current().start());
        assert_eq!(
            profiler.completed_entry_index(),
            (profiler.current_entry + profiler.frames.len() - 1) % profiler.frames.len()
        );
    }

    #[test]
    fn interval_view_exposes_flat_values() {
        let mut profiler = profiler();
        profiler.begin_frame();
        profiler.begin("update");
        profiler.begin("physics");
        profiler.end("physics");
        profiler.end("update");
        profiler.end_frame();
        profiler.begin_frame();

        let update = profiler.interval_view(0, SampleView::Averaged).unwrap();
        assert_eq!(update.name, "update");
        assert_eq!(update.level, 0);
        assert!(update.start_ms >= 0.0);
        assert!(update.end_ms >= update.start_ms);

        let physics = profiler.interval_view(1, SampleView::Raw).unwrap();
        assert_eq!(physics.level, 1);
        assert!(physics.start_ms >= update.start_ms);
        assert!(profiler.interval_view(2, SampleView::Raw).is_none());
    }

    #[test]
    fn scope_guard_ends_on_drop() {
        let mut profiler = profiler();
        profiler.begin_frame();
        {
            let _scope = profiler.scope("update");
        }
        assert_eq!(profiler.nesting_level(), 0);
        assert!(profiler.current().intervals()[0].is_finalized());
        profiler.end_frame();
    }

    #[test]
    fn offsets_fold_into_sample_windows() {
        // Two frame slots: every other frame folds into the same slot's
        // interval, so four frames leave two samples per window.
        let config = ProfilerConfig::default().with_frame_slots(2);
        let mut profiler = FlameProfiler::new(&config).unwrap();
        for _ in 0..4 {
            profiler.begin_frame();
            profiler.begin("update");
            profiler.end("update");
            profiler.end_frame();
        }
        let entry = profiler.completed();
        let interval = &entry.intervals()[0];
        assert_eq!(interval.start_samples.len(), 2);
        assert_eq!(interval.end_samples.len(), 2);
        assert!(
            interval.end_offset_ms(SampleView::Averaged)
                >= interval.start_offset_ms(SampleView::Averaged)
        );
    }

    #[test]
    fn destroy_stage_by_name() {
        let mut profiler = profiler();
        profiler.create_stage("update");
        profiler.create_stage("render");
        profiler.destroy_stage("update");
        assert_eq!(profiler.stage_count(), 1);
        assert_eq!(profiler.stage_id("update"), None);
        assert_eq!(profiler.stage_name(profiler.stage_id("render").unwrap()), Some("render"));
        for slot in &profiler.frames {
            assert_eq!(slot.intervals().len(), 1);
        }
    }
}

//! Frame-rate aggregation.

use std::time::Instant;

use ember_ring::{AveragingBuffer, SampleView};

/// Rolling frame-time tracker for HUD-style fps readouts.
#[derive(Debug, Clone)]
pub struct FrameRateTracker {
    frame_ms: AveragingBuffer<f32>,
    last_tick: Option<Instant>,
}

impl FrameRateTracker {
    /// Create a tracker averaging over `window` frames.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            frame_ms: AveragingBuffer::new(window),
            last_tick: None,
        }
    }

    /// Record a frame boundary; call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            let ms = now.saturating_duration_since(last).as_secs_f32() * 1_000.0;
            self.frame_ms.push(ms);
        }
        self.last_tick = Some(now);
    }

    /// Feed an externally measured frame time in milliseconds.
    pub fn push_frame_ms(&mut self, ms: f32) {
        self.frame_ms.push(ms);
    }

    /// Frame time over the window, milliseconds.
    #[must_use]
    pub fn frame_ms(&self, view: SampleView) -> f32 {
        self.frame_ms.head_value(view)
    }

    /// Frames per second derived from the frame time.
    #[must_use]
    pub fn fps(&self, view: SampleView) -> f32 {
        let ms = self.frame_ms(view);
        if ms > 0.0 {
            1_000.0 / ms
        } else {
            0.0
        }
    }

    /// Down-sampled frame-time points for a plot widget.
    #[must_use]
    pub fn plot_points(&self, threshold: usize, view: SampleView) -> Vec<(f64, f64)> {
        self.frame_ms.downsample(threshold, view)
    }
}

//! Synthetic frame driver.
//!
//! Pumps a few hundred frames of fake work through the profiler and
//! console so the read surfaces can be eyeballed without an engine
//! attached. Useful as a smoke run: `cargo run -p ember-benchmark`.

use std::time::Duration;

use ember_console::{Severity, SharedConsole};
use ember_profiler::{FlameProfiler, FrameRateTracker, ProfilerConfig, SampleView};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAMES: u32 = 240;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProfilerConfig::default().with_frame_slots(4);
    let mut profiler = FlameProfiler::new(&config)?;
    let mut tracker = FrameRateTracker::new(120);
    let console = SharedConsole::new(256)?;

    info!(frames = FRAMES, "driving synthetic frames");
    for frame in 0..FRAMES {
        profiler.begin_frame();
        tracker.tick();

        profiler.begin("update");
        profiler.begin("physics");
        std::thread::sleep(Duration::from_micros(200));
        profiler.end("physics");
        profiler.begin("scripts");
        std::thread::sleep(Duration::from_micros(100));
        profiler.end("scripts");
        profiler.end("update");

        profiler.begin("render");
        std::thread::sleep(Duration::from_micros(300));
        profiler.end("render");

        if frame % 60 == 0 {
            console.push(Severity::Info, format!("frame {frame} checkpoint"));
        }
        profiler.end_frame();
    }

    profiler.begin_frame();
    let mut index = 0;
    while let Some(view) = profiler.interval_view(index, SampleView::Averaged) {
        info!(
            stage = view.name,
            level = view.level,
            start_ms = view.start_ms,
            end_ms = view.end_ms,
            "stage timing"
        );
        index += 1;
    }
    info!(
        fps = tracker.fps(SampleView::Averaged),
        console_lines = console.total_lines(),
        "run complete"
    );
    Ok(())
}

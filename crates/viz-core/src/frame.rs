//! Frame scheduling independent of any display-refresh primitive.
//!
//! The host calls [`FrameLoop::tick`] once per display refresh with the time
//! since the previous refresh; tests call it directly.

use crate::render::{DualRenderer, Renderer};
use crate::spectrum::{FrequencySource, SpectralAnalyzer, SpectrumFrame};
use crate::view::ViewMode;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTick {
    /// Seconds since the first frame.
    pub elapsed: f32,
    pub delta: f32,
    pub index: u64,
}

#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
    elapsed: Duration,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock. The first tick reports zero elapsed time.
    pub fn tick(&mut self, delta: Duration) -> FrameTick {
        let delta = if self.frames == 0 { Duration::ZERO } else { delta };
        self.elapsed += delta;
        let tick = FrameTick {
            elapsed: self.elapsed.as_secs_f32(),
            delta: delta.as_secs_f32(),
            index: self.frames,
        };
        self.frames += 1;
        tick
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Scheduler plus analyzer: one spectrum sample per tick, handed to whichever
/// renderer the view mode selects.
#[derive(Default)]
pub struct FrameLoop {
    scheduler: FrameScheduler,
    analyzer: SpectralAnalyzer,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick<F, S, B>(
        &mut self,
        delta: Duration,
        source: &F,
        mode: ViewMode,
        renderer: &mut DualRenderer<S, B>,
    ) -> FrameTick
    where
        F: FrequencySource + ?Sized,
        S: Renderer,
        B: Renderer,
    {
        let tick = self.scheduler.tick(delta);
        let frame = self.analyzer.sample(source);
        renderer.draw(mode, frame, tick);
        tick
    }

    pub fn frame(&self) -> &SpectrumFrame {
        self.analyzer.frame()
    }

    pub fn frames(&self) -> u64 {
        self.scheduler.frames()
    }
}

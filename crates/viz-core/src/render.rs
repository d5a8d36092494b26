//! Output-mode dispatch shared by the shader and bar-chart renderers.

use crate::error::VizError;
use crate::frame::FrameTick;
use crate::spectrum::SpectrumFrame;
use crate::view::ViewMode;

/// One output surface fed from the per-frame spectrum.
///
/// The frame reference is only valid for the duration of the call; its
/// contents are overwritten on the next tick.
pub trait Renderer {
    fn draw(&mut self, frame: &SpectrumFrame, tick: FrameTick);
}

/// Shader renderer (optional; lost permanently after an init failure) plus
/// the bar-chart renderer. The active [`ViewMode`] picks which one draws.
pub struct DualRenderer<S, B> {
    shader: Option<S>,
    bars: B,
    shader_error: Option<VizError>,
}

impl<S: Renderer, B: Renderer> DualRenderer<S, B> {
    pub fn new(shader: Result<S, VizError>, bars: B) -> Self {
        match shader {
            Ok(shader) => Self {
                shader: Some(shader),
                bars,
                shader_error: None,
            },
            Err(e) => {
                log::error!("[render] shader output unavailable: {}", e);
                Self {
                    shader: None,
                    bars,
                    shader_error: Some(e),
                }
            }
        }
    }

    pub fn shader_available(&self) -> bool {
        self.shader.is_some()
    }

    pub fn shader_error(&self) -> Option<&VizError> {
        self.shader_error.as_ref()
    }

    pub fn shader_mut(&mut self) -> Option<&mut S> {
        self.shader.as_mut()
    }

    pub fn bars_mut(&mut self) -> &mut B {
        &mut self.bars
    }

    /// Draws `frame` with the renderer selected by `mode`. Player mode has no
    /// canvas output.
    pub fn draw(&mut self, mode: ViewMode, frame: &SpectrumFrame, tick: FrameTick) {
        match mode {
            ViewMode::Shader => {
                if let Some(shader) = &mut self.shader {
                    shader.draw(frame, tick);
                }
            }
            ViewMode::Fft => self.bars.draw(frame, tick),
            ViewMode::Player => {}
        }
    }

    /// Drops the GPU program. The bar renderer stays usable.
    pub fn release_shader(&mut self) {
        self.shader = None;
    }
}

/// Backing-store size for a surface: `max(1, floor(client * dpr))` per axis.
#[inline]
pub fn backing_size(client_width: f64, client_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let scale = |v: f64| (v.max(0.0) * dpr).floor().max(1.0) as u32;
    (scale(client_width), scale(client_height))
}

/// Last applied backing size of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    /// Records `(width, height)` and reports whether it differs from the
    /// previous size, i.e. whether the surface needs reallocating.
    pub fn update(&mut self, (width, height): (u32, u32)) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }
}

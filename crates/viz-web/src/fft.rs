use crate::dom;
use viz_core::{
    bar_layout, BarRect, FrameTick, Renderer, SpectrumFrame, BASELINE_HEIGHT_PX,
    BASELINE_OFFSET_PX, FFT_BACKGROUND, FFT_BASELINE, FFT_GRADIENT_STOPS,
    FFT_GRADIENT_TOP_OF_HEIGHT,
};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Bar chart on a 2D canvas. Draws in CSS pixels; the context transform maps
/// them onto the device-pixel backing store.
pub struct BarRenderer {
    canvas: web::HtmlCanvasElement,
    ctx: Option<web::CanvasRenderingContext2d>,
}

impl BarRenderer {
    pub fn new(canvas: web::HtmlCanvasElement) -> Self {
        Self { canvas, ctx: None }
    }

    // Acquired lazily so a missing 2D context only costs the bar view.
    fn context(&mut self) -> Option<web::CanvasRenderingContext2d> {
        if self.ctx.is_none() {
            self.ctx = self
                .canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into::<web::CanvasRenderingContext2d>().ok());
            if self.ctx.is_none() {
                log::warn!("[fft] 2d context unavailable");
            }
        }
        self.ctx.clone()
    }
}

impl Renderer for BarRenderer {
    fn draw(&mut self, frame: &SpectrumFrame, _tick: FrameTick) {
        let Some(ctx) = self.context() else {
            return;
        };
        dom::sync_canvas_backing_size(&self.canvas);
        let dpr = dom::device_pixel_ratio();
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let cw = self.canvas.client_width() as f64;
        let ch = self.canvas.client_height() as f64;

        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        ctx.set_fill_style_str(FFT_BACKGROUND);
        ctx.fill_rect(0.0, 0.0, cw, ch);

        let gradient = ctx.create_linear_gradient(0.0, ch, 0.0, ch * FFT_GRADIENT_TOP_OF_HEIGHT);
        for (offset, color) in FFT_GRADIENT_STOPS {
            let _ = gradient.add_color_stop(offset, color);
        }
        ctx.set_fill_style_canvas_gradient(&gradient);
        for bar in bar_layout(&frame.bins, cw, ch) {
            rounded_rect(&ctx, &bar);
            ctx.fill();
        }

        ctx.set_fill_style_str(FFT_BASELINE);
        ctx.fill_rect(0.0, ch - BASELINE_OFFSET_PX, cw, BASELINE_HEIGHT_PX);
    }
}

fn rounded_rect(ctx: &web::CanvasRenderingContext2d, bar: &BarRect) {
    let (x, y) = (bar.origin.x, bar.origin.y);
    let (w, h) = (bar.size.x, bar.size.y);
    let r = bar.radius.min(w * 0.5).min(h * 0.5).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.quadratic_curve_to(x + w, y, x + w, y + r);
    ctx.line_to(x + w, y + h - r);
    ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
    ctx.line_to(x + r, y + h);
    ctx.quadratic_curve_to(x, y + h, x, y + h - r);
    ctx.line_to(x, y + r);
    ctx.quadratic_curve_to(x, y, x + r, y);
}

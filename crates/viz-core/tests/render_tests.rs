use std::time::Duration;
use viz_core::*;

#[derive(Default)]
struct Recorder {
    draws: Vec<(u64, [f32; BIN_COUNT])>,
}

impl Renderer for Recorder {
    fn draw(&mut self, frame: &SpectrumFrame, tick: FrameTick) {
        self.draws.push((tick.index, frame.bins));
    }
}

struct Constant(u8);

impl FrequencySource for Constant {
    fn read_frequencies(&self, out: &mut Vec<u8>) -> bool {
        out.clear();
        out.resize(1024, self.0);
        true
    }
}

#[test]
fn backing_size_floors_and_never_hits_zero() {
    assert_eq!(backing_size(300.0, 150.0, 2.0), (600, 300));
    assert_eq!(backing_size(100.7, 50.3, 1.5), (151, 75));
    assert_eq!(backing_size(0.0, 0.0, 2.0), (1, 1));
    assert_eq!(backing_size(200.0, 100.0, 0.0), (200, 100));
    assert_eq!(backing_size(200.0, 100.0, f64::NAN), (200, 100));
}

#[test]
fn surface_size_reports_only_changes() {
    let mut size = SurfaceSize::default();
    assert!(size.update((640, 480)));
    assert!(!size.update((640, 480)));
    assert!(size.update((1280, 960)));
    assert_eq!(size, SurfaceSize { width: 1280, height: 960 });
}

#[test]
fn view_mode_selects_the_drawing_renderer() {
    let mut dual = DualRenderer::new(Ok(Recorder::default()), Recorder::default());
    let frame = SpectrumFrame::default();
    dual.draw(ViewMode::Shader, &frame, FrameTick::default());
    dual.draw(ViewMode::Fft, &frame, FrameTick::default());
    dual.draw(ViewMode::Fft, &frame, FrameTick::default());
    dual.draw(ViewMode::Player, &frame, FrameTick::default());
    assert_eq!(dual.shader_mut().map(|s| s.draws.len()), Some(1));
    assert_eq!(dual.bars_mut().draws.len(), 2);
}

#[test]
fn shader_init_failure_only_disables_shader_mode() {
    let failed: Result<Recorder, VizError> =
        Err(VizError::RenderInitFailure("link failed".into()));
    let mut dual = DualRenderer::new(failed, Recorder::default());
    assert!(!dual.shader_available());
    assert!(matches!(
        dual.shader_error(),
        Some(VizError::RenderInitFailure(_))
    ));

    let frame = SpectrumFrame::default();
    dual.draw(ViewMode::Shader, &frame, FrameTick::default());
    dual.draw(ViewMode::Fft, &frame, FrameTick::default());
    assert_eq!(dual.bars_mut().draws.len(), 1);
}

#[test]
fn frame_loop_samples_once_and_tracks_elapsed_time() {
    let mut frames = FrameLoop::new();
    let mut dual = DualRenderer::new(Ok(Recorder::default()), Recorder::default());
    let source = Constant(255);

    let first = frames.tick(Duration::from_millis(500), &source, ViewMode::Shader, &mut dual);
    assert_eq!(first.elapsed, 0.0);
    assert_eq!(first.index, 0);
    let second = frames.tick(Duration::from_millis(16), &source, ViewMode::Fft, &mut dual);
    let third = frames.tick(Duration::from_millis(16), &source, ViewMode::Fft, &mut dual);
    assert!((second.elapsed - 0.016).abs() < 1e-6);
    assert!((third.elapsed - 0.032).abs() < 1e-6);
    assert_eq!(frames.frames(), 3);

    // Both outputs see the same band data for their frames.
    let shader_bins = dual.shader_mut().map(|s| s.draws[0].1);
    assert_eq!(shader_bins, Some([1.0; BIN_COUNT]));
    assert_eq!(dual.bars_mut().draws[0].1, [1.0; BIN_COUNT]);
    assert_eq!(frames.frame().bass, 1.0);
}

#[test]
fn bars_have_a_visible_floor_and_scale_with_value() {
    let mut bins = [0.0f32; BIN_COUNT];
    bins[1] = 1.0;
    bins[2] = 0.5;
    let bars: Vec<_> = bar_layout(&bins, 640.0, 300.0).collect();
    assert_eq!(bars.len(), BIN_COUNT);

    let slot = 640.0 / BIN_COUNT as f64;
    assert_eq!(bars[0].size.y, BAR_MIN_HEIGHT_PX);
    assert!((bars[1].size.y - 240.0).abs() < 1e-9);
    assert!((bars[2].size.y - 120.0).abs() < 1e-9);
    for (i, bar) in bars.iter().enumerate() {
        assert!((bar.origin.x - (i as f64 * slot + slot * BAR_INSET)).abs() < 1e-9);
        assert!((bar.size.x - slot * BAR_WIDTH).abs() < 1e-9);
        // bottom edge sits on the baseline guide
        assert!((bar.origin.y + bar.size.y - (300.0 - BASELINE_OFFSET_PX)).abs() < 1e-9);
        assert!((bar.radius - 3.5).abs() < 1e-9);
    }
}

#[test]
fn bar_height_keeps_floor_on_tiny_surfaces() {
    assert_eq!(bar_height(1.0, 0.0), BAR_MIN_HEIGHT_PX);
    assert_eq!(bar_height(2.0, 100.0), 100.0);
    let bins = [1.0; BIN_COUNT];
    let mut bars = bar_layout(&bins, 6400.0, 40.0);
    assert!(bars.all(|b| b.size.y == BAR_MIN_HEIGHT_PX && b.radius == BAR_MAX_RADIUS_PX));
}

#[test]
fn bar_layout_streams_one_rect_per_bin() {
    let bins = [0.25; BIN_COUNT];
    let layout = bar_layout(&bins, 320.0, 200.0);
    assert_eq!(layout.size_hint(), (BIN_COUNT, Some(BIN_COUNT)));
    let mut last_x = f64::NEG_INFINITY;
    let mut count = 0;
    for bar in layout {
        assert!(bar.origin.x > last_x);
        last_x = bar.origin.x;
        count += 1;
    }
    assert_eq!(count, BIN_COUNT);
}

#[test]
fn shader_uniforms_pack_bins_in_vec4_rows() {
    assert_eq!(std::mem::size_of::<ShaderUniforms>(), 288);
    let mut frame = SpectrumFrame::default();
    for (i, v) in frame.bins.iter_mut().enumerate() {
        *v = i as f32 / 64.0;
    }
    frame.bass = 0.1;
    frame.mids = 0.2;
    frame.highs = 0.3;
    let u = ShaderUniforms::new([800.0, 600.0], 1.5, &frame);
    for i in 0..BIN_COUNT {
        assert_eq!(u.bin(i), frame.bins[i]);
    }
    assert_eq!(u.bins[2], [8.0 / 64.0, 9.0 / 64.0, 10.0 / 64.0, 11.0 / 64.0]);
    let bytes = bytemuck::bytes_of(&u);
    assert_eq!(bytes.len(), 288);
    assert_eq!(&bytes[0..4], &800.0f32.to_ne_bytes());
}

use crate::dom::{set_class, set_disabled, set_text};
use viz_core::{
    format_time, PlaybackState, SourceKind, ViewMode, ViewState, SEEK_STEP_SEC, TRACK_NONE,
};
use wasm_bindgen::JsCast;
use web_sys as web;

// Element ids the page must provide
pub const BTN_MIC: &str = "btn-mic";
pub const FILE_INPUT: &str = "file-input";
pub const BTN_STOP: &str = "btn-stop";
pub const STATUS_DOT: &str = "status-dot";
pub const STATUS_TEXT: &str = "status-text";
pub const ERROR_TEXT: &str = "error-text";
pub const VIEW_SHADER: &str = "view-shader";
pub const VIEW_FFT: &str = "view-fft";
pub const VIEW_PLAYER: &str = "view-player";
pub const SHADER_CANVAS: &str = "shader-canvas";
pub const FFT_CANVAS: &str = "fft-canvas";
pub const PLAYER_BOX: &str = "player-box";
pub const TRACK_NAME: &str = "track-name";
pub const BTN_PLAY: &str = "btn-play";
pub const SEEK_RANGE: &str = "seek-range";
pub const TIME_POSITION: &str = "time-position";
pub const TIME_DURATION: &str = "time-duration";
pub const SOURCE_LABEL: &str = "source-label";

/// Mirrors view and playback state into the page, touching the DOM only
/// when a revision moved.
#[derive(Default)]
pub struct UiSync {
    view_revision: Option<u64>,
    playback_revision: Option<u64>,
}

impl UiSync {
    pub fn sync(&mut self, document: &web::Document, view: &ViewState, playback: &PlaybackState) {
        if self.view_revision != Some(view.revision()) {
            self.view_revision = Some(view.revision());
            sync_view(document, view);
            // transport controls depend on the source kind
            self.playback_revision = None;
        }
        if self.playback_revision != Some(playback.revision()) {
            self.playback_revision = Some(playback.revision());
            sync_playback(document, view.source(), playback);
        }
    }
}

fn sync_view(document: &web::Document, view: &ViewState) {
    let source = view.source();
    let mode = view.mode();
    set_class(document, STATUS_DOT, "on", source != SourceKind::None);
    set_class(document, STATUS_DOT, "off", source == SourceKind::None);
    set_text(document, STATUS_TEXT, view.status());
    set_text(document, ERROR_TEXT, view.error().unwrap_or(""));
    set_class(document, ERROR_TEXT, "hidden", view.error().is_none());
    set_text(document, SOURCE_LABEL, source.label());
    set_disabled(document, BTN_STOP, source == SourceKind::None);

    for (id, m) in [
        (VIEW_SHADER, ViewMode::Shader),
        (VIEW_FFT, ViewMode::Fft),
        (VIEW_PLAYER, ViewMode::Player),
    ] {
        set_class(document, id, "active", mode == m);
    }
    set_disabled(document, VIEW_PLAYER, !view.player_available());

    for (id, m) in [
        (SHADER_CANVAS, ViewMode::Shader),
        (FFT_CANVAS, ViewMode::Fft),
        (PLAYER_BOX, ViewMode::Player),
    ] {
        set_class(document, id, "visible", mode == m);
        set_class(document, id, "hidden", mode != m);
    }
    set_text(document, TRACK_NAME, view.track_name().unwrap_or(TRACK_NONE));
}

fn sync_playback(document: &web::Document, source: SourceKind, playback: &PlaybackState) {
    let has_file = source == SourceKind::File;
    let duration = playback.duration();
    set_text(
        document,
        BTN_PLAY,
        if playback.is_playing() { "Pause" } else { "Play" },
    );
    set_disabled(document, BTN_PLAY, !has_file);

    if let Some(range) = document
        .get_element_by_id(SEEK_RANGE)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    {
        range.set_min("0");
        range.set_step(&SEEK_STEP_SEC.to_string());
        range.set_max(&duration.to_string());
        range.set_value(&playback.position().min(duration).to_string());
        range.set_disabled(!has_file || duration == 0.0);
    }
    set_text(document, TIME_POSITION, &format_time(playback.position()));
    set_text(document, TIME_DURATION, &format_time(duration));
}

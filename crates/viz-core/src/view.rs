//! Discrete UI state read by the renderers and the page controls.

/// Kind of the active source session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceKind {
    #[default]
    None,
    Microphone,
    File,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::None => "Waiting",
            SourceKind::Microphone => "Live microphone",
            SourceKind::File => "File playback",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Shader,
    Fft,
    Player,
}

pub const STATUS_IDLE: &str = "Choose an audio source";
pub const STATUS_MIC_CONNECTING: &str = "Connecting microphone...";
pub const STATUS_MIC_LIVE: &str = "Microphone live (output muted to avoid feedback)";
pub const STATUS_MIC_FAILED: &str = "Microphone unavailable";
pub const STATUS_FILE_LOADING: &str = "Loading file...";
pub const STATUS_FILE_FAILED: &str = "Playback stopped";
pub const STATUS_STOPPED: &str = "Capture paused";
pub const TRACK_NONE: &str = "No file loaded";

/// Source kind, view mode, status/error text and track metadata.
///
/// Every mutation bumps `revision` so the page only re-syncs the DOM when
/// something changed.
#[derive(Clone, Debug)]
pub struct ViewState {
    source: SourceKind,
    mode: ViewMode,
    status: String,
    error: Option<String>,
    track_name: Option<String>,
    revision: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            source: SourceKind::None,
            mode: ViewMode::Shader,
            status: STATUS_IDLE.to_string(),
            error: None,
            track_name: None,
            revision: 0,
        }
    }
}

impl ViewState {
    pub fn source(&self) -> SourceKind {
        self.source
    }
    pub fn mode(&self) -> ViewMode {
        self.mode
    }
    pub fn status(&self) -> &str {
        &self.status
    }
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    pub fn track_name(&self) -> Option<&str> {
        self.track_name.as_deref()
    }
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn player_available(&self) -> bool {
        self.source == SourceKind::File
    }

    /// Switches the active view. Player mode is refused unless a file is the
    /// active source.
    pub fn select_mode(&mut self, mode: ViewMode) -> bool {
        if mode == ViewMode::Player && !self.player_available() {
            return false;
        }
        if self.mode != mode {
            self.mode = mode;
            self.touch();
        }
        true
    }

    pub fn set_source(&mut self, source: SourceKind) {
        self.source = source;
        if self.mode == ViewMode::Player && !self.player_available() {
            self.mode = ViewMode::Shader;
        }
        self.touch();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.touch();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.touch();
    }

    pub fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.touch();
        }
    }

    pub fn set_track_name(&mut self, name: Option<String>) {
        self.track_name = name;
        self.touch();
    }

    #[inline]
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// `m:ss`, or `0:00` for negative and non-finite input.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

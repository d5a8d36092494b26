use thiserror::Error;

/// Failures surfaced to the user. All of them are recovered where they occur:
/// the caller logs them, resets the affected state and shows `user_message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VizError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("playback unavailable: {0}")]
    PlaybackUnavailable(String),
    #[error("playback blocked: {0}")]
    PlaybackBlocked(String),
    #[error("render initialization failed: {0}")]
    RenderInitFailure(String),
}

impl VizError {
    /// Short text for the page's error line.
    pub fn user_message(&self) -> &'static str {
        match self {
            VizError::DeviceUnavailable(_) => {
                "Cannot access the microphone. Check permissions or device settings."
            }
            VizError::PlaybackUnavailable(_) => "Cannot play this audio file.",
            VizError::PlaybackBlocked(_) => "Playback refused (autoplay blocked?)",
            VizError::RenderInitFailure(_) => "The shader view could not be initialized.",
        }
    }
}

/// Platform-level failure reported by an [`AudioBackend`](crate::AudioBackend).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("not supported by this platform")]
    Unsupported,
    #[error("permission denied: {0}")]
    Denied(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("rejected by platform: {0}")]
    Rejected(String),
    #[error("audio graph error: {0}")]
    Graph(String),
}

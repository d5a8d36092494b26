//! Transport state for file sessions.
//!
//! [`PlaybackState::apply`] is the only place the playback fields change.
//! Media listeners, `toggle_play` and `seek` all go through it, stamped with
//! the generation of the load that owns the media so that late events from a
//! released element are dropped.

use crate::backend::AudioBackend;
use crate::error::VizError;
use crate::source::AudioSourceManager;

/// Lifecycle notification from a media handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaEvent {
    TimeUpdate { position: f64 },
    MetadataLoaded { duration: f64 },
    Play,
    Pause,
    Ended,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    is_playing: bool,
    duration: f64,
    position: f64,
    media: Option<u64>,
    revision: u64,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
    pub fn duration(&self) -> f64 {
        self.duration
    }
    pub fn position(&self) -> f64 {
        self.position
    }
    /// Generation of the media currently allowed to report events.
    pub fn media(&self) -> Option<u64> {
        self.media
    }
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clears transport fields and binds the state to `media`.
    pub fn reset(&mut self, media: Option<u64>) {
        self.is_playing = false;
        self.duration = 0.0;
        self.position = 0.0;
        self.media = media;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Applies one lifecycle event. Returns `false` when the event belongs to
    /// a media handle other than the current one.
    pub fn apply(&mut self, media: u64, event: MediaEvent) -> bool {
        if self.media != Some(media) {
            log::debug!("[playback] dropping {:?} from stale media {}", event, media);
            return false;
        }
        match event {
            MediaEvent::TimeUpdate { position } => {
                self.position = if position.is_finite() { position.max(0.0) } else { 0.0 };
            }
            MediaEvent::MetadataLoaded { duration } => {
                self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
            }
            MediaEvent::Play => self.is_playing = true,
            MediaEvent::Pause | MediaEvent::Ended => self.is_playing = false,
        }
        self.revision = self.revision.wrapping_add(1);
        true
    }
}

/// Clamps a seek target into `[0, duration]`. While the duration is unknown
/// (or zero) the requested value is only floored at 0.
pub fn clamp_seek(target: f64, duration: Option<f64>) -> f64 {
    let upper = duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(target);
    target.min(upper).max(0.0)
}

impl<B: AudioBackend> AudioSourceManager<B> {
    /// Resumes or pauses the active file session. A rejected resume leaves the
    /// state untouched and is reported as [`VizError::PlaybackBlocked`].
    pub async fn toggle_play(&self) -> Result<(), VizError> {
        let Some((media, generation)) = self.active_media() else {
            return Ok(());
        };
        if !self.backend().is_paused(&media) {
            self.backend().pause(&media);
            return Ok(());
        }
        match self.backend().play(&media).await {
            Ok(()) => {
                self.playback().borrow_mut().apply(generation, MediaEvent::Play);
                Ok(())
            }
            Err(e) => {
                let err = VizError::PlaybackBlocked(e.to_string());
                log::error!("[playback] resume rejected: {}", err);
                self.view().borrow_mut().set_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Moves the active file to `target` seconds, clamped into the known
    /// duration. Returns the applied position, or `None` without a file.
    pub fn seek(&self, target: f64) -> Option<f64> {
        let (media, generation) = self.active_media()?;
        let position = clamp_seek(target, self.backend().duration(&media));
        self.backend().set_position(&media, position);
        self.playback()
            .borrow_mut()
            .apply(generation, MediaEvent::TimeUpdate { position });
        Some(position)
    }
}

//! Seam between the source manager and the host audio platform.
//!
//! The web front-end implements this on top of WebAudio; tests use an
//! in-memory fake. Async methods must not hold interior borrows across an
//! await, since the frame loop keeps reading the analysis node while an
//! acquisition is pending.

use crate::constants::{AUDIBLE_GAIN, SILENT_GAIN};
use crate::error::BackendError;
use crate::playback::MediaEvent;
use crate::spectrum::FrequencySource;
use std::rc::Rc;

/// Callback a media handle uses to deliver its lifecycle events.
pub type MediaEventSink = Rc<dyn Fn(MediaEvent)>;

/// Whether a source reaches the output sink in addition to the analyser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routing {
    Silent,
    Audible,
}

impl Routing {
    #[inline]
    pub fn gain(self) -> f32 {
        match self {
            Routing::Silent => SILENT_GAIN,
            Routing::Audible => AUDIBLE_GAIN,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait AudioBackend: FrequencySource {
    /// Live input stream.
    type Capture;
    /// Decodable media plus whatever temporary references it needs.
    type Media: Clone;
    /// User-supplied file.
    type File;
    /// Source node feeding the analyser.
    type Node;

    /// Creates the context, analysis node and output gain on first use and
    /// resumes the context if it is suspended. Safe to call repeatedly.
    async fn ensure_graph(&self) -> Result<(), BackendError>;
    fn supports_capture(&self) -> bool;
    async fn request_capture(&self) -> Result<Self::Capture, BackendError>;
    fn capture_node(&self, capture: &Self::Capture) -> Result<Self::Node, BackendError>;
    /// Stops every hardware track of the capture. Tolerates repeated calls.
    fn stop_capture(&self, capture: &Self::Capture);

    fn file_name(&self, file: &Self::File) -> String;
    /// Creates a playable handle for `file` and attaches its lifecycle
    /// listeners, which report through `sink`.
    fn open_media(&self, file: &Self::File, sink: MediaEventSink)
        -> Result<Self::Media, BackendError>;
    fn media_node(&self, media: &Self::Media) -> Result<Self::Node, BackendError>;
    async fn play(&self, media: &Self::Media) -> Result<(), BackendError>;
    fn pause(&self, media: &Self::Media);
    fn is_paused(&self, media: &Self::Media) -> bool;
    fn set_position(&self, media: &Self::Media, seconds: f64);
    /// Known duration in seconds, `None` until metadata has loaded.
    fn duration(&self, media: &Self::Media) -> Option<f64>;
    /// Detaches listeners, stops playback and releases temporary references.
    /// Tolerates repeated calls.
    fn release_media(&self, media: &Self::Media);

    /// Wires `node -> analyser -> output gain` and sets the output gain.
    fn connect_source(&self, node: &Self::Node, routing: Routing) -> Result<(), BackendError>;
    /// Disconnects the source node and the analyser outputs. Errors from
    /// already-disconnected nodes are ignored.
    fn disconnect_source(&self, node: &Self::Node);
    fn output_gain(&self) -> Option<f32>;
    /// Closes the audio context and drops the permanent nodes.
    fn close(&self);
}

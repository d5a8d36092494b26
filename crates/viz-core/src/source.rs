//! Audio source acquisition, switching and teardown.
//!
//! At most one source node is wired into the analyser. Every transition into
//! a new session disconnects the previous node and releases its handles
//! before the new node is connected.
//!
//! Overlapping acquisitions resolve as last-writer-wins: each acquisition and
//! each `stop` bumps a generation counter, and an acquisition that resumes
//! after an await with a stale generation releases whatever it obtained and
//! reports [`Acquisition::Superseded`].

use crate::backend::{AudioBackend, MediaEventSink, Routing};
use crate::error::{BackendError, VizError};
use crate::playback::{MediaEvent, PlaybackState};
use crate::spectrum::FrequencySource;
use crate::view::{
    SourceKind, ViewState, STATUS_FILE_FAILED, STATUS_FILE_LOADING, STATUS_MIC_CONNECTING,
    STATUS_MIC_FAILED, STATUS_MIC_LIVE, STATUS_STOPPED,
};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

/// The active capture and the handles it holds.
pub enum SourceSession<B: AudioBackend> {
    None,
    Microphone {
        capture: B::Capture,
        node: B::Node,
    },
    File {
        media: B::Media,
        node: B::Node,
        generation: u64,
    },
}

impl<B: AudioBackend> SourceSession<B> {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceSession::None => SourceKind::None,
            SourceSession::Microphone { .. } => SourceKind::Microphone,
            SourceSession::File { .. } => SourceKind::File,
        }
    }

    pub fn routing(&self) -> Option<Routing> {
        match self {
            SourceSession::None => None,
            SourceSession::Microphone { .. } => Some(Routing::Silent),
            SourceSession::File { .. } => Some(Routing::Audible),
        }
    }
}

/// Outcome of an acquisition that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acquisition {
    Active,
    /// A later acquisition, `stop` or teardown took over while this one was
    /// pending; nothing it acquired was kept.
    Superseded,
}

pub struct AudioSourceManager<B: AudioBackend> {
    backend: B,
    session: RefCell<SourceSession<B>>,
    generation: Cell<u64>,
    in_flight: Cell<Option<u64>>,
    closed: Cell<bool>,
    playback: Rc<RefCell<PlaybackState>>,
    view: Rc<RefCell<ViewState>>,
}

impl<B: AudioBackend> AudioSourceManager<B> {
    pub fn new(backend: B, view: Rc<RefCell<ViewState>>) -> Self {
        Self {
            backend,
            session: RefCell::new(SourceSession::None),
            generation: Cell::new(0),
            in_flight: Cell::new(None),
            closed: Cell::new(false),
            playback: Rc::new(RefCell::new(PlaybackState::default())),
            view,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
    pub fn view(&self) -> &Rc<RefCell<ViewState>> {
        &self.view
    }
    pub fn playback(&self) -> &Rc<RefCell<PlaybackState>> {
        &self.playback
    }
    pub fn session(&self) -> Ref<'_, SourceSession<B>> {
        self.session.borrow()
    }
    pub fn kind(&self) -> SourceKind {
        self.session.borrow().kind()
    }
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Idempotently builds the audio graph and resumes a suspended context.
    pub async fn ensure_graph(&self) -> Result<(), BackendError> {
        self.backend.ensure_graph().await
    }

    /// Opens the default capture device and routes it silently through the
    /// analyser.
    pub async fn start_microphone(&self) -> Result<Acquisition, VizError> {
        let generation = self.begin(STATUS_MIC_CONNECTING);
        let result = self.acquire_microphone(generation).await;
        self.finish(generation, result, STATUS_MIC_FAILED, |view| {
            view.set_source(SourceKind::Microphone);
            view.set_status(STATUS_MIC_LIVE);
        })
    }

    async fn acquire_microphone(&self, generation: u64) -> Result<Acquisition, VizError> {
        let unavailable = |e: BackendError| VizError::DeviceUnavailable(e.to_string());
        self.backend.ensure_graph().await.map_err(unavailable)?;
        if !self.backend.supports_capture() {
            return Err(unavailable(BackendError::Unsupported));
        }
        if self.is_stale(generation) {
            return Ok(Acquisition::Superseded);
        }
        let capture = self.backend.request_capture().await.map_err(unavailable)?;
        if self.is_stale(generation) {
            log::info!("[source] microphone acquisition superseded; releasing capture");
            self.backend.stop_capture(&capture);
            return Ok(Acquisition::Superseded);
        }
        let node = match self.backend.capture_node(&capture) {
            Ok(node) => node,
            Err(e) => {
                self.backend.stop_capture(&capture);
                return Err(unavailable(e));
            }
        };
        self.teardown_session();
        if let Err(e) = self.backend.connect_source(&node, Routing::Silent) {
            self.backend.disconnect_source(&node);
            self.backend.stop_capture(&capture);
            return Err(unavailable(e));
        }
        *self.session.borrow_mut() = SourceSession::Microphone { capture, node };
        log::info!("[source] microphone connected (silent)");
        Ok(Acquisition::Active)
    }

    /// Replaces the current session with audible playback of `file`.
    pub async fn load_file(&self, file: &B::File) -> Result<Acquisition, VizError> {
        let generation = self.begin(STATUS_FILE_LOADING);
        let name = self.backend.file_name(file);
        let result = self.acquire_file(generation, file, &name).await;
        self.finish(generation, result, STATUS_FILE_FAILED, |view| {
            view.set_source(SourceKind::File);
            view.set_status(format!("Playing: {}", name));
        })
    }

    async fn acquire_file(
        &self,
        generation: u64,
        file: &B::File,
        name: &str,
    ) -> Result<Acquisition, VizError> {
        let unavailable = |e: BackendError| VizError::PlaybackUnavailable(e.to_string());
        self.backend.ensure_graph().await.map_err(unavailable)?;
        if self.is_stale(generation) {
            return Ok(Acquisition::Superseded);
        }
        self.teardown_session();
        self.playback.borrow_mut().reset(Some(generation));
        self.view.borrow_mut().set_track_name(Some(name.to_string()));

        let media = self
            .backend
            .open_media(file, self.media_sink(generation))
            .map_err(unavailable)?;
        let node = match self.backend.media_node(&media) {
            Ok(node) => node,
            Err(e) => {
                self.backend.release_media(&media);
                return Err(unavailable(e));
            }
        };
        if let Err(e) = self.backend.connect_source(&node, Routing::Audible) {
            self.backend.disconnect_source(&node);
            self.backend.release_media(&media);
            return Err(unavailable(e));
        }
        // Installed before awaiting playback so a concurrent stop can release it.
        *self.session.borrow_mut() = SourceSession::File {
            media: media.clone(),
            node,
            generation,
        };
        let played = self.backend.play(&media).await;
        if self.is_stale(generation) {
            return Ok(Acquisition::Superseded);
        }
        played.map_err(unavailable)?;
        if !self.backend.is_paused(&media) {
            self.playback
                .borrow_mut()
                .apply(generation, MediaEvent::Play);
        }
        log::info!("[source] file connected (audible): {}", name);
        Ok(Acquisition::Active)
    }

    /// Tears down the current session and returns to `none`. Cancels any
    /// in-flight acquisition. A no-op when nothing is active.
    pub fn stop(&self) {
        self.bump_generation();
        let pending = self.in_flight.take().is_some();
        if !pending && self.kind() == SourceKind::None {
            return;
        }
        self.teardown_session();
        let mut view = self.view.borrow_mut();
        view.set_source(SourceKind::None);
        view.set_status(STATUS_STOPPED);
    }

    /// Final teardown for page unmount: stops the session and closes the graph.
    pub fn shutdown(&self) {
        if self.closed.replace(true) {
            return;
        }
        self.stop();
        self.backend.close();
        log::info!("[source] audio graph closed");
    }

    /// Media handle and load generation of the active file session.
    pub(crate) fn active_media(&self) -> Option<(B::Media, u64)> {
        match &*self.session.borrow() {
            SourceSession::File {
                media, generation, ..
            } => Some((media.clone(), *generation)),
            _ => None,
        }
    }

    fn begin(&self, status: &str) -> u64 {
        let generation = self.bump_generation();
        self.in_flight.set(Some(generation));
        let mut view = self.view.borrow_mut();
        view.clear_error();
        view.set_status(status);
        generation
    }

    fn finish(
        &self,
        generation: u64,
        result: Result<Acquisition, VizError>,
        failed_status: &str,
        on_active: impl FnOnce(&mut ViewState),
    ) -> Result<Acquisition, VizError> {
        if self.in_flight.get() == Some(generation) {
            self.in_flight.set(None);
        }
        match result {
            Ok(Acquisition::Active) if !self.is_stale(generation) => {
                on_active(&mut self.view.borrow_mut());
                Ok(Acquisition::Active)
            }
            Ok(_) => Ok(Acquisition::Superseded),
            Err(e) if self.is_stale(generation) => {
                log::warn!("[source] superseded acquisition failed: {}", e);
                Ok(Acquisition::Superseded)
            }
            Err(e) => {
                log::error!("[source] {}", e);
                self.teardown_session();
                let mut view = self.view.borrow_mut();
                view.set_source(SourceKind::None);
                view.set_status(failed_status);
                view.set_error(e.user_message());
                Err(e)
            }
        }
    }

    /// Disconnects the current node, releases its handles and clears the
    /// transport and track fields. Safe to call with no session and against
    /// handles the platform already released.
    fn teardown_session(&self) {
        let previous = std::mem::replace(&mut *self.session.borrow_mut(), SourceSession::None);
        match previous {
            SourceSession::None => {}
            SourceSession::Microphone { capture, node } => {
                self.backend.disconnect_source(&node);
                self.backend.stop_capture(&capture);
                log::debug!("[source] microphone released");
            }
            SourceSession::File { media, node, .. } => {
                self.backend.disconnect_source(&node);
                self.backend.release_media(&media);
                log::debug!("[source] file released");
            }
        }
        self.playback.borrow_mut().reset(None);
        self.view.borrow_mut().set_track_name(None);
    }

    fn media_sink(&self, generation: u64) -> MediaEventSink {
        let playback = Rc::downgrade(&self.playback);
        Rc::new(move |event| {
            if let Some(playback) = playback.upgrade() {
                playback.borrow_mut().apply(generation, event);
            }
        })
    }

    #[inline]
    fn bump_generation(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    #[inline]
    fn is_stale(&self, generation: u64) -> bool {
        self.closed.get() || self.generation.get() != generation
    }
}

impl<B: AudioBackend> FrequencySource for AudioSourceManager<B> {
    fn read_frequencies(&self, out: &mut Vec<u8>) -> bool {
        if self.kind() == SourceKind::None {
            return false;
        }
        self.backend.read_frequencies(out)
    }
}

// In-memory stand-in for the WebAudio graph, shared by the host-side tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};
use viz_core::*;

#[derive(Clone, Debug, PartialEq)]
pub struct FakeFile {
    pub name: String,
    pub duration: f64,
}

pub fn file(name: &str, duration: f64) -> FakeFile {
    FakeFile {
        name: name.to_string(),
        duration,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FakeCapture(pub u32);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FakeMedia(pub u32);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FakeNode(pub u32);

/// Future that stays pending until its gate is opened.
pub struct Hold(Rc<Cell<bool>>);

impl Future for Hold {
    type Output = ();
    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.0.get() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

pub struct FakeState {
    pub graph: bool,
    pub graphs_created: u32,
    pub suspended: bool,
    pub resumes: u32,
    pub capture_supported: bool,
    pub deny_capture: bool,
    pub fail_decode: bool,
    pub block_play: bool,
    pub emit_metadata: bool,
    pub hold_capture: Option<Rc<Cell<bool>>>,
    pub hold_play: Option<Rc<Cell<bool>>>,
    next_id: u32,
    pub live_captures: Vec<u32>,
    pub stopped_captures: Vec<u32>,
    pub opened_media: Vec<u32>,
    pub released_media: Vec<u32>,
    pub connected: Vec<u32>,
    pub gain: Option<f32>,
    pub paused: HashMap<u32, bool>,
    pub positions: HashMap<u32, f64>,
    pub durations: HashMap<u32, f64>,
    pub metadata: HashMap<u32, bool>,
    pub sinks: HashMap<u32, MediaEventSink>,
    pub spectrum: Vec<u8>,
    pub closed: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            graph: false,
            graphs_created: 0,
            suspended: true,
            resumes: 0,
            capture_supported: true,
            deny_capture: false,
            fail_decode: false,
            block_play: false,
            emit_metadata: true,
            hold_capture: None,
            hold_play: None,
            next_id: 0,
            live_captures: Vec::new(),
            stopped_captures: Vec::new(),
            opened_media: Vec::new(),
            released_media: Vec::new(),
            connected: Vec::new(),
            gain: None,
            paused: HashMap::new(),
            positions: HashMap::new(),
            durations: HashMap::new(),
            metadata: HashMap::new(),
            sinks: HashMap::new(),
            spectrum: vec![128; 1024],
            closed: false,
        }
    }
}

impl FakeState {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub state: RefCell<FakeState>,
}

impl FakeBackend {
    pub fn with(configure: impl FnOnce(&mut FakeState)) -> Self {
        let backend = Self::default();
        configure(&mut backend.state.borrow_mut());
        backend
    }

    pub fn sink(&self, media: u32) -> Option<MediaEventSink> {
        self.state.borrow().sinks.get(&media).cloned()
    }

    /// Delivers `event` the way an attached media listener would.
    pub fn emit(&self, media: u32, event: MediaEvent) {
        if let Some(sink) = self.sink(media) {
            sink(event);
        }
    }

    pub fn gain(&self) -> Option<f32> {
        self.state.borrow().gain
    }

    pub fn connected(&self) -> Vec<u32> {
        self.state.borrow().connected.clone()
    }
}

impl FrequencySource for FakeBackend {
    fn read_frequencies(&self, out: &mut Vec<u8>) -> bool {
        let state = self.state.borrow();
        if !state.graph {
            return false;
        }
        out.clear();
        out.extend_from_slice(&state.spectrum);
        true
    }
}

impl AudioBackend for FakeBackend {
    type Capture = FakeCapture;
    type Media = FakeMedia;
    type File = FakeFile;
    type Node = FakeNode;

    async fn ensure_graph(&self) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if !state.graph {
            state.graph = true;
            state.graphs_created += 1;
        }
        if state.suspended {
            state.suspended = false;
            state.resumes += 1;
        }
        Ok(())
    }

    fn supports_capture(&self) -> bool {
        self.state.borrow().capture_supported
    }

    async fn request_capture(&self) -> Result<FakeCapture, BackendError> {
        let hold = self.state.borrow_mut().hold_capture.take();
        if let Some(gate) = hold {
            Hold(gate).await;
        }
        let mut state = self.state.borrow_mut();
        if state.deny_capture {
            return Err(BackendError::Denied("NotAllowedError".into()));
        }
        let id = state.next();
        state.live_captures.push(id);
        Ok(FakeCapture(id))
    }

    fn capture_node(&self, capture: &FakeCapture) -> Result<FakeNode, BackendError> {
        Ok(FakeNode(capture.0))
    }

    fn stop_capture(&self, capture: &FakeCapture) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.live_captures.iter().position(|&c| c == capture.0) {
            state.live_captures.remove(pos);
            state.stopped_captures.push(capture.0);
        }
    }

    fn file_name(&self, file: &FakeFile) -> String {
        file.name.clone()
    }

    fn open_media(&self, file: &FakeFile, sink: MediaEventSink) -> Result<FakeMedia, BackendError> {
        let mut state = self.state.borrow_mut();
        if state.fail_decode {
            return Err(BackendError::Decode("unsupported format".into()));
        }
        let id = state.next();
        state.opened_media.push(id);
        state.paused.insert(id, true);
        state.durations.insert(id, file.duration);
        state.sinks.insert(id, sink);
        Ok(FakeMedia(id))
    }

    fn media_node(&self, media: &FakeMedia) -> Result<FakeNode, BackendError> {
        Ok(FakeNode(media.0))
    }

    async fn play(&self, media: &FakeMedia) -> Result<(), BackendError> {
        let hold = self.state.borrow_mut().hold_play.take();
        if let Some(gate) = hold {
            Hold(gate).await;
        }
        let (events, sink) = {
            let mut state = self.state.borrow_mut();
            if state.block_play {
                return Err(BackendError::Rejected("NotAllowedError".into()));
            }
            state.paused.insert(media.0, false);
            let mut events = Vec::new();
            if state.emit_metadata && !state.metadata.get(&media.0).copied().unwrap_or(false) {
                state.metadata.insert(media.0, true);
                let duration = state.durations.get(&media.0).copied().unwrap_or(0.0);
                events.push(MediaEvent::MetadataLoaded { duration });
            }
            events.push(MediaEvent::Play);
            (events, state.sinks.get(&media.0).cloned())
        };
        if let Some(sink) = sink {
            for event in events {
                sink(event);
            }
        }
        Ok(())
    }

    fn pause(&self, media: &FakeMedia) {
        self.state.borrow_mut().paused.insert(media.0, true);
        self.emit(media.0, MediaEvent::Pause);
    }

    fn is_paused(&self, media: &FakeMedia) -> bool {
        self.state.borrow().paused.get(&media.0).copied().unwrap_or(true)
    }

    fn set_position(&self, media: &FakeMedia, seconds: f64) {
        self.state.borrow_mut().positions.insert(media.0, seconds);
    }

    fn duration(&self, media: &FakeMedia) -> Option<f64> {
        let state = self.state.borrow();
        if !state.metadata.get(&media.0).copied().unwrap_or(false) {
            return None;
        }
        state.durations.get(&media.0).copied()
    }

    fn release_media(&self, media: &FakeMedia) {
        let mut state = self.state.borrow_mut();
        state.sinks.remove(&media.0);
        state.paused.insert(media.0, true);
        if !state.released_media.contains(&media.0) {
            state.released_media.push(media.0);
        }
    }

    fn connect_source(&self, node: &FakeNode, routing: Routing) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if !state.graph {
            return Err(BackendError::Graph("no analyser".into()));
        }
        state.connected.push(node.0);
        state.gain = Some(routing.gain());
        Ok(())
    }

    fn disconnect_source(&self, node: &FakeNode) {
        self.state.borrow_mut().connected.retain(|&n| n != node.0);
    }

    fn output_gain(&self) -> Option<f32> {
        self.state.borrow().gain
    }

    fn close(&self) {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.graph = false;
        state.gain = None;
    }
}

pub fn manager(backend: FakeBackend) -> AudioSourceManager<FakeBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    AudioSourceManager::new(backend, Rc::new(RefCell::new(ViewState::default())))
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

/// Polls `fut` once without blocking.
pub fn poll_once<F: Future>(fut: Pin<&mut F>) -> Poll<F::Output> {
    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);
    fut.poll(&mut cx)
}

use std::cell::RefCell;
use std::rc::Rc;
use viz_core::{
    AudioBackend, BackendError, FrequencySource, MediaEvent, MediaEventSink, Routing, FFT_SIZE,
    SMOOTHING_TIME_CONSTANT,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

const MEDIA_EVENTS: [&str; 5] = ["timeupdate", "loadedmetadata", "play", "pause", "ended"];

#[inline]
fn js_message(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn graph_err(e: JsValue) -> BackendError {
    BackendError::Graph(js_message(&e))
}

// Permanent nodes: analyser -> output gain -> destination
struct Graph {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    gain: web::GainNode,
}

impl Graph {
    fn new() -> Result<Self, BackendError> {
        let ctx = web::AudioContext::new().map_err(graph_err)?;
        match Self::nodes(&ctx) {
            Ok((analyser, gain)) => Ok(Self {
                ctx,
                analyser,
                gain,
            }),
            Err(e) => {
                _ = ctx.close();
                Err(e)
            }
        }
    }

    fn nodes(ctx: &web::AudioContext) -> Result<(web::AnalyserNode, web::GainNode), BackendError> {
        let analyser = web::AnalyserNode::new(ctx).map_err(graph_err)?;
        analyser.set_fft_size(FFT_SIZE);
        analyser.set_smoothing_time_constant(SMOOTHING_TIME_CONSTANT);
        let gain = web::GainNode::new(ctx).map_err(graph_err)?;
        gain.gain().set_value(1.0);
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(graph_err)?;
        Ok((analyser, gain))
    }
}

struct MediaInner {
    element: web::HtmlAudioElement,
    url: RefCell<Option<String>>,
    listeners: RefCell<Vec<(&'static str, Closure<dyn FnMut()>)>>,
}

/// An `<audio>` element playing an object URL, plus its lifecycle listeners.
#[derive(Clone)]
pub struct WebMedia(Rc<MediaInner>);

impl WebMedia {
    fn element(&self) -> &web::HtmlAudioElement {
        &self.0.element
    }

    fn attach_listeners(&self, sink: MediaEventSink) {
        let mut listeners = self.0.listeners.borrow_mut();
        for name in MEDIA_EVENTS {
            let sink = sink.clone();
            let element = self.0.element.clone();
            let closure = Closure::wrap(Box::new(move || {
                if let Some(event) = media_event(name, &element) {
                    sink(event);
                }
            }) as Box<dyn FnMut()>);
            _ = self
                .0
                .element
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            listeners.push((name, closure));
        }
    }

    fn detach_listeners(&self) {
        for (name, closure) in self.0.listeners.borrow_mut().drain(..) {
            _ = self
                .0
                .element
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

fn media_event(name: &str, element: &web::HtmlAudioElement) -> Option<MediaEvent> {
    match name {
        "timeupdate" => Some(MediaEvent::TimeUpdate {
            position: element.current_time(),
        }),
        "loadedmetadata" => Some(MediaEvent::MetadataLoaded {
            duration: element.duration(),
        }),
        "play" => Some(MediaEvent::Play),
        "pause" => Some(MediaEvent::Pause),
        "ended" => Some(MediaEvent::Ended),
        _ => None,
    }
}

fn media_devices() -> Option<web::MediaDevices> {
    let navigator = web::window()?.navigator();
    let devices = navigator.media_devices().ok()?;
    (!devices.is_undefined()).then_some(devices)
}

/// WebAudio implementation of the audio graph. The context and permanent
/// nodes are created lazily, inside the first user gesture.
#[derive(Default)]
pub struct WebAudioBackend {
    graph: RefCell<Option<Graph>>,
}

impl WebAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Result<web::AudioContext, BackendError> {
        self.graph
            .borrow()
            .as_ref()
            .map(|g| g.ctx.clone())
            .ok_or_else(|| BackendError::Graph("audio graph not initialized".into()))
    }
}

impl FrequencySource for WebAudioBackend {
    fn read_frequencies(&self, out: &mut Vec<u8>) -> bool {
        let graph = self.graph.borrow();
        let Some(graph) = graph.as_ref() else {
            return false;
        };
        let bins = graph.analyser.frequency_bin_count() as usize;
        if out.len() != bins {
            out.resize(bins, 0);
        }
        graph.analyser.get_byte_frequency_data(out);
        true
    }
}

impl AudioBackend for WebAudioBackend {
    type Capture = web::MediaStream;
    type Media = WebMedia;
    type File = web::File;
    type Node = web::AudioNode;

    async fn ensure_graph(&self) -> Result<(), BackendError> {
        let ctx = {
            let mut graph = self.graph.borrow_mut();
            if graph.is_none() {
                *graph = Some(Graph::new()?);
                log::info!("[audio] graph created (fft {})", FFT_SIZE);
            }
            graph.as_ref().map(|g| g.ctx.clone())
        };
        if let Some(ctx) = ctx {
            if ctx.state() == web::AudioContextState::Suspended {
                let resume = ctx
                    .resume()
                    .map_err(graph_err)?;
                JsFuture::from(resume)
                    .await
                    .map_err(graph_err)?;
            }
        }
        Ok(())
    }

    fn supports_capture(&self) -> bool {
        media_devices().is_some()
    }

    async fn request_capture(&self) -> Result<web::MediaStream, BackendError> {
        let devices = media_devices().ok_or(BackendError::Unsupported)?;
        let constraints = web::MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        let denied = |e: JsValue| BackendError::Denied(js_message(&e));
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(denied)?;
        let stream = JsFuture::from(promise).await.map_err(denied)?;
        stream
            .dyn_into::<web::MediaStream>()
            .map_err(graph_err)
    }

    fn capture_node(&self, capture: &web::MediaStream) -> Result<web::AudioNode, BackendError> {
        let node = self
            .context()?
            .create_media_stream_source(capture)
            .map_err(graph_err)?;
        Ok(node.into())
    }

    fn stop_capture(&self, capture: &web::MediaStream) {
        for track in capture.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
                track.stop();
            }
        }
    }

    fn file_name(&self, file: &web::File) -> String {
        file.name()
    }

    fn open_media(&self, file: &web::File, sink: MediaEventSink) -> Result<WebMedia, BackendError> {
        let decode = |e: JsValue| BackendError::Decode(js_message(&e));
        let url = web::Url::create_object_url_with_blob(file).map_err(decode)?;
        let element = match web::HtmlAudioElement::new_with_src(&url) {
            Ok(el) => el,
            Err(e) => {
                _ = web::Url::revoke_object_url(&url);
                return Err(decode(e));
            }
        };
        element.set_loop(true);
        element.set_cross_origin(Some("anonymous"));
        let media = WebMedia(Rc::new(MediaInner {
            element,
            url: RefCell::new(Some(url)),
            listeners: RefCell::new(Vec::new()),
        }));
        media.attach_listeners(sink);
        Ok(media)
    }

    fn media_node(&self, media: &WebMedia) -> Result<web::AudioNode, BackendError> {
        let node = self
            .context()?
            .create_media_element_source(media.element())
            .map_err(graph_err)?;
        Ok(node.into())
    }

    async fn play(&self, media: &WebMedia) -> Result<(), BackendError> {
        let rejected = |e: JsValue| BackendError::Rejected(js_message(&e));
        let promise = media.element().play().map_err(rejected)?;
        JsFuture::from(promise).await.map_err(rejected)?;
        Ok(())
    }

    fn pause(&self, media: &WebMedia) {
        _ = media.element().pause();
    }

    fn is_paused(&self, media: &WebMedia) -> bool {
        media.element().paused()
    }

    fn set_position(&self, media: &WebMedia, seconds: f64) {
        media.element().set_current_time(seconds);
    }

    fn duration(&self, media: &WebMedia) -> Option<f64> {
        let d = media.element().duration();
        (d.is_finite() && d > 0.0).then_some(d)
    }

    fn release_media(&self, media: &WebMedia) {
        media.detach_listeners();
        let element = media.element();
        _ = element.pause();
        element.set_src("");
        element.load();
        if let Some(url) = media.0.url.borrow_mut().take() {
            _ = web::Url::revoke_object_url(&url);
        }
    }

    fn connect_source(&self, node: &web::AudioNode, routing: Routing) -> Result<(), BackendError> {
        let graph = self.graph.borrow();
        let graph = graph
            .as_ref()
            .ok_or_else(|| BackendError::Graph("audio graph not initialized".into()))?;
        _ = node.disconnect();
        _ = graph.analyser.disconnect();
        node.connect_with_audio_node(&graph.analyser)
            .map_err(graph_err)?;
        graph.gain.gain().set_value(routing.gain());
        graph
            .analyser
            .connect_with_audio_node(&graph.gain)
            .map_err(graph_err)?;
        Ok(())
    }

    fn disconnect_source(&self, node: &web::AudioNode) {
        _ = node.disconnect();
        if let Some(graph) = self.graph.borrow().as_ref() {
            _ = graph.analyser.disconnect();
        }
    }

    fn output_gain(&self) -> Option<f32> {
        self.graph.borrow().as_ref().map(|g| g.gain.gain().value())
    }

    fn close(&self) {
        if let Some(graph) = self.graph.borrow_mut().take() {
            _ = graph.analyser.disconnect();
            _ = graph.gain.disconnect();
            _ = graph.ctx.close();
        }
    }
}

#![cfg(target_arch = "wasm32")]
//! Browser front-end: WebAudio capture and playback, a WebGPU shader view
//! and a 2D bar chart, all driven by `viz-core`.

mod audio;
mod dom;
mod events;
mod fft;
mod frame;
mod render;
mod ui;

use audio::WebAudioBackend;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use viz_core::{AudioSourceManager, DualRenderer, FrameLoop, VizError, ViewState};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub(crate) struct App {
    pub manager: AudioSourceManager<WebAudioBackend>,
    pub view: Rc<RefCell<ViewState>>,
}

struct Mount {
    app: Rc<App>,
    frame_ctx: Rc<RefCell<frame::FrameContext>>,
    frame_loop: frame::LoopHandle,
    listeners: Vec<dom::EventListener>,
}

impl Mount {
    fn unmount(mut self) {
        self.frame_loop.cancel();
        self.listeners.clear();
        self.app.manager.shutdown();
        self.frame_ctx.borrow_mut().renderer.release_shader();
        log::info!("viz-web unmounted");
    }
}

thread_local! {
    static MOUNT: RefCell<Option<Mount>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("viz-web starting");

    if let Some(window) = web::window() {
        watch_page_lifecycle(&window);
    }
    mount();
    Ok(())
}

fn mount() {
    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
}

// Registered once, outside the mount: pagehide must outlive the teardown it
// triggers, and pageshow remounts a page restored from the back/forward cache.
fn watch_page_lifecycle(window: &web::Window) {
    let hide = Closure::wrap(Box::new(teardown) as Box<dyn FnMut()>);
    let _ = window.add_event_listener_with_callback("pagehide", hide.as_ref().unchecked_ref());
    hide.forget();

    let show = Closure::wrap(Box::new(move |ev: web::Event| {
        let restored = ev
            .dyn_ref::<web::PageTransitionEvent>()
            .is_some_and(|e| e.persisted());
        if restored {
            log::info!("viz-web restored from page cache; remounting");
            mount();
        }
    }) as Box<dyn FnMut(web::Event)>);
    let _ = window.add_event_listener_with_callback("pageshow", show.as_ref().unchecked_ref());
    show.forget();
}

/// Stops the frame loop, releases every audio and GPU resource and unwires
/// the page. Safe to call more than once.
#[wasm_bindgen]
pub fn teardown() {
    if let Some(mount) = MOUNT.with(|m| m.borrow_mut().take()) {
        mount.unmount();
    }
}

async fn init() -> anyhow::Result<()> {
    if MOUNT.with(|m| m.borrow().is_some()) {
        log::warn!("[init] already mounted; ignoring");
        return Ok(());
    }
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let shader_canvas: web::HtmlCanvasElement = dom::element(&document, ui::SHADER_CANVAS)?;
    let fft_canvas: web::HtmlCanvasElement = dom::element(&document, ui::FFT_CANVAS)?;
    dom::sync_canvas_backing_size(&shader_canvas);
    dom::sync_canvas_backing_size(&fft_canvas);

    let view = Rc::new(RefCell::new(ViewState::default()));
    let app = Rc::new(App {
        manager: AudioSourceManager::new(WebAudioBackend::new(), view.clone()),
        view: view.clone(),
    });

    let shader = render::ShaderRenderer::new(shader_canvas.clone())
        .await
        .map_err(|e| VizError::RenderInitFailure(format!("{:#}", e)));
    if let Err(e) = &shader {
        view.borrow_mut().set_error(e.user_message());
    }
    let renderer = DualRenderer::new(shader, fft::BarRenderer::new(fft_canvas.clone()));
    // a second mount may have finished while the GPU device was pending
    if MOUNT.with(|m| m.borrow().is_some()) {
        log::warn!("[init] mounted concurrently; dropping this instance");
        return Ok(());
    }

    let mut listeners = events::wire_controls(&document, &app);
    listeners.push(dom::EventListener::new(&window, "resize", move |_| {
        dom::sync_canvas_backing_size(&shader_canvas);
        dom::sync_canvas_backing_size(&fft_canvas);
    }));

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        app: app.clone(),
        document,
        frames: FrameLoop::new(),
        renderer,
        ui: ui::UiSync::default(),
        last_instant: Instant::now(),
    }));
    let frame_loop = frame::start_loop(frame_ctx.clone());

    MOUNT.with(|m| {
        *m.borrow_mut() = Some(Mount {
            app,
            frame_ctx,
            frame_loop,
            listeners,
        })
    });
    log::info!("viz-web mounted");
    Ok(())
}

use crate::fft::BarRenderer;
use crate::render::ShaderRenderer;
use crate::ui::UiSync;
use crate::App;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use viz_core::{DualRenderer, FrameLoop};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub app: Rc<App>,
    pub document: web::Document,
    pub frames: FrameLoop,
    pub renderer: DualRenderer<ShaderRenderer, BarRenderer>,
    pub ui: UiSync,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;

        // DOM first so a canvas that just became visible has its layout size
        let mode = {
            let view = self.app.view.borrow();
            let playback = self.app.manager.playback().borrow();
            self.ui.sync(&self.document, &view, &playback);
            view.mode()
        };
        self.frames
            .tick(dt, &self.app.manager, mode, &mut self.renderer);
    }
}

/// Running animation-frame loop. [`LoopHandle::cancel`] stops it and drops
/// the frame closure together with everything it captured.
pub struct LoopHandle {
    tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        if let Some(id) = self.raf_id.take() {
            if let Some(w) = web::window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        self.tick.borrow_mut().take();
    }
}

fn request_frame(tick: &RefCell<Option<Closure<dyn FnMut()>>>, raf_id: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        raf_id.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> LoopHandle {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let raf_id = Rc::new(Cell::new(None));
    let tick_clone = tick.clone();
    let raf_clone = raf_id.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        raf_clone.set(None);
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone, &raf_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick, &raf_id);
    LoopHandle { tick, raf_id }
}

use viz_core::backing_size;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn element<T: JsCast>(document: &web::Document, id: &str) -> anyhow::Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", id))?
        .dyn_into::<T>()
        .map_err(|e| anyhow::anyhow!(format!("#{}: {:?}", id, e)))
}

#[inline]
pub fn device_pixel_ratio() -> f64 {
    web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

/// Backing-store size the canvas should have for its current CSS size.
#[inline]
pub fn canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    backing_size(
        canvas.client_width() as f64,
        canvas.client_height() as f64,
        device_pixel_ratio(),
    )
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    let (w, h) = canvas_backing_size(canvas);
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
}

/// A registered listener. Dropping it unregisters the callback.
pub struct EventListener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        Self {
            target: target.clone(),
            event,
            closure,
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

pub fn add_listener(
    document: &web::Document,
    element_id: &str,
    event: &'static str,
    handler: impl FnMut(web::Event) + 'static,
) -> Option<EventListener> {
    let el = document.get_element_by_id(element_id)?;
    Some(EventListener::new(&el, event, handler))
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) -> Option<EventListener> {
    add_listener(document, element_id, "click", move |_| handler())
}

pub fn set_text(document: &web::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        if el.text_content().as_deref() != Some(text) {
            el.set_text_content(Some(text));
        }
    }
}

pub fn set_disabled(document: &web::Document, id: &str, disabled: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = if disabled {
            el.set_attribute("disabled", "")
        } else {
            el.remove_attribute("disabled")
        };
    }
}

pub fn set_class(document: &web::Document, id: &str, class: &str, on: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.class_list().toggle_with_force(class, on);
    }
}

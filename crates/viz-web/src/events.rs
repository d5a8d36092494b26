use crate::dom::{self, EventListener};
use crate::ui;
use crate::App;
use std::rc::Rc;
use viz_core::ViewMode;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// Wires the page controls to the source manager and view state. Dropping the
/// returned listeners unwires them.
pub fn wire_controls(document: &web::Document, app: &Rc<App>) -> Vec<EventListener> {
    let mut listeners = Vec::new();

    {
        let app = app.clone();
        listeners.extend(dom::add_click_listener(document, ui::BTN_MIC, move || {
            let app = app.clone();
            spawn_local(async move {
                if let Err(e) = app.manager.start_microphone().await {
                    log::debug!("[ui] microphone request ended: {}", e);
                }
            });
        }));
    }

    {
        let app = app.clone();
        listeners.extend(dom::add_listener(document, ui::FILE_INPUT, "change", move |ev| {
            let Some(input) = ev
                .target()
                .and_then(|t| t.dyn_into::<web::HtmlInputElement>().ok())
            else {
                return;
            };
            let file = input.files().and_then(|files| files.get(0));
            // allow re-selecting the same file
            input.set_value("");
            let Some(file) = file else {
                return;
            };
            let app = app.clone();
            spawn_local(async move {
                if let Err(e) = app.manager.load_file(&file).await {
                    log::debug!("[ui] file load ended: {}", e);
                }
            });
        }));
    }

    {
        let app = app.clone();
        listeners.extend(dom::add_click_listener(document, ui::BTN_STOP, move || {
            app.manager.stop();
        }));
    }

    for (id, mode) in [
        (ui::VIEW_SHADER, ViewMode::Shader),
        (ui::VIEW_FFT, ViewMode::Fft),
        (ui::VIEW_PLAYER, ViewMode::Player),
    ] {
        let app = app.clone();
        listeners.extend(dom::add_click_listener(document, id, move || {
            if !app.view.borrow_mut().select_mode(mode) {
                log::debug!("[ui] {:?} view unavailable", mode);
            }
        }));
    }

    {
        let app = app.clone();
        listeners.extend(dom::add_click_listener(document, ui::BTN_PLAY, move || {
            let app = app.clone();
            spawn_local(async move {
                let _ = app.manager.toggle_play().await;
            });
        }));
    }

    {
        let app = app.clone();
        listeners.extend(dom::add_listener(document, ui::SEEK_RANGE, "input", move |ev| {
            if let Some(range) = ev
                .target()
                .and_then(|t| t.dyn_into::<web::HtmlInputElement>().ok())
            {
                let target = range.value_as_number();
                if target.is_finite() {
                    app.manager.seek(target);
                }
            }
        }));
    }

    log::info!("[ui] {} controls wired", listeners.len());
    listeners
}

use bevy::prelude::*;

use crate::browser::inbox::{BrowserEvent, BrowserEventReceived, BrowserInbox};
use crate::engine::viewer::errors::{ViewerError, ViewerErrorEvent};
use crate::engine::viewer::lifecycle::{ViewerLifecycle, ViewerLifecycleEvent};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, closure::Closure};

/// Main-thread only: holds the JS closure registered on the canvas.
#[derive(Default)]
pub struct ContextLossListener {
    #[cfg(target_arch = "wasm32")]
    attached: Option<(web_sys::HtmlCanvasElement, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl ContextLossListener {
    #[cfg(target_arch = "wasm32")]
    fn attach(&mut self, inbox: &BrowserInbox) -> Result<(), String> {
        use constants::path::CANVAS_SELECTOR;

        self.detach();
        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.query_selector(CANVAS_SELECTOR).ok().flatten())
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            .ok_or_else(|| format!("canvas '{CANVAS_SELECTOR}' not found"))?;

        let inbox = inbox.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            inbox.push(BrowserEvent::ContextLost);
        }) as Box<dyn FnMut(web_sys::Event)>);

        canvas
            .add_event_listener_with_callback("webglcontextlost", closure.as_ref().unchecked_ref())
            .map_err(|e| format!("{e:?}"))?;
        self.attached = Some((canvas, closure));
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn attach(&mut self, _inbox: &BrowserInbox) -> Result<(), String> {
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn detach(&mut self) {
        if let Some((canvas, closure)) = self.attached.take() {
            if let Err(e) = canvas.remove_event_listener_with_callback(
                "webglcontextlost",
                closure.as_ref().unchecked_ref(),
            ) {
                warn!("Failed to detach context loss listener: {:?}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn detach(&mut self) {}
}

pub fn sync_context_loss_listener(
    mut lifecycle_events: EventReader<ViewerLifecycleEvent>,
    mut listener: NonSendMut<ContextLossListener>,
    inbox: Res<BrowserInbox>,
) {
    for event in lifecycle_events.read() {
        match event {
            ViewerLifecycleEvent::Mounted => {
                if let Err(reason) = listener.attach(&inbox) {
                    warn!("Context loss listener unavailable: {}", reason);
                }
            }
            ViewerLifecycleEvent::Unmounted => listener.detach(),
        }
    }
}

/// A lost context ends the viewer instance; the reporter unmounts it.
pub fn report_context_loss(
    mut browser_events: EventReader<BrowserEventReceived>,
    lifecycle: Res<ViewerLifecycle>,
    mut errors: EventWriter<ViewerErrorEvent>,
) {
    let lost = browser_events
        .read()
        .any(|event| event.0 == BrowserEvent::ContextLost);
    if lost && lifecycle.is_mounted() {
        errors.write(ViewerErrorEvent(ViewerError::ContextLost));
    }
}

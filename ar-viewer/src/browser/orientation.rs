use bevy::prelude::*;

use super::inbox::BrowserInbox;
use crate::engine::viewer::lifecycle::ViewerLifecycleEvent;

#[cfg(target_arch = "wasm32")]
use super::inbox::BrowserEvent;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, closure::Closure};

/// `deviceorientation` listener on the window, held while the viewer is mounted.
#[derive(Default)]
pub struct OrientationListener {
    #[cfg(target_arch = "wasm32")]
    closure: Option<Closure<dyn FnMut(web_sys::DeviceOrientationEvent)>>,
}

#[cfg(target_arch = "wasm32")]
impl OrientationListener {
    fn attach(&mut self, inbox: &BrowserInbox) {
        self.detach();
        let Some(window) = web_sys::window() else {
            return;
        };
        let inbox = inbox.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::DeviceOrientationEvent| {
            inbox.push(BrowserEvent::Orientation {
                beta: event.beta(),
                gamma: event.gamma(),
            });
        }) as Box<dyn FnMut(web_sys::DeviceOrientationEvent)>);

        match window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())
        {
            Ok(()) => self.closure = Some(closure),
            Err(e) => warn!(
                "Device orientation unavailable: {}",
                super::js_error_message(&e)
            ),
        }
    }

    fn detach(&mut self) {
        let (Some(closure), Some(window)) = (self.closure.take(), web_sys::window()) else {
            return;
        };
        if let Err(e) = window.remove_event_listener_with_callback(
            "deviceorientation",
            closure.as_ref().unchecked_ref(),
        ) {
            warn!(
                "Failed to detach orientation listener: {}",
                super::js_error_message(&e)
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl OrientationListener {
    fn attach(&mut self, _inbox: &BrowserInbox) {
        debug!("Device orientation is not available natively");
    }

    fn detach(&mut self) {}
}

pub fn sync_orientation_listener(
    mut lifecycle_events: EventReader<ViewerLifecycleEvent>,
    mut listener: NonSendMut<OrientationListener>,
    inbox: Res<BrowserInbox>,
) {
    for event in lifecycle_events.read() {
        match event {
            ViewerLifecycleEvent::Mounted => listener.attach(&inbox),
            ViewerLifecycleEvent::Unmounted => listener.detach(),
        }
    }
}

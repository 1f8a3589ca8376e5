use bevy::prelude::*;

use super::inbox::{BrowserEvent, BrowserInbox};
use crate::ar::camera_stream::StreamRequest;
use crate::engine::viewer::errors::Capability;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, collections::HashMap, rc::Rc};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

#[cfg(target_arch = "wasm32")]
const VIDEO_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
                           object-fit: cover; z-index: -1; pointer-events: none;";

/// Camera streams and the `<video>` element that shows them behind the canvas.
///
/// Main-thread only. Acquired streams wait in `arrived`, keyed by request
/// generation, until a system decides to attach or discard them.
#[derive(Default)]
pub struct MediaHost {
    #[cfg(target_arch = "wasm32")]
    arrived: Rc<RefCell<HashMap<u64, MediaStream>>>,
    #[cfg(target_arch = "wasm32")]
    live: Option<MediaStream>,
    #[cfg(target_arch = "wasm32")]
    video: Option<HtmlVideoElement>,
}

#[cfg(target_arch = "wasm32")]
impl MediaHost {
    pub fn request_stream(&mut self, request: StreamRequest, inbox: &BrowserInbox) {
        let generation = request.generation;
        let video = js_sys::Object::new();
        if let Err(e) = js_sys::Reflect::set(
            &video,
            &JsValue::from_str("facingMode"),
            &JsValue::from_str(request.facing.constraint()),
        ) {
            inbox.push(BrowserEvent::CameraStream {
                generation,
                result: Err(super::js_error_message(&e)),
            });
            return;
        }
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video.into());

        let arrived = self.arrived.clone();
        let inbox = inbox.clone();
        request_user_media(constraints, move |result| {
            let result = result.map(|stream| {
                arrived.borrow_mut().insert(generation, stream);
            });
            inbox.push(BrowserEvent::CameraStream { generation, result });
        });
    }

    /// Ask for camera access with a throwaway stream whose tracks stop immediately.
    pub fn probe_permission(&mut self, inbox: &BrowserInbox) {
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&JsValue::TRUE);

        let inbox = inbox.clone();
        request_user_media(constraints, move |result| {
            let result = result.map(|stream| stop_tracks(&stream));
            inbox.push(BrowserEvent::PermissionProbe {
                capability: Capability::Camera,
                result,
            });
        });
    }

    pub fn attach(&mut self, generation: u64) {
        let Some(stream) = self.arrived.borrow_mut().remove(&generation) else {
            warn!("Camera stream {} is no longer available", generation);
            return;
        };
        if let Some(previous) = self.live.take() {
            stop_tracks(&previous);
        }
        match self.video_element() {
            Ok(video) => video.set_src_object(Some(&stream)),
            Err(reason) => warn!("Cannot show camera stream: {}", reason),
        }
        self.live = Some(stream);
    }

    pub fn discard(&mut self, generation: u64) {
        if let Some(stream) = self.arrived.borrow_mut().remove(&generation) {
            stop_tracks(&stream);
        }
    }

    pub fn stop_all(&mut self) {
        if let Some(stream) = self.live.take() {
            stop_tracks(&stream);
        }
        for (_, stream) in self.arrived.borrow_mut().drain() {
            stop_tracks(&stream);
        }
        if let Some(video) = self.video.take() {
            video.set_src_object(None);
            video.remove();
        }
    }

    fn video_element(&mut self) -> Result<&HtmlVideoElement, String> {
        if self.video.is_none() {
            self.video = Some(create_video_element()?);
        }
        self.video
            .as_ref()
            .ok_or_else(|| "video element unavailable".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
fn request_user_media(
    constraints: MediaStreamConstraints,
    on_settled: impl FnOnce(Result<MediaStream, String>) + 'static,
) {
    let promise = web_sys::window()
        .ok_or_else(|| "window unavailable".to_string())
        .and_then(|window| {
            window
                .navigator()
                .media_devices()
                .map_err(|e| super::js_error_message(&e))
        })
        .and_then(|devices| {
            devices
                .get_user_media_with_constraints(&constraints)
                .map_err(|e| super::js_error_message(&e))
        });

    let promise = match promise {
        Ok(promise) => promise,
        Err(reason) => {
            on_settled(Err(reason));
            return;
        }
    };

    wasm_bindgen_futures::spawn_local(async move {
        let result = match JsFuture::from(promise).await {
            Ok(value) => value
                .dyn_into::<MediaStream>()
                .map_err(|_| "getUserMedia resolved without a stream".to_string()),
            Err(e) => Err(super::js_error_message(&e)),
        };
        on_settled(result);
    });
}

#[cfg(target_arch = "wasm32")]
fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn create_video_element() -> Result<HtmlVideoElement, String> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| "document unavailable".to_string())?;
    let body = document
        .body()
        .ok_or_else(|| "document has no body".to_string())?;
    let video = document
        .create_element("video")
        .map_err(|e| super::js_error_message(&e))?
        .dyn_into::<HtmlVideoElement>()
        .map_err(|_| "created element is not a video".to_string())?;

    video.set_autoplay(true);
    video.set_muted(true);
    video
        .set_attribute("playsinline", "")
        .and_then(|_| video.set_attribute("style", VIDEO_STYLE))
        .map_err(|e| super::js_error_message(&e))?;
    body.insert_before(&video, body.first_child().as_ref())
        .map_err(|e| super::js_error_message(&e))?;
    Ok(video)
}

#[cfg(not(target_arch = "wasm32"))]
impl MediaHost {
    pub fn request_stream(&mut self, request: StreamRequest, inbox: &BrowserInbox) {
        inbox.push(BrowserEvent::CameraStream {
            generation: request.generation,
            result: Err(format!("camera streams are {}", super::UNSUPPORTED)),
        });
    }

    pub fn probe_permission(&mut self, inbox: &BrowserInbox) {
        inbox.push(BrowserEvent::PermissionProbe {
            capability: Capability::Camera,
            result: Err(format!("camera access is {}", super::UNSUPPORTED)),
        });
    }

    pub fn attach(&mut self, generation: u64) {
        debug!("No camera surface to attach stream {} to", generation);
    }

    pub fn discard(&mut self, _generation: u64) {}

    pub fn stop_all(&mut self) {}
}

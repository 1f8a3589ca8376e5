//! Browser APIs the viewer consumes: camera streams, geolocation and
//! device orientation.
//!
//! Everything here is asynchronous on the JS side. Callbacks only push a
//! [`inbox::BrowserEvent`] into the shared [`inbox::BrowserInbox`]; systems
//! drain it on the next frame. Native builds answer each request with an
//! "unsupported" result through the same inbox.

pub mod inbox;
pub mod location;
pub mod media;
pub mod orientation;

/// Human-readable message from a rejected promise or error callback.
#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error_message(value: &wasm_bindgen::JsValue) -> String {
    let field = |name: &str| {
        js_sys::Reflect::get(value, &wasm_bindgen::JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.is_empty())
    };
    match (field("name"), field("message")) {
        (Some(name), Some(message)) => format!("{name}: {message}"),
        (None, Some(message)) => message,
        (Some(name), None) => name,
        (None, None) => value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) const UNSUPPORTED: &str = "unsupported on this platform";

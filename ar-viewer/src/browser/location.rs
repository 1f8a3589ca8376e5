use super::inbox::{BrowserEvent, BrowserInbox};

#[cfg(target_arch = "wasm32")]
use crate::ar::geolocation::GeoFix;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue, closure::Closure};

/// One-shot, high accuracy. The result arrives as [`BrowserEvent::Position`].
#[cfg(target_arch = "wasm32")]
pub fn request_position(inbox: &BrowserInbox) {
    let geolocation = web_sys::window().and_then(|window| window.navigator().geolocation().ok());
    let Some(geolocation) = geolocation else {
        inbox.push(BrowserEvent::Position(Err(
            "Geolocation is not supported by your browser".to_string(),
        )));
        return;
    };

    let on_fix = inbox.clone();
    let success = Closure::once_into_js(move |position: JsValue| {
        on_fix.push(BrowserEvent::Position(read_fix(&position)));
    });
    let on_error = inbox.clone();
    let failure = Closure::once_into_js(move |error: JsValue| {
        on_error.push(BrowserEvent::Position(Err(super::js_error_message(&error))));
    });

    let options = web_sys::PositionOptions::new();
    options.set_enable_high_accuracy(true);
    if let Err(e) = geolocation.get_current_position_with_error_callback_and_options(
        success.unchecked_ref(),
        Some(failure.unchecked_ref()),
        &options,
    ) {
        inbox.push(BrowserEvent::Position(Err(super::js_error_message(&e))));
    }
}

#[cfg(target_arch = "wasm32")]
fn read_fix(position: &JsValue) -> Result<GeoFix, String> {
    let coords = js_sys::Reflect::get(position, &JsValue::from_str("coords"))
        .map_err(|e| super::js_error_message(&e))?;
    let number = |name: &str| {
        js_sys::Reflect::get(&coords, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.as_f64())
            .ok_or_else(|| format!("position is missing '{name}'"))
    };
    Ok(GeoFix {
        latitude: number("latitude")?,
        longitude: number("longitude")?,
        accuracy: number("accuracy").unwrap_or(f64::NAN),
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn request_position(inbox: &BrowserInbox) {
    inbox.push(BrowserEvent::Position(Err(format!(
        "geolocation is {}",
        super::UNSUPPORTED
    ))));
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_native_position_request_fails_softly() {
        let inbox = BrowserInbox::default();
        request_position(&inbox);
        assert!(matches!(
            inbox.drain().as_slice(),
            [BrowserEvent::Position(Err(reason))] if reason.contains("unsupported")
        ));
    }
}

//! The display surface the viewer renders into.
//!
//! On the web this is the `#bevy` canvas, fitted to its parent element by
//! the window plugin. Natively it is the primary window.

use bevy::prelude::*;

use crate::engine::viewer::config::SurfaceSize;
use crate::engine::viewer::errors::ViewerError;

/// `webglcontextlost` listener on the canvas, attached while mounted.
pub mod context_loss;

/// WebGL2 availability check run before the app starts.
pub mod render_probe;

/// Size the viewer should mount with. An explicit size wins; otherwise the
/// container is measured. The container must exist either way.
pub fn resolve_surface(
    selector: &str,
    requested: Option<SurfaceSize>,
    window: Option<&Window>,
) -> Result<SurfaceSize, ViewerError> {
    let measured = measure_container(selector, window)?;
    Ok(requested.unwrap_or(measured))
}

#[cfg(target_arch = "wasm32")]
fn measure_container(selector: &str, _window: Option<&Window>) -> Result<SurfaceSize, ViewerError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ViewerError::Initialization("document is not available".to_string()))?;
    let element = document
        .query_selector(selector)
        .ok()
        .flatten()
        .ok_or_else(|| {
            ViewerError::Initialization(format!("no element matches '{selector}'"))
        })?;
    Ok(SurfaceSize::new(
        element.client_width() as f32,
        element.client_height() as f32,
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn measure_container(_selector: &str, window: Option<&Window>) -> Result<SurfaceSize, ViewerError> {
    // Headless runs have no window; an explicit size is then the only source.
    Ok(window
        .map(|window| SurfaceSize::new(window.width(), window.height()))
        .unwrap_or(SurfaceSize::new(0.0, 0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_size_wins() {
        let size = resolve_surface("#bevy", Some(SurfaceSize::new(320.0, 240.0)), None).unwrap();
        assert_eq!(size, SurfaceSize::new(320.0, 240.0));
    }

    #[test]
    fn test_window_size_is_used_when_unspecified() {
        let mut window = Window::default();
        window.resolution.set(1024.0, 768.0);
        let size = resolve_surface("#bevy", None, Some(&window)).unwrap();
        assert_eq!(size, SurfaceSize::new(1024.0, 768.0));
    }

    #[test]
    fn test_missing_window_yields_unrenderable_size() {
        let size = resolve_surface("#bevy", None, None).unwrap();
        assert!(!size.is_renderable());
    }
}

use crate::engine::viewer::errors::ViewerError;

/// Check that a WebGL2 context can be created before handing the canvas to the renderer.
#[cfg(target_arch = "wasm32")]
pub fn probe_render_context() -> Result<(), ViewerError> {
    use wasm_bindgen::JsCast;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ViewerError::Initialization("document is not available".to_string()))?;
    let canvas = document
        .create_element("canvas")
        .ok()
        .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        .ok_or_else(|| ViewerError::Initialization("cannot create a probe canvas".to_string()))?;

    match canvas.get_context("webgl2") {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ViewerError::Initialization(
            "WebGL2 is not supported by this browser".to_string(),
        )),
        Err(e) => Err(ViewerError::Initialization(format!(
            "WebGL2 context creation failed: {e:?}"
        ))),
    }
}

/// Native builds render through wgpu's own adapter selection.
#[cfg(not(target_arch = "wasm32"))]
pub fn probe_render_context() -> Result<(), ViewerError> {
    Ok(())
}

mod ar;
mod browser;
mod engine;
mod rpc;

use crate::engine::core::app_setup::create_app;

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        // Without WebGL2 the renderer would panic; tell the host instead.
        if let Err(err) = engine::surface::render_probe::probe_render_context() {
            rpc::web_rpc::notify_parent(
                "viewer_error",
                engine::viewer::reporter::error_payload(&err),
            );
            return;
        }

        let mut app = create_app();
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_app().run();
    }
}

use wasm_bindgen::prelude::*;

use crate::SplashApp;

/// Starts the landing page with the splash cursor in the canvas `canvas_id`.
#[wasm_bindgen]
pub async fn start(canvas_id: String) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("logger already initialized");
    }

    eframe::WebRunner::new()
        .start(
            &canvas_id,
            eframe::WebOptions::default(),
            Box::new(|_cc| Box::new(SplashApp::new(SplashApp::window_config()))),
        )
        .await
}

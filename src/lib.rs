// ============================================================================
// COMEDOR ESCOLAR - NÚCLEO CLIENTE (RUST PURO + MVVM)
// ============================================================================
// Arquitectura MVVM:
// - ViewModels: lógica de sesión, avisos y menús
// - Services: comunicación API, sincronización long-poll, notifier
// - State: feeds fusionados, estado derivado, reactividad
// - Models: estructuras compartidas con el backend
// La capa de vistas (routing, formularios, estilos) vive fuera del núcleo
// y consume los ViewModels y los eventos del notifier.
// ============================================================================

pub mod app;
pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod stores;
pub mod utils;
pub mod viewmodels;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::config::AppConfig;

// Instancia única de la app durante toda la vida del proceso
thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_env();
    if config.enable_logging {
        wasm_logger::init(wasm_logger::Config::default());
    }
    log::info!("🍽️ Comedor Escolar - núcleo cliente ({})", config.environment);

    let app = App::new(config);

    // Cada cambio de autenticación re-alinea los sincronizadores.
    // El listener se registra una sola vez, aquí.
    app.auth.state.subscribe(|| {
        APP.with(|cell| {
            if let Some(app) = &*cell.borrow() {
                app.sync_session_state();
            }
        });
    });

    app.sync_session_state();
    APP.with(|cell| *cell.borrow_mut() = Some(app));
    Ok(())
}

/// Acceso a la app para la capa de vistas
pub fn with_app<R>(reader: impl FnOnce(&App) -> R) -> Option<R> {
    APP.with(|cell| cell.borrow().as_ref().map(reader))
}

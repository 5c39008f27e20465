pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::domain::logging::{LogComponent, get_logger};

/// Wire up the browser-side services once the module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = Box::new(infrastructure::services::ConsoleLogger::new_development());
    domain::logging::init_logger(console_logger);

    get_logger().info(
        LogComponent::Presentation("Initialize"),
        "coin chart module initialized",
    );
}

/// Mount the dashboard UI into the document body.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn mount_chart_app() {
    presentation::mount_chart_app();
}

pub mod application;
pub mod domain;
#[cfg(not(feature = "logic-only"))]
pub mod infrastructure;
#[cfg(not(feature = "logic-only"))]
pub mod presentation;

#[cfg(not(feature = "logic-only"))]
use wasm_bindgen::prelude::*;

/// Install the browser logger, clock and panic hook
#[cfg(not(feature = "logic-only"))]
#[wasm_bindgen(start)]
pub fn initialize() {
    use crate::domain::logging::{LogComponent, get_logger};

    console_error_panic_hook::set_once();

    let console_logger = Box::new(if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    });
    domain::logging::init_logger(console_logger);

    let browser_time_provider = Box::new(infrastructure::services::BrowserTimeProvider::new());
    domain::logging::init_time_provider(browser_time_provider);

    get_logger().info(
        LogComponent::Presentation("Initialize"),
        "🚀 Bands chart module initialized",
    );
}

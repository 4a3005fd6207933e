/// Content script: SPA navigation reporting and the warning overlay
pub mod overlay;
pub mod url_watch;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::{self, BrowserTimer};
use crate::config::ExtensionConfig;
use crate::models::{ExtensionMessage, ModalAck};
use crate::retry::Timer;

pub fn start(config: ExtensionConfig) {
    if let Err(err) = url_watch::watch_spa_navigation() {
        log::error!("Failed to watch for URL changes: {:?}", err);
    }

    chrome::listen_runtime_messages(move |message, _sender_tab| match message {
        ExtensionMessage::ShowSuspiciousModal { summary } => Some(show_warning(&config, summary)),
        ExtensionMessage::ClassifyUrl { .. } => None,
    });
}

fn show_warning(config: &ExtensionConfig, summary: String) -> JsValue {
    log::info!("Showing suspicious URL modal");

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return JsValue::UNDEFINED;
    };

    if let Err(err) = overlay::inject_and_show(&document, config.overlay_show_tick()) {
        log::error!("Failed to inject modal: {:?}", err);
    }

    // The overlay may not be queryable yet on first injection
    let delay = config.overlay_summary_delay();
    spawn_local(async move {
        BrowserTimer.sleep(delay).await;
        overlay::set_summary(&document, &summary);
    });

    chrome::to_js(&ModalAck::shown()).unwrap_or(JsValue::UNDEFINED)
}

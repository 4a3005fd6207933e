/// URL Guard - Chrome Extension that flags suspicious URLs
/// Built with Rust + WASM + Yew

pub mod api;
pub mod background;
pub mod chrome;
pub mod classifier;
pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod history;
pub mod models;
pub mod navigation;
pub mod notifier;
pub mod operations;
pub mod retry;
pub mod session;
pub mod storage;
#[cfg(feature = "ui")]
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

use crate::config::ExtensionConfig;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[cfg(feature = "ui")]
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the history page
#[cfg(feature = "ui")]
#[wasm_bindgen]
pub fn start_history_viewer() {
    yew::Renderer::<ui::history::HistoryViewer>::new().render();
}

// Attach the background handlers; background.js queues events until this runs
#[wasm_bindgen]
pub fn init_background() {
    background::install(ExtensionConfig::from_build_env());
}

// Wire up the in-page navigation watcher and warning overlay
#[wasm_bindgen]
pub fn start_content_script() {
    content::start(ExtensionConfig::from_build_env());
}

/// Navigation watcher, in-page half: catches single-page-app URL changes
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit};

use crate::chrome;
use crate::models::ExtensionMessage;

/// Remembers the last URL seen in this page
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTracker {
    last: String,
}

impl UrlTracker {
    pub fn new(initial: impl Into<String>) -> Self {
        UrlTracker { last: initial.into() }
    }

    /// `Some(url)` when `current` differs from the last URL seen
    pub fn observe(&mut self, current: &str) -> Option<String> {
        if current == self.last {
            return None;
        }
        self.last = current.to_string();
        Some(self.last.clone())
    }
}

/// Observe `document.body` (and subtree) and report URL changes to the
/// background worker for classification.
pub fn watch_spa_navigation() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let location = window.location();

    let tracker = Rc::new(RefCell::new(UrlTracker::new(location.href()?)));

    let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
        let Ok(href) = location.href() else {
            return;
        };
        if let Some(url) = tracker.borrow_mut().observe(&href) {
            log::debug!("URL changed to: {}", url);
            chrome::send_runtime_message(&ExtensionMessage::ClassifyUrl { url });
        }
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)?;

    callback.forget();
    Ok(())
}

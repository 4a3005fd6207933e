/// Bridge to the chrome.* extension APIs through `js/chrome_bridge.js`
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::error::{DeliveryError, ExtensionError, Result};
use crate::models::{ExtensionMessage, ModalAck, TabInfo};
use crate::navigation::{ChangeInfo, ReadyStateProbe, TabSnapshot, TabUpdate};
use crate::notifier::TabMessenger;
use crate::retry::Timer;
use crate::storage::KeyValueStore;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/chrome_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(keys: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn isDocumentComplete(tab_id: i32) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryAllTabs() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openExtensionPage(path: &str) -> std::result::Result<(), JsValue>;

    fn sendRuntimeMessage(message: JsValue);

    fn onTabUpdated(handler: &Closure<dyn FnMut(i32, JsValue, JsValue)>);

    fn onRuntimeMessage(handler: &Closure<dyn FnMut(JsValue, JsValue) -> JsValue>);

    fn onStorageChanged(handler: &Closure<dyn FnMut(JsValue)>);
}

#[wasm_bindgen]
extern "C" {
    // Global in both windows and service workers
    fn setTimeout(handler: &js_sys::Function, timeout: i32) -> JsValue;
}

/// Plain JS objects rather than `Map`s for anything handed to chrome.*
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn js_error_text(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn bridge_error(err: JsValue) -> ExtensionError {
    ExtensionError::Bridge(js_error_text(&err))
}

/// chrome.storage.local
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

#[async_trait(?Send)]
impl KeyValueStore for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = getStorage(to_js(keys)?).await.map_err(bridge_error)?;
        if values.is_null() || values.is_undefined() {
            return Ok(Map::new());
        }
        Ok(serde_wasm_bindgen::from_value(values)?)
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        setStorage(to_js(&entries)?).await.map_err(bridge_error)
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        removeStorage(to_js(keys)?).await.map_err(bridge_error)
    }
}

/// chrome.tabs + chrome.scripting
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

#[async_trait(?Send)]
impl TabMessenger for ChromeTabs {
    async fn send_to_tab(
        &self,
        tab_id: i32,
        message: &ExtensionMessage,
    ) -> std::result::Result<ModalAck, DeliveryError> {
        let message = to_js(message).map_err(|e| DeliveryError::new(e.to_string()))?;
        let reply = sendTabMessage(tab_id, message)
            .await
            .map_err(|err| DeliveryError::new(js_error_text(&err)))?;

        let ack: Option<ModalAck> = serde_wasm_bindgen::from_value(reply).unwrap_or(None);
        Ok(ack.unwrap_or_else(|| ModalAck {
            status: "No response".to_string(),
        }))
    }
}

#[async_trait(?Send)]
impl ReadyStateProbe for ChromeTabs {
    async fn is_document_complete(&self, tab_id: i32) -> Result<bool> {
        let ready = isDocumentComplete(tab_id).await.map_err(bridge_error)?;
        Ok(ready.as_bool().unwrap_or(false))
    }
}

/// setTimeout-backed delays
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            setTimeout(&resolve, millis);
        });
        let _ = JsFuture::from(promise).await;
    }
}

pub async fn query_all_tabs() -> Result<Vec<TabInfo>> {
    let tabs = queryAllTabs().await.map_err(bridge_error)?;
    Ok(serde_wasm_bindgen::from_value(tabs)?)
}

pub async fn open_extension_page(path: &str) -> Result<()> {
    openExtensionPage(path).await.map_err(bridge_error)
}

/// Fire-and-forget message to the background worker
pub fn send_runtime_message(message: &ExtensionMessage) {
    match to_js(message) {
        Ok(message) => sendRuntimeMessage(message),
        Err(err) => log::error!("Failed to encode message: {}", err),
    }
}

pub fn listen_tab_updates(mut handler: impl FnMut(TabUpdate) + 'static) {
    let closure = Closure::wrap(Box::new(move |tab_id: i32, change: JsValue, tab: JsValue| {
        let change: ChangeInfo = serde_wasm_bindgen::from_value(change).unwrap_or_default();
        let tab: TabSnapshot = serde_wasm_bindgen::from_value(tab).unwrap_or_default();
        handler(TabUpdate::new(tab_id, change, tab));
    }) as Box<dyn FnMut(i32, JsValue, JsValue)>);

    onTabUpdated(&closure);
    closure.forget();
}

/// `handler` gets the decoded message and the sender's tab id; a returned
/// value is sent back as the response.
pub fn listen_runtime_messages(mut handler: impl FnMut(ExtensionMessage, Option<i32>) -> Option<JsValue> + 'static) {
    let closure = Closure::wrap(Box::new(move |message: JsValue, sender_tab: JsValue| {
        let message: ExtensionMessage = match serde_wasm_bindgen::from_value(message) {
            Ok(message) => message,
            Err(err) => {
                log::debug!("Ignoring unrecognised message: {}", err);
                return JsValue::UNDEFINED;
            }
        };
        let sender_tab = sender_tab.as_f64().map(|id| id as i32);
        handler(message, sender_tab).unwrap_or(JsValue::UNDEFINED)
    }) as Box<dyn FnMut(JsValue, JsValue) -> JsValue>);

    onRuntimeMessage(&closure);
    closure.forget();
}

/// chrome.storage.onChanged for the local area, as JSON
pub fn watch_storage(mut handler: impl FnMut(Value) + 'static) {
    let closure = Closure::wrap(Box::new(move |changes: JsValue| {
        match serde_wasm_bindgen::from_value::<Value>(changes) {
            Ok(changes) => handler(changes),
            Err(err) => log::warn!("Unreadable storage change: {}", err),
        }
    }) as Box<dyn FnMut(JsValue)>);

    onStorageChanged(&closure);
    closure.forget();
}

/// In-page warning modal
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement};

use crate::chrome::BrowserTimer;
use crate::retry::Timer;

pub const CONTAINER_ID: &str = "suspicious-url-modal-container";
pub const SUMMARY_CONTAINER_ID: &str = "summary-container";
pub const SUMMARY_TEXT_ID: &str = "summary-text";
pub const DETAILS_BUTTON_ID: &str = "modal-details-button";
pub const CLOSE_BUTTON_ID: &str = "modal-close-button";
pub const SHOW_CLASS: &str = "show";

const MODAL_CSS: &str = r#"
@import url('https://fonts.googleapis.com/css?family=Poppins&display=swap');

#suspicious-url-modal-container * {
    box-sizing: border-box;
    font-family: 'Poppins', sans-serif;
    margin: 0;
    padding: 0;
    line-height: initial;
    border: initial;
    background: initial;
    color: initial;
    text-align: initial;
}

#suspicious-url-modal-container {
    background-color: rgba(0, 0, 0, 0.6);
    display: flex;
    align-items: center;
    justify-content: center;
    position: fixed;
    opacity: 0;
    pointer-events: none;
    top: 0;
    left: 0;
    height: 100vh;
    width: 100vw;
    z-index: 999999;
    transition: opacity 0.3s ease;
}

#suspicious-url-modal-container.show {
    pointer-events: auto;
    opacity: 1;
}

#suspicious-url-modal-container .modal-content {
    background-color: #fff;
    border-radius: 5px;
    box-shadow: 0 5px 15px rgba(0, 0, 0, 0.3);
    padding: 30px 50px;
    width: 500px;
    max-width: 90%;
    text-align: center;
    color: #333;
    transform: translateY(-50px);
    transition: transform 0.3s ease;
}

#suspicious-url-modal-container.show .modal-content {
    transform: translateY(0);
}

#suspicious-url-modal-container h1 {
    margin-bottom: 15px;
    color: #d9534f;
    font-size: 22px;
}

#suspicious-url-modal-container p {
    font-size: 15px;
    opacity: 0.9;
    margin-bottom: 20px;
    line-height: 1.5;
}

#suspicious-url-modal-container .summary-container {
    margin: 15px 0;
    padding: 10px;
    background-color: #f8f8f8;
    border-radius: 5px;
    border-left: 4px solid #4285f4;
}

#suspicious-url-modal-container .summary-text {
    font-size: 14px;
    line-height: 1.4;
    color: #333;
}

#suspicious-url-modal-container .buttons-container {
    display: flex;
    justify-content: center;
    margin-top: 15px;
}

#suspicious-url-modal-container button {
    background-color: #474747;
    border: 0;
    border-radius: 5px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.2);
    color: #fff;
    font-size: 14px;
    padding: 10px 25px;
    cursor: pointer;
    margin: 0 5px;
}

#suspicious-url-modal-container #modal-details-button {
    background-color: #4285f4;
}

#suspicious-url-modal-container #modal-close-button {
    background-color: #d9534f;
}
"#;

/// Label of the details toggle for the given expanded state
pub fn details_label(expanded: bool) -> &'static str {
    if expanded { "Hide Details" } else { "Show Details" }
}

/// Show the overlay, creating it on first use. Returns `true` when the DOM
/// was built, `false` when an existing overlay was only re-shown.
pub fn inject_and_show(document: &Document, show_tick: Duration) -> Result<bool, JsValue> {
    if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
        existing.class_list().add_1(SHOW_CLASS)?;
        return Ok(false);
    }

    let style = document.create_element("style")?;
    style.set_attribute("type", "text/css")?;
    style.set_text_content(Some(MODAL_CSS));
    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?
            .append_child(&style)?,
    };

    let container = document.create_element("div")?;
    container.set_id(CONTAINER_ID);

    let modal = element(document, "div", None, Some("modal-content"), None)?;
    let heading = element(document, "h1", None, None, Some("Suspicious URL Detected"))?;
    let caution = element(
        document,
        "p",
        None,
        None,
        Some("This website has been flagged as potentially unsafe. Proceed with caution."),
    )?;

    let summary_container: HtmlElement =
        element(document, "div", Some(SUMMARY_CONTAINER_ID), Some("summary-container"), None)?.dyn_into()?;
    summary_container.style().set_property("display", "none")?;
    let summary_text = element(document, "p", Some(SUMMARY_TEXT_ID), Some("summary-text"), None)?;
    summary_container.append_child(&summary_text)?;

    let buttons = element(document, "div", None, Some("buttons-container"), None)?;
    let details_button = element(document, "button", Some(DETAILS_BUTTON_ID), None, Some(details_label(false)))?;
    let close_button = element(document, "button", Some(CLOSE_BUTTON_ID), None, Some("Acknowledge & Close"))?;

    modal.append_child(&heading)?;
    modal.append_child(&caution)?;
    modal.append_child(&summary_container)?;
    buttons.append_child(&details_button)?;
    buttons.append_child(&close_button)?;
    modal.append_child(&buttons)?;
    container.append_child(&modal)?;

    document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?
        .append_child(&container)?;

    // Close hides the overlay but keeps the nodes for the next warning
    {
        let container = container.clone();
        on_click(&close_button, move || {
            let _ = container.class_list().remove_1(SHOW_CLASS);
        })?;
    }

    {
        let toggle = details_button.clone();
        on_click(&details_button, move || {
            let style = summary_container.style();
            let hidden = style.get_property_value("display").map(|d| d == "none").unwrap_or(true);
            let _ = style.set_property("display", if hidden { "block" } else { "none" });
            toggle.set_text_content(Some(details_label(hidden)));
        })?;
    }

    // Add `show` a tick later so the opacity transition runs
    spawn_local(async move {
        BrowserTimer.sleep(show_tick).await;
        if let Err(err) = container.class_list().add_1(SHOW_CLASS) {
            log::error!("Failed to show modal: {:?}", err);
        }
    });

    log::info!("Suspicious URL modal injected");
    Ok(true)
}

/// Write the explanation into the details region. Returns false when the
/// overlay is not in the page.
pub fn set_summary(document: &Document, summary: &str) -> bool {
    match document.get_element_by_id(SUMMARY_TEXT_ID) {
        Some(text) => {
            text.set_text_content(Some(summary));
            true
        }
        None => {
            log::error!("Summary text element not found in modal");
            false
        }
    }
}

fn element(
    document: &Document,
    tag: &str,
    id: Option<&str>,
    class: Option<&str>,
    text: Option<&str>,
) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    if let Some(id) = id {
        el.set_id(id);
    }
    if let Some(class) = class {
        el.class_list().add_1(class)?;
    }
    if text.is_some() {
        el.set_text_content(text);
    }
    Ok(el)
}

fn on_click(target: &Element, mut handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| handler()) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

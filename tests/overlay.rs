#![cfg(target_arch = "wasm32")]

use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement};

use url_guard::content::overlay::{
    CLOSE_BUTTON_ID, CONTAINER_ID, DETAILS_BUTTON_ID, SHOW_CLASS, SUMMARY_CONTAINER_ID, SUMMARY_TEXT_ID,
    inject_and_show, set_summary,
};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn reset(document: &Document) {
    if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
        existing.remove();
    }
}

fn button(document: &Document, id: &str) -> HtmlElement {
    document.get_element_by_id(id).unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn test_second_warning_reuses_overlay() {
    let document = document();
    reset(&document);

    assert!(inject_and_show(&document, Duration::ZERO).unwrap());
    assert!(!inject_and_show(&document, Duration::ZERO).unwrap());

    let containers = document.query_selector_all(&format!("#{}", CONTAINER_ID)).unwrap();
    assert_eq!(containers.length(), 1);

    let container = document.get_element_by_id(CONTAINER_ID).unwrap();
    assert!(container.class_list().contains(SHOW_CLASS));
}

#[wasm_bindgen_test]
fn test_summary_lands_in_details_region() {
    let document = document();
    reset(&document);

    assert!(!set_summary(&document, "Lookalike domain"));

    inject_and_show(&document, Duration::ZERO).unwrap();
    assert!(set_summary(&document, "Lookalike domain"));

    let text = document.get_element_by_id(SUMMARY_TEXT_ID).unwrap();
    assert_eq!(text.text_content().unwrap(), "Lookalike domain");
}

#[wasm_bindgen_test]
fn test_details_toggle_and_close() {
    let document = document();
    reset(&document);
    inject_and_show(&document, Duration::ZERO).unwrap();

    let summary: HtmlElement = document.get_element_by_id(SUMMARY_CONTAINER_ID).unwrap().dyn_into().unwrap();
    let details = button(&document, DETAILS_BUTTON_ID);
    assert_eq!(summary.style().get_property_value("display").unwrap(), "none");

    details.click();
    assert_eq!(summary.style().get_property_value("display").unwrap(), "block");
    assert_eq!(details.text_content().unwrap(), "Hide Details");

    details.click();
    assert_eq!(summary.style().get_property_value("display").unwrap(), "none");
    assert_eq!(details.text_content().unwrap(), "Show Details");

    // Re-show synchronously so the close assertion doesn't race the show tick
    inject_and_show(&document, Duration::ZERO).unwrap();
    button(&document, CLOSE_BUTTON_ID).click();

    let container = document.get_element_by_id(CONTAINER_ID).unwrap();
    assert!(!container.class_list().contains(SHOW_CLASS));
    assert!(document.get_element_by_id(CONTAINER_ID).is_some());
}

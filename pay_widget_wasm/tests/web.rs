//! Browser tests for the DOM-facing pieces of the widget.
#![cfg(target_arch = "wasm32")]

use pay_widget_core::ports::{HostBridge, Notifier, ScriptCallbacks, ScriptSpec, View, ViewModel};
use pay_widget_core::Phase;
use pay_widget_wasm::bridge::{WebViewBridge, BRIDGE_GLOBAL};
use pay_widget_wasm::dom::{self, DomView};
use pay_widget_wasm::sdk::sdk_error_from_js;
use pay_widget_wasm::toast::DomToastNotifier;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn window() -> web_sys::Window {
    web_sys::window().unwrap()
}

fn model() -> ViewModel {
    ViewModel {
        phase: Phase::AwaitingSubmission,
        overlay_visible: false,
        form_visible: true,
        button_label: "Add Card".to_string(),
        button_disabled: false,
        button_css: "border: 0px;".to_string(),
        loading: false,
        spinner_color: None,
        error_banner: None,
        complete_message: None,
    }
}

#[wasm_bindgen_test]
fn test_bridge_missing_is_an_error() {
    js_sys::Reflect::delete_property(&window().into(), &JsValue::from_str(BRIDGE_GLOBAL)).unwrap();
    assert!(WebViewBridge.post_message("true").is_err());
}

#[wasm_bindgen_test]
fn test_bridge_posts_message() {
    let bridge = js_sys::Object::new();
    let post = js_sys::Function::new_with_args("m", "window.__posted = m;");
    js_sys::Reflect::set(&bridge, &JsValue::from_str("postMessage"), &post).unwrap();
    js_sys::Reflect::set(&window(), &JsValue::from_str(BRIDGE_GLOBAL), &bridge).unwrap();

    WebViewBridge.post_message("true").unwrap();

    let posted = js_sys::Reflect::get(&window(), &JsValue::from_str("__posted")).unwrap();
    assert_eq!(posted.as_string().as_deref(), Some("true"));
}

#[wasm_bindgen_test]
fn test_layout_and_render() {
    let document = dom::document().unwrap();
    let view = DomView::new(document.clone(), "tyro-pay-form");
    view.ensure_layout().unwrap();
    view.ensure_layout().unwrap();

    for id in [dom::FORM_ID, dom::OVERLAY_ID, dom::SUBMIT_ID, dom::TOASTS_ID, "tyro-pay-form"] {
        assert!(document.get_element_by_id(id).is_some(), "missing #{}", id);
    }
    assert_eq!(document.query_selector_all("#pay-form-submit").unwrap().length(), 1);

    let mut submitting = model();
    submitting.button_disabled = true;
    submitting.overlay_visible = true;
    view.render(&submitting);

    let button = document.get_element_by_id(dom::SUBMIT_ID).unwrap();
    assert!(button.has_attribute("disabled"));
    assert_eq!(button.text_content().as_deref(), Some("Add Card"));
    let style = button.get_attribute("style").unwrap();
    assert!(style.contains("border: 0px;"));
    assert!(style.contains("visibility: visible;"));

    view.render(&model());
    assert!(!button.has_attribute("disabled"));
}

#[wasm_bindgen_test]
fn test_clear_mount_point() {
    let document = dom::document().unwrap();
    let view = DomView::new(document.clone(), "tyro-pay-form");
    view.ensure_layout().unwrap();
    document
        .get_element_by_id("tyro-pay-form")
        .unwrap()
        .set_inner_html("<iframe></iframe>");

    assert!(view.clear_mount_point("tyro-pay-form"));
    assert_eq!(document.get_element_by_id("tyro-pay-form").unwrap().inner_html(), "");
    assert!(!view.clear_mount_point("no-such-element"));
}

#[wasm_bindgen_test]
fn test_toast_is_appended() {
    let document = dom::document().unwrap();
    DomView::new(document.clone(), "tyro-pay-form").ensure_layout().unwrap();
    let container = document.get_element_by_id(dom::TOASTS_ID).unwrap();
    let before = container.child_element_count();

    DomToastNotifier::new(document).toast_error("Error: declined");

    assert_eq!(container.child_element_count(), before + 1);
    assert_eq!(container.last_element_child().unwrap().text_content().as_deref(), Some("Error: declined"));
}

#[wasm_bindgen_test]
fn test_sdk_error_from_js_object() {
    let err = js_sys::Object::new();
    js_sys::Reflect::set(&err, &"type".into(), &"CLIENT_VALIDATION_ERROR".into()).unwrap();
    js_sys::Reflect::set(&err, &"message".into(), &"Card number is invalid".into()).unwrap();

    let parsed = sdk_error_from_js(&err.into());
    assert_eq!(parsed.error_type.as_deref(), Some("CLIENT_VALIDATION_ERROR"));
    assert_eq!(parsed.error_code, None);
    assert!(parsed.is_ignorable_validation());

    let thrown = js_sys::Error::new("Pay Form is not mounted");
    assert_eq!(sdk_error_from_js(&thrown.into()).to_string(), "Error: Pay Form is not mounted");
    assert_eq!(sdk_error_from_js(&"plain".into()).message, "plain");
}

#[wasm_bindgen_test]
fn test_loading_script_tag_is_reused() {
    let document = dom::document().unwrap();
    let pending = document.create_element("script").unwrap();
    pending.set_id("pending-pay-library");
    document.body().unwrap().append_child(&pending).unwrap();

    let loaded = Rc::new(Cell::new(false));
    let flag = loaded.clone();
    let callbacks = ScriptCallbacks {
        on_load: Box::new(move || flag.set(true)),
        on_error: Box::new(|_| {}),
    };
    let view = DomView::new(document.clone(), "tyro-pay-form");
    view.inject_script(&ScriptSpec::new("pending-pay-library", "https://pay.example/lib.js"), callbacks)
        .unwrap();

    assert_eq!(document.query_selector_all("#pending-pay-library").unwrap().length(), 1);
    assert!(!loaded.get());
    pending.dispatch_event(&web_sys::Event::new("load").unwrap()).unwrap();
    assert!(loaded.get());
}

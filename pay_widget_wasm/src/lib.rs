// Pay Widget WASM Bindings
// Embeds the tyro.js card form in a WebView page and reports the result to the host app
#![cfg(target_arch = "wasm32")]

use log::info;
use pay_widget_core::{Controller, Event, Phase, Ports, QueryParams, WidgetSettings};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod bindings;
pub mod bridge;
pub mod dom;
pub mod scheduler;
pub mod sdk;
pub mod toast;

use bridge::WebViewBridge;
use dom::DomView;
use scheduler::BrowserScheduler;
use sdk::TyroSdkFactory;
use toast::DomToastNotifier;

// Initialize panic hook and logger for WASM
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

#[derive(Serialize)]
struct WidgetStatus {
    phase: Phase,
    flags: pay_widget_core::LifecycleFlags,
    live_mode: bool,
}

/// The embeddable payment widget.
#[wasm_bindgen]
pub struct PayWidget {
    controller: Controller,
    view: Rc<DomView>,
    submit_listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
    form_listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

#[wasm_bindgen]
impl PayWidget {
    /// Widget with default settings, seeded from the page query string
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<PayWidget, JsValue> {
        Self::build(WidgetSettings::default())
    }

    /// Widget configured from a JSON settings object
    #[wasm_bindgen]
    pub fn with_settings(settings_json: &str) -> Result<PayWidget, JsValue> {
        let settings = WidgetSettings::from_json(settings_json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse settings: {}", e)))?;
        Self::build(settings)
    }

    fn build(settings: WidgetSettings) -> Result<PayWidget, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let search = window.location().search()?;
        let document = dom::document()?;

        let view = Rc::new(DomView::new(document.clone(), settings.mount_id()));
        let secret_source = settings.secret_endpoint.as_ref().map(|_| {
            Rc::new(pay_widget_core::wasm::FetchSecretSource::new()) as Rc<dyn pay_widget_core::SecretSource>
        });
        let ports = Ports {
            sdk_factory: Rc::new(TyroSdkFactory),
            view: view.clone(),
            notifier: Rc::new(DomToastNotifier::new(document)),
            bridge: Rc::new(WebViewBridge),
            secret_source,
            scheduler: Rc::new(BrowserScheduler),
        };
        let controller = Controller::new(settings, QueryParams::parse(&search), ports);
        Ok(Self {
            controller,
            view,
            submit_listener: None,
            form_listener: None,
        })
    }

    /// Build the page layout, wire the submit button and start loading the SDK
    #[wasm_bindgen]
    pub fn mount(&mut self) -> Result<(), JsValue> {
        if self.submit_listener.is_some() {
            return Ok(());
        }
        self.view.ensure_layout()?;
        let document = dom::document()?;

        let sender = self.controller.sender();
        let on_click = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            sender.send(Event::SubmitClicked);
        }) as Box<dyn FnMut(_)>);
        if let Some(button) = document.get_element_by_id(dom::SUBMIT_ID) {
            button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        }

        // The form must never navigate the WebView
        let on_submit = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
        }) as Box<dyn FnMut(_)>);
        if let Some(form) = document.get_element_by_id(dom::FORM_ID) {
            form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
        }

        self.submit_listener = Some(on_click);
        self.form_listener = Some(on_submit);
        info!("Mounting payment widget");
        self.controller.sender().send(Event::Mounted);
        Ok(())
    }

    /// Submit the entered card details, as if the button was clicked
    #[wasm_bindgen]
    pub fn submit(&self) {
        self.controller.sender().send(Event::SubmitClicked);
    }

    /// Provide the pay secret when the page URL does not carry one
    #[wasm_bindgen]
    pub fn resolve_secret(&self, secret: String) {
        self.controller.sender().send(Event::SecretResolved(secret));
    }

    /// Stop reacting to SDK callbacks and detach the page listeners
    #[wasm_bindgen]
    pub fn teardown(&mut self) -> Result<(), JsValue> {
        let document = dom::document()?;
        if let (Some(listener), Some(button)) =
            (self.submit_listener.take(), document.get_element_by_id(dom::SUBMIT_ID))
        {
            button.remove_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        }
        if let (Some(listener), Some(form)) =
            (self.form_listener.take(), document.get_element_by_id(dom::FORM_ID))
        {
            form.remove_event_listener_with_callback("submit", listener.as_ref().unchecked_ref())?;
        }
        self.controller.sender().send(Event::Teardown);
        Ok(())
    }

    /// Current lifecycle phase name
    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.controller.phase().to_string()
    }

    /// Phase and flags as JSON
    #[wasm_bindgen]
    pub fn get_status(&self) -> Result<String, JsValue> {
        let status = WidgetStatus {
            phase: self.controller.phase(),
            flags: self.controller.flags(),
            live_mode: self.controller.live_mode(),
        };
        serde_json::to_string(&status)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize status: {}", e)))
    }

    /// Recorded phase transitions as JSON
    #[wasm_bindgen]
    pub fn get_history(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.history())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize history: {}", e)))
    }
}

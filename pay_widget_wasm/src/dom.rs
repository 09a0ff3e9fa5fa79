// DOM view: page layout, SDK script injection and state rendering

use log::{debug, warn};
use pay_widget_core::error::{WidgetError, WidgetResult};
use pay_widget_core::ports::{ScriptCallbacks, ScriptSpec, View, ViewModel};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlScriptElement};

pub const ROOT_ID: &str = "pay-widget";
pub const ERROR_ID: &str = "pay-form-error";
pub const FORM_ID: &str = "pay-form";
pub const OVERLAY_ID: &str = "pay-form-submitting-overlay";
pub const SUBMIT_ID: &str = "pay-form-submit";
pub const LOADING_ID: &str = "pay-widget-loading";
pub const COMPLETE_ID: &str = "pay-widget-complete";
pub const TOASTS_ID: &str = "pay-widget-toasts";

const OVERLAY_STYLE: &str =
    "position: absolute; width: 100%; height: 100%; background-color: rgba(255,255,255,0.5);";
const LOADING_STYLE: &str = "position: fixed; inset: 0; align-items: center; justify-content: center; \
     background-color: rgba(255,255,255,0.8);";

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))
}

/// Renders the widget into the page.
pub struct DomView {
    document: Document,
    mount_id: String,
}

impl DomView {
    pub fn new(document: Document, mount_id: &str) -> Self {
        Self {
            document,
            mount_id: mount_id.to_string(),
        }
    }

    fn element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn create(&self, tag: &str, id: &str, parent: &Element) -> Result<Element, JsValue> {
        let el = self.document.create_element(tag)?;
        el.set_id(id);
        parent.append_child(&el)?;
        Ok(el)
    }

    /// Create any part of the page contract that the host page did not ship.
    pub fn ensure_layout(&self) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?;

        let root: Element = match self.document.get_element_by_id(ROOT_ID) {
            Some(root) => root,
            None => {
                let root = self.create("div", ROOT_ID, &body)?;
                root.set_attribute(
                    "style",
                    "display: flex; flex-direction: column; position: relative; padding-top: 15px;",
                )?;
                root
            }
        };
        if self.document.get_element_by_id(ERROR_ID).is_none() {
            let error = self.create("div", ERROR_ID, &root)?;
            error.set_class_name("error-container");
            error.set_attribute("style", "display: none;")?;
        }
        let form = match self.document.get_element_by_id(FORM_ID) {
            Some(form) => form,
            None => self.create("form", FORM_ID, &root)?,
        };
        if self.document.get_element_by_id(OVERLAY_ID).is_none() {
            let overlay = self.create("div", OVERLAY_ID, &form)?;
            overlay.set_text_content(Some("... Submitting ..."));
            overlay.set_attribute("style", &format!("display: none; {}", OVERLAY_STYLE))?;
        }
        if self.document.get_element_by_id(&self.mount_id).is_none() {
            let mount = self.create("div", &self.mount_id, &form)?;
            mount.set_attribute("style", "visibility: hidden;")?;
        }
        if self.document.get_element_by_id(SUBMIT_ID).is_none() {
            let button = self.create("button", SUBMIT_ID, &form)?;
            button.set_attribute("type", "button")?;
        }
        if self.document.get_element_by_id(COMPLETE_ID).is_none() {
            let complete = self.create("p", COMPLETE_ID, &root)?;
            complete.set_attribute("style", "display: none;")?;
        }
        if self.document.get_element_by_id(TOASTS_ID).is_none() {
            let toasts = self.create("div", TOASTS_ID, &body)?;
            toasts.set_attribute(
                "style",
                "position: fixed; top: 12px; left: 12px; right: 12px; z-index: 9999;",
            )?;
        }
        if self.document.get_element_by_id(LOADING_ID).is_none() {
            let loading = self.create("div", LOADING_ID, &body)?;
            loading.set_attribute("role", "status")?;
            loading.set_attribute("aria-label", "loading")?;
            loading.set_text_content(Some("Loading..."));
            loading.set_attribute("style", &format!("display: none; {}", LOADING_STYLE))?;
        }
        Ok(())
    }

    fn set_style(&self, id: &str, property: &str, value: &str) {
        if let Some(el) = self.element(id) {
            if let Err(e) = el.style().set_property(property, value) {
                warn!("Failed to set {} on #{}: {:?}", property, id, e);
            }
        }
    }

    fn render_button(&self, model: &ViewModel) {
        let Some(button) = self
            .document
            .get_element_by_id(SUBMIT_ID)
            .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
        else {
            return;
        };
        button.set_disabled(model.button_disabled);
        button.set_text_content(Some(&model.button_label));
        let visibility = if model.form_visible { "visible" } else { "hidden" };
        let style = format!("{} visibility: {};", model.button_css, visibility);
        if let Err(e) = button.set_attribute("style", &style) {
            warn!("Failed to style submit button: {:?}", e);
        }
    }

    fn render_text(&self, id: &str, text: Option<&str>) {
        if let Some(el) = self.element(id) {
            el.set_text_content(text);
            let display = if text.is_some() { "block" } else { "none" };
            if let Err(e) = el.style().set_property("display", display) {
                warn!("Failed to toggle #{}: {:?}", id, e);
            }
        }
    }
}

impl View for DomView {
    fn inject_script(&self, script: &ScriptSpec, callbacks: ScriptCallbacks) -> WidgetResult<()> {
        let existing = self.document.get_element_by_id(&script.id);
        if existing.is_some() && crate::bindings::tyro_available() {
            debug!("Payment library already present");
            (callbacks.on_load)();
            return Ok(());
        }

        // A tag that is still loading gets our listeners instead of a duplicate
        let (el, is_new): (Element, bool) = match existing {
            Some(el) => {
                debug!("Payment library still loading, attaching to existing tag");
                (el, false)
            }
            None => {
                let el: HtmlScriptElement = self
                    .document
                    .create_element("script")
                    .map_err(|e| WidgetError::Config(format!("Failed to create script tag: {:?}", e)))?
                    .dyn_into()
                    .map_err(|_| WidgetError::Config("Created element is not a script".to_string()))?;
                el.set_id(&script.id);
                el.set_src(&script.src);
                el.set_cross_origin(Some(&script.cross_origin));
                el.set_async(script.is_async);
                (el.into(), true)
            }
        };

        let on_load = callbacks.on_load;
        let on_error = callbacks.on_error;
        let src = script.src.clone();
        let load = Closure::once_into_js(move |_event: web_sys::Event| on_load());
        let error = Closure::once_into_js(move |_event: web_sys::Event| {
            on_error(format!("could not load {}", src))
        });
        el.add_event_listener_with_callback("load", load.unchecked_ref())
            .map_err(|e| WidgetError::Config(format!("Failed to listen for script load: {:?}", e)))?;
        el.add_event_listener_with_callback("error", error.unchecked_ref())
            .map_err(|e| WidgetError::Config(format!("Failed to listen for script error: {:?}", e)))?;

        if is_new {
            let body = self
                .document
                .body()
                .ok_or_else(|| WidgetError::Config("Document has no body".to_string()))?;
            body.append_child(&el)
                .map_err(|e| WidgetError::Config(format!("Failed to append script tag: {:?}", e)))?;
        }
        Ok(())
    }

    fn clear_mount_point(&self, mount_id: &str) -> bool {
        match self.document.get_element_by_id(mount_id) {
            Some(el) => {
                el.set_inner_html("");
                true
            }
            None => false,
        }
    }

    fn render(&self, model: &ViewModel) {
        self.set_style(OVERLAY_ID, "display", if model.overlay_visible { "block" } else { "none" });
        self.set_style(
            &self.mount_id,
            "visibility",
            if model.form_visible { "visible" } else { "hidden" },
        );
        self.render_button(model);
        self.render_text(ERROR_ID, model.error_banner.as_deref());
        self.render_text(COMPLETE_ID, model.complete_message.as_deref());

        self.set_style(LOADING_ID, "display", if model.loading { "flex" } else { "none" });
        if let Some(color) = &model.spinner_color {
            self.set_style(LOADING_ID, "color", color);
        }
    }
}

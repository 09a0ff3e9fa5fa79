// Host bridge: `window.ReactNativeWebView.postMessage`

use log::info;
use pay_widget_core::error::{WidgetError, WidgetResult};
use pay_widget_core::ports::HostBridge;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub const BRIDGE_GLOBAL: &str = "ReactNativeWebView";

#[derive(Default)]
pub struct WebViewBridge;

impl HostBridge for WebViewBridge {
    fn post_message(&self, message: &str) -> WidgetResult<()> {
        let window = web_sys::window()
            .ok_or_else(|| WidgetError::Bridge("No window".to_string()))?;
        let bridge = js_sys::Reflect::get(&window, &JsValue::from_str(BRIDGE_GLOBAL))
            .map_err(|e| WidgetError::Bridge(format!("{:?}", e)))?;
        if bridge.is_undefined() || bridge.is_null() {
            return Err(WidgetError::Bridge(format!("{} is not available", BRIDGE_GLOBAL)));
        }
        let post: js_sys::Function = js_sys::Reflect::get(&bridge, &JsValue::from_str("postMessage"))
            .map_err(|e| WidgetError::Bridge(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| WidgetError::Bridge("postMessage is not a function".to_string()))?;
        post.call1(&bridge, &JsValue::from_str(message))
            .map_err(|e| WidgetError::Bridge(format!("postMessage failed: {:?}", e)))?;
        info!("Posted payment result to host");
        Ok(())
    }
}

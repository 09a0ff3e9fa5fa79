// WASM pay secret source using the browser fetch API

use crate::error::{WidgetError, WidgetResult};
use crate::ports::SecretSource;
use crate::secret::parse_secret_response;
use async_trait::async_trait;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Fetches the pay secret from a merchant endpoint
pub struct FetchSecretSource;

impl FetchSecretSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FetchSecretSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl SecretSource for FetchSecretSource {
    async fn fetch_secret(&self, endpoint: &str) -> WidgetResult<String> {
        debug!("Fetching pay secret from {}", endpoint);

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(endpoint, &opts)
            .map_err(|e| WidgetError::Http(format!("Failed to create request: {:?}", e)))?;
        request
            .headers()
            .set("Accept", "application/json, text/plain")
            .map_err(|e| WidgetError::Http(format!("Failed to set headers: {:?}", e)))?;

        let window = web_sys::window()
            .ok_or_else(|| WidgetError::Http("No window object available".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| WidgetError::Http(format!("Fetch failed: {:?}", e)))?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| WidgetError::Http("Failed to cast response".to_string()))?;

        if !resp.ok() {
            return Err(WidgetError::Http(format!("HTTP error: {}", resp.status())));
        }

        let text_promise = resp
            .text()
            .map_err(|e| WidgetError::Http(format!("Failed to get text: {:?}", e)))?;

        let text_value = JsFuture::from(text_promise)
            .await
            .map_err(|e| WidgetError::Http(format!("Failed to await text: {:?}", e)))?;

        let text = text_value
            .as_string()
            .ok_or_else(|| WidgetError::Http("Response text is not a string".to_string()))?;

        parse_secret_response(&text)
    }
}

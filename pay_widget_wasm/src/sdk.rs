// tyro.js implementation of the core SDK traits

use crate::bindings::{self, JsPayForm, JsTyro};
use async_trait::async_trait;
use log::debug;
use pay_widget_core::config::{Configuration, WalletOption};
use pay_widget_core::error::SdkError;
use pay_widget_core::sdk::{
    PayForm, PayRequest, PaySdk, SdkFactory, SdkResult, WalletEvent, WalletKind, WalletSink,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TyroOptions {
    live_mode: bool,
}

/// The subset of `Configuration` that `createPayForm` accepts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PayFormConfig<'a> {
    theme: &'a str,
    style_props: &'a BTreeMap<String, String>,
    options: &'a BTreeMap<String, WalletOption>,
}

fn read_string(value: &JsValue, key: &str) -> Option<String> {
    js_sys::Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.is_empty())
}

/// Convert a rejection or thrown value into the SDK error shape.
pub fn sdk_error_from_js(value: &JsValue) -> SdkError {
    if let Some(text) = value.as_string() {
        return SdkError::message(text);
    }
    if value.is_object() {
        let message = read_string(value, "message")
            .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
            .unwrap_or_else(|| format!("{:?}", value));
        return SdkError {
            error_type: read_string(value, "type"),
            error_code: read_string(value, "errorCode"),
            message,
        };
    }
    SdkError::message(format!("{:?}", value))
}

fn to_js<T: Serialize>(value: &T) -> SdkResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| SdkError::message(format!("Failed to serialize SDK options: {}", e)))
}

async fn await_promise(promise: Result<js_sys::Promise, JsValue>) -> SdkResult<JsValue> {
    let promise = promise.map_err(|e| sdk_error_from_js(&e))?;
    JsFuture::from(promise).await.map_err(|e| sdk_error_from_js(&e))
}

/// Builds `TyroSdk` instances from the global `Tyro` constructor
pub struct TyroSdkFactory;

impl SdkFactory for TyroSdkFactory {
    fn create(&self, live_mode: bool) -> SdkResult<Rc<dyn PaySdk>> {
        if !bindings::tyro_available() {
            return Err(SdkError::message("Tyro is not defined"));
        }
        let options = to_js(&TyroOptions { live_mode })?;
        let js = bindings::new_tyro(&options).map_err(|e| sdk_error_from_js(&e))?;
        Ok(Rc::new(TyroSdk { js }))
    }
}

pub struct TyroSdk {
    js: JsTyro,
}

#[async_trait(?Send)]
impl PaySdk for TyroSdk {
    async fn init(&self, pay_secret: &str) -> SdkResult<()> {
        await_promise(self.js.init(pay_secret)).await?;
        Ok(())
    }

    async fn create_pay_form(&self, configuration: &Configuration) -> SdkResult<Box<dyn PayForm>> {
        let config = to_js(&PayFormConfig {
            theme: &configuration.theme,
            style_props: &configuration.style_props,
            options: &configuration.options,
        })?;
        let js = self.js.create_pay_form(&config).map_err(|e| sdk_error_from_js(&e))?;
        Ok(Box::new(TyroPayForm { js, listeners: Vec::new() }))
    }

    async fn submit_pay(&self) -> SdkResult<()> {
        await_promise(self.js.submit_pay()).await?;
        Ok(())
    }

    async fn fetch_pay_request(&self) -> SdkResult<PayRequest> {
        let value = await_promise(self.js.fetch_pay_request()).await?;
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| SdkError::message(format!("Unexpected pay request: {}", e)))
    }
}

pub struct TyroPayForm {
    js: JsPayForm,
    // Closures must outlive the form so the SDK can keep calling them
    listeners: Vec<Closure<dyn FnMut(JsValue, JsValue)>>,
}

fn wallet_kind(value: &JsValue) -> WalletKind {
    WalletKind::from_sdk(&value.as_string().unwrap_or_default())
}

impl PayForm for TyroPayForm {
    fn set_wallet_listeners(&mut self, sink: WalletSink) -> SdkResult<()> {
        let begin_sink = sink.clone();
        let on_begin = Closure::wrap(Box::new(move |payment_type: JsValue, _: JsValue| {
            begin_sink(WalletEvent::Begin(wallet_kind(&payment_type)));
        }) as Box<dyn FnMut(JsValue, JsValue)>);

        let cancel_sink = sink.clone();
        let on_cancel = Closure::wrap(Box::new(move |payment_type: JsValue, _: JsValue| {
            cancel_sink(WalletEvent::Cancelled(wallet_kind(&payment_type)));
        }) as Box<dyn FnMut(JsValue, JsValue)>);

        let on_complete = Closure::wrap(Box::new(move |payment_type: JsValue, error: JsValue| {
            let error = (!error.is_null() && !error.is_undefined()).then(|| sdk_error_from_js(&error));
            sink(WalletEvent::Complete(wallet_kind(&payment_type), error));
        }) as Box<dyn FnMut(JsValue, JsValue)>);

        self.js
            .set_wallet_payment_begin_listener(on_begin.as_ref().unchecked_ref())
            .map_err(|e| sdk_error_from_js(&e))?;
        self.js
            .set_wallet_payment_cancelled_listener(on_cancel.as_ref().unchecked_ref())
            .map_err(|e| sdk_error_from_js(&e))?;
        self.js
            .set_wallet_payment_complete_listener(on_complete.as_ref().unchecked_ref())
            .map_err(|e| sdk_error_from_js(&e))?;

        debug!("Wallet listeners attached");
        self.listeners = vec![on_begin, on_cancel, on_complete];
        Ok(())
    }

    fn inject(&self, selector: &str) -> SdkResult<()> {
        self.js.inject(selector).map_err(|e| sdk_error_from_js(&e))
    }
}

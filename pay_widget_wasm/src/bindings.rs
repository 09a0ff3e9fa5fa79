//! Low-level wasm-bindgen bindings to tyro.js.
//!
//! Exposes the raw SDK handles (`JsTyro`, `JsPayForm`). Every method is
//! `catch` so thrown SDK errors surface as `Err(JsValue)` instead of traps.
//! Higher-level wrappers live in `sdk.rs`.

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Raw tyro.js client handle.
    #[derive(Debug, Clone)]
    pub type JsTyro;

    /// Raw pay form handle returned by `createPayForm`.
    #[derive(Debug, Clone)]
    pub type JsPayForm;

    /// `Tyro({ liveMode })` → `JsTyro`
    #[wasm_bindgen(js_name = Tyro, catch)]
    pub fn new_tyro(options: &JsValue) -> Result<JsTyro, JsValue>;

    /// `tyro.init(paySecret)` → `Promise<void>`
    #[wasm_bindgen(method, catch, js_name = init)]
    pub fn init(this: &JsTyro, pay_secret: &str) -> Result<Promise, JsValue>;

    /// `tyro.createPayForm({ theme, styleProps, options })` → `JsPayForm`
    #[wasm_bindgen(method, catch, js_name = createPayForm)]
    pub fn create_pay_form(this: &JsTyro, config: &JsValue) -> Result<JsPayForm, JsValue>;

    /// `tyro.submitPay()` → `Promise<void>`
    #[wasm_bindgen(method, catch, js_name = submitPay)]
    pub fn submit_pay(this: &JsTyro) -> Result<Promise, JsValue>;

    /// `tyro.fetchPayRequest()` → `Promise<PayRequest>`
    #[wasm_bindgen(method, catch, js_name = fetchPayRequest)]
    pub fn fetch_pay_request(this: &JsTyro) -> Result<Promise, JsValue>;

    /// `payForm.setWalletPaymentBeginListener((paymentType) => ...)`
    #[wasm_bindgen(method, catch, js_name = setWalletPaymentBeginListener)]
    pub fn set_wallet_payment_begin_listener(this: &JsPayForm, listener: &Function) -> Result<(), JsValue>;

    /// `payForm.setWalletPaymentCancelledListener((paymentType) => ...)`
    #[wasm_bindgen(method, catch, js_name = setWalletPaymentCancelledListener)]
    pub fn set_wallet_payment_cancelled_listener(this: &JsPayForm, listener: &Function) -> Result<(), JsValue>;

    /// `payForm.setWalletPaymentCompleteListener((paymentType, error) => ...)`
    #[wasm_bindgen(method, catch, js_name = setWalletPaymentCompleteListener)]
    pub fn set_wallet_payment_complete_listener(this: &JsPayForm, listener: &Function) -> Result<(), JsValue>;

    /// `payForm.inject(selector)`
    #[wasm_bindgen(method, catch, js_name = inject)]
    pub fn inject(this: &JsPayForm, selector: &str) -> Result<(), JsValue>;
}

/// Whether the `Tyro` global has been installed by the script tag.
pub fn tyro_available() -> bool {
    web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("Tyro")).ok())
        .map_or(false, |v| v.is_function())
}

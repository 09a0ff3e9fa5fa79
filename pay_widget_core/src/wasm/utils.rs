// WASM utility functions

use log::error;
use wasm_bindgen_futures::JsFuture;

/// Sleep for the specified number of milliseconds using browser's setTimeout
///
/// Resolves immediately when no window is available or the timer
/// cannot be scheduled.
pub async fn sleep_ms(milliseconds: u64) {
    let delay = i32::try_from(milliseconds).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
        });
        match scheduled {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                error!("setTimeout failed: {:?}", e);
                let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
            }
            None => {
                error!("No window available for setTimeout");
                let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
            }
        }
    });
    let _ = JsFuture::from(promise).await;
}

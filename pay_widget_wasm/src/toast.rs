// Toast notifications rendered into the toast container

use crate::dom::TOASTS_ID;
use log::error;
use pay_widget_core::ports::Notifier;
use pay_widget_core::wasm::sleep_ms;
use web_sys::Document;

const TOAST_STYLE: &str = "background-color: #e74c3c; color: white; padding: 10px 14px; \
     margin-bottom: 8px; border-radius: 5px; font-size: 14px;";

pub struct DomToastNotifier {
    document: Document,
    dismiss_after_ms: u64,
}

impl DomToastNotifier {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            dismiss_after_ms: 5_000,
        }
    }
}

impl Notifier for DomToastNotifier {
    fn toast_error(&self, message: &str) {
        let Some(container) = self.document.get_element_by_id(TOASTS_ID) else {
            web_sys::console::error_1(&message.into());
            return;
        };
        let toast = match self.document.create_element("div") {
            Ok(el) => el,
            Err(e) => {
                error!("Failed to create toast: {:?}", e);
                return;
            }
        };
        toast.set_class_name("pay-widget-toast");
        toast.set_text_content(Some(message));
        let _ = toast.set_attribute("role", "alert");
        let _ = toast.set_attribute("style", TOAST_STYLE);
        if let Err(e) = container.append_child(&toast) {
            error!("Failed to show toast: {:?}", e);
            return;
        }

        let delay = self.dismiss_after_ms;
        wasm_bindgen_futures::spawn_local(async move {
            sleep_ms(delay).await;
            toast.remove();
        });
    }
}

// Page-side collaborators of the controller: DOM view, toasts, host bridge,
// secret source and the local task scheduler

use crate::config::BridgePayload;
use crate::error::WidgetResult;
use crate::sdk::PayRequest;
use crate::state::Phase;
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

/// Script tag injected to load the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    pub id: String,
    pub src: String,
    pub cross_origin: String,
    pub is_async: bool,
}

impl ScriptSpec {
    pub fn new(id: &str, src: &str) -> Self {
        Self {
            id: id.to_string(),
            src: src.to_string(),
            cross_origin: "anonymous".to_string(),
            is_async: true,
        }
    }
}

/// Callbacks wired to the script tag's `load` / `error` events.
pub struct ScriptCallbacks {
    pub on_load: Box<dyn FnOnce()>,
    pub on_error: Box<dyn FnOnce(String)>,
}

/// Everything the page needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub phase: Phase,
    pub overlay_visible: bool,
    pub form_visible: bool,
    pub button_label: String,
    pub button_disabled: bool,
    pub button_css: String,
    pub loading: bool,
    pub spinner_color: Option<String>,
    pub error_banner: Option<String>,
    pub complete_message: Option<String>,
}

pub trait View {
    fn inject_script(&self, script: &ScriptSpec, callbacks: ScriptCallbacks) -> WidgetResult<()>;

    /// Empty the form mount point. Returns false when the element is missing.
    fn clear_mount_point(&self, mount_id: &str) -> bool;

    fn render(&self, model: &ViewModel);
}

/// Transient user-visible notifications.
pub trait Notifier {
    fn toast_error(&self, message: &str);
}

/// Outbound channel to the hosting application.
pub trait HostBridge {
    fn post_message(&self, message: &str) -> WidgetResult<()>;
}

/// Remote source of the pay secret when the page URL carries none.
#[async_trait(?Send)]
pub trait SecretSource {
    async fn fetch_secret(&self, endpoint: &str) -> WidgetResult<String>;
}

/// Runs controller continuations on the UI thread.
pub trait Scheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    /// Future that resolves after `ms` milliseconds.
    fn delay(&self, ms: u64) -> LocalBoxFuture<'static, ()>;
}

/// Success message posted to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeMessage {
    Flag(bool),
    Result {
        success: bool,
        status: String,
        #[serde(rename = "payRequestId", skip_serializing_if = "Option::is_none")]
        pay_request_id: Option<String>,
    },
}

impl BridgeMessage {
    pub fn success(payload: BridgePayload, request: &PayRequest) -> Self {
        match payload {
            BridgePayload::Flag => BridgeMessage::Flag(true),
            BridgePayload::Result => BridgeMessage::Result {
                success: request.status.is_success(),
                status: request.status.to_string(),
                pay_request_id: request.id.clone(),
            },
        }
    }

    /// Wire form: `true` or a JSON object.
    pub fn to_wire(&self) -> WidgetResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::PayRequestStatus;

    #[test]
    fn test_flag_message_is_bare_true() {
        let request = PayRequest::with_status(PayRequestStatus::Success);
        let msg = BridgeMessage::success(BridgePayload::Flag, &request);
        assert_eq!(msg.to_wire().unwrap(), "true");
    }

    #[test]
    fn test_result_message_carries_status_and_id() {
        let mut request = PayRequest::with_status(PayRequestStatus::Success);
        request.id = Some("pr_42".to_string());
        let wire = BridgeMessage::success(BridgePayload::Result, &request).to_wire().unwrap();
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["status"], "SUCCESS");
        assert_eq!(value["payRequestId"], "pr_42");

        let no_id = BridgeMessage::success(BridgePayload::Result, &PayRequest::with_status(PayRequestStatus::Success));
        assert!(!no_id.to_wire().unwrap().contains("payRequestId"));
    }

    #[test]
    fn test_script_spec_defaults() {
        let spec = ScriptSpec::new("tyro-js-library", "https://pay.connect.tyro.com/v1/tyro.js");
        assert_eq!(spec.cross_origin, "anonymous");
        assert!(spec.is_async);
    }
}

// Payment SDK abstraction
// The browser implementation wraps the global `Tyro` constructor; tests use fakes

use crate::config::Configuration;
use crate::error::SdkError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Result type for SDK calls
pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayRequestStatus {
    AwaitingPaymentInput,
    AwaitingAuthentication,
    Processing,
    Success,
    Failed,
    Voided,
    #[serde(other)]
    Unknown,
}

impl PayRequestStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PayRequestStatus::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayRequestStatus::AwaitingPaymentInput => "AWAITING_PAYMENT_INPUT",
            PayRequestStatus::AwaitingAuthentication => "AWAITING_AUTHENTICATION",
            PayRequestStatus::Processing => "PROCESSING",
            PayRequestStatus::Success => "SUCCESS",
            PayRequestStatus::Failed => "FAILED",
            PayRequestStatus::Voided => "VOIDED",
            PayRequestStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for PayRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pay request as returned by `fetchPayRequest`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub status: PayRequestStatus,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl PayRequest {
    pub fn with_status(status: PayRequestStatus) -> Self {
        Self { status, id: None, error_code: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletKind {
    ApplePay,
    GooglePay,
    Other(String),
}

impl WalletKind {
    pub fn from_sdk(raw: &str) -> Self {
        match raw {
            "APPLE_PAY" => WalletKind::ApplePay,
            "GOOGLE_PAY" => WalletKind::GooglePay,
            other => WalletKind::Other(other.to_string()),
        }
    }
}

/// Wallet lifecycle callbacks raised by the pay form.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    Begin(WalletKind),
    Cancelled(WalletKind),
    Complete(WalletKind, Option<SdkError>),
}

/// Receives wallet events from a mounted form.
pub type WalletSink = Rc<dyn Fn(WalletEvent)>;

/// A pay request session inside the SDK.
#[async_trait(?Send)]
pub trait PaySdk {
    /// Load the pay request identified by `pay_secret`.
    async fn init(&self, pay_secret: &str) -> SdkResult<()>;

    /// Build the card-entry form. It is not attached to the page until `inject`.
    async fn create_pay_form(&self, configuration: &Configuration) -> SdkResult<Box<dyn PayForm>>;

    /// Submit the data entered in the form.
    async fn submit_pay(&self) -> SdkResult<()>;

    /// Fetch the current state of the pay request.
    async fn fetch_pay_request(&self) -> SdkResult<PayRequest>;
}

/// Card-entry form handle returned by `PaySdk::create_pay_form`.
pub trait PayForm {
    /// Route the begin/cancelled/complete wallet listeners into `sink`.
    fn set_wallet_listeners(&mut self, sink: WalletSink) -> SdkResult<()>;

    /// Render the form into the element matched by `selector`.
    fn inject(&self, selector: &str) -> SdkResult<()>;
}

/// Constructs SDK instances, i.e. `Tyro({ liveMode })`.
pub trait SdkFactory {
    fn create(&self, live_mode: bool) -> SdkResult<Rc<dyn PaySdk>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_request_status_parsing() {
        let req: PayRequest = serde_json::from_str(r#"{"status":"SUCCESS","id":"pr_1","capture":{}}"#).unwrap();
        assert!(req.status.is_success());
        assert_eq!(req.id.as_deref(), Some("pr_1"));

        let req: PayRequest = serde_json::from_str(r#"{"status":"PARTIALLY_REFUNDED"}"#).unwrap();
        assert_eq!(req.status, PayRequestStatus::Unknown);

        let req: PayRequest = serde_json::from_str(r#"{"status":"AWAITING_AUTHENTICATION"}"#).unwrap();
        assert!(!req.status.is_success());
        assert_eq!(req.status.to_string(), "AWAITING_AUTHENTICATION");
    }

    #[test]
    fn test_wallet_kind_from_sdk() {
        assert_eq!(WalletKind::from_sdk("APPLE_PAY"), WalletKind::ApplePay);
        assert_eq!(WalletKind::from_sdk("GOOGLE_PAY"), WalletKind::GooglePay);
        assert_eq!(WalletKind::from_sdk("CLICK_TO_PAY"), WalletKind::Other("CLICK_TO_PAY".to_string()));
    }
}

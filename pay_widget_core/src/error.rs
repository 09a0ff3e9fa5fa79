use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type the SDK uses for inline field validation failures.
pub const CLIENT_VALIDATION_ERROR: &str = "CLIENT_VALIDATION_ERROR";

/// Error object reported by the payment SDK.
///
/// Opaque to the widget: it is shown to the user as-is, and only the
/// presence of `type` (and the validation rule below) is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl SdkError {
    /// Error without a type, e.g. a thrown JS `Error` or a glue failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error_type: None,
            error_code: None,
            message: message.into(),
        }
    }

    pub fn typed(error_type: impl Into<String>, error_code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: Some(error_type.into()),
            error_code,
            message: message.into(),
        }
    }

    /// Validation errors without a code are already rendered inline by the
    /// SDK form, so they need no toast.
    pub fn is_ignorable_validation(&self) -> bool {
        self.error_type.as_deref() == Some(CLIENT_VALIDATION_ERROR)
            && self.error_code.as_deref().map_or(true, str::is_empty)
    }

    /// Text of the inline error banner: `(<code>) <message>`.
    pub fn banner_text(&self) -> String {
        format!(
            "({}) {}",
            self.error_code.as_deref().unwrap_or("UNKNOWN_ERROR"),
            self.message
        )
    }
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.error_type, &self.error_code) {
            (Some(t), Some(code)) => write!(f, "{} [{}]: {}", t, code, self.message),
            (Some(t), None) => write!(f, "{}: {}", t, self.message),
            _ => write!(f, "Error: {}", self.message),
        }
    }
}

impl std::error::Error for SdkError {}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("{0}")]
    Sdk(#[from] SdkError),

    #[error("Pay Form is not mounted ({0})")]
    MountPointMissing(String),

    #[error("Payment library has not been initialized")]
    NoSdkInstance,

    #[error("Payment was not successful (status: {0})")]
    PaymentNotSuccessful(String),

    #[error("Host bridge error: {0}")]
    Bridge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Widget was torn down")]
    Cancelled,
}

pub type WidgetResult<T> = Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_without_code_is_ignorable() {
        let err = SdkError::typed(CLIENT_VALIDATION_ERROR, None, "Card number is invalid");
        assert!(err.is_ignorable_validation());

        let empty_code = SdkError::typed(CLIENT_VALIDATION_ERROR, Some(String::new()), "x");
        assert!(empty_code.is_ignorable_validation());
    }

    #[test]
    fn test_validation_error_with_code_is_reported() {
        let err = SdkError::typed(CLIENT_VALIDATION_ERROR, Some("CARD_DECLINED".to_string()), "Declined");
        assert!(!err.is_ignorable_validation());
        assert!(!SdkError::message("boom").is_ignorable_validation());
        assert!(!SdkError::typed("SERVER_ERROR", None, "down").is_ignorable_validation());
    }

    #[test]
    fn test_display_and_banner() {
        assert_eq!(SdkError::message("boom").to_string(), "Error: boom");
        assert_eq!(SdkError::typed("SERVER_ERROR", None, "down").to_string(), "SERVER_ERROR: down");
        let coded = SdkError::typed("CARD_ERROR", Some("DECLINED".to_string()), "No funds");
        assert_eq!(coded.to_string(), "CARD_ERROR [DECLINED]: No funds");
        assert_eq!(coded.banner_text(), "(DECLINED) No funds");
        assert_eq!(SdkError::typed("X", None, "m").banner_text(), "(UNKNOWN_ERROR) m");
    }

    #[test]
    fn test_deserialize_sdk_shape() {
        let err: SdkError = serde_json::from_str(
            r#"{"type":"CLIENT_VALIDATION_ERROR","message":"Expiry is required"}"#,
        )
        .unwrap();
        assert_eq!(err.error_type.as_deref(), Some(CLIENT_VALIDATION_ERROR));
        assert_eq!(err.error_code, None);
        assert!(err.is_ignorable_validation());
    }
}

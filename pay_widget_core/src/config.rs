// Widget configuration: the SDK form config plus the settings envelope
// that parameterizes the controller

use crate::error::WidgetError;
use crate::style::ButtonStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SCRIPT_SRC: &str = "https://pay.connect.tyro.com/v1/tyro.js";
pub const DEFAULT_SCRIPT_ID: &str = "tyro-js-library";
pub const DEFAULT_MOUNT_SELECTOR: &str = "#tyro-pay-form";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletOption {
    pub enabled: bool,
}

/// Pay form configuration handed to `createPayForm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub pay_secret: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub style_props: BTreeMap<String, String>,
    #[serde(default)]
    pub options: BTreeMap<String, WalletOption>,
}

impl Default for Configuration {
    fn default() -> Self {
        let mut style_props = BTreeMap::new();
        style_props.insert("bodyBackgroundColor".to_string(), "#fff".to_string());

        let mut options = BTreeMap::new();
        options.insert("applePay".to_string(), WalletOption { enabled: true });
        options.insert("googlePay".to_string(), WalletOption { enabled: false });

        Self {
            pay_secret: String::new(),
            theme: default_theme(),
            style_props,
            options,
        }
    }
}

impl Configuration {
    /// Copy of this configuration with the resolved secret merged in.
    pub fn with_pay_secret(&self, secret: &str) -> Self {
        Self {
            pay_secret: secret.to_string(),
            ..self.clone()
        }
    }

    pub fn has_pay_secret(&self) -> bool {
        !self.pay_secret.trim().is_empty()
    }
}

/// Which of the two historical widget flavours to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetProfile {
    /// Saves a card; reports a bare `true` to the host.
    #[default]
    AddCard,
    /// Takes a payment; reports the result object and shows a completion message.
    Checkout,
}

/// Shape of the message posted to the host on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgePayload {
    Flag,
    Result,
}

impl WidgetProfile {
    pub fn button_label(&self) -> &'static str {
        match self {
            WidgetProfile::AddCard => "Add Card",
            WidgetProfile::Checkout => "Pay",
        }
    }

    pub fn bridge_payload(&self) -> BridgePayload {
        match self {
            WidgetProfile::AddCard => BridgePayload::Flag,
            WidgetProfile::Checkout => BridgePayload::Result,
        }
    }

    pub fn show_complete_message(&self) -> bool {
        matches!(self, WidgetProfile::Checkout)
    }

    pub fn button_style(&self) -> ButtonStyle {
        match self {
            WidgetProfile::AddCard => ButtonStyle::default(),
            WidgetProfile::Checkout => ButtonStyle::default()
                .with("border-radius", "10px")
                .with("background-color", "#9E8CCC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub profile: WidgetProfile,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default = "default_script_src")]
    pub script_src: String,
    #[serde(default = "default_script_id")]
    pub script_id: String,
    #[serde(default = "default_mount_selector")]
    pub mount_selector: String,
    #[serde(default)]
    pub button_label: Option<String>,
    #[serde(default)]
    pub button_style: Option<ButtonStyle>,
    #[serde(default)]
    pub bridge_payload: Option<BridgePayload>,
    #[serde(default)]
    pub show_complete_message: Option<bool>,
    #[serde(default)]
    pub secret_endpoint: Option<String>,
    #[serde(default)]
    pub secret_timeout_ms: Option<u64>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self::for_profile(WidgetProfile::default())
    }
}

impl WidgetSettings {
    pub fn for_profile(profile: WidgetProfile) -> Self {
        Self {
            configuration: Configuration::default(),
            profile,
            live_mode: false,
            script_src: default_script_src(),
            script_id: default_script_id(),
            mount_selector: default_mount_selector(),
            button_label: None,
            button_style: None,
            bridge_payload: None,
            show_complete_message: None,
            secret_endpoint: None,
            secret_timeout_ms: None,
        }
    }

    /// Parse settings from JSON; every field falls back to its default.
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), WidgetError> {
        if self.script_src.trim().is_empty() {
            return Err(WidgetError::Config("script_src must not be empty".to_string()));
        }
        if self.script_id.trim().is_empty() {
            return Err(WidgetError::Config("script_id must not be empty".to_string()));
        }
        if !self.mount_selector.starts_with('#') || self.mount_selector.len() < 2 {
            return Err(WidgetError::Config(format!(
                "mount_selector must be an id selector, got '{}'",
                self.mount_selector
            )));
        }
        if self.secret_timeout_ms == Some(0) {
            return Err(WidgetError::Config("secret_timeout_ms must be > 0".to_string()));
        }
        if let Some(endpoint) = &self.secret_endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| WidgetError::Config(format!("Invalid secret_endpoint '{}': {}", endpoint, e)))?;
        }
        Ok(())
    }

    /// Element id of the mount point, without the leading `#`.
    pub fn mount_id(&self) -> &str {
        self.mount_selector.trim_start_matches('#')
    }

    pub fn effective_button_label(&self) -> String {
        self.button_label
            .clone()
            .unwrap_or_else(|| self.profile.button_label().to_string())
    }

    pub fn effective_button_style(&self) -> ButtonStyle {
        self.button_style
            .clone()
            .unwrap_or_else(|| self.profile.button_style())
    }

    pub fn effective_bridge_payload(&self) -> BridgePayload {
        self.bridge_payload
            .unwrap_or_else(|| self.profile.bridge_payload())
    }

    pub fn effective_show_complete_message(&self) -> bool {
        self.show_complete_message
            .unwrap_or_else(|| self.profile.show_complete_message())
    }
}

fn default_theme() -> String { "default".to_string() }
fn default_script_src() -> String { DEFAULT_SCRIPT_SRC.to_string() }
fn default_script_id() -> String { DEFAULT_SCRIPT_ID.to_string() }
fn default_mount_selector() -> String { DEFAULT_MOUNT_SELECTOR.to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_template() {
        let config = Configuration::default();
        assert_eq!(config.pay_secret, "");
        assert_eq!(config.theme, "default");
        assert_eq!(config.style_props.get("bodyBackgroundColor").map(String::as_str), Some("#fff"));
        assert!(config.options["applePay"].enabled);
        assert!(!config.options["googlePay"].enabled);
        assert!(!config.options.contains_key("paypal"));
    }

    #[test]
    fn test_configuration_serializes_camel_case() {
        let value = serde_json::to_value(Configuration::default().with_pay_secret("sec_123")).unwrap();
        assert_eq!(value["paySecret"], "sec_123");
        assert_eq!(value["styleProps"]["bodyBackgroundColor"], "#fff");
        assert_eq!(value["options"]["applePay"]["enabled"], true);
    }

    #[test]
    fn test_with_pay_secret_leaves_template_untouched() {
        let template = Configuration::default();
        let merged = template.with_pay_secret("abc");
        assert!(merged.has_pay_secret());
        assert!(!template.has_pay_secret());
        assert_eq!(merged.options, template.options);
    }

    #[test]
    fn test_settings_from_empty_json_uses_defaults() {
        let settings = WidgetSettings::from_json("{}").unwrap();
        assert_eq!(settings, WidgetSettings::default());
        assert_eq!(settings.mount_id(), "tyro-pay-form");
        assert_eq!(settings.effective_button_label(), "Add Card");
        assert_eq!(settings.effective_bridge_payload(), BridgePayload::Flag);
        assert!(!settings.effective_show_complete_message());
    }

    #[test]
    fn test_checkout_profile_defaults() {
        let settings = WidgetSettings::from_json(r#"{"profile":"checkout","live_mode":true}"#).unwrap();
        assert!(settings.live_mode);
        assert_eq!(settings.effective_button_label(), "Pay");
        assert_eq!(settings.effective_bridge_payload(), BridgePayload::Result);
        assert!(settings.effective_show_complete_message());
        assert_eq!(settings.effective_button_style().get("background-color"), Some("#9E8CCC"));
    }

    #[test]
    fn test_explicit_overrides_beat_profile() {
        let settings = WidgetSettings::from_json(
            r#"{"profile":"checkout","bridge_payload":"flag","button_label":"Confirm"}"#,
        )
        .unwrap();
        assert_eq!(settings.effective_bridge_payload(), BridgePayload::Flag);
        assert_eq!(settings.effective_button_label(), "Confirm");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = WidgetSettings::default();
        settings.mount_selector = ".tyro-pay-form".to_string();
        assert!(matches!(settings.validate(), Err(WidgetError::Config(_))));

        let mut settings = WidgetSettings::default();
        settings.secret_timeout_ms = Some(0);
        assert!(settings.validate().is_err());

        let mut settings = WidgetSettings::default();
        settings.secret_endpoint = Some("not a url".to_string());
        assert!(settings.validate().is_err());

        assert!(WidgetSettings::from_json(r#"{"script_src":"  "}"#).is_err());
        assert!(WidgetSettings::from_json("not json").is_err());
    }
}

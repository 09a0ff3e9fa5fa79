// Submit button styling and query-string overrides

use crate::query::QueryParams;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CSS declarations for the submit button, keyed by property name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonStyle(BTreeMap<String, String>);

impl Default for ButtonStyle {
    fn default() -> Self {
        Self::empty()
            .with("border-radius", "5px")
            .with("width", "100%")
            .with("background-color", "#F3C910")
            .with("border", "0px")
            .with("color", "white")
            .with("padding", "10px")
            .with("margin-top", "10px")
            .with("font-size", "20px")
    }
}

impl ButtonStyle {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, property: &str, value: &str) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: &str, value: &str) {
        self.0.insert(property.to_string(), value.to_string());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `buttonBorderRadius` / `buttonBackgroundColor` into the style.
    /// Only the two affected properties change. Returns how many were applied.
    pub fn apply_query_overrides(&mut self, params: &QueryParams) -> usize {
        let mut applied = 0;
        if let Some(radius) = params.button_border_radius() {
            match radius.parse::<f64>() {
                Ok(px) if px.is_finite() && px >= 0.0 => {
                    self.set("border-radius", &format!("{}px", radius));
                    applied += 1;
                }
                _ => warn!("Ignoring invalid buttonBorderRadius '{}'", radius),
            }
        }
        if let Some(color) = params.button_background_color() {
            match hex_color(color) {
                Some(css) => {
                    self.set("background-color", &css);
                    applied += 1;
                }
                None => warn!("Ignoring invalid buttonBackgroundColor '{}'", color),
            }
        }
        applied
    }

    /// Inline `style` attribute text, e.g. `border: 0px; color: white;`.
    pub fn to_css_text(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `#`-prefixed CSS color for a bare hex value like `F3C910`.
pub fn hex_color(raw: &str) -> Option<String> {
    let hex = raw.trim_start_matches('#');
    let valid_len = matches!(hex.len(), 3 | 4 | 6 | 8);
    if valid_len && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex))
    } else {
        None
    }
}

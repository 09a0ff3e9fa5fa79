// Startup query parameters read from `window.location.search`

use std::collections::HashMap;

pub const PAY_SECRET_PARAM: &str = "paySecretValue";
pub const BUTTON_BORDER_RADIUS_PARAM: &str = "buttonBorderRadius";
pub const BUTTON_BACKGROUND_COLOR_PARAM: &str = "buttonBackgroundColor";
pub const LIVE_MODE_PARAM: &str = "liveMode";

/// Decoded query parameters. First occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    /// Parse a search string, with or without the leading `?`.
    pub fn parse(search: &str) -> Self {
        let query = search.strip_prefix('?').unwrap_or(search);
        let mut values = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self { values }
    }

    /// Non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn pay_secret(&self) -> Option<&str> {
        self.get(PAY_SECRET_PARAM)
    }

    pub fn button_border_radius(&self) -> Option<&str> {
        self.get(BUTTON_BORDER_RADIUS_PARAM)
    }

    pub fn button_background_color(&self) -> Option<&str> {
        self.get(BUTTON_BACKGROUND_COLOR_PARAM)
    }

    /// `liveMode=true|false`; anything else is treated as absent.
    pub fn live_mode(&self) -> Option<bool> {
        match self.get(LIVE_MODE_PARAM)? {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

// Pay secret endpoint response parsing

use crate::error::{WidgetError, WidgetResult};
use log::debug;

/// Keys accepted for the secret in a JSON response body.
const SECRET_KEYS: &[&str] = &["paySecret", "pay_secret", "secret"];

/// Extract the pay secret from an endpoint response.
/// Accepts a JSON object with one of `SECRET_KEYS`, a JSON string, or plain text.
pub fn parse_secret_response(body: &str) -> WidgetResult<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(WidgetError::Http("Empty pay secret response".to_string()));
    }

    let secret = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => SECRET_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)
            .ok_or_else(|| WidgetError::Http("Pay secret missing from response".to_string()))?,
        Ok(serde_json::Value::String(s)) => s,
        Ok(_) => return Err(WidgetError::Http("Unexpected pay secret response".to_string())),
        Err(_) => {
            debug!("Pay secret response is not JSON, using raw body");
            trimmed.to_string()
        }
    };

    if secret.trim().is_empty() {
        return Err(WidgetError::Http("Empty pay secret response".to_string()));
    }
    Ok(secret.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_object() {
        assert_eq!(parse_secret_response(r#"{"paySecret":"abc"}"#).unwrap(), "abc");
        assert_eq!(parse_secret_response(r#"{"secret":"xyz","other":1}"#).unwrap(), "xyz");
    }

    #[test]
    fn test_parse_json_string_and_plain_text() {
        assert_eq!(parse_secret_response(r#""quoted""#).unwrap(), "quoted");
        assert_eq!(parse_secret_response("  raw_secret\n").unwrap(), "raw_secret");
    }

    #[test]
    fn test_parse_rejects_empty_and_wrong_shapes() {
        assert!(parse_secret_response("   ").is_err());
        assert!(parse_secret_response(r#"{"paySecret":""}"#).is_err());
        assert!(parse_secret_response(r#"{"token":"abc"}"#).is_err());
        assert!(parse_secret_response("[1,2]").is_err());
    }
}

//! Lenient field accessors for weakly typed JSON.
//!
//! Every accessor returns `None` for a missing key, a null, or a value of the
//! wrong type, so callers can substitute defaults instead of failing.

use serde_json::Value;

/// Non-blank string at `key`.
pub fn text<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// Owned non-blank string at `key`, or `default`.
pub fn text_or(value: &Value, key: &str, default: &str) -> String {
    text(value, key).unwrap_or(default).to_string()
}

/// Finite number at `key`. Numeric strings such as `"12.50"` are accepted.
pub fn number(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(as_number)
}

/// Interprets a JSON value as a finite number.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Boolean at `key`. `"true"`/`"false"` strings are accepted.
pub fn flag(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Object at `key`.
pub fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

/// Array items at `key`, empty when absent or not an array.
pub fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// Renders a scalar as display text. Objects and arrays yield `None`.
pub fn display(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts a fraction in [0, 1] to an integer percent, clamped to [0, 100].
pub fn fraction_to_percent(fraction: f64) -> u8 {
    clamp_percent(fraction * 100.0)
}

/// Rounds and clamps to an integer percent. Non-finite input yields 0.
pub fn clamp_percent(percent: f64) -> u8 {
    if !percent.is_finite() {
        return 0;
    }
    percent.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text() {
        let v = json!({"a": " Nike ", "b": "", "c": 5, "d": null});
        assert_eq!(text(&v, "a"), Some("Nike"));
        assert_eq!(text(&v, "b"), None);
        assert_eq!(text(&v, "c"), None);
        assert_eq!(text(&v, "d"), None);
        assert_eq!(text(&v, "missing"), None);
        assert_eq!(text_or(&v, "b", "fallback"), "fallback");
    }

    #[test]
    fn test_text_on_non_object() {
        assert_eq!(text(&json!(null), "a"), None);
        assert_eq!(text(&json!([1, 2]), "a"), None);
    }

    #[test]
    fn test_number() {
        let v = json!({"i": 8, "f": 9.99, "s": "12.50", "d": "$7", "bad": "abc", "t": true});
        assert_eq!(number(&v, "i"), Some(8.0));
        assert_eq!(number(&v, "f"), Some(9.99));
        assert_eq!(number(&v, "s"), Some(12.5));
        assert_eq!(number(&v, "d"), Some(7.0));
        assert_eq!(number(&v, "bad"), None);
        assert_eq!(number(&v, "t"), None);
        assert_eq!(number(&v, "missing"), None);
    }

    #[test]
    fn test_number_rejects_non_finite_strings() {
        let v = json!({"n": "NaN", "inf": "inf"});
        assert_eq!(number(&v, "n"), None);
        assert_eq!(number(&v, "inf"), None);
    }

    #[test]
    fn test_flag() {
        let v = json!({"a": true, "b": "False", "c": 1, "d": "maybe"});
        assert_eq!(flag(&v, "a"), Some(true));
        assert_eq!(flag(&v, "b"), Some(false));
        assert_eq!(flag(&v, "c"), None);
        assert_eq!(flag(&v, "d"), None);
    }

    #[test]
    fn test_object_and_items() {
        let v = json!({"o": {"x": 1}, "a": [1, 2], "s": "str"});
        assert!(object(&v, "o").is_some());
        assert!(object(&v, "a").is_none());
        assert_eq!(items(&v, "a").len(), 2);
        assert!(items(&v, "s").is_empty());
        assert!(items(&v, "missing").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&json!("x")), Some("x".to_string()));
        assert_eq!(display(&json!(42)), Some("42".to_string()));
        assert_eq!(display(&json!(false)), Some("false".to_string()));
        assert_eq!(display(&json!({"a": 1})), None);
    }

    #[test]
    fn test_percent_conversion() {
        assert_eq!(fraction_to_percent(0.92), 92);
        assert_eq!(fraction_to_percent(0.925), 93);
        assert_eq!(fraction_to_percent(1.7), 100);
        assert_eq!(fraction_to_percent(-0.3), 0);
        assert_eq!(clamp_percent(f64::NAN), 0);
        assert_eq!(clamp_percent(49.5), 50);
    }
}

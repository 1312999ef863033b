//! Helpers for reading loosely-typed JSON payloads.

use serde_json::Value;

/// Truthiness of a payload value: `null`, `false`, `0` and `""` are falsy;
/// everything else, including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text shown in a report cell. Strings are taken verbatim, `null` is empty,
/// other values use their compact JSON form.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Integers print as is; floats drop a zero fraction, so `2001.0` reads `2001`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// `display_text` of a truthy value, otherwise `fallback`.
pub fn text_or(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(v) if is_truthy(v) => display_text(v),
        _ => fallback.to_string(),
    }
}

/// Numeric reading of a loose value, used for comparisons such as
/// `DegreeOfSeparation > 0`. Numeric strings are accepted; anything else is `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

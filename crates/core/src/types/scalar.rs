//! Attribute bags and lenient scalar readers.
//!
//! Domain records are exchanged with the resource pipeline as attribute bags
//! keyed by attribute code. Values coming off the wire are loosely typed
//! (`"1"` for `true`, `"12"` for `12`), so reading them goes through the
//! helpers here rather than strict serde deserialization.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// An attribute-code keyed bag of scalar values.
///
/// `serde_json::Map` is ordered by key, so anything rendered from an
/// `Attributes` value is sorted ascending by attribute code.
pub type Attributes = Map<String, Value>;

/// Read a value as an optional trimmed string.
///
/// `null`, empty strings and whitespace-only strings read as `None`. Numbers
/// and booleans are rendered to their string form.
#[must_use]
pub fn to_opt_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read a value as a boolean.
///
/// Accepts JSON booleans, numbers (non-zero is `true`) and the usual string
/// spellings (`"1"`, `"true"`, `"yes"`, `"on"` and their negatives). Anything
/// else reads as `None`.
#[must_use]
pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read a value as an integer.
///
/// Accepts integral JSON numbers and strings holding an integer (a trailing
/// `.0`-style fraction is tolerated when it is exactly zero).
#[must_use]
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<Decimal>()
                    .ok()
                    .filter(|d| d.fract().is_zero())
                    .and_then(|d| i64::try_from(d).ok())
            })
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read a value as a decimal.
#[must_use]
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok().or_else(|| {
            n.as_f64().and_then(|f| Decimal::try_from(f).ok())
        }),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whether a value looks numeric (a JSON number or a string holding one).
#[must_use]
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite)
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render an optional string as a JSON value (`None` becomes `null`).
#[must_use]
pub fn opt_string_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_to_opt_string() {
        assert_eq!(to_opt_string(&json!("  Austin ")), Some("Austin".to_string()));
        assert_eq!(to_opt_string(&json!("   ")), None);
        assert_eq!(to_opt_string(&json!(null)), None);
        assert_eq!(to_opt_string(&json!(78701)), Some("78701".to_string()));
    }

    #[test]
    fn test_to_bool() {
        assert_eq!(to_bool(&json!("1")), Some(true));
        assert_eq!(to_bool(&json!("Off")), Some(false));
        assert_eq!(to_bool(&json!(0)), Some(false));
        assert_eq!(to_bool(&json!(true)), Some(true));
        assert_eq!(to_bool(&json!("maybe")), None);
    }

    #[test]
    fn test_to_i64() {
        assert_eq!(to_i64(&json!("12")), Some(12));
        assert_eq!(to_i64(&json!("12.0")), Some(12));
        assert_eq!(to_i64(&json!(12.5)), None);
        assert_eq!(to_i64(&json!("twelve")), None);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(&json!("5.50")), Some(Decimal::new(550, 2)));
        assert_eq!(to_decimal(&json!(2)), Some(Decimal::new(2, 0)));
        assert_eq!(to_decimal(&json!(true)), None);
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric(&json!("12")));
        assert!(is_numeric(&json!(12)));
        assert!(!is_numeric(&json!("CA")));
        assert!(!is_numeric(&json!("")));
        assert!(!is_numeric(&json!(null)));
    }
}

//! Generic flow records and numeric field extraction

use serde_json::Value;

/// One flow observation or one synthesized aggregate output
pub type GenericMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    Missing(String),
    NotNumeric { field: String, value: String },
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Missing(field) => write!(f, "missing field {}", field),
            FieldError::NotNumeric { field, value } => {
                write!(f, "cannot convert {} ({}) to f64", value, field)
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Convert a record value to f64
///
/// Accepts integers, floating point numbers, and numeric text. Anything else
/// (bool, null, arrays, objects, non-numeric text) yields `None`, and so does
/// text spelling a non-finite value such as `"NaN"` or `"inf"`.
pub fn convert_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Read `field` from `record` as f64
pub fn read_f64(record: &GenericMap, field: &str) -> Result<f64, FieldError> {
    let raw = record
        .get(field)
        .ok_or_else(|| FieldError::Missing(field.to_string()))?;

    convert_to_f64(raw).ok_or_else(|| FieldError::NotNumeric {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Text form of a field value used when building group keys
///
/// Strings are used verbatim (no surrounding quotes), everything else uses its
/// JSON rendering.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> GenericMap {
        let mut map = GenericMap::new();
        map.insert("bytes".to_string(), value);
        map
    }

    #[test]
    fn test_numeric_representations() {
        assert_eq!(read_f64(&record(json!(42)), "bytes"), Ok(42.0));
        assert_eq!(read_f64(&record(json!(-7)), "bytes"), Ok(-7.0));
        assert_eq!(read_f64(&record(json!(1.5)), "bytes"), Ok(1.5));
        assert_eq!(read_f64(&record(json!("12.25")), "bytes"), Ok(12.25));
        assert_eq!(read_f64(&record(json!(" 3 ")), "bytes"), Ok(3.0));
    }

    #[test]
    fn test_missing_field() {
        let err = read_f64(&GenericMap::new(), "bytes").unwrap_err();
        assert_eq!(err, FieldError::Missing("bytes".to_string()));
        assert_eq!(err.to_string(), "missing field bytes");
    }

    #[test]
    fn test_non_numeric_values() {
        for value in [json!("abc"), json!(true), json!(null), json!([1]), json!({"a": 1})] {
            let err = read_f64(&record(value), "bytes").unwrap_err();
            assert!(matches!(err, FieldError::NotNumeric { .. }), "got {:?}", err);
        }
    }

    #[test]
    fn test_non_finite_text_rejected() {
        for text in ["NaN", "nan", "inf", "+inf", "-infinity", " Infinity "] {
            let err = read_f64(&record(json!(text)), "bytes").unwrap_err();
            assert!(matches!(err, FieldError::NotNumeric { .. }), "{} gave {:?}", text, err);
        }
    }

    #[test]
    fn test_label_text() {
        assert_eq!(label_text(&json!("http")), "http");
        assert_eq!(label_text(&json!(443)), "443");
        assert_eq!(label_text(&json!(true)), "true");
    }
}

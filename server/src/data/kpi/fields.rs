//! Lenient field deserializers for KPI payloads
//!
//! Producers send `null` for absent labels and readings. These helpers map
//! `null` to the empty value while still rejecting wrongly typed fields, so a
//! record either decodes completely or fails.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String label value; `null` becomes empty
pub fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string label value, found {}",
            json_kind(&other)
        ))),
    }
}

/// Numeric reading; `null` reads as zero
pub fn reading<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Any defaultable value where `null` means "absent"
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

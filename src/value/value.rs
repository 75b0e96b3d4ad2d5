//! Emptiness rules and document conversions.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Returns true if the value counts as empty for scalar diffing.
///
/// Only an absent value, `null` and the empty string are empty. `false`,
/// `0`, empty lists and empty maps are real values.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Collapses `null` into `None` so that absent and null compare equal.
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Deserializes an optional string, reading `""` as `None`.
///
/// Used on optional scalar fields so that a cleared form input and a
/// missing field have the same canonical form.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

/// Parse a document from JSON.
pub fn from_json(json: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize a document to pretty-printed JSON.
pub fn to_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Parse a document from YAML. JSON input is accepted as well.
pub fn from_yaml(yaml: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Serialize a document to YAML.
pub fn to_yaml(value: &Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(value)
}

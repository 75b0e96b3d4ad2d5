//! Key/value map differ for labels and label selectors.
//!
//! A key holding the empty string (a "valueless" label) is a different
//! state from an absent key: selectors match on key existence alone. The
//! rules below never collapse one into the other.

use super::options::KeyPolicy;
use super::scalar::diff_scalar;
use crate::patch::{PatchError, PatchOperation};
use crate::pointer::{needs_escape, Pointer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Label is one row of a label editor: a key with an optional value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Label {
    /// Creates a label with a value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Label {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Creates a label without a value.
    pub fn valueless(key: impl Into<String>) -> Self {
        Label {
            key: key.into(),
            value: None,
        }
    }
}

/// Converts label rows into a map. A missing value becomes `""` and a
/// repeated key keeps its last value.
pub fn labels_to_map(labels: &[Label]) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|l| (l.key.clone(), l.value.clone().unwrap_or_default()))
        .collect()
}

fn to_object(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Diffs two maps rooted at `path`.
///
/// An empty side is handled as a whole: the first entries are added as one
/// map and the last entries are removed as one map. Otherwise every key of
/// the union is diffed on its own, in key order:
///
/// 1. valueless in current, absent in desired: `remove`
/// 2. non-empty in current, valueless in desired: `replace` with `""`
/// 3. anything else: scalar rules, reading an absent desired value as `""`
pub fn diff_map(
    path: &Pointer,
    current: &BTreeMap<String, String>,
    desired: &BTreeMap<String, String>,
    policy: KeyPolicy,
) -> Result<Vec<PatchOperation>, PatchError> {
    if current.is_empty() && desired.is_empty() {
        return Ok(Vec::new());
    }
    if current.is_empty() {
        return Ok(vec![PatchOperation::add(path.clone(), to_object(desired))]);
    }
    if desired.is_empty() {
        return Ok(vec![PatchOperation::remove(path.clone())]);
    }

    let keys: BTreeSet<&String> = current.keys().chain(desired.keys()).collect();
    let mut ops = Vec::new();

    for key in keys {
        let cur = current.get(key);
        let des = desired.get(key);
        if cur == des {
            continue;
        }
        if policy == KeyPolicy::Reject && needs_escape(key) {
            return Err(PatchError::invalid_key(path.as_str(), key.as_str()));
        }
        let key_path = path.field(key);

        match (cur.map(String::as_str), des.map(String::as_str)) {
            (Some(""), None) => ops.push(PatchOperation::remove(key_path)),
            (Some(c), Some("")) if !c.is_empty() => ops.push(PatchOperation::replace(key_path, "")),
            (c, d) => {
                let old = c.map(|s| Value::String(s.to_string()));
                let new = Value::String(d.unwrap_or_default().to_string());
                if let Some(op) = diff_scalar(&key_path, old.as_ref(), Some(&new)) {
                    ops.push(op);
                }
            }
        }
    }

    Ok(ops)
}

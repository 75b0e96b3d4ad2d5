//! Leaf field differ.

use crate::patch::{to_document, PatchError, PatchOperation};
use crate::pointer::Pointer;
use crate::value::{is_empty, present};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

/// ScalarEncoding is applied to the new value before it is transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarEncoding {
    #[default]
    Plain,
    /// Standard-alphabet base64 of string values. Other values pass through.
    Base64,
}

impl ScalarEncoding {
    fn encode(&self, value: &Value) -> Value {
        match (self, value) {
            (ScalarEncoding::Base64, Value::String(s)) => Value::String(STANDARD.encode(s)),
            _ => value.clone(),
        }
    }
}

/// Diffs a single leaf field.
///
/// - equal values produce nothing (`null` and absent are equal)
/// - an empty new value over a non-empty old value produces `remove`
/// - an absent new value over any old value produces `remove`
/// - otherwise `add` when the old value was empty, else `replace`
pub fn diff_scalar(path: &Pointer, old: Option<&Value>, new: Option<&Value>) -> Option<PatchOperation> {
    diff_scalar_encoded(path, old, new, ScalarEncoding::Plain)
}

/// Like [`diff_scalar`], encoding the transmitted value.
///
/// Equality is checked on the unencoded values.
pub fn diff_scalar_encoded(
    path: &Pointer,
    old: Option<&Value>,
    new: Option<&Value>,
    encoding: ScalarEncoding,
) -> Option<PatchOperation> {
    let old = present(old);
    let new = present(new);

    if old == new {
        return None;
    }

    match new {
        None => Some(PatchOperation::remove(path.clone())),
        Some(n) if is_empty(Some(n)) && !is_empty(old) => Some(PatchOperation::remove(path.clone())),
        Some(n) => {
            let value = encoding.encode(n);
            if is_empty(old) {
                Some(PatchOperation::add(path.clone(), value))
            } else {
                Some(PatchOperation::replace(path.clone(), value))
            }
        }
    }
}

/// Diffs a typed leaf field by rendering both sides as document values.
pub fn diff_field<T: Serialize + ?Sized>(
    path: &Pointer,
    old: Option<&T>,
    new: Option<&T>,
) -> Result<Option<PatchOperation>, PatchError> {
    let old = old.map(|v| to_document(path, v)).transpose()?;
    let new = new.map(|v| to_document(path, v)).transpose()?;
    Ok(diff_scalar(path, old.as_ref(), new.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issuer() -> Pointer {
        Pointer::from_fields(["spec", "issuer"])
    }

    #[test]
    fn test_equal_values_produce_nothing() {
        let v = json!("https://idp");
        assert_eq!(diff_scalar(&issuer(), Some(&v), Some(&v)), None);
        assert_eq!(diff_scalar(&issuer(), None, None), None);
        assert_eq!(diff_scalar(&issuer(), None, Some(&Value::Null)), None);
        assert_eq!(diff_scalar(&issuer(), Some(&json!("")), Some(&json!(""))), None);
    }

    #[test]
    fn test_cleared_value_is_removed() {
        let op = diff_scalar(&issuer(), Some(&json!("https://idp")), Some(&json!("")));
        assert_eq!(op, Some(PatchOperation::remove(issuer())));

        let op = diff_scalar(&issuer(), Some(&json!("https://idp")), None);
        assert_eq!(op, Some(PatchOperation::remove(issuer())));
    }

    #[test]
    fn test_absent_new_value_removes_empty_old_value() {
        let op = diff_scalar(&issuer(), Some(&json!("")), None);
        assert_eq!(op, Some(PatchOperation::remove(issuer())));
    }

    #[test]
    fn test_add_versus_replace() {
        let op = diff_scalar(&issuer(), None, Some(&json!("https://idp")));
        assert_eq!(op, Some(PatchOperation::add(issuer(), "https://idp")));

        let op = diff_scalar(&issuer(), Some(&json!("")), Some(&json!("https://idp")));
        assert_eq!(op, Some(PatchOperation::add(issuer(), "https://idp")));

        let op = diff_scalar(&issuer(), Some(&json!("https://a")), Some(&json!("https://b")));
        assert_eq!(op, Some(PatchOperation::replace(issuer(), "https://b")));
    }

    #[test]
    fn test_false_and_zero_are_not_empty() {
        let enabled = Pointer::from_fields(["spec", "enabled"]);
        let op = diff_scalar(&enabled, Some(&json!(true)), Some(&json!(false)));
        assert_eq!(op, Some(PatchOperation::replace(enabled.clone(), false)));

        let count = Pointer::from_fields(["spec", "count"]);
        let op = diff_scalar(&count, Some(&json!(3)), Some(&json!(0)));
        assert_eq!(op, Some(PatchOperation::replace(count.clone(), 0)));

        let op = diff_scalar(&count, None, Some(&json!(0)));
        assert_eq!(op, Some(PatchOperation::add(count, 0)));
    }

    #[test]
    fn test_empty_string_new_value_over_absent_is_added() {
        let op = diff_scalar(&issuer(), None, Some(&json!("")));
        assert_eq!(op, Some(PatchOperation::add(issuer(), "")));
    }

    #[test]
    fn test_base64_encoding() {
        let key = Pointer::from_fields(["spec", "sshConfig", "sshPrivateKey"]);
        let op = diff_scalar_encoded(
            &key,
            Some(&json!("old")),
            Some(&json!("secret")),
            ScalarEncoding::Base64,
        );
        assert_eq!(op, Some(PatchOperation::replace(key.clone(), "c2VjcmV0")));

        // Equality is decided before encoding.
        let op = diff_scalar_encoded(&key, Some(&json!("same")), Some(&json!("same")), ScalarEncoding::Base64);
        assert_eq!(op, None);

        let op = diff_scalar_encoded(&key, Some(&json!("old")), Some(&json!("")), ScalarEncoding::Base64);
        assert_eq!(op, Some(PatchOperation::remove(key)));
    }

    #[test]
    fn test_diff_field_typed() {
        let enabled = Pointer::from_fields(["spec", "enabled"]);
        let op = diff_field(&enabled, Some(&true), Some(&false)).unwrap();
        assert_eq!(op, Some(PatchOperation::replace(enabled, false)));

        let name: Option<&String> = None;
        let op = diff_field(&issuer(), name, Some(&"x".to_string())).unwrap();
        assert_eq!(op, Some(PatchOperation::add(issuer(), "x")));
    }
}

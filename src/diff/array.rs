//! Ordered scalar array differ.
//!
//! Arrays are always patched whole. Granular insert/remove operations on
//! indices shift under each other and are not worth the risk for the short
//! arrays these fields hold.

use crate::patch::PatchOperation;
use crate::pointer::Pointer;
use serde_json::Value;

/// Returns true if the two lists differ in length or in any position.
pub fn lists_differ<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() != b.len() || a.iter().zip(b).any(|(x, y)| x != y)
}

/// Diffs two string arrays. Order matters.
pub fn diff_string_array(path: &Pointer, current: &[String], desired: &[String]) -> Option<PatchOperation> {
    let value = || Value::from(desired.to_vec());
    match (current.is_empty(), desired.is_empty()) {
        (true, true) => None,
        (true, false) => Some(PatchOperation::add(path.clone(), value())),
        (false, true) => Some(PatchOperation::remove(path.clone())),
        (false, false) if lists_differ(current, desired) => {
            Some(PatchOperation::replace(path.clone(), value()))
        }
        (false, false) => None,
    }
}

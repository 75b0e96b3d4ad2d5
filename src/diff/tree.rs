//! Generic structural diff used as the first pass over composite lists.

use serde_json::Value;

/// TreeDiff produces a candidate patch between two documents.
///
/// Paths in the candidate are relative to the documents passed in. The
/// candidate may contain any RFC 6902 operation; callers decide whether to
/// accept it.
pub trait TreeDiff {
    fn diff(&self, current: &Value, desired: &Value) -> json_patch::Patch;
}

/// JsonPatchTree delegates to [`json_patch::diff`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatchTree;

impl TreeDiff for JsonPatchTree {
    fn diff(&self, current: &Value, desired: &Value) -> json_patch::Patch {
        json_patch::diff(current, desired)
    }
}

impl<F> TreeDiff for F
where
    F: Fn(&Value, &Value) -> json_patch::Patch,
{
    fn diff(&self, current: &Value, desired: &Value) -> json_patch::Patch {
        self(current, desired)
    }
}

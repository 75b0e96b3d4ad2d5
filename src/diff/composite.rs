//! Composite list differ.
//!
//! Elements of these lists are nested and often polymorphic, so element
//! identity is ambiguous. A generic tree diff is tried first and its
//! candidate is kept only when it is provably safe to apply; otherwise the
//! whole list is added, removed or replaced in one operation.

use super::tree::TreeDiff;
use crate::patch::{to_document, PatchError, PatchOperation};
use crate::pointer::Pointer;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Raised for a candidate operation outside the add/replace/remove/test
/// whitelist. It only ever selects the coarse fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UnsupportedCompositeOp(&'static str);

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Populated,
    Emptied,
    LengthChanged,
    Unsupported(UnsupportedCompositeOp),
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Populated => f.write_str("list was empty"),
            Fallback::Emptied => f.write_str("list became empty"),
            Fallback::LengthChanged => f.write_str("length changed"),
            Fallback::Unsupported(UnsupportedCompositeOp(op)) => {
                write!(f, "unsupported {} operation", op)
            }
        }
    }
}

fn whitelist(base: &Pointer, op: json_patch::PatchOperation) -> Result<PatchOperation, UnsupportedCompositeOp> {
    use json_patch::PatchOperation as Candidate;

    match op {
        Candidate::Add(op) => Ok(PatchOperation::add(base.join_encoded(op.path.as_str()), op.value)),
        Candidate::Replace(op) => Ok(PatchOperation::replace(base.join_encoded(op.path.as_str()), op.value)),
        Candidate::Remove(op) => Ok(PatchOperation::remove(base.join_encoded(op.path.as_str()))),
        Candidate::Test(op) => Ok(PatchOperation::test(base.join_encoded(op.path.as_str()), op.value)),
        other => Err(UnsupportedCompositeOp(match other {
            Candidate::Move(_) => "move",
            Candidate::Copy(_) => "copy",
            _ => "unknown",
        })),
    }
}

fn accept(
    base: &Pointer,
    candidate: json_patch::Patch,
    current_len: usize,
    desired_len: usize,
) -> Result<Vec<PatchOperation>, Fallback> {
    match (current_len, desired_len) {
        (0, d) if d > 0 => return Err(Fallback::Populated),
        (c, 0) if c > 0 => return Err(Fallback::Emptied),
        (c, d) if c != d => return Err(Fallback::LengthChanged),
        _ => {}
    }
    candidate
        .0
        .into_iter()
        .map(|op| whitelist(base, op))
        .collect::<Result<_, _>>()
        .map_err(Fallback::Unsupported)
}

fn coarse(path: &Pointer, current_len: usize, desired_len: usize, desired: Value) -> PatchOperation {
    match (current_len, desired_len) {
        (0, _) => PatchOperation::add(path.clone(), desired),
        (_, 0) => PatchOperation::remove(path.clone()),
        _ => PatchOperation::replace(path.clone(), desired),
    }
}

/// Diffs two lists of composite objects rooted at `path`.
pub fn diff_composite_list<T: Serialize>(
    tree: &dyn TreeDiff,
    path: &Pointer,
    current: &[T],
    desired: &[T],
) -> Result<Vec<PatchOperation>, PatchError> {
    let current_doc = to_document(path, current)?;
    let desired_doc = to_document(path, desired)?;
    if current_doc == desired_doc {
        return Ok(Vec::new());
    }

    let candidate = tree.diff(&current_doc, &desired_doc);
    match accept(path, candidate, current.len(), desired.len()) {
        Ok(ops) => {
            debug!(%path, ops = ops.len(), "granular list patch accepted");
            Ok(ops)
        }
        Err(reason) => {
            debug!(%path, %reason, "falling back to coarse list patch");
            Ok(vec![coarse(path, current.len(), desired.len(), desired_doc)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::JsonPatchTree;
    use serde_json::json;

    fn config() -> Pointer {
        Pointer::from_fields(["spec", "config"])
    }

    fn git(name: &str, path: &str) -> Value {
        json!({
            "configType": "GitConfigProviderSpec",
            "name": name,
            "gitRef": {"repository": "repo", "targetRevision": "main", "path": path}
        })
    }

    fn apply(mut doc: Value, ops: &[PatchOperation]) -> Value {
        let patch = crate::patch::Patch::from(ops.to_vec()).to_json_patch().unwrap();
        json_patch::patch(&mut doc, &patch.0).unwrap();
        doc
    }

    #[test]
    fn test_unchanged_list() {
        let list = vec![git("a", "/etc")];
        assert!(diff_composite_list(&JsonPatchTree, &config(), &list, &list).unwrap().is_empty());
        let empty: Vec<Value> = Vec::new();
        assert!(diff_composite_list(&JsonPatchTree, &config(), &empty, &empty).unwrap().is_empty());
    }

    #[test]
    fn test_same_length_is_granular() {
        let current = vec![git("a", "/etc"), git("b", "/var")];
        let desired = vec![git("a", "/etc"), git("b", "/opt")];

        let ops = diff_composite_list(&JsonPatchTree, &config(), &current, &desired).unwrap();
        assert!(!ops.is_empty());
        assert!(ops.iter().all(|op| op.path().as_str().starts_with("/spec/config/1/")));

        let doc = apply(json!({"spec": {"config": current}}), &ops);
        assert_eq!(doc, json!({"spec": {"config": desired}}));
    }

    #[test]
    fn test_length_change_replaces_list() {
        let current = vec![git("a", "/etc"), git("b", "/var")];
        let desired = vec![git("a", "/etc"), git("b", "/var"), git("c", "/opt")];

        let ops = diff_composite_list(&JsonPatchTree, &config(), &current, &desired).unwrap();
        assert_eq!(ops, vec![PatchOperation::replace(config(), json!(desired))]);
    }

    #[test]
    fn test_empty_transitions() {
        let empty: Vec<Value> = Vec::new();
        let list = vec![git("a", "/etc")];

        assert_eq!(
            diff_composite_list(&JsonPatchTree, &config(), &empty, &list).unwrap(),
            vec![PatchOperation::add(config(), json!(list))]
        );
        assert_eq!(
            diff_composite_list(&JsonPatchTree, &config(), &list, &empty).unwrap(),
            vec![PatchOperation::remove(config())]
        );
    }

    #[test]
    fn test_unsupported_candidate_falls_back() {
        let moving = |_: &Value, _: &Value| -> json_patch::Patch {
            serde_json::from_value(json!([{"op": "move", "from": "/0", "path": "/1"}])).unwrap()
        };
        let current = vec![git("a", "/etc"), git("b", "/var")];
        let desired = vec![git("b", "/var"), git("a", "/etc")];

        let ops = diff_composite_list(&moving, &config(), &current, &desired).unwrap();
        assert_eq!(ops, vec![PatchOperation::replace(config(), json!(desired))]);
    }

    #[test]
    fn test_test_operations_are_accepted() {
        let testing = |_: &Value, desired: &Value| -> json_patch::Patch {
            serde_json::from_value(json!([
                {"op": "test", "path": "/0/name", "value": "a"},
                {"op": "replace", "path": "/0/gitRef", "value": desired[0]["gitRef"]}
            ]))
            .unwrap()
        };
        let current = vec![git("a", "/etc")];
        let desired = vec![git("a", "/opt")];

        let ops = diff_composite_list(&testing, &config(), &current, &desired).unwrap();
        assert_eq!(
            ops,
            vec![
                PatchOperation::test(config().join_encoded("/0/name"), "a"),
                PatchOperation::replace(config().join_encoded("/0/gitRef"), desired[0]["gitRef"].clone()),
            ]
        );
    }

    #[test]
    fn test_fallback_reasons() {
        let empty = json_patch::Patch(Vec::new());
        assert_eq!(accept(&config(), empty.clone(), 0, 2), Err(Fallback::Populated));
        assert_eq!(accept(&config(), empty.clone(), 2, 0), Err(Fallback::Emptied));
        assert_eq!(accept(&config(), empty.clone(), 2, 3), Err(Fallback::LengthChanged));
        assert_eq!(accept(&config(), empty, 2, 2), Ok(Vec::new()));
    }
}

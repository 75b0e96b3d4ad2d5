//! Patch operation types.

use crate::pointer::Pointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// OpKind names the four operation kinds a partial-update endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    Add,
    Replace,
    Remove,
    Test,
}

impl OpKind {
    /// Returns the RFC 6902 `op` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Replace => "replace",
            OpKind::Remove => "remove",
            OpKind::Test => "test",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PatchOperation is a single instruction targeting a pointer path.
///
/// `Remove` has no value; every other kind always carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Upserts the value at the path.
    Add { path: Pointer, value: Value },
    /// Overwrites the value at an existing path.
    Replace { path: Pointer, value: Value },
    /// Deletes the value at the path.
    Remove { path: Pointer },
    /// Asserts the path holds the value. Never emitted by the differs.
    Test { path: Pointer, value: Value },
}

impl PatchOperation {
    /// Creates an add operation.
    pub fn add(path: Pointer, value: impl Into<Value>) -> Self {
        PatchOperation::Add {
            path,
            value: value.into(),
        }
    }

    /// Creates a replace operation.
    pub fn replace(path: Pointer, value: impl Into<Value>) -> Self {
        PatchOperation::Replace {
            path,
            value: value.into(),
        }
    }

    /// Creates a remove operation.
    pub fn remove(path: Pointer) -> Self {
        PatchOperation::Remove { path }
    }

    /// Creates a test operation.
    pub fn test(path: Pointer, value: impl Into<Value>) -> Self {
        PatchOperation::Test {
            path,
            value: value.into(),
        }
    }

    /// Returns the kind of this operation.
    pub fn kind(&self) -> OpKind {
        match self {
            PatchOperation::Add { .. } => OpKind::Add,
            PatchOperation::Replace { .. } => OpKind::Replace,
            PatchOperation::Remove { .. } => OpKind::Remove,
            PatchOperation::Test { .. } => OpKind::Test,
        }
    }

    /// Returns the target path.
    pub fn path(&self) -> &Pointer {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Test { path, .. } => path,
        }
    }

    /// Returns the carried value, `None` for remove.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOperation::Add { value, .. }
            | PatchOperation::Replace { value, .. }
            | PatchOperation::Test { value, .. } => Some(value),
            PatchOperation::Remove { .. } => None,
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.path())?;
        if let Some(value) = self.value() {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// Patch is an ordered list of operations.
///
/// An empty patch means the documents were equal and the update call
/// should be skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(pub Vec<PatchOperation>);

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Patch(Vec::new())
    }

    /// Appends an operation.
    pub fn push(&mut self, op: PatchOperation) {
        self.0.push(op);
    }

    /// Returns true if the patch has no operations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the operations in order.
    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    /// Returns an iterator over the operations.
    pub fn iter(&self) -> impl Iterator<Item = &PatchOperation> {
        self.0.iter()
    }

    /// Consumes the patch and returns the operations.
    pub fn into_inner(self) -> Vec<PatchOperation> {
        self.0
    }

    /// Converts into the `json_patch` representation, for transports that
    /// already speak it.
    pub fn to_json_patch(&self) -> Result<json_patch::Patch, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(ops: Vec<PatchOperation>) -> Self {
        Patch(ops)
    }
}

impl FromIterator<PatchOperation> for Patch {
    fn from_iter<T: IntoIterator<Item = PatchOperation>>(iter: T) -> Self {
        Patch(iter.into_iter().collect())
    }
}

impl Extend<PatchOperation> for Patch {
    fn extend<T: IntoIterator<Item = PatchOperation>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

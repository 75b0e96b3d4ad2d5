//! Entry point shared by all resource kinds.

use crate::diff::{JsonPatchTree, PatchOptions, TreeDiff};
use crate::patch::{Patch, PatchError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// DiffContext is what a resource builder needs from the caller: options
/// and the tree diff used for composite lists.
#[derive(Clone, Copy)]
pub struct DiffContext<'a> {
    pub options: &'a PatchOptions,
    pub tree: &'a dyn TreeDiff,
}

/// ResourceDiff is implemented by every resource kind that can be patched.
pub trait ResourceDiff: Serialize + DeserializeOwned {
    /// Kind name used in logs and errors.
    const KIND: &'static str;

    /// Computes the ordered patch turning `current` into `desired`.
    fn diff(ctx: DiffContext<'_>, current: &Self, desired: &Self) -> Result<Patch, PatchError>;
}

/// PatchBuilder holds options and the tree diff, and dispatches to the
/// builder of a resource kind.
///
/// Every call is independent: nothing is kept between calls.
pub struct PatchBuilder<T: TreeDiff = JsonPatchTree> {
    options: PatchOptions,
    tree: T,
}

impl PatchBuilder {
    /// Creates a builder using [`json_patch::diff`] for composite lists.
    pub fn new(options: PatchOptions) -> Self {
        PatchBuilder {
            options,
            tree: JsonPatchTree,
        }
    }
}

impl Default for PatchBuilder {
    fn default() -> Self {
        PatchBuilder::new(PatchOptions::default())
    }
}

impl<T: TreeDiff> PatchBuilder<T> {
    /// Creates a builder with a custom tree diff.
    pub fn with_tree_diff(options: PatchOptions, tree: T) -> Self {
        PatchBuilder { options, tree }
    }

    /// Returns the options.
    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Returns the context handed to resource builders.
    pub fn context(&self) -> DiffContext<'_> {
        DiffContext {
            options: &self.options,
            tree: &self.tree,
        }
    }

    /// Diffs two typed resources.
    pub fn diff<R: ResourceDiff>(&self, current: &R, desired: &R) -> Result<Patch, PatchError> {
        let patch = R::diff(self.context(), current, desired)?;
        debug!(kind = R::KIND, ops = patch.len(), "computed patch");
        Ok(patch)
    }

    /// Diffs two raw documents of kind `R`.
    pub fn diff_documents<R: ResourceDiff>(&self, current: &Value, desired: &Value) -> Result<Patch, PatchError> {
        let current: R = parse_document(current)?;
        let desired: R = parse_document(desired)?;
        self.diff(&current, &desired)
    }
}

/// Deserializes a document into the typed model of kind `R`.
pub fn parse_document<R: ResourceDiff>(doc: &Value) -> Result<R, PatchError> {
    serde_json::from_value(doc.clone()).map_err(|e| PatchError::malformed(R::KIND, e))
}

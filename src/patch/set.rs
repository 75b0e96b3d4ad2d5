//! Phase-ordered accumulation of operations.

use super::operation::{Patch, PatchOperation};
use std::collections::BTreeMap;
use tracing::trace;

/// Phase groups operations by the kind of field they touch.
///
/// Consumers apply patches in list order, so the phases are emitted in the
/// order declared here regardless of the order builders push them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Changes to a discriminator field.
    Discriminator,
    /// Leaf fields and scalar arrays.
    Scalar,
    /// Key/value maps such as labels and selectors.
    Map,
    /// Tagged-variant sub-documents.
    Variant,
    /// Lists of composite objects.
    CompositeList,
}

/// PatchSet collects operations per phase and flattens them into a [`Patch`].
///
/// Within a phase the push order is preserved.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    phases: BTreeMap<Phase, Vec<PatchOperation>>,
}

impl PatchSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        PatchSet {
            phases: BTreeMap::new(),
        }
    }

    /// Adds an operation to a phase.
    pub fn push(&mut self, phase: Phase, op: PatchOperation) {
        trace!(?phase, %op, "emit");
        self.phases.entry(phase).or_default().push(op);
    }

    /// Adds an operation if there is one.
    pub fn push_opt(&mut self, phase: Phase, op: Option<PatchOperation>) {
        if let Some(op) = op {
            self.push(phase, op);
        }
    }

    /// Adds several operations to a phase.
    pub fn extend(&mut self, phase: Phase, ops: impl IntoIterator<Item = PatchOperation>) {
        for op in ops {
            self.push(phase, op);
        }
    }

    /// Returns true if no operation was collected.
    pub fn is_empty(&self) -> bool {
        self.phases.values().all(Vec::is_empty)
    }

    /// Returns the total number of operations.
    pub fn len(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    /// Flattens the phases, in phase order, into a patch.
    pub fn into_patch(self) -> Patch {
        self.phases.into_values().flatten().collect()
    }
}

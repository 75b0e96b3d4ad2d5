//! Tagged-variant differ.
//!
//! A tagged variant is a sub-document whose shape is selected by a
//! discriminator field. It is atomic to the consuming schema: it is only
//! ever replaced whole, so a patch can never leave a hybrid of two shapes.

use crate::patch::{to_document, PatchError, PatchOperation};
use crate::pointer::Pointer;
use serde::Serialize;
use tracing::debug;

/// TaggedVariant is implemented by closed sum types with one case per shape.
pub trait TaggedVariant: Serialize {
    /// Name of the discriminator field.
    const DISCRIMINATOR: &'static str;

    /// Returns the discriminator value, or `None` if the document named a
    /// shape this type does not know.
    fn tag(&self) -> Option<&'static str>;

    /// Compares two values. Called only when both tags are equal; optional
    /// sub-fields missing on either side compare equal to their default.
    fn same_shape_eq(&self, other: &Self) -> bool;
}

/// Returns the tag of `value`, or an invalid shape error located at `path`.
pub fn ensure_known<V: TaggedVariant>(path: &Pointer, value: &V) -> Result<&'static str, PatchError> {
    value
        .tag()
        .ok_or_else(|| PatchError::invalid_shape(path.field(V::DISCRIMINATOR).as_str()))
}

/// Checks every element of a list of variants.
pub fn ensure_all_known<V: TaggedVariant>(path: &Pointer, values: &[V]) -> Result<(), PatchError> {
    for (i, v) in values.iter().enumerate() {
        ensure_known(&path.index(i), v)?;
    }
    Ok(())
}

/// Diffs two values of a tagged variant, emitting at most one `replace`.
pub fn diff_variant<V: TaggedVariant>(
    path: &Pointer,
    current: &V,
    desired: &V,
) -> Result<Option<PatchOperation>, PatchError> {
    let current_tag = ensure_known(path, current)?;
    let desired_tag = ensure_known(path, desired)?;

    if current_tag != desired_tag {
        debug!(%path, from = current_tag, to = desired_tag, "variant shape changed");
    } else if current.same_shape_eq(desired) {
        return Ok(None);
    }

    Ok(Some(PatchOperation::replace(path.clone(), to_document(path, desired)?)))
}

/// Diffs an optional tagged variant: appearing is an `add`, disappearing
/// is a `remove`.
pub fn diff_optional_variant<V: TaggedVariant>(
    path: &Pointer,
    current: Option<&V>,
    desired: Option<&V>,
) -> Result<Option<PatchOperation>, PatchError> {
    match (current, desired) {
        (None, None) => Ok(None),
        (None, Some(d)) => {
            ensure_known(path, d)?;
            Ok(Some(PatchOperation::add(path.clone(), to_document(path, d)?)))
        }
        (Some(c), None) => {
            ensure_known(path, c)?;
            Ok(Some(PatchOperation::remove(path.clone())))
        }
        (Some(c), Some(d)) => diff_variant(path, c, d),
    }
}

/// Diffs an optional sub-document that is only ever written whole.
pub fn diff_atomic<T: Serialize + PartialEq>(
    path: &Pointer,
    current: Option<&T>,
    desired: Option<&T>,
) -> Result<Option<PatchOperation>, PatchError> {
    match (current, desired) {
        (None, None) => Ok(None),
        (None, Some(d)) => Ok(Some(PatchOperation::add(path.clone(), to_document(path, d)?))),
        (Some(_), None) => Ok(Some(PatchOperation::remove(path.clone()))),
        (Some(c), Some(d)) if c == d => Ok(None),
        (Some(_), Some(d)) => Ok(Some(PatchOperation::replace(path.clone(), to_document(path, d)?))),
    }
}

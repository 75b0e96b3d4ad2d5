//! Diff module - Field-level differs that turn two values into patch operations.
//!
//! Each differ is a pure function of `(current, desired)` and handles one
//! kind of field:
//!
//! - [`scalar`] - leaf values
//! - [`map`] - key/value maps with valueless entries (labels, selectors)
//! - [`array`] - ordered scalar arrays, replaced whole
//! - [`variant`] - tagged unions, replaced whole
//! - [`composite`] - lists of nested objects, granular when safe
//!
//! The resource builders compose these into one ordered patch per resource.

pub mod array;
pub mod composite;
pub mod map;
mod options;
pub mod scalar;
mod tree;
pub mod variant;

pub use array::diff_string_array;
pub use composite::diff_composite_list;
pub use map::{diff_map, labels_to_map, Label};
pub use options::*;
pub use scalar::{diff_field, diff_scalar, diff_scalar_encoded, ScalarEncoding};
pub use tree::*;
pub use variant::{diff_atomic, diff_optional_variant, diff_variant, ensure_all_known, ensure_known, TaggedVariant};

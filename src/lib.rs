//! # Resource Patch
//!
//! Computes minimal, ordered RFC 6902 JSON patches between two snapshots of
//! a managed resource.
//!
//! Given the document currently stored on the server and the document the
//! user wants, the builders produce the list of `add`/`replace`/`remove`
//! operations a partial-update endpoint needs, preserving the protocol's
//! rules around empty values, valueless labels, polymorphic sub-documents
//! and nested configuration lists.
//!
//! ## Modules
//!
//! - [`value`] - Emptiness rules and JSON/YAML document helpers
//! - [`pointer`] - JSON pointer paths with RFC 6901 escaping
//! - [`patch`] - Patch operations, ordered patches and errors
//! - [`diff`] - Field-level differs (scalar, map, array, variant, composite list)
//! - [`resource`] - Typed resources and one patch builder per kind
//!
//! ## Example
//!
//! ```
//! use resource_patch::resource::{Device, PatchBuilder};
//! use serde_json::json;
//!
//! let current = json!({"metadata": {"labels": {"team": "infra"}}, "spec": {}});
//! let desired = json!({"metadata": {"labels": {"team": ""}}, "spec": {}});
//!
//! let patch = PatchBuilder::default()
//!     .diff_documents::<Device>(&current, &desired)
//!     .unwrap();
//! assert_eq!(
//!     serde_json::to_value(&patch).unwrap(),
//!     json!([{"op": "replace", "path": "/metadata/labels/team", "value": ""}])
//! );
//! ```

pub mod diff;
pub mod patch;
pub mod pointer;
pub mod resource;
pub mod value;

pub use diff::{KeyPolicy, PatchOptions};
pub use patch::{OpKind, Patch, PatchError, PatchOperation};
pub use pointer::Pointer;
pub use resource::{PatchBuilder, ResourceDiff};

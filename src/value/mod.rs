//! Value module - Helpers over the JSON documents that patches are computed from.
//!
//! Documents are plain `serde_json::Value` trees; this module adds the
//! notion of an "empty" scalar and YAML/JSON conversions.

mod value;

pub use value::*;

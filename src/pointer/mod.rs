//! Pointer module - Slash-delimited paths addressing fields inside a resource document.
//!
//! Patch paths are JSON pointers (RFC 6901) built by appending field names,
//! map keys and list indices to a base path.

mod path;

pub use path::*;

//! Patch module - Partial-update operations and ordered patch lists.
//!
//! A [`Patch`] is the output of every diff: an ordered list of RFC 6902
//! operations that consumers apply strictly in list order.

mod error;
mod operation;
mod set;

pub use error::*;
pub use operation::*;
pub use set::*;

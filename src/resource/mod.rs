//! Resource module - Typed resource models and one patch builder per kind.
//!
//! Each builder composes the field differs into a single ordered patch:
//! discriminator changes first, then scalars, maps, tagged variants and
//! finally composite lists.

mod auth_provider;
mod builder;
mod device;
mod fleet;
mod meta;



pub use auth_provider::*;
pub use builder::*;
pub use device::*;
pub use fleet::*;
pub use meta::*;

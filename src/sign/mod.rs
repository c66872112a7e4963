//! Sign module - per-sign descriptors and the name registry.
//!
//! Provides:
//! - [`SignDescriptor`] - address, size and orientation of one sign
//! - [`SignRegistry`] - maps sign names to descriptors

mod descriptor;
mod registry;

pub use descriptor::{Orientation, SignDescriptor};
pub use registry::SignRegistry;

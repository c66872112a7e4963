//! Sign registry for resolving signs by name.
//!
//! Names are unique. An empty name is a shortcut for "the only sign" and
//! resolves only while exactly one sign is registered.
//!
//! The registry is a plain in-memory table with no interior locking: it is
//! mutated through `&mut self` only, so concurrent registration and lookup
//! need an external lock around whatever owns it.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::{Orientation, SignDescriptor, SignRegistry};
//!
//! let mut registry = SignRegistry::new();
//! let sign = SignDescriptor::new(1, 86, 7, Orientation::Upright).unwrap();
//! registry.register("front", sign).unwrap();
//!
//! assert_eq!(registry.resolve("front").unwrap().address(), 1);
//! assert_eq!(registry.resolve("").unwrap().address(), 1);
//! assert!(registry.register("front", sign).is_err());
//! ```

use std::collections::HashMap;

use super::SignDescriptor;
use crate::error::{FlipdotError, Result};

/// Registry mapping sign names to descriptors.
#[derive(Debug, Clone, Default)]
pub struct SignRegistry {
    /// Signs by name.
    signs: HashMap<String, SignDescriptor>,
}

impl SignRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            signs: HashMap::new(),
        }
    }

    /// Register a sign under `name`.
    ///
    /// Fails with `AlreadyExists` if the name is taken; the existing entry is
    /// left untouched.
    pub fn register(&mut self, name: &str, sign: SignDescriptor) -> Result<()> {
        if self.signs.contains_key(name) {
            return Err(FlipdotError::AlreadyExists(name.to_string()));
        }
        self.signs.insert(name.to_string(), sign);
        Ok(())
    }

    /// Look up a sign by name.
    ///
    /// An empty name resolves to the single registered sign; with zero or
    /// several signs registered it is `NotFound`.
    pub fn resolve(&self, name: &str) -> Result<&SignDescriptor> {
        if name.is_empty() && self.signs.len() == 1 {
            if let Some(sign) = self.signs.values().next() {
                return Ok(sign);
            }
        }
        self.signs
            .get(name)
            .ok_or_else(|| FlipdotError::NotFound(name.to_string()))
    }

    /// Whether a sign is registered under exactly `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.signs.contains_key(name)
    }

    /// Number of registered signs.
    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signs.keys().map(String::as_str)
    }

    /// All `(name, sign)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignDescriptor)> {
        self.signs.iter().map(|(name, sign)| (name.as_str(), sign))
    }
}

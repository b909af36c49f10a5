//! Facts: memoized observations of the running system
//!
//! A [`Facts`] implementation groups related observations, each backed by a
//! shared [`FactCache`]. Facts are independent of any one resource; providers
//! consult them (for example to pick a package manager) while planning.

mod cache;
pub mod platform;

pub use cache::{FactCache, FactKey};
pub use platform::{PlatformFacts, PlatformProbe};

use crate::error::Result;
use std::collections::BTreeMap;

/// Serializable value of a fact, as reported by [`Facts::constants`]
pub type FactValue = serde_json::Value;

/// Snapshot of every zero-argument fact, keyed by fact name
pub type Constants = BTreeMap<&'static str, FactValue>;

/// A named group of memoized observations
pub trait Facts: Send + Sync {
    /// Cache backing every fact of this group
    fn cache(&self) -> &FactCache;

    /// Every zero-argument fact keyed by name.
    ///
    /// Cached values are reused; missing ones are evaluated (and cached).
    /// Facts that take arguments are never included.
    fn constants(&self) -> Result<Constants>;

    /// Forget every cached value, derived facts included.
    fn invalidate(&self) {
        self.cache().invalidate();
    }
}

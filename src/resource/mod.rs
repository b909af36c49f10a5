//! Concrete observers and the provider registry built from them
//!
//! Each observer is the OS-specific half of a package provider: it shells
//! out to the package manager to report what is installed. The generic
//! planning policy lives in [`declarative::Package`].

pub mod apt_package;
pub mod brew_package;

pub use apt_package::DpkgObserver;
pub use brew_package::BrewObserver;

use declarative::{PlatformFacts, ProviderRegistry};
use std::sync::Arc;

/// Registry of every package manager converge can observe
pub fn registry(facts: &Arc<PlatformFacts>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register_observer(BrewObserver::formula(Arc::clone(facts)));
    registry.register_observer(BrewObserver::cask(Arc::clone(facts)));
    registry.register_observer(DpkgObserver::new(Arc::clone(facts)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::HostProbe;

    #[test]
    fn test_registry_managers() {
        let facts = Arc::new(PlatformFacts::new(Arc::new(HostProbe)));
        let registry = registry(&facts);
        assert_eq!(
            registry.managers().collect::<Vec<_>>(),
            vec!["apt", "brew", "brew_cask"]
        );
    }
}

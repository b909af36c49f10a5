//! Provider registry - package manager id to provider factory

use crate::error::{Error, Result};
use crate::facts::PlatformFacts;
use crate::provider::{Package, Provider, VersionObserver};
use crate::types::PackageSpec;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds a provider for one desired state
pub type ProviderFactory = Arc<dyn Fn(PackageSpec) -> Result<Box<dyn Provider>> + Send + Sync>;

/// Explicit mapping from package manager id to provider factory.
///
/// Populated once at startup; lookups never load code by name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `manager`
    pub fn register<F>(&mut self, manager: impl Into<String>, factory: F)
    where
        F: Fn(PackageSpec) -> Result<Box<dyn Provider>> + Send + Sync + 'static,
    {
        self.factories.insert(manager.into(), Arc::new(factory));
    }

    /// Register a [`Package`] provider backed by a cloneable observer
    pub fn register_observer<O>(&mut self, observer: O)
    where
        O: VersionObserver + Clone + 'static,
    {
        let manager = observer.manager();
        self.register(manager, move |spec| {
            Ok(Box::new(Package::new(spec, observer.clone())?) as Box<dyn Provider>)
        });
    }

    pub fn get(&self, manager: &str) -> Result<&ProviderFactory> {
        self.factories
            .get(manager)
            .ok_or_else(|| Error::UnknownProvider {
                manager: manager.to_string(),
            })
    }

    pub fn contains(&self, manager: &str) -> bool {
        self.factories.contains_key(manager)
    }

    /// Registered manager ids, sorted
    pub fn managers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a provider for `spec` using the factory registered for `manager`
    pub fn build(&self, manager: &str, spec: PackageSpec) -> Result<Box<dyn Provider>> {
        let factory = self.get(manager)?;
        factory(spec)
    }

    /// Resolve the platform's default package manager to a registered id.
    pub fn resolve_default(&self, facts: &PlatformFacts) -> Result<String> {
        let manager = match facts.default_package_manager()? {
            Some(manager) => manager,
            None => {
                return Err(Error::NoDefaultProvider {
                    system: facts.system()?,
                });
            }
        };
        if !self.contains(&manager) {
            return Err(Error::UnknownProvider { manager });
        }
        log::debug!("default package manager: {}", manager);
        Ok(manager)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("managers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

//! Builds providers from the desired-state config

use crate::config::{Config, PackageEntry};
use anyhow::{Context, Result, bail};
use declarative::{Provider, ProviderRegistry};
use std::cell::OnceCell;
use std::collections::HashSet;

/// Package manager for entries without their own `manager`
///
/// A lazy default is resolved the first time such an entry is planned, so a
/// config naming a manager for every package never needs one.
pub struct DefaultManager<'a> {
    resolve: Box<dyn Fn() -> Result<String> + 'a>,
    resolved: OnceCell<String>,
}

impl<'a> DefaultManager<'a> {
    pub fn fixed(manager: impl Into<String>) -> Self {
        let manager = manager.into();
        Self::lazy(move || Ok(manager.clone()))
    }

    pub fn lazy(resolve: impl Fn() -> Result<String> + 'a) -> Self {
        Self {
            resolve: Box::new(resolve),
            resolved: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&str> {
        if let Some(manager) = self.resolved.get() {
            return Ok(manager);
        }
        let manager = (self.resolve)()?;
        log::info!("Using package manager: {}", manager);
        Ok(self.resolved.get_or_init(|| manager))
    }

    /// Manager for `entry`, resolving the default only when needed
    pub fn for_entry<'e>(&'e self, entry: &'e PackageEntry) -> Result<&'e str> {
        match entry.manager.as_deref() {
            Some(manager) => Ok(manager),
            None => self.get(),
        }
    }
}

/// Build one provider per configured package matching `target`.
///
/// Two entries resolving to the same manager and name are rejected.
pub fn build_providers(
    config: &Config,
    registry: &ProviderRegistry,
    default_manager: &DefaultManager<'_>,
    target: Option<&str>,
) -> Result<Vec<Box<dyn Provider>>> {
    let (manager_filter, name_filter) = match target {
        Some(t) => parse_target(t),
        None => (None, None),
    };

    let mut seen = HashSet::new();
    let mut providers = Vec::new();

    for entry in &config.packages {
        if !matches_name(entry, name_filter.as_deref()) {
            continue;
        }

        let manager = default_manager
            .for_entry(entry)
            .with_context(|| format!("Cannot plan package '{}'", entry.name))?;
        if manager_filter.as_deref().is_some_and(|m| m != manager) {
            continue;
        }

        if !seen.insert((manager, entry.name.as_str())) {
            bail!(
                "package '{}' is declared more than once for {}",
                entry.name,
                manager
            );
        }

        let provider = registry
            .build(manager, entry.spec())
            .with_context(|| format!("Cannot plan package '{}'", entry.name))?;
        providers.push(provider);
    }

    Ok(providers)
}

/// Parse a target string like "brew.ripgrep" into (manager, name).
///
/// A bare word is a name filter.
pub fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        Some((manager, name)) if !name.contains('.') => {
            (Some(manager.to_string()), Some(name.to_string()))
        }
        Some(_) => (None, Some(target.to_string())),
        None => (None, Some(target.to_string())),
    }
}

/// Check if a package entry matches the name filter
pub fn matches_name(entry: &PackageEntry, name: Option<&str>) -> bool {
    name.is_none_or(|n| entry.name.contains(n))
}

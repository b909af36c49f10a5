//! Platform facts: operating system, kernel and default managers.
//!
//! Raw observations come from a [`PlatformProbe`]; [`PlatformFacts`] adds
//! memoization and the derived facts built on top of them.
//!
//! # Example
//!
//! ```ignore
//! use declarative::facts::{Facts, PlatformFacts};
//!
//! let facts = PlatformFacts::new(probe);
//! println!("{}", facts.system()?);
//! println!("{:?}", facts.constants()?);
//! ```

use super::{Constants, FactCache, FactKey, FactValue, Facts};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Package manager id for Homebrew
pub const BREW: &str = "brew";
/// Package manager id for dpkg/apt based systems
pub const APT: &str = "apt";
/// Service manager id for systemd
pub const SYSTEMD: &str = "systemd";

/// Source of raw platform observations.
///
/// Implementations usually shell out (`uname`, `which`) and may block.
pub trait PlatformProbe: Send + Sync {
    /// Operating system name (`Darwin`, `Linux`, `Windows`, ...)
    fn system(&self) -> Result<String>;

    /// Kernel release
    fn release(&self) -> Result<String>;

    /// Kernel build/version string
    fn version(&self) -> Result<String>;

    /// CPU architecture
    fn arch(&self) -> Result<String> {
        Ok(std::env::consts::ARCH.to_string())
    }

    /// Whether an executable is reachable on `PATH`
    fn command_exists(&self, name: &str) -> Result<bool>;
}

/// Map a Rust OS id (`std::env::consts::OS`) to the conventional system name.
pub fn system_name(os: &str) -> String {
    match os {
        "macos" => "Darwin".to_string(),
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

type Getter = fn(&PlatformFacts) -> Result<FactValue>;

/// Zero-argument facts, in the order they are reported.
const CONSTANT_FACTS: &[(&str, Getter)] = &[
    ("system", |f| f.system().map(FactValue::from)),
    ("release", |f| f.release().map(FactValue::from)),
    ("version", |f| f.version().map(FactValue::from)),
    ("arch", |f| f.arch().map(FactValue::from)),
    ("default_package_manager", |f| {
        f.default_package_manager().map(FactValue::from)
    }),
    ("default_service_manager", |f| {
        f.default_service_manager().map(FactValue::from)
    }),
];

/// Memoized facts about the host platform.
///
/// One instance is meant to be created at startup and shared (`Arc`) by
/// everything that needs observations.
pub struct PlatformFacts {
    probe: Arc<dyn PlatformProbe>,
    cache: FactCache,
}

impl PlatformFacts {
    pub fn new(probe: Arc<dyn PlatformProbe>) -> Self {
        Self {
            probe,
            cache: FactCache::new(),
        }
    }

    /// Names of the facts reported by [`Facts::constants`]
    pub fn constant_names() -> impl Iterator<Item = &'static str> {
        CONSTANT_FACTS.iter().map(|(name, _)| *name)
    }

    pub fn system(&self) -> Result<String> {
        self.cache
            .get_or_observe(FactKey::new("system"), || self.probe.system())
    }

    pub fn release(&self) -> Result<String> {
        self.cache
            .get_or_observe(FactKey::new("release"), || self.probe.release())
    }

    pub fn version(&self) -> Result<String> {
        self.cache
            .get_or_observe(FactKey::new("version"), || self.probe.version())
    }

    pub fn arch(&self) -> Result<String> {
        self.cache
            .get_or_observe(FactKey::new("arch"), || self.probe.arch())
    }

    /// Whether `name` is an executable on `PATH`
    pub fn command_exists(&self, name: &str) -> Result<bool> {
        self.cache
            .get_or_observe(FactKey::with_args("command_exists", [name]), || {
                self.probe.command_exists(name)
            })
    }

    /// Package manager providers should default to on this platform
    ///
    /// `None` when the platform has no supported package manager.
    pub fn default_package_manager(&self) -> Result<Option<String>> {
        self.cache
            .get_or_observe(FactKey::new("default_package_manager"), || {
                let manager = match self.system()?.as_str() {
                    "Darwin" => Some(BREW),
                    "Linux" if self.command_exists("dpkg-query")? => Some(APT),
                    "Linux" if self.command_exists(BREW)? => Some(BREW),
                    _ => None,
                };
                Ok(manager.map(str::to_string))
            })
    }

    /// Service manager providers should default to on this platform
    pub fn default_service_manager(&self) -> Result<Option<String>> {
        self.cache
            .get_or_observe(FactKey::new("default_service_manager"), || {
                let manager = match self.system()?.as_str() {
                    "Darwin" => Some(BREW),
                    "Linux" if self.command_exists("systemctl")? => Some(SYSTEMD),
                    _ => None,
                };
                Ok(manager.map(str::to_string))
            })
    }
}

impl Facts for PlatformFacts {
    fn cache(&self) -> &FactCache {
        &self.cache
    }

    fn constants(&self) -> Result<Constants> {
        CONSTANT_FACTS
            .iter()
            .map(|(name, get)| get(self).map(|value| (*name, value)))
            .collect()
    }
}

impl fmt::Debug for PlatformFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformFacts")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

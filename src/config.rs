//! Desired-state configuration (`config.toml`)

use anyhow::{Context, Result, bail};
use declarative::PackageSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Top-level desired-state file
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// Global settings
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Package manager to use instead of the platform default
    pub package_manager: Option<String>,
    /// Number of parallel planning jobs
    pub jobs: Option<usize>,
}

/// Desired state of one package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageEntry {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub absent: bool,
    /// Per-package package manager override
    #[serde(default)]
    pub manager: Option<String>,
}

impl PackageEntry {
    /// Desired state handed to the provider
    pub fn spec(&self) -> PackageSpec {
        PackageSpec {
            name: self.name.clone(),
            absent: self.absent,
            latest: self.latest,
            version: self.version.clone(),
        }
    }

    /// Package manager for this entry, falling back to `default`
    pub fn manager<'a>(&'a self, default: &'a str) -> &'a str {
        self.manager.as_deref().unwrap_or(default)
    }
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        log::debug!(
            "Loaded {} packages from {}",
            config.packages.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.settings.jobs == Some(0) {
            bail!("settings.jobs must be at least 1");
        }

        // Lexical check; entries that only collide once the default manager
        // is resolved are rejected by `engine::build_providers`.
        let mut seen = HashSet::new();
        for entry in &self.packages {
            entry.spec().validate()?;
            let key = (entry.manager.as_deref(), entry.name.as_str());
            if !seen.insert(key) {
                bail!("package '{}' is declared more than once", entry.name);
            }
        }
        Ok(())
    }
}

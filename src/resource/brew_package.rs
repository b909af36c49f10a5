//! Homebrew package observer

use crate::runner;
use declarative::{CommandOutput, Error, PlatformFacts, Result, VersionObserver};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Known install locations, checked before `PATH`
const BREW_PATHS: &[&str] = &[
    "/opt/homebrew/bin/brew",              // Apple Silicon
    "/usr/local/bin/brew",                 // Intel
    "/home/linuxbrew/.linuxbrew/bin/brew", // Linux
];

/// stderr fragments brew prints when it does not know a package
const UNKNOWN_PACKAGE: &[&str] = &[
    "no available formula",
    "no available cask",
    "no formulae found",
    "no cask with this name",
];

/// Type of brew package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewPackageType {
    Formula,
    Cask,
}

/// Reports the installed version of a formula or cask via `brew info`
#[derive(Debug, Clone)]
pub struct BrewObserver {
    facts: Arc<PlatformFacts>,
    package_type: BrewPackageType,
}

#[derive(Debug, Default, Deserialize)]
struct BrewInfo {
    #[serde(default)]
    formulae: Vec<BrewFormula>,
    #[serde(default)]
    casks: Vec<BrewCask>,
}

#[derive(Debug, Deserialize)]
struct BrewFormula {
    #[serde(default)]
    installed: Vec<BrewInstalled>,
}

#[derive(Debug, Deserialize)]
struct BrewInstalled {
    version: String,
}

#[derive(Debug, Deserialize)]
struct BrewCask {
    installed: Option<String>,
}

impl BrewObserver {
    pub fn formula(facts: Arc<PlatformFacts>) -> Self {
        Self {
            facts,
            package_type: BrewPackageType::Formula,
        }
    }

    pub fn cask(facts: Arc<PlatformFacts>) -> Self {
        Self {
            facts,
            package_type: BrewPackageType::Cask,
        }
    }

    fn type_flag(&self) -> &'static str {
        match self.package_type {
            BrewPackageType::Formula => "--formula",
            BrewPackageType::Cask => "--cask",
        }
    }

    /// Path to the brew executable
    fn brew_path(&self, resource: &str) -> Result<String> {
        if let Some(path) = BREW_PATHS.iter().find(|p| Path::new(p).exists()) {
            return Ok((*path).to_string());
        }
        if self.facts.command_exists("brew")? {
            return Ok("brew".to_string());
        }
        Err(Error::observation(resource, "Homebrew not found"))
    }
}

impl VersionObserver for BrewObserver {
    fn manager(&self) -> &'static str {
        match self.package_type {
            BrewPackageType::Formula => "brew",
            BrewPackageType::Cask => "brew_cask",
        }
    }

    fn current_version(&self, package: &str) -> Result<Option<String>> {
        let resource = format!("{}:{}", self.manager(), package);
        let brew = self.brew_path(&resource)?;

        let output = runner::run_output(&brew, &["info", "--json=v2", self.type_flag(), package])
            .map_err(|e| Error::observation(&resource, format!("failed to run brew: {e}")))?;

        interpret_output(&resource, &output, self.package_type)
    }
}

/// Map a `brew info` run to an installed version.
///
/// Only brew's "unknown package" errors mean not installed; any other
/// failure is an observation error.
fn interpret_output(
    resource: &str,
    output: &CommandOutput,
    package_type: BrewPackageType,
) -> Result<Option<String>> {
    if !output.success {
        let stderr = output.stderr_str();
        let lower = stderr.to_lowercase();
        if UNKNOWN_PACKAGE.iter().any(|m| lower.contains(m)) {
            log::debug!("{}: {}", resource, stderr.trim());
            return Ok(None);
        }
        return Err(Error::observation(
            resource,
            format!("brew info failed: {}", stderr.trim()),
        ));
    }

    parse_installed_version(&output.stdout, package_type)
        .map_err(|e| Error::observation(resource, format!("unexpected brew output: {e}")))
}

/// Extract the installed version from `brew info --json=v2` output
fn parse_installed_version(
    json: &[u8],
    package_type: BrewPackageType,
) -> serde_json::Result<Option<String>> {
    let info: BrewInfo = serde_json::from_slice(json)?;

    let version = match package_type {
        BrewPackageType::Formula => info
            .formulae
            .into_iter()
            .next()
            .and_then(|f| f.installed.into_iter().next())
            .map(|i| i.version),
        BrewPackageType::Cask => info.casks.into_iter().next().and_then(|c| c.installed),
    };

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            success: false,
            code: Some(1),
        }
    }

    #[test]
    fn test_unknown_formula_is_not_installed() {
        let out = failed("Error: No available formula with the name \"jqq\".");
        assert_eq!(
            interpret_output("brew:jqq", &out, BrewPackageType::Formula).unwrap(),
            None
        );
    }

    #[test]
    fn test_unknown_cask_is_not_installed() {
        let out = failed("Error: Cask 'firefoxx' is unavailable: No Cask with this name exists.");
        assert_eq!(
            interpret_output("brew_cask:firefoxx", &out, BrewPackageType::Cask).unwrap(),
            None
        );
    }

    #[test]
    fn test_other_brew_failure_is_an_error() {
        let out = failed("Error: Another active Homebrew update process is already in progress.");
        let err = interpret_output("brew:jq", &out, BrewPackageType::Formula).unwrap_err();
        assert!(matches!(err, Error::Observation { .. }));
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_successful_output_is_parsed() {
        let out = CommandOutput {
            stdout: br#"{"formulae":[{"installed":[{"version":"1.7.1"}]}],"casks":[]}"#.to_vec(),
            stderr: Vec::new(),
            success: true,
            code: Some(0),
        };
        assert_eq!(
            interpret_output("brew:jq", &out, BrewPackageType::Formula).unwrap(),
            Some("1.7.1".to_string())
        );
    }

    #[test]
    fn test_parse_installed_formula() {
        let json = br#"{"formulae":[{"name":"jq","installed":[{"version":"1.7.1","used_options":[]}]}],"casks":[]}"#;
        assert_eq!(
            parse_installed_version(json, BrewPackageType::Formula).unwrap(),
            Some("1.7.1".to_string())
        );
    }

    #[test]
    fn test_parse_missing_formula() {
        let json = br#"{"formulae":[{"name":"jq","installed":[]}],"casks":[]}"#;
        assert_eq!(
            parse_installed_version(json, BrewPackageType::Formula).unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_cask() {
        let installed = br#"{"formulae":[],"casks":[{"token":"firefox","installed":"128.0"}]}"#;
        let missing = br#"{"formulae":[],"casks":[{"token":"firefox","installed":null}]}"#;

        assert_eq!(
            parse_installed_version(installed, BrewPackageType::Cask).unwrap(),
            Some("128.0".to_string())
        );
        assert_eq!(
            parse_installed_version(missing, BrewPackageType::Cask).unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_installed_version(b"Error: not json", BrewPackageType::Formula).is_err());
    }
}

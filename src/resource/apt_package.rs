//! dpkg/apt package observer

use crate::runner;
use declarative::{CommandOutput, Error, PlatformFacts, Result, VersionObserver};
use std::sync::Arc;

/// Reports the installed version of a Debian package via `dpkg-query`
#[derive(Debug, Clone)]
pub struct DpkgObserver {
    facts: Arc<PlatformFacts>,
}

impl DpkgObserver {
    pub fn new(facts: Arc<PlatformFacts>) -> Self {
        Self { facts }
    }
}

impl VersionObserver for DpkgObserver {
    fn manager(&self) -> &'static str {
        "apt"
    }

    fn current_version(&self, package: &str) -> Result<Option<String>> {
        let resource = format!("apt:{package}");
        if !self.facts.command_exists("dpkg-query")? {
            return Err(Error::observation(&resource, "dpkg-query not found"));
        }

        let output = runner::run_output(
            "dpkg-query",
            &["--show", "--showformat=${Status}\t${Version}", package],
        )
        .map_err(|e| Error::observation(&resource, format!("failed to run dpkg-query: {e}")))?;

        interpret_output(&resource, &output)
    }
}

/// Map a `dpkg-query --show` run to an installed version.
///
/// Exit status 1 means no package matched; any other failure (2 for a
/// locked or unreadable database, or a signal) is an observation error.
fn interpret_output(resource: &str, output: &CommandOutput) -> Result<Option<String>> {
    match output.code {
        Some(0) => Ok(parse_status_line(&output.stdout_str())),
        Some(1) => {
            log::debug!("{}: {}", resource, output.stderr_str().trim());
            Ok(None)
        }
        code => {
            let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            Err(Error::observation(
                resource,
                format!(
                    "dpkg-query failed ({}): {}",
                    status,
                    output.stderr_str().trim()
                ),
            ))
        }
    }
}

/// Parse `<status>\t<version>`; only fully installed packages have a version
fn parse_status_line(line: &str) -> Option<String> {
    let (status, version) = line.trim().split_once('\t')?;
    let installed = status.split_whitespace().last() == Some("installed");
    (installed && !version.is_empty()).then(|| version.to_string())
}

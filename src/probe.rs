//! Host platform probe backing [`PlatformFacts`](declarative::PlatformFacts)

use crate::runner;
use declarative::facts::platform::system_name;
use declarative::{Error, PlatformProbe, Result};

/// Observes the machine converge runs on
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl HostProbe {
    fn uname(fact: &'static str, flag: &str) -> Result<String> {
        runner::run_capture("uname", &[flag]).map_err(|e| Error::probe(fact, format!("{e:#}")))
    }
}

impl PlatformProbe for HostProbe {
    fn system(&self) -> Result<String> {
        Ok(system_name(std::env::consts::OS))
    }

    fn release(&self) -> Result<String> {
        Self::uname("release", "-r")
    }

    fn version(&self) -> Result<String> {
        Self::uname("version", "-v")
    }

    fn command_exists(&self, name: &str) -> Result<bool> {
        Ok(runner::find_command(name).is_some())
    }
}

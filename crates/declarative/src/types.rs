//! Core types for convergence planning

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Output;

/// A named unit of work required to converge a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resource is missing and must be created
    Install,
    /// Resource exists and must be removed
    Uninstall,
    /// Resource must be moved to an exact version
    Upgrade,
    /// Resource must be moved to the newest available version
    Latest,
}

impl Action {
    /// Stable lowercase name, as read by execution engines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Upgrade => "upgrade",
            Self::Latest => "latest",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of pending actions owned by one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionList(Vec<Action>);

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `action` is required. Recording the same action twice
    /// keeps a single entry.
    pub fn needs(&mut self, action: Action) {
        if !self.0.contains(&action) {
            self.0.push(action);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.0
    }
}

/// Desired state of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package name as known to the package manager
    pub name: String,
    /// The package must not be installed
    #[serde(default)]
    pub absent: bool,
    /// Always converge to the newest available version
    #[serde(default)]
    pub latest: bool,
    /// Exact version to converge to
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageSpec {
    /// Desired state "installed, any version"
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn absent(mut self) -> Self {
        self.absent = true;
        self
    }

    pub fn latest(mut self) -> Self {
        self.latest = true;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Reject desired states no provider could act on
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidSpec {
                message: "package name is empty".to_string(),
            });
        }
        if self.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(Error::InvalidSpec {
                message: format!("package '{}' has an empty version", self.name),
            });
        }
        Ok(())
    }
}

/// What an observation hook reported about a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Observed {
    /// Resource does not exist
    Absent,
    /// Resource exists at the given version
    Present { version: String },
}

impl Observed {
    /// Interpret a hook result; `None` and blank versions mean absent
    pub fn from_version(version: Option<String>) -> Self {
        match version {
            Some(v) if !v.trim().is_empty() => Self::Present {
                version: v.trim().to_string(),
            },
            _ => Self::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Present { version } => Some(version),
            Self::Absent => None,
        }
    }
}

/// Lifecycle of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanState {
    /// `plan()` has not run yet
    #[default]
    Unplanned,
    /// `plan()` ran; the action list reflects the last observation
    Planned,
}

/// Outcome of planning one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Planning succeeded; an empty list means already converged
    Actions(Vec<Action>),
    /// Observation or planning failed
    Failed { error: String },
}

impl PlanOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Actions(actions) if actions.is_empty())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Planning result for a single resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePlan {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    pub outcome: PlanOutcome,
}

/// Summary of a batch of plans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub converged: usize,
    pub install: usize,
    pub uninstall: usize,
    pub upgrade: usize,
    pub latest: usize,
    pub failed: usize,
}

impl PlanSummary {
    /// Count outcomes of a batch
    pub fn from_plans(plans: &[ResourcePlan]) -> Self {
        let mut summary = Self::default();
        for plan in plans {
            summary.add_outcome(&plan.outcome);
        }
        summary
    }

    /// Add one outcome to the summary
    pub fn add_outcome(&mut self, outcome: &PlanOutcome) {
        match outcome {
            PlanOutcome::Failed { .. } => self.failed += 1,
            PlanOutcome::Actions(actions) if actions.is_empty() => self.converged += 1,
            PlanOutcome::Actions(actions) => {
                for action in actions {
                    match action {
                        Action::Install => self.install += 1,
                        Action::Uninstall => self.uninstall += 1,
                        Action::Upgrade => self.upgrade += 1,
                        Action::Latest => self.latest += 1,
                    }
                }
            }
        }
    }

    /// Total number of planned actions
    pub fn total_actions(&self) -> usize {
        self.install + self.uninstall + self.upgrade + self.latest
    }

    pub fn has_changes(&self) -> bool {
        self.total_actions() > 0
    }

    /// No resource failed to plan
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Output from a probe command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

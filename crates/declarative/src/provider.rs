//! Providers: the reconciliation units.
//!
//! A provider is bound to one resource and one desired state. Its
//! [`Provider::plan`] observes the resource afresh, compares the observation
//! with the desired state and records the actions an execution engine must
//! run to converge. Planning never touches the managed resource.

use crate::error::Result;
use crate::types::{Action, ActionList, Observed, PackageSpec, PlanState};
use std::fmt;

/// Core trait for reconciliation units
///
/// Providers are owned by a single caller and are not shared between
/// threads, but must be `Send` so a batch can be planned on a worker pool.
pub trait Provider: Send + fmt::Debug {
    /// Unique identifier, e.g. "brew:ripgrep"
    fn id(&self) -> String;

    /// Resource type category, e.g. "package"
    fn resource_type(&self) -> &'static str;

    /// Observe the resource and compute the actions needed to converge.
    ///
    /// Pending actions from a previous call are discarded first, so calling
    /// `plan` repeatedly never accumulates actions. Observation failures are
    /// returned unchanged and leave the provider unplanned.
    fn plan(&mut self) -> Result<&[Action]>;

    /// Actions recorded by the last successful [`Provider::plan`]
    fn actions(&self) -> &[Action];

    fn state(&self) -> PlanState;
}

/// Observation hook for package providers
///
/// Reports the installed version of a package, `None` (or a blank string)
/// when it is not installed, or an error when the state cannot be
/// determined.
pub trait VersionObserver: Send + Sync + fmt::Debug {
    /// Package manager id, e.g. "brew"
    fn manager(&self) -> &'static str;

    fn current_version(&self, package: &str) -> Result<Option<String>>;
}

/// Decide the single action needed to move `current` to `desired`.
///
/// Order: `absent`, then a missing package, then `latest`, then an explicit
/// version mismatch.
pub fn decide(desired: &PackageSpec, current: &Observed) -> Option<Action> {
    if desired.absent {
        return match current {
            Observed::Absent => None,
            Observed::Present { .. } => Some(Action::Uninstall),
        };
    }

    if current.is_absent() {
        return Some(Action::Install);
    }

    if desired.latest {
        return Some(Action::Latest);
    }

    match desired.version.as_deref() {
        Some(wanted) if current.version() != Some(wanted) => Some(Action::Upgrade),
        _ => None,
    }
}

/// A package provider parameterised by its observation hook
#[derive(Debug)]
pub struct Package<O: VersionObserver> {
    spec: PackageSpec,
    observer: O,
    actions: ActionList,
    state: PlanState,
}

impl<O: VersionObserver> Package<O> {
    /// Bind a desired state to an observer.
    ///
    /// Fails when the desired state is unusable (empty name or version).
    pub fn new(spec: PackageSpec, observer: O) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            observer,
            actions: ActionList::new(),
            state: PlanState::Unplanned,
        })
    }

    pub fn spec(&self) -> &PackageSpec {
        &self.spec
    }

    /// Observe the package without planning
    pub fn observe(&self) -> Result<Observed> {
        self.observer
            .current_version(&self.spec.name)
            .map(Observed::from_version)
    }

    fn needs(&mut self, action: Action) {
        self.actions.needs(action);
    }
}

impl<O: VersionObserver> Provider for Package<O> {
    fn id(&self) -> String {
        format!("{}:{}", self.observer.manager(), self.spec.name)
    }

    fn resource_type(&self) -> &'static str {
        "package"
    }

    fn plan(&mut self) -> Result<&[Action]> {
        self.actions.clear();
        self.state = PlanState::Unplanned;

        let current = self.observe()?;
        log::debug!("{}: observed {:?}", self.id(), current);

        if let Some(action) = decide(&self.spec, &current) {
            log::debug!("{}: needs {}", self.id(), action);
            self.needs(action);
        }

        self.state = PlanState::Planned;
        Ok(self.actions.as_slice())
    }

    fn actions(&self) -> &[Action] {
        self.actions.as_slice()
    }

    fn state(&self) -> PlanState {
        self.state
    }
}

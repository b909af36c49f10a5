//! # Declarative
//!
//! Reconciliation core for desired-state configuration management.
//!
//! Given the declared state of a resource and its freshly observed state,
//! a provider computes the minimal list of actions needed to converge the
//! two, without re-planning work that is already done.
//!
//! ## Core Concepts
//!
//! - **Fact**: a memoized observation of the running system ([`FactCache`])
//! - **Facts**: a group of related facts with a [`Facts::constants`] snapshot
//! - **Provider**: the reconciliation unit; [`Provider::plan`] emits [`Action`]s
//! - **VersionObserver**: the observation hook a package provider consults
//! - **ProviderRegistry**: package manager id to provider factory
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Package, PackageSpec, Provider, VersionObserver};
//!
//! #[derive(Debug, Clone)]
//! struct Pinned;
//!
//! impl VersionObserver for Pinned {
//!     fn manager(&self) -> &'static str { "pinned" }
//!     fn current_version(&self, _package: &str) -> declarative::Result<Option<String>> {
//!         Ok(Some("1.0".into()))
//!     }
//! }
//!
//! let mut provider = Package::new(PackageSpec::new("jq").version("2.0"), Pinned)?;
//! assert_eq!(provider.plan()?, &[declarative::Action::Upgrade]);
//! ```
//!
//! Executing actions is left to the caller, which is also responsible for
//! invalidating facts once the system has changed.

pub mod error;
pub mod facts;
pub mod planner;
pub mod provider;
pub mod registry;
pub mod types;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use facts::{Constants, FactCache, FactKey, FactValue, Facts, PlatformFacts, PlatformProbe};
pub use planner::{ConvergencePlan, plan_all};
pub use provider::{Package, Provider, VersionObserver, decide};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use types::{
    Action, ActionList, CommandOutput, Observed, PackageSpec, PlanOutcome, PlanState,
    PlanSummary, ResourcePlan,
};

//! Batch planner - plans many independent providers at once

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{PlanOutcome, PlanSummary, ResourcePlan};
use rayon::prelude::*;

/// Plans for a batch of resources, in input order
#[derive(Debug, Clone, Default)]
pub struct ConvergencePlan {
    pub resources: Vec<ResourcePlan>,
}

impl ConvergencePlan {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary::from_plans(&self.resources)
    }

    /// Resources that need at least one action
    pub fn changes(&self) -> impl Iterator<Item = &ResourcePlan> {
        self.resources
            .iter()
            .filter(|r| matches!(&r.outcome, PlanOutcome::Actions(a) if !a.is_empty()))
    }

    /// Resources whose observation failed
    pub fn failures(&self) -> impl Iterator<Item = &ResourcePlan> {
        self.resources.iter().filter(|r| r.outcome.is_failed())
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Plan every provider, using up to `jobs` worker threads.
///
/// A provider whose observation fails is recorded as
/// [`PlanOutcome::Failed`]; the rest of the batch is still planned.
pub fn plan_all(providers: &mut [Box<dyn Provider>], jobs: usize) -> Result<ConvergencePlan> {
    let jobs = jobs.max(1);

    let resources: Vec<ResourcePlan> = if jobs == 1 || providers.len() <= 1 {
        providers.iter_mut().map(|p| plan_one(p.as_mut())).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        pool.install(|| {
            providers
                .par_iter_mut()
                .map(|p| plan_one(p.as_mut()))
                .collect()
        })
    };

    Ok(ConvergencePlan { resources })
}

fn plan_one(provider: &mut dyn Provider) -> ResourcePlan {
    let outcome = match provider.plan() {
        Ok(actions) => PlanOutcome::Actions(actions.to_vec()),
        Err(e) => PlanOutcome::Failed {
            error: e.to_string(),
        },
    };

    if let PlanOutcome::Failed { error } = &outcome {
        log::warn!("{}: {}", provider.id(), error);
    }

    ResourcePlan {
        resource_id: provider.id(),
        resource_type: provider.resource_type().to_string(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::platform::tests::MockProbe;
    use crate::facts::{PlatformFacts, PlatformProbe};
    use crate::provider::tests::FakeObserver;
    use crate::provider::{Package, VersionObserver};
    use crate::types::{Action, PackageSpec};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn fake(spec: PackageSpec, installed: Option<&str>) -> Box<dyn Provider> {
        Box::new(Package::new(spec, FakeObserver::installed(installed)).unwrap())
    }

    #[test]
    fn test_empty_batch() {
        let mut providers: Vec<Box<dyn Provider>> = Vec::new();
        let plan = plan_all(&mut providers, 4).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.summary(), PlanSummary::default());
    }

    #[test]
    fn test_preserves_order_and_records_failures() {
        let mut providers = vec![
            fake(PackageSpec::new("a"), Some("1.0")),
            fake(PackageSpec::new("b"), None),
            Box::new(Package::new(PackageSpec::new("c"), FakeObserver::failing()).unwrap())
                as Box<dyn Provider>,
            fake(PackageSpec::new("d").version("2.0"), Some("1.0")),
        ];

        for jobs in [1, 4] {
            let plan = plan_all(&mut providers, jobs).unwrap();
            let ids: Vec<&str> = plan.resources.iter().map(|r| r.resource_id.as_str()).collect();
            assert_eq!(ids, vec!["fake:a", "fake:b", "fake:c", "fake:d"]);

            assert!(plan.resources[0].outcome.is_converged());
            assert_eq!(
                plan.resources[1].outcome,
                PlanOutcome::Actions(vec![Action::Install])
            );
            assert!(plan.resources[2].outcome.is_failed());
            assert_eq!(plan.changes().count(), 2);
            assert_eq!(plan.failures().count(), 1);

            let summary = plan.summary();
            assert_eq!(summary.converged, 1);
            assert_eq!(summary.install, 1);
            assert_eq!(summary.upgrade, 1);
            assert_eq!(summary.failed, 1);
        }
    }

    /// Observer that consults shared platform facts before answering
    #[derive(Debug, Clone)]
    struct FactsObserver {
        facts: Arc<PlatformFacts>,
    }

    impl VersionObserver for FactsObserver {
        fn manager(&self) -> &'static str {
            "brew"
        }

        fn current_version(&self, package: &str) -> Result<Option<String>> {
            if self.facts.command_exists("brew")? {
                Ok(Some(format!("{package}-1.0")))
            } else {
                Err(Error::observation(package, "brew not found"))
            }
        }
    }

    #[test]
    fn test_shared_facts_observed_once_across_batch() {
        let probe = Arc::new(MockProbe::new("Darwin", &["brew"]));
        let facts = Arc::new(PlatformFacts::new(
            Arc::clone(&probe) as Arc<dyn PlatformProbe>
        ));

        let mut providers: Vec<Box<dyn Provider>> = (0..32)
            .map(|i| {
                let observer = FactsObserver {
                    facts: Arc::clone(&facts),
                };
                Box::new(Package::new(PackageSpec::new(format!("pkg{i}")), observer).unwrap())
                    as Box<dyn Provider>
            })
            .collect();

        let plan = plan_all(&mut providers, 8).unwrap();

        assert_eq!(plan.summary().converged, 32);
        assert_eq!(probe.calls("command_exists:brew"), 1);
        assert_eq!(probe.total.load(Ordering::SeqCst), 1);
    }
}

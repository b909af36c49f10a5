//! `converge plan` - observe declared packages and print required actions

use crate::Context;
use crate::cli::PlanArgs;
use crate::config::Config;
use crate::engine::{self, DefaultManager, build_providers};
use crate::paths;
use crate::ui;
use anyhow::{Context as _, Result, bail};
use declarative::plan_all;

const DEFAULT_JOBS: usize = 4;

/// How the plan is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Json,
    Human,
    /// `-q`: only errors
    Silent,
}

impl Output {
    fn select(json: bool, quiet: bool) -> Self {
        if json {
            Self::Json
        } else if quiet {
            Self::Silent
        } else {
            Self::Human
        }
    }
}

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let path = paths::config_file(args.config.as_deref())?;
    let config = Config::load(&path)?;

    let default_manager = match &config.settings.package_manager {
        Some(manager) => DefaultManager::fixed(manager.as_str()),
        None => DefaultManager::lazy(|| {
            ctx.registry
                .resolve_default(&ctx.facts)
                .context("Cannot choose a package manager; set settings.package_manager")
        }),
    };

    let mut providers = build_providers(
        &config,
        &ctx.registry,
        &default_manager,
        args.target.as_deref(),
    )?;

    let output = Output::select(args.json, ctx.quiet);

    if providers.is_empty() && args.target.is_some() && output != Output::Json {
        if output == Output::Human {
            ui::warn("No packages match the target");
        }
        return Ok(());
    }

    let jobs = args.jobs.or(config.settings.jobs).unwrap_or(DEFAULT_JOBS);
    let plan = plan_all(&mut providers, jobs)?;
    let summary = plan.summary();

    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&plan.resources)?),
        Output::Human => {
            engine::display_plan(&plan, ctx.verbose > 0);
            if summary.has_changes() {
                println!();
                ui::info(&format!(
                    "{} of {} packages need changes",
                    plan.changes().count(),
                    plan.resources.len()
                ));
                engine::print_summary(&summary);
            }
        }
        Output::Silent => {}
    }

    if !summary.is_success() {
        let failed: Vec<&str> = plan.failures().map(|r| r.resource_id.as_str()).collect();
        bail!(
            "{} packages could not be observed: {}",
            summary.failed,
            failed.join(", ")
        );
    }

    Ok(())
}

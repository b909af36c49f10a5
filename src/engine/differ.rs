//! Plan display - converge-specific UI

use colored::{ColoredString, Colorize};
use declarative::{Action, ConvergencePlan, PlanOutcome, PlanSummary, ResourcePlan};

fn action_symbol(action: Action) -> ColoredString {
    match action {
        Action::Install => "+".green(),
        Action::Uninstall => "-".red(),
        Action::Upgrade => "~".yellow(),
        Action::Latest => "↑".cyan(),
    }
}

fn describe(plan: &ResourcePlan) -> (ColoredString, String) {
    match &plan.outcome {
        PlanOutcome::Actions(actions) if actions.is_empty() => {
            ("○".dimmed(), "(converged)".to_string())
        }
        PlanOutcome::Actions(actions) => {
            let names: Vec<&str> = actions.iter().map(Action::as_str).collect();
            (action_symbol(actions[0]), names.join(", "))
        }
        PlanOutcome::Failed { error } => ("✗".red(), error.clone()),
    }
}

/// Display a plan in a user-friendly format
pub fn display_plan(plan: &ConvergencePlan, verbose: bool) {
    if plan.is_empty() {
        println!();
        println!("  {} No packages declared", "ℹ".blue());
        return;
    }

    let summary = plan.summary();
    if !summary.has_changes() && summary.is_success() && !verbose {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Convergence Plan".bold()
    );
    println!("│");

    for resource in &plan.resources {
        if resource.outcome.is_converged() && !verbose {
            continue;
        }
        let (symbol, detail) = describe(resource);
        println!(
            "│   {} {:<30} {}",
            symbol,
            resource.resource_id,
            detail.dimmed()
        );
    }

    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} actions ({} converged, {} failed)",
        summary.total_actions().to_string().bold(),
        summary.converged.to_string().green(),
        summary.failed.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Print per-action counts
pub fn print_summary(summary: &PlanSummary) {
    if summary.install > 0 {
        println!("    • {} to install", summary.install);
    }
    if summary.uninstall > 0 {
        println!("    • {} to uninstall", summary.uninstall);
    }
    if summary.upgrade > 0 {
        println!("    • {} to upgrade", summary.upgrade);
    }
    if summary.latest > 0 {
        println!("    • {} to bring to latest", summary.latest);
    }
    if summary.failed > 0 {
        println!("    • {} {} not observed", summary.failed, "resources".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(outcome: PlanOutcome) -> ResourcePlan {
        ResourcePlan {
            resource_id: "brew:jq".into(),
            resource_type: "package".into(),
            outcome,
        }
    }

    #[test]
    fn test_describe_converged() {
        let (_, detail) = describe(&resource(PlanOutcome::Actions(vec![])));
        assert_eq!(detail, "(converged)");
    }

    #[test]
    fn test_describe_actions() {
        let (_, detail) = describe(&resource(PlanOutcome::Actions(vec![Action::Upgrade])));
        assert_eq!(detail, "upgrade");
    }

    #[test]
    fn test_describe_failure() {
        let (_, detail) = describe(&resource(PlanOutcome::Failed {
            error: "cannot observe brew:jq: Homebrew not found".into(),
        }));
        assert!(detail.contains("Homebrew not found"));
    }
}

//! `converge facts` - show platform facts

use crate::Context;
use crate::cli::FactsArgs;
use crate::ui;
use anyhow::{Context as _, Result};
use declarative::{FactValue, Facts};

pub fn run(ctx: &Context, args: FactsArgs) -> Result<()> {
    if args.refresh {
        ctx.facts.invalidate();
    }

    let constants = ctx.facts.constants().context("Failed to gather platform facts")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&constants)?);
        return Ok(());
    }

    ui::header("Platform Facts");
    for (name, value) in &constants {
        ui::kv(name, &display_value(value));
    }

    if ctx.verbose > 0 {
        println!();
        ui::dim(&format!("{} facts cached", ctx.facts.cache().stats()));
    }

    Ok(())
}

fn display_value(value: &FactValue) -> String {
    match value {
        FactValue::Null => "(none)".to_string(),
        FactValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

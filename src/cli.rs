use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "converge")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Plan the actions needed to converge your machine to its declared state", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show platform facts
    Facts(FactsArgs),

    /// Plan the actions needed to converge declared packages
    Plan(PlanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct FactsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Forget cached facts before reading them
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Only plan packages matching NAME or MANAGER.NAME
    pub target: Option<String>,

    /// Desired-state file (default: <config dir>/config.toml)
    #[arg(short, long, env = "CONVERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of parallel observation jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

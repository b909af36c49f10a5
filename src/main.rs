mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod probe;
mod resource;
mod runner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use declarative::{PlatformFacts, ProviderRegistry};
use probe::HostProbe;
use std::io;
use std::sync::Arc;

/// Global context for the application
///
/// Facts are created once here and shared by every provider; the registry is
/// resolved once at startup.
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub facts: Arc<PlatformFacts>,
    pub registry: ProviderRegistry,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let facts = Arc::new(PlatformFacts::new(Arc::new(HostProbe)));
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        registry: resource::registry(&facts),
        facts,
    };

    match cli.command {
        Command::Facts(args) => commands::facts::run(&ctx, args),
        Command::Plan(args) => commands::plan::run(&ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "converge", &mut io::stdout());
            Ok(())
        }
    }
}

mod classify;
mod commands;
mod config;
mod dispatch;
mod error;
mod event;
mod github;
mod intent;
mod subprocess;
mod telemetry;
mod template;
#[cfg(test)]
mod testing;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::classify::ClassifyArgs;
use commands::run::RunArgs;

#[derive(Debug, Parser)]
#[command(
    name = "release-bot",
    version,
    about = "ChatOps release bot: turns GitHub events into release-tool runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Handle the triggering event: classify, dispatch, and post the result
    Run(RunArgs),
    /// Print the intent an event classifies to, without running anything
    Classify(ClassifyArgs),
    /// Print the JSON Schema for the [release_bot] config table
    Schema,
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Classify(_) => "classify",
            Self::Schema => "schema",
        }
    }

    const fn debug(&self) -> bool {
        match self {
            Self::Run(args) => args.event.inputs.debug,
            Self::Classify(args) => args.event.inputs.debug,
            Self::Schema => false,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    telemetry::init(cli.command.debug());

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Classify(args) => args.execute(),
        Commands::Schema => commands::schema::run_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<error::ExitError>() {
                eprintln!("error: {exit_err}");
                exit_err.exit_code()
            } else {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}

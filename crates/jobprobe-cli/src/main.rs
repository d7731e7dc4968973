//! jobprobe CLI: run the job screen scenarios against a live scheduler
//!
//! ## Usage
//!
//! ```bash
//! jobprobe list                                  # Available scenarios
//! jobprobe run                                   # Run every scenario
//! jobprobe run -s dispatch-to-nodes --headed     # One scenario, visible browser
//! jobprobe run --report target/jobprobe.json     # Write the JSON suite report
//! jobprobe config -c harness.yaml                # Effective configuration
//! ```

use clap::Parser;
use jobprobe_cli::{handlers, Cli, CliConfig, CliResult, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into());

    match cli.command {
        Commands::Run(args) => handlers::run::execute(&config, &args),
        Commands::List(args) => handlers::list::execute(&args),
        Commands::Config(args) => handlers::config::execute(&args),
    }
}

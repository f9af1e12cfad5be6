use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    analyze::{self, AnalyzeArgs},
    compare::{self, CompareArgs},
    estimate::{self, EstimateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "tfa", about = "Correlation dimension (D2) analysis of event samples")]
struct Cli {
    /// Log progress at info level (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate D2 for feature vectors projected from event files.
    Estimate(EstimateArgs),
    /// Run a YAML-configured analysis and print its report.
    Analyze(AnalyzeArgs),
    /// Compare a measured value against reference values.
    Compare(CompareArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    match cli.command {
        Command::Estimate(args) => estimate::run(&args),
        Command::Analyze(args) => analyze::run(&args),
        Command::Compare(args) => compare::run(&args),
    }
}

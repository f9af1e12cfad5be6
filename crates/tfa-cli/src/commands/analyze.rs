use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use tfa_exp::{load_config, render_text, run_from_config, write_report};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// YAML analysis configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Directory receiving analysis_report.json and analysis_report.txt.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    log::info!("running analysis '{}'", config.name);
    let report = run_from_config(&config)?;
    print!("{}", render_text(&report));
    if let Some(out) = &args.out {
        write_report(&report, out)?;
        log::info!("report written to {}", out.display());
    }
    Ok(())
}

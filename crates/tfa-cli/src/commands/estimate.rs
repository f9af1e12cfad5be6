use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use tfa_d2::{
    bootstrap_estimate, correlation_curve, fit_curve, BootstrapOpts, D2Outcome, EstimateOpts,
};
use tfa_exp::{
    load_table, project, subsample, FeatureSpec, Normalization, TableFormat, TableSpec,
};

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Event files or glob patterns; repeatable.
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,
    /// Feature axis as `column[:transform]`; repeatable.
    #[arg(long = "feature", required = true)]
    pub features: Vec<FeatureSpec>,
    /// Column names for files without a header line.
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Field delimiter; whitespace separated when absent.
    #[arg(long, conflicts_with = "json")]
    pub delimiter: Option<char>,
    /// Inputs are JSON objects of numeric column arrays.
    #[arg(long)]
    pub json: bool,
    /// Keep transformed values instead of rescaling each axis to [0, 1].
    #[arg(long)]
    pub raw: bool,
    /// Number of log-spaced radii.
    #[arg(long, default_value_t = 30)]
    pub radii: usize,
    /// Subsample this many events before estimating.
    #[arg(long)]
    pub sample: Option<usize>,
    /// Seed for subsampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Number of bootstrap resamples; no bootstrap when absent.
    #[arg(long)]
    pub bootstrap: Option<usize>,
    /// Worker threads for the bootstrap.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,
    /// Print the correlation sum at every radius.
    #[arg(long)]
    pub curve: bool,
}

pub fn run(args: &EstimateArgs) -> Result<(), Box<dyn Error>> {
    let format = match args.delimiter {
        _ if args.json => TableFormat::JsonColumns,
        Some(delimiter) => TableFormat::Delimited {
            delimiter,
            has_header: args.columns.is_empty(),
        },
        None => TableFormat::Whitespace,
    };
    let spec = TableSpec {
        paths: args.inputs.clone(),
        format,
        columns: args.columns.clone(),
        comment: Some('#'),
    };
    let table = load_table(&spec, Path::new("."))?;
    log::info!("loaded {} events from {} pattern(s)", table.len(), args.inputs.len());
    let table = match args.sample {
        Some(size) => subsample(&table, size, args.seed),
        None => table,
    };
    let normalization = if args.raw {
        Normalization::None
    } else {
        Normalization::MinMax
    };
    let features = project(&table, &args.features, normalization)?;
    let opts = EstimateOpts::with_radii(args.radii);

    let curve = correlation_curve(&features, &opts)?;
    let outcome = fit_curve(&curve, &opts);
    println!(
        "Events: {} in {} dimension(s), {} pairs",
        curve.n_points,
        features.dim(),
        curve.n_pairs
    );
    if args.curve {
        println!("{:>14} {:>14}", "r", "C(r)");
        for (radius, sum) in curve.radii.iter().zip(&curve.sums) {
            println!("{radius:>14.6e} {sum:>14.6e}");
        }
    }
    match &outcome {
        D2Outcome::Estimate(estimate) => println!(
            "D2 = {:.3} +/- {:.3} ({} radii in [{:.4e}, {:.4e}])",
            estimate.d2, estimate.stderr, estimate.scaling_points, estimate.r_min, estimate.r_max
        ),
        D2Outcome::InsufficientScalingRegion { points, levels } => println!(
            "insufficient scaling region ({points} radii, {levels} distinct levels)"
        ),
    }

    if let Some(iterations) = args.bootstrap {
        let bootstrap = BootstrapOpts {
            threads: args.threads,
            ..BootstrapOpts::new(iterations, args.seed)
        };
        let summary = bootstrap_estimate(&features, &bootstrap, &opts)?;
        println!(
            "Bootstrap: D2 = {:.3} +/- {:.3}, {:.0}% CI [{:.3}, {:.3}] ({} of {} retained)",
            summary.mean,
            summary.std_dev,
            bootstrap.confidence * 100.0,
            summary.ci_low,
            summary.ci_high,
            summary.retained,
            summary.iterations
        );
    }
    Ok(())
}

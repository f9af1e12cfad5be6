use std::error::Error;

use clap::Args;
use tfa_exp::{closest_reference, compare_all, AgreementThresholds, Measurement, ReferenceValue};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Measured value.
    #[arg(long, allow_negative_numbers = true)]
    pub value: f64,
    /// One-sigma uncertainty of the measurement.
    #[arg(long, allow_negative_numbers = true)]
    pub uncertainty: f64,
    /// Reference as `label=value:uncertainty`; repeatable.
    #[arg(long = "reference", value_name = "LABEL=VALUE:SIGMA", required = true)]
    pub references: Vec<ReferenceValue>,
    /// Upper sigma limits of the excellent, good and marginal classes.
    #[arg(long, value_delimiter = ',', default_values_t = [1.0, 2.0, 3.0])]
    pub thresholds: Vec<f64>,
}

pub fn run(args: &CompareArgs) -> Result<(), Box<dyn Error>> {
    if args.thresholds.len() != 3 {
        return Err(format!(
            "--thresholds takes three comma separated values, got {}",
            args.thresholds.len()
        )
        .into());
    }
    let thresholds = AgreementThresholds {
        excellent: args.thresholds[0],
        good: args.thresholds[1],
        marginal: args.thresholds[2],
    };
    thresholds.validate()?;
    let measurement = Measurement {
        value: args.value,
        uncertainty: args.uncertainty,
    };
    measurement.validate()?;
    let comparisons = compare_all(&measurement, &args.references, &thresholds);

    println!("Measured: D2 = {:.3} +/- {:.3}", measurement.value, measurement.uncertainty);
    for comparison in &comparisons {
        println!(
            "{:<16} {:>8.3} +/- {:<8.3} {:>6.2} sigma  {}",
            comparison.label,
            comparison.reference_value,
            comparison.reference_uncertainty,
            comparison.sigma,
            thresholds.describe(comparison.agreement)
        );
    }
    if let Some(closest) = closest_reference(&comparisons) {
        println!("Closest reference: {}", closest.label);
    }
    Ok(())
}

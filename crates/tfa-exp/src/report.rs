use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};
use tfa_d2::{bootstrap_estimate, estimate_with, BootstrapSummary, D2Outcome};

use crate::compare::{
    closest_reference, compare_all, AgreementThresholds, Comparison, Measurement,
};
use crate::config::AnalysisConfig;
use crate::hash::stable_hash_string;
use crate::project::{project, subsample};
use crate::serde::to_canonical_json_bytes;
use crate::strata::{run_stratum, BinStatus, StratumReport, SweepContext};
use crate::table::{load_table, EventTable};

const RULE_WIDTH: usize = 70;

/// Everything computed by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Analysis title.
    pub name: String,
    /// Events loaded.
    pub events: usize,
    /// Events used for the primary estimate.
    pub sampled: usize,
    /// Feature axis labels.
    pub features: Vec<String>,
    /// Direct estimate on the sampled events.
    pub direct: D2Outcome,
    /// Bootstrap summary when configured.
    pub bootstrap: Option<BootstrapSummary>,
    /// Value compared with the references.
    pub measurement: Option<Measurement>,
    /// One comparison per reference.
    pub comparisons: Vec<Comparison>,
    /// Label of the reference with the smallest deviation.
    pub closest: Option<String>,
    /// Agreement class limits used for the comparisons.
    pub thresholds: AgreementThresholds,
    /// Stratified sweeps.
    pub strata: Vec<StratumReport>,
    /// SHA256 of the canonical report with this field empty.
    pub report_hash: String,
}

/// Loads the configured tables and runs the analysis.
pub fn run_from_config(config: &AnalysisConfig) -> Result<AnalysisReport, TfaError> {
    let table = load_table(&config.data, &config.base_dir)?;
    run_analysis(config, &table)
}

/// Runs the direct estimate, bootstrap, comparisons and sweeps on `table`.
pub fn run_analysis(
    config: &AnalysisConfig,
    table: &EventTable,
) -> Result<AnalysisReport, TfaError> {
    config.validate()?;
    let sampled = match config.sample_size {
        Some(size) => subsample(table, size, config.sample_seed),
        None => table.clone(),
    };
    let features = project(&sampled, &config.features, config.normalization)?;
    let direct = estimate_with(&features, &config.estimator)?;
    let bootstrap = match &config.bootstrap {
        Some(opts) => Some(bootstrap_estimate(&features, opts, &config.estimator)?),
        None => None,
    };

    let measurement = match (&bootstrap, direct.estimate()) {
        (Some(summary), _) => Some(Measurement {
            value: summary.mean,
            uncertainty: summary.std_dev,
        }),
        (None, Some(estimate)) => Some(Measurement {
            value: estimate.d2,
            uncertainty: estimate.stderr,
        }),
        (None, None) => None,
    };
    let comparisons = measurement
        .map(|m| compare_all(&m, &config.references, &config.thresholds))
        .unwrap_or_default();
    let closest = closest_reference(&comparisons).map(|c| c.label.clone());

    let ctx = SweepContext {
        features: &config.features,
        normalization: config.normalization,
        estimate_opts: &config.estimator,
        seed: config.sample_seed,
    };
    let strata = config
        .strata
        .iter()
        .map(|spec| run_stratum(table, spec, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = AnalysisReport {
        name: config.name.clone(),
        events: table.len(),
        sampled: sampled.len(),
        features: config.features.iter().map(|f| f.to_string()).collect(),
        direct,
        bootstrap,
        measurement,
        comparisons,
        closest,
        thresholds: config.thresholds,
        strata,
        report_hash: String::new(),
    };
    report.report_hash = stable_hash_string(&report)?;
    Ok(report)
}

fn rule(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    writeln!(f, "{}", ch.to_string().repeat(RULE_WIDTH))
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    rule(f, '-')?;
    writeln!(f, "{title}")?;
    rule(f, '-')
}

fn format_outcome(outcome: &D2Outcome) -> String {
    match outcome.estimate() {
        Some(estimate) => format!("D2 = {:.3} +/- {:.3}", estimate.d2, estimate.stderr),
        None => "insufficient scaling region".to_string(),
    }
}

/// Plain-text layout of an [`AnalysisReport`].
struct TextReport<'a>(&'a AnalysisReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        rule(f, '=')?;
        writeln!(f, "{}", report.name)?;
        rule(f, '=')?;
        writeln!(f, "Events: {} (sampled {})", report.events, report.sampled)?;
        writeln!(f, "Features: [{}] normalized", report.features.join(", "))?;

        section(f, "GRASSBERGER-PROCACCIA ANALYSIS")?;
        writeln!(f, "Direct fit: {}", format_outcome(&report.direct))?;
        if let Some(summary) = &report.bootstrap {
            writeln!(
                f,
                "Bootstrap:  D2 = {:.3} +/- {:.3} ({} of {} resamples retained)",
                summary.mean, summary.std_dev, summary.retained, summary.iterations
            )?;
            writeln!(f, "CI:         [{:.3}, {:.3}]", summary.ci_low, summary.ci_high)?;
        }

        if !report.comparisons.is_empty() {
            section(f, "COMPARISON WITH REFERENCE VALUES")?;
            if let Some(m) = &report.measurement {
                writeln!(f, "Measured: D2 = {:.3} +/- {:.3}", m.value, m.uncertainty)?;
            }
            for comparison in &report.comparisons {
                writeln!(
                    f,
                    "{}: D2 = {:.3} +/- {:.3}",
                    comparison.label, comparison.reference_value, comparison.reference_uncertainty
                )?;
                writeln!(
                    f,
                    "  Difference: {:.3}, combined uncertainty {:.3}, deviation {:.2} sigma",
                    comparison.difference, comparison.combined_uncertainty, comparison.sigma
                )?;
                writeln!(f, "  STATUS: {}", report.thresholds.describe(comparison.agreement))?;
            }
            if let Some(label) = &report.closest {
                writeln!(f, "Closest reference: {label}")?;
            }
        }

        for stratum in &report.strata {
            section(f, &format!("{} ({})", stratum.name, stratum.column))?;
            for bin in &stratum.bins {
                let detail = match &bin.status {
                    BinStatus::Skipped => format!("insufficient events ({})", bin.events),
                    BinStatus::Estimated { outcome } => {
                        format!("{} (N={})", format_outcome(outcome), bin.events)
                    }
                    BinStatus::Failed { reason } => format!("failed: {reason}"),
                };
                writeln!(f, "  [{}, {}): {}", bin.lo, bin.hi, detail)?;
            }
        }
        writeln!(f)?;
        rule(f, '=')
    }
}

/// Renders the plain-text report.
pub fn render_text(report: &AnalysisReport) -> String {
    TextReport(report).to_string()
}

/// Writes `analysis_report.json` and `analysis_report.txt` into `dir`.
pub fn write_report(report: &AnalysisReport, dir: &Path) -> Result<(), TfaError> {
    let io_error = |code: &str, err: std::io::Error| {
        TfaError::Io(ErrorInfo::new(code, err.to_string()).with_context("dir", dir.display()))
    };
    fs::create_dir_all(dir).map_err(|err| io_error("report_dir", err))?;
    fs::write(dir.join("analysis_report.json"), to_canonical_json_bytes(report)?)
        .map_err(|err| io_error("report_write", err))?;
    fs::write(dir.join("analysis_report.txt"), render_text(report))
        .map_err(|err| io_error("report_write", err))?;
    Ok(())
}

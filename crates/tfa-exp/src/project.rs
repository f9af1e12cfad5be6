use std::fmt;
use std::str::FromStr;

use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};
use tfa_core::{FeatureSet, RngHandle};

use crate::table::EventTable;

/// Scalar transform applied to a column before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Value used as-is.
    #[default]
    Identity,
    /// Base-10 logarithm (e.g. energies).
    Log10,
    /// Sine of an angle given in degrees (e.g. declination).
    SinDegrees,
    /// Cosine of an angle given in degrees.
    CosDegrees,
    /// Sine of an angle given in radians.
    SinRadians,
    /// Cosine of an angle given in radians (e.g. zenith).
    CosRadians,
}

impl Transform {
    /// Applies the transform to a single value.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Log10 => value.log10(),
            Transform::SinDegrees => value.to_radians().sin(),
            Transform::CosDegrees => value.to_radians().cos(),
            Transform::SinRadians => value.sin(),
            Transform::CosRadians => value.cos(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::Log10 => "log10",
            Transform::SinDegrees => "sin_degrees",
            Transform::CosDegrees => "cos_degrees",
            Transform::SinRadians => "sin_radians",
            Transform::CosRadians => "cos_radians",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = TfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" | "" => Ok(Transform::Identity),
            "log10" => Ok(Transform::Log10),
            "sin_degrees" | "sin_deg" => Ok(Transform::SinDegrees),
            "cos_degrees" | "cos_deg" => Ok(Transform::CosDegrees),
            "sin_radians" | "sin" => Ok(Transform::SinRadians),
            "cos_radians" | "cos" => Ok(Transform::CosRadians),
            other => Err(TfaError::Config(
                ErrorInfo::new("unknown-transform", format!("unknown transform '{other}'"))
                    .with_hint(
                        "identity, log10, sin_degrees, cos_degrees, sin_radians, cos_radians",
                    ),
            )),
        }
    }
}

/// One feature axis: a table column and its transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Source column.
    pub column: String,
    /// Transform applied to the column.
    #[serde(default)]
    pub transform: Transform,
}

impl FeatureSpec {
    /// Feature from `column` through `transform`.
    pub fn new(column: impl Into<String>, transform: Transform) -> Self {
        Self {
            column: column.into(),
            transform,
        }
    }
}

impl fmt::Display for FeatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transform {
            Transform::Identity => write!(f, "{}", self.column),
            transform => write!(f, "{}({})", transform, self.column),
        }
    }
}

/// Parses `column` or `column:transform`.
impl FromStr for FeatureSpec {
    type Err = TfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, transform) = match s.split_once(':') {
            Some((column, transform)) => (column, transform.parse()?),
            None => (s, Transform::Identity),
        };
        if column.is_empty() {
            return Err(TfaError::Config(ErrorInfo::new(
                "empty-column",
                "feature needs a column name",
            )));
        }
        Ok(Self::new(column, transform))
    }
}

/// Rescaling applied to every projected axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Map each axis onto [0, 1] using its minimum and maximum.
    #[default]
    MinMax,
    /// Keep transformed values unchanged.
    None,
}

/// Rescales `values` onto [0, 1]; a constant axis becomes all zeros.
pub fn normalize_min_max(values: &mut [f64], label: &str) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = max - min;
    if !(span > 0.0) {
        if !values.is_empty() {
            log::warn!("feature {label} is constant; normalizing it to zero");
        }
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    values.iter_mut().for_each(|v| *v = (*v - min) / span);
}

/// Projects table records onto the feature axes.
pub fn project(
    table: &EventTable,
    features: &[FeatureSpec],
    normalization: Normalization,
) -> Result<FeatureSet, TfaError> {
    if features.is_empty() {
        return Err(TfaError::Config(ErrorInfo::new(
            "no-features",
            "at least one feature axis is required",
        )));
    }
    let mut columns = Vec::with_capacity(features.len());
    for spec in features {
        let raw = table.column(&spec.column)?;
        let mut values = Vec::with_capacity(raw.len());
        for (row, value) in raw.into_iter().enumerate() {
            let projected = spec.transform.apply(value);
            if !projected.is_finite() {
                return Err(TfaError::Data(
                    ErrorInfo::new("non-finite-feature", "transform produced a non-finite value")
                        .with_context("feature", spec)
                        .with_context("row", row)
                        .with_context("value", value),
                ));
            }
            values.push(projected);
        }
        if normalization == Normalization::MinMax {
            normalize_min_max(&mut values, &spec.to_string());
        }
        columns.push(values);
    }
    FeatureSet::from_columns(&columns)
}

/// Draws `size` records without replacement, keeping their original order.
///
/// Tables no larger than `size` are returned unchanged.
pub fn subsample(table: &EventTable, size: usize, seed: u64) -> EventTable {
    if table.len() <= size {
        return table.clone();
    }
    let mut rng = RngHandle::from_seed(seed);
    let mut indices = sample(&mut rng, table.len(), size).into_vec();
    indices.sort_unstable();
    log::info!("sampled {size} of {} events (seed {seed})", table.len());
    table.select_rows(&indices)
}

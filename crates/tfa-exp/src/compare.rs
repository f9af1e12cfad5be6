use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};

/// Literature or predicted value a measurement is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValue {
    /// Label used in reports.
    pub label: String,
    /// Central value.
    pub value: f64,
    /// One-sigma uncertainty.
    pub uncertainty: f64,
}

impl ReferenceValue {
    /// Creates a reference value.
    pub fn new(label: impl Into<String>, value: f64, uncertainty: f64) -> Self {
        Self {
            label: label.into(),
            value,
            uncertainty,
        }
    }

    /// Rejects non-finite values and negative uncertainties.
    pub fn validate(&self) -> Result<(), TfaError> {
        if !self.value.is_finite() || !self.uncertainty.is_finite() || self.uncertainty < 0.0 {
            return Err(TfaError::Config(
                ErrorInfo::new(
                    "reference-value",
                    "reference needs a finite value and uncertainty >= 0",
                )
                .with_context("label", &self.label),
            ));
        }
        Ok(())
    }
}

/// Parses `label=value:uncertainty`.
impl FromStr for ReferenceValue {
    type Err = TfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            TfaError::Config(
                ErrorInfo::new("reference-syntax", format!("cannot parse reference '{s}'"))
                    .with_hint("expected label=value:uncertainty"),
            )
        };
        let (label, rest) = s.split_once('=').ok_or_else(malformed)?;
        let (value, uncertainty) = rest.split_once(':').ok_or_else(malformed)?;
        let reference = Self::new(
            label.trim(),
            value.trim().parse().map_err(|_| malformed())?,
            uncertainty.trim().parse().map_err(|_| malformed())?,
        );
        reference.validate()?;
        Ok(reference)
    }
}

/// A measured value with its one-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Central value.
    pub value: f64,
    /// One-sigma uncertainty.
    pub uncertainty: f64,
}

impl Measurement {
    /// Rejects non-finite values and negative uncertainties.
    pub fn validate(&self) -> Result<(), TfaError> {
        if !self.value.is_finite() || !self.uncertainty.is_finite() || self.uncertainty < 0.0 {
            return Err(TfaError::Config(
                ErrorInfo::new(
                    "measurement-value",
                    "measurement needs a finite value and uncertainty >= 0",
                )
                .with_context("value", self.value)
                .with_context("uncertainty", self.uncertainty),
            ));
        }
        Ok(())
    }
}

fn default_excellent() -> f64 {
    1.0
}

fn default_good() -> f64 {
    2.0
}

fn default_marginal() -> f64 {
    3.0
}

/// Sigma limits separating the agreement classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgreementThresholds {
    /// Below this deviation the agreement is excellent.
    #[serde(default = "default_excellent")]
    pub excellent: f64,
    /// Below this deviation the agreement is good.
    #[serde(default = "default_good")]
    pub good: f64,
    /// Below this deviation the agreement is marginal; otherwise significant.
    #[serde(default = "default_marginal")]
    pub marginal: f64,
}

impl Default for AgreementThresholds {
    fn default() -> Self {
        Self {
            excellent: default_excellent(),
            good: default_good(),
            marginal: default_marginal(),
        }
    }
}

impl AgreementThresholds {
    /// Requires `0 < excellent <= good <= marginal`.
    pub fn validate(&self) -> Result<(), TfaError> {
        if !(self.excellent > 0.0 && self.excellent <= self.good && self.good <= self.marginal) {
            return Err(TfaError::Config(
                ErrorInfo::new("thresholds", "thresholds must be increasing and positive")
                    .with_context("excellent", self.excellent)
                    .with_context("good", self.good)
                    .with_context("marginal", self.marginal),
            ));
        }
        Ok(())
    }

    /// Classifies a deviation expressed in combined standard deviations.
    pub fn classify(&self, sigma: f64) -> Agreement {
        if sigma < self.excellent {
            Agreement::Excellent
        } else if sigma < self.good {
            Agreement::Good
        } else if sigma < self.marginal {
            Agreement::Marginal
        } else {
            Agreement::Significant
        }
    }

    /// Report line for a class, e.g. `GOOD AGREEMENT (< 2 sigma)`.
    pub fn describe(&self, agreement: Agreement) -> String {
        match agreement {
            Agreement::Excellent => format!("EXCELLENT AGREEMENT (< {} sigma)", self.excellent),
            Agreement::Good => format!("GOOD AGREEMENT (< {} sigma)", self.good),
            Agreement::Marginal => format!("MARGINAL ({}-{} sigma)", self.good, self.marginal),
            Agreement::Significant => {
                format!("SIGNIFICANT DEVIATION (> {} sigma)", self.marginal)
            }
        }
    }
}

/// Agreement class of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    /// Below the excellent threshold.
    Excellent,
    /// Below the good threshold.
    Good,
    /// Below the marginal threshold.
    Marginal,
    /// At or beyond the marginal threshold.
    Significant,
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Agreement::Excellent => "excellent",
            Agreement::Good => "good",
            Agreement::Marginal => "marginal",
            Agreement::Significant => "significant",
        };
        f.write_str(label)
    }
}

/// Deviation of a measurement from one reference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Reference label.
    pub label: String,
    /// Reference central value.
    pub reference_value: f64,
    /// Reference uncertainty.
    pub reference_uncertainty: f64,
    /// Absolute difference of the central values.
    pub difference: f64,
    /// Quadrature sum of both uncertainties.
    pub combined_uncertainty: f64,
    /// Difference in units of the combined uncertainty.
    #[serde(with = "deviation")]
    pub sigma: f64,
    /// Agreement class of `sigma`.
    pub agreement: Agreement,
}

/// Compares a measurement with a reference value.
///
/// With zero combined uncertainty the deviation is 0 for identical values and
/// infinite otherwise.
pub fn compare(
    measurement: &Measurement,
    reference: &ReferenceValue,
    thresholds: &AgreementThresholds,
) -> Comparison {
    let difference = (measurement.value - reference.value).abs();
    let combined_uncertainty = measurement.uncertainty.hypot(reference.uncertainty);
    let sigma = if combined_uncertainty > 0.0 {
        difference / combined_uncertainty
    } else if difference == 0.0 {
        0.0
    } else {
        f64::INFINITY
    };
    Comparison {
        label: reference.label.clone(),
        reference_value: reference.value,
        reference_uncertainty: reference.uncertainty,
        difference,
        combined_uncertainty,
        sigma,
        agreement: thresholds.classify(sigma),
    }
}

/// Compares a measurement against every reference, in order.
pub fn compare_all(
    measurement: &Measurement,
    references: &[ReferenceValue],
    thresholds: &AgreementThresholds,
) -> Vec<Comparison> {
    references
        .iter()
        .map(|reference| compare(measurement, reference, thresholds))
        .collect()
}

/// The comparison with the smallest deviation; the first wins ties.
pub fn closest_reference(comparisons: &[Comparison]) -> Option<&Comparison> {
    comparisons.iter().reduce(|best, candidate| {
        if candidate.sigma < best.sigma {
            candidate
        } else {
            best
        }
    })
}

/// JSON has no infinity; infinite deviations are written as `"inf"`.
mod deviation {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid deviation '{other}'"))),
            },
        }
    }
}

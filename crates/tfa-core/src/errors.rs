//! Structured error types shared across TFA crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`TfaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sizes, counts, file names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the TFA analysis tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum TfaError {
    /// The point cloud cannot yield a usable distance spread.
    #[error("degenerate input: {0}")]
    DegenerateInput(ErrorInfo),
    /// Every bootstrap resample was rejected.
    #[error("all bootstrap samples invalid: {0}")]
    AllBootstrapSamplesInvalid(ErrorInfo),
    /// Malformed feature vectors (ragged, empty or non-finite).
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// Invalid estimator, bootstrap or analysis options.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Table loading and feature projection errors.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl TfaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            TfaError::DegenerateInput(info)
            | TfaError::AllBootstrapSamplesInvalid(info)
            | TfaError::InvalidInput(info)
            | TfaError::Config(info)
            | TfaError::Data(info)
            | TfaError::Serde(info)
            | TfaError::Io(info) => info,
        }
    }

    /// Returns true for [`TfaError::DegenerateInput`].
    pub fn is_degenerate(&self) -> bool {
        matches!(self, TfaError::DegenerateInput(_))
    }
}

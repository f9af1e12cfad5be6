//! Validated point clouds in a normalized feature space.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, TfaError};

fn input_error(code: &str, message: impl Into<String>) -> TfaError {
    TfaError::InvalidInput(ErrorInfo::new(code, message))
}

/// Collection of equally sized, finite feature vectors stored row-major.
///
/// Rows are identified only by position. The estimator never relies on row
/// order, but resampling and subsampling preserve it so results stay
/// reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureSet")]
pub struct FeatureSet {
    dim: usize,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawFeatureSet {
    dim: usize,
    values: Vec<f64>,
}

impl TryFrom<RawFeatureSet> for FeatureSet {
    type Error = TfaError;

    fn try_from(raw: RawFeatureSet) -> Result<Self, Self::Error> {
        Self::from_flat(raw.dim, raw.values)
    }
}

impl FeatureSet {
    /// Builds a feature set from individual rows.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, TfaError>
    where
        R: AsRef<[f64]>,
    {
        let dim = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if dim == 0 && !rows.is_empty() {
            return Err(TfaError::InvalidInput(
                ErrorInfo::new("zero-dimension", "feature vectors must have at least one column")
                    .with_context("rows", rows.len()),
            ));
        }
        let mut values = Vec::with_capacity(rows.len() * dim);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(TfaError::InvalidInput(
                    ErrorInfo::new("ragged-rows", "all feature vectors must share a dimension")
                        .with_context("row", index)
                        .with_context("expected", dim)
                        .with_context("found", row.len()),
                ));
            }
            values.extend_from_slice(row);
        }
        Self::from_flat(dim, values)
    }

    /// Builds a feature set from a row-major buffer of `dim`-sized rows.
    pub fn from_flat(dim: usize, values: Vec<f64>) -> Result<Self, TfaError> {
        if dim == 0 && !values.is_empty() {
            return Err(input_error("zero-dimension", "feature dimension must be at least 1"));
        }
        if dim == 0 {
            return Ok(Self { dim: 0, values });
        }
        if values.len() % dim != 0 {
            return Err(TfaError::InvalidInput(
                ErrorInfo::new("ragged-buffer", "buffer length is not a multiple of the dimension")
                    .with_context("len", values.len())
                    .with_context("dim", dim),
            ));
        }
        if let Some(position) = values.iter().position(|value| !value.is_finite()) {
            return Err(TfaError::InvalidInput(
                ErrorInfo::new("non-finite", "feature values must be finite")
                    .with_context("row", position / dim)
                    .with_context("column", position % dim),
            ));
        }
        Ok(Self { dim, values })
    }

    /// Builds a feature set from equally long columns; at least one column is required.
    pub fn from_columns<C>(columns: &[C]) -> Result<Self, TfaError>
    where
        C: AsRef<[f64]>,
    {
        let dim = columns.len();
        if dim == 0 {
            return Err(input_error("zero-dimension", "at least one feature column is required"));
        }
        let len = columns.first().map(|col| col.as_ref().len()).unwrap_or(0);
        if columns.iter().any(|col| col.as_ref().len() != len) {
            return Err(input_error("ragged-columns", "all columns must have the same length"));
        }
        let mut values = Vec::with_capacity(len * dim);
        for row in 0..len {
            for column in columns {
                values.push(column.as_ref()[row]);
            }
        }
        Self::from_flat(dim, values)
    }

    /// Number of feature vectors.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.values.len() / self.dim
        }
    }

    /// Returns true when the set holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of every vector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the vector at `index`.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.values[index * self.dim..(index + 1) * self.dim]
    }

    /// Iterates over the vectors in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero chunk size.
        self.values.chunks_exact(self.dim.max(1))
    }

    /// Builds a new set from the rows at `indices` (duplicates allowed).
    pub fn select(&self, indices: &[usize]) -> Result<Self, TfaError> {
        let len = self.len();
        let mut values = Vec::with_capacity(indices.len() * self.dim);
        for &index in indices {
            if index >= len {
                return Err(TfaError::InvalidInput(
                    ErrorInfo::new("index-out-of-range", "row index exceeds the feature set")
                        .with_context("index", index)
                        .with_context("len", len),
                ));
            }
            values.extend_from_slice(self.row(index));
        }
        Ok(Self {
            dim: self.dim,
            values,
        })
    }

    /// Returns a copy with every coordinate multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Self, TfaError> {
        Self::from_flat(self.dim, self.values.iter().map(|v| v * factor).collect())
    }

    /// Row-major view of the coordinates.
    pub fn as_flat(&self) -> &[f64] {
        &self.values
    }
}

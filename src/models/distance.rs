//! Precomputed distance matrix model.
//!
//! Symmetric, non-negative, zero-diagonal. Only the strict upper triangle
//! is stored, row by row: entry `(i, j)` with `i < j` lives at
//! `i * n - i * (i + 1) / 2 + (j - i - 1)`.

use crate::error::{CoreHunterError, Result, ValidationErrorKind};
use crate::validation::validate_headers;

use super::AccessionHeader;

/// Default dataset name for distance matrices.
pub const DISTANCE_DATA_NAME: &str = "Precomputed distance matrix";

/// Absolute tolerance for symmetry and zero-diagonal checks.
pub const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Validated, immutable distance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrixData {
    name: String,
    headers: Vec<AccessionHeader>,
    upper: Vec<f64>,
}

impl DistanceMatrixData {
    /// Creates a distance matrix from a full square matrix.
    ///
    /// # Errors
    /// If the matrix is empty or not square, an entry is negative or not
    /// finite, a diagonal entry is non-zero, or `d[i][j]` and `d[j][i]`
    /// differ by more than [`SYMMETRY_TOLERANCE`].
    pub fn new(headers: Vec<AccessionHeader>, distances: &[Vec<f64>]) -> Result<Self> {
        let n = distances.len();
        if n == 0 {
            return Err(CoreHunterError::validation(
                ValidationErrorKind::EmptyData,
                "Empty distance matrix",
            ));
        }
        let headers = validate_headers(headers, n)?;

        let mut upper = Vec::with_capacity(n * (n - 1) / 2);
        for (i, row) in distances.iter().enumerate() {
            if row.len() != n {
                return Err(CoreHunterError::validation(
                    ValidationErrorKind::DimensionMismatch,
                    format!("Row {i} of the distance matrix has {} values, expected {n}", row.len()),
                ));
            }
            for (j, &d) in row.iter().enumerate() {
                if !d.is_finite() || d < 0.0 {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::OutOfRange,
                        format!("Distance {d} between accessions {i} and {j} should be finite and non-negative"),
                    ));
                }
                if i == j && d > SYMMETRY_TOLERANCE {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::OutOfRange,
                        format!("Distance of accession {i} to itself is {d}, expected 0"),
                    ));
                }
                if j > i {
                    let mirror = distances[j].get(i).copied().unwrap_or(f64::NAN);
                    if !((d - mirror).abs() <= SYMMETRY_TOLERANCE) {
                        return Err(CoreHunterError::validation(
                            ValidationErrorKind::DimensionMismatch,
                            format!("Distance matrix is not symmetric at ({i}, {j}): {d} vs {mirror}"),
                        ));
                    }
                    upper.push(d);
                }
            }
        }

        Ok(Self {
            name: DISTANCE_DATA_NAME.to_string(),
            headers,
            upper,
        })
    }

    /// Sets the dataset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of accessions.
    #[inline]
    pub fn size(&self) -> usize {
        self.headers.len()
    }

    pub fn header(&self, index: usize) -> &AccessionHeader {
        &self.headers[index]
    }

    pub fn headers(&self) -> &[AccessionHeader] {
        &self.headers
    }

    /// Distance between two accessions.
    ///
    /// # Panics
    /// If either index is out of range.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let n = self.size();
        assert!(i < n && j < n, "accession index out of range");
        if i == j {
            return 0.0;
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.upper[i * n - i * (i + 1) / 2 + (j - i - 1)]
    }

    /// Full square matrix.
    pub fn to_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.size();
        (0..n).map(|i| (0..n).map(|j| self.distance(i, j)).collect()).collect()
    }
}

//! Centralized error handling.
//!
//! One error type for the whole crate, derived with `thiserror`.
//! Construction-time problems are [`CoreHunterError::Validation`] and carry
//! a [`ValidationError`] with a category, so callers can match on the kind
//! of violation without parsing messages.

use thiserror::Error;

/// Main error type for core selection operations.
#[derive(Error, Debug)]
pub enum CoreHunterError {
    /// Input data violates a structural or numeric invariant.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An argument is out of range or incompatible with the data.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A search could not produce a feasible subset.
    #[error("Optimization error: {message}")]
    Optimization { message: String },

    /// I/O errors (file missing, permission denied, read/write failures).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited text errors (inconsistent column counts, bad quoting).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed cell content in a data file.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Dataset record (de)serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No dataset with this identifier in the repository.
    #[error("Unknown dataset: {id}")]
    UnknownDataset { id: String },
}

/// Type alias for results using [`CoreHunterError`].
pub type Result<T> = std::result::Result<T, CoreHunterError>;

impl CoreHunterError {
    /// Creates a validation error of the given kind.
    pub fn validation(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(kind, message))
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an optimization failure.
    pub fn optimization(message: impl Into<String>) -> Self {
        Self::Optimization {
            message: message.into(),
        }
    }

    /// Creates a parse error for a 1-based file line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// The validation category, if this is a validation error.
    pub fn validation_kind(&self) -> Option<&ValidationErrorKind> {
        match self {
            Self::Validation(err) => Some(&err.kind),
            _ => None,
        }
    }
}

/// A data validation error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description naming the offending accession/marker.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No rows, or a required array is absent.
    EmptyData,
    /// Row/column/name counts disagree.
    DimensionMismatch,
    /// An allele count differs from the one the first accession defined.
    InconsistentAlleleCount,
    /// A frequency is negative or not finite.
    InvalidFrequency,
    /// Frequencies at a marker exceed one, or do not sum to one.
    FrequencySum,
    /// A score or value lies outside its allowed range.
    OutOfRange,
    /// Two accessions share a unique identifier.
    DuplicateId,
    /// Datasets combined into one collection disagree.
    InconsistentDatasets,
    /// A phenotype value does not match its feature's scale.
    TypeMismatch,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = CoreHunterError::validation(
            ValidationErrorKind::FrequencySum,
            "frequencies of accession 3 at marker 1 sum to 1.2",
        );
        assert_eq!(
            err.to_string(),
            "Validation error: frequencies of accession 3 at marker 1 sum to 1.2"
        );
        assert_eq!(err.validation_kind(), Some(&ValidationErrorKind::FrequencySum));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: CoreHunterError = io.into();
        assert!(matches!(err, CoreHunterError::Io(_)));
        assert!(err.validation_kind().is_none());
    }

    #[test]
    fn test_parse_error_line() {
        let err = CoreHunterError::parse(4, "invalid frequency 'x'");
        assert_eq!(err.to_string(), "Parse error at line 4: invalid frequency 'x'");
    }
}

//! Input validation for accession data.
//!
//! Checks structural and numeric integrity of raw arrays before any
//! dataset is built. Detects:
//! - Ragged or empty inputs (marker/allele counts that disagree)
//! - Negative or non-finite allele frequencies
//! - Frequency sums above one, or below one when nothing is missing
//! - Duplicate unique identifiers
//!
//! Every check stops at the first violation and names the offending
//! accession and marker, so no partially valid dataset is ever built.

use std::collections::HashSet;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::models::AccessionHeader;

/// Absolute tolerance on per-marker frequency sums.
pub const FREQUENCY_TOLERANCE: f64 = 1e-10;

/// Validation result.
pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// Validates the allele frequencies of one accession at one marker.
///
/// Present frequencies must be finite and non-negative. Their sum may not
/// exceed one; if no frequency is missing it must equal one.
pub fn validate_marker_frequencies(
    accession: usize,
    marker: usize,
    frequencies: &[Option<f64>],
) -> ValidationResult {
    let mut sum = 0.0;
    let mut missing = false;
    for (allele, freq) in frequencies.iter().enumerate() {
        match freq {
            Some(f) if !f.is_finite() || *f < 0.0 => {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidFrequency,
                    format!(
                        "Frequency {f} of allele {allele} at marker {marker} in accession {accession} \
                         should be finite and non-negative"
                    ),
                ));
            }
            Some(f) => sum += f,
            None => missing = true,
        }
    }

    if sum > 1.0 + FREQUENCY_TOLERANCE {
        return Err(ValidationError::new(
            ValidationErrorKind::FrequencySum,
            format!(
                "Allele frequencies at marker {marker} in accession {accession} sum to {sum}, \
                 which exceeds one"
            ),
        ));
    }
    if !missing && (1.0 - sum).abs() > FREQUENCY_TOLERANCE {
        return Err(ValidationError::new(
            ValidationErrorKind::FrequencySum,
            format!(
                "Allele frequencies at marker {marker} in accession {accession} sum to {sum}, \
                 expected one"
            ),
        ));
    }
    Ok(())
}

/// Infers the per-marker allele counts of a frequency array and validates it.
///
/// The first accession defines the number of markers (at least one) and
/// the number of alleles of every marker; all other accessions must match. Each
/// (accession, marker) cell is checked with [`validate_marker_frequencies`].
pub fn infer_allele_counts(frequencies: &[Vec<Vec<Option<f64>>>]) -> ValidationResult<Vec<usize>> {
    let first = frequencies.first().ok_or_else(|| {
        ValidationError::new(ValidationErrorKind::EmptyData, "Allele frequencies are empty")
    })?;
    let allele_counts: Vec<usize> = first.iter().map(Vec::len).collect();
    let markers = allele_counts.len();
    if markers == 0 {
        return Err(ValidationError::new(
            ValidationErrorKind::EmptyData,
            "Allele frequencies have no markers",
        ));
    }

    for (accession, row) in frequencies.iter().enumerate() {
        if row.len() != markers {
            return Err(ValidationError::new(
                ValidationErrorKind::DimensionMismatch,
                format!(
                    "Accession {accession} has {} markers, expected {markers}",
                    row.len()
                ),
            ));
        }
        for (marker, freqs) in row.iter().enumerate() {
            if freqs.len() != allele_counts[marker] {
                return Err(ValidationError::new(
                    ValidationErrorKind::InconsistentAlleleCount,
                    format!(
                        "Accession {accession} has {} alleles at marker {marker}, expected {}",
                        freqs.len(),
                        allele_counts[marker]
                    ),
                ));
            }
            validate_marker_frequencies(accession, marker, freqs)?;
        }
    }

    if let Some(marker) = allele_counts.iter().position(|&count| count == 0) {
        return Err(ValidationError::new(
            ValidationErrorKind::EmptyData,
            format!("Marker {marker} has no alleles"),
        ));
    }

    Ok(allele_counts)
}

/// Checks headers against the dataset size, filling in blanks.
///
/// An empty header list means "no headers assigned" and yields `size`
/// blank headers. Assigned unique identifiers may not repeat.
pub fn validate_headers(
    headers: Vec<AccessionHeader>,
    size: usize,
) -> ValidationResult<Vec<AccessionHeader>> {
    if headers.is_empty() {
        return Ok(vec![AccessionHeader::default(); size]);
    }
    if headers.len() != size {
        return Err(ValidationError::new(
            ValidationErrorKind::DimensionMismatch,
            format!(
                "Incorrect number of headers. Expected: {size}, actual: {}",
                headers.len()
            ),
        ));
    }

    let mut ids = HashSet::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(id) = &header.id {
            if !ids.insert(id.as_str()) {
                return Err(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate identifier '{id}' at accession {i}"),
                ));
            }
        }
    }
    Ok(headers)
}

/// Checks an optional list of names against an expected count.
///
/// `None` assigns no names. `what` names the list in error messages.
pub fn validate_names(
    names: Option<Vec<Option<String>>>,
    expected: usize,
    what: &str,
) -> ValidationResult<Vec<Option<String>>> {
    match names {
        None => Ok(vec![None; expected]),
        Some(names) if names.len() == expected => Ok(names),
        Some(names) => Err(ValidationError::new(
            ValidationErrorKind::DimensionMismatch,
            format!(
                "Incorrect number of {what} provided. Expected: {expected}, actual: {}",
                names.len()
            ),
        )),
    }
}

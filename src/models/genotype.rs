//! Genotype data model.
//!
//! Allele frequencies per accession, marker and allele, with explicit
//! missing values. Markers are ragged: each has its own allele count,
//! identical across accessions.
//!
//! # Storage
//!
//! Frequencies live in one flat arena, row-major by accession. A per-marker
//! offset table maps `(marker, allele)` to a column of that row:
//!
//! | marker | alleles | offset |
//! |--------|---------|--------|
//! | 0 | 3 | 0 |
//! | 1 | 2 | 3 |
//! | 2 | 4 | 5 |
//!
//! # Construction
//!
//! - [`GenotypeData::from_frequencies`]: multi-allelic frequencies
//! - [`GenotypeData::from_scores`]: biallelic dosage scores
//! - [`GenotypeData::from_default`]: observed allele labels, one column per
//!   chromosome copy

use std::collections::{BTreeSet, HashSet};

use crate::error::{CoreHunterError, Result, ValidationErrorKind};
use crate::validation::{infer_allele_counts, validate_headers, validate_names};

use super::AccessionHeader;

/// Default dataset name for frequency data.
pub const FREQUENCY_DATA_NAME: &str = "Multi-allelic marker data";
/// Default dataset name for dosage score data.
pub const BIALLELIC_DATA_NAME: &str = "Biallelic marker data";
/// Default dataset name for allele label data.
pub const DEFAULT_DATA_NAME: &str = "Genotype data";

/// Dosage scores retained for biallelic data.
#[derive(Debug, Clone, PartialEq)]
struct AlleleScores {
    ploidy: u32,
    /// Row-major: accession * markers + marker.
    values: Vec<Option<u32>>,
}

/// Validated, immutable genotype data.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeData {
    name: String,
    headers: Vec<AccessionHeader>,
    marker_names: Vec<Option<String>>,
    /// Flat, indexed like one frequency row.
    allele_names: Vec<Option<String>>,
    /// `offsets[m]..offsets[m + 1]` are the columns of marker `m`.
    offsets: Vec<usize>,
    /// Row-major: accession * total_alleles + column.
    frequencies: Vec<Option<f64>>,
    scores: Option<AlleleScores>,
}

impl GenotypeData {
    /// Creates genotype data from multi-allelic frequencies.
    ///
    /// `frequencies[i][m][a]` is the frequency of allele `a` of marker `m`
    /// in accession `i`; `None` marks a missing value. The first accession
    /// defines the marker and allele counts. Headers may be empty (none
    /// assigned); marker and allele names are optional, and an empty
    /// allele-name list for a marker leaves its alleles unnamed.
    ///
    /// # Errors
    /// A validation error naming the offending accession/marker if the
    /// array is ragged, a frequency is negative, or a marker's frequencies
    /// break the sum rule.
    pub fn from_frequencies(
        headers: Vec<AccessionHeader>,
        marker_names: Option<Vec<Option<String>>>,
        allele_names: Option<Vec<Vec<Option<String>>>>,
        frequencies: &[Vec<Vec<Option<f64>>>],
    ) -> Result<Self> {
        let allele_counts = infer_allele_counts(frequencies)?;
        let n = frequencies.len();
        let markers = allele_counts.len();

        let headers = validate_headers(headers, n)?;
        let marker_names = validate_names(marker_names, markers, "marker names")?;

        let mut offsets = Vec::with_capacity(markers + 1);
        offsets.push(0);
        for count in &allele_counts {
            offsets.push(offsets[offsets.len() - 1] + count);
        }
        let total = offsets[markers];

        let allele_names = match allele_names {
            None => vec![None; total],
            Some(per_marker) => {
                if per_marker.len() != markers {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::DimensionMismatch,
                        format!(
                            "Incorrect number of marker-allele names provided. Expected: {markers}, actual: {}",
                            per_marker.len()
                        ),
                    ));
                }
                let mut flat = Vec::with_capacity(total);
                for (m, names) in per_marker.into_iter().enumerate() {
                    if names.is_empty() {
                        flat.extend(std::iter::repeat(None).take(allele_counts[m]));
                    } else if names.len() != allele_counts[m] {
                        return Err(CoreHunterError::validation(
                            ValidationErrorKind::DimensionMismatch,
                            format!(
                                "Incorrect number of allele names provided for marker {m}. Expected: {}, actual: {}",
                                allele_counts[m],
                                names.len()
                            ),
                        ));
                    } else {
                        flat.extend(names);
                    }
                }
                flat
            }
        };

        let mut flat = Vec::with_capacity(n * total);
        for row in frequencies {
            for freqs in row {
                flat.extend_from_slice(freqs);
            }
        }

        Ok(Self {
            name: FREQUENCY_DATA_NAME.to_string(),
            headers,
            marker_names,
            allele_names,
            offsets,
            frequencies: flat,
            scores: None,
        })
    }

    /// Creates biallelic genotype data from dosage scores.
    ///
    /// `scores[i][m]` counts the copies of allele `1` of marker `m` in
    /// accession `i`, in `[0, ploidy]`. Allele `0` gets frequency
    /// `1 - score / ploidy`, allele `1` gets `score / ploidy`. A missing
    /// score makes both frequencies missing.
    pub fn from_scores(
        headers: Vec<AccessionHeader>,
        marker_names: Option<Vec<Option<String>>>,
        scores: &[Vec<Option<u32>>],
        ploidy: u32,
    ) -> Result<Self> {
        if ploidy == 0 {
            return Err(CoreHunterError::validation(
                ValidationErrorKind::OutOfRange,
                "Ploidy should be at least one",
            ));
        }
        let first = scores.first().ok_or_else(|| {
            CoreHunterError::validation(ValidationErrorKind::EmptyData, "Empty allele score matrix")
        })?;
        let markers = first.len();

        let mut frequencies = Vec::with_capacity(scores.len());
        let mut values = Vec::with_capacity(scores.len() * markers);
        for (i, row) in scores.iter().enumerate() {
            if row.len() != markers {
                return Err(CoreHunterError::validation(
                    ValidationErrorKind::DimensionMismatch,
                    format!("Accession {i} has {} scores, expected {markers}", row.len()),
                ));
            }
            let mut freqs = Vec::with_capacity(markers);
            for (m, score) in row.iter().enumerate() {
                match score {
                    Some(s) if *s > ploidy => {
                        return Err(CoreHunterError::validation(
                            ValidationErrorKind::OutOfRange,
                            format!(
                                "Score {s} of accession {i} at marker {m} exceeds ploidy {ploidy}"
                            ),
                        ));
                    }
                    Some(s) => {
                        let alt = f64::from(*s) / f64::from(ploidy);
                        freqs.push(vec![Some(1.0 - alt), Some(alt)]);
                    }
                    None => freqs.push(vec![None, None]),
                }
            }
            values.extend_from_slice(row);
            frequencies.push(freqs);
        }

        let allele_names = vec![vec![Some("0".to_string()), Some("1".to_string())]; markers];
        let mut data = Self::from_frequencies(headers, marker_names, Some(allele_names), &frequencies)?;
        data.name = BIALLELIC_DATA_NAME.to_string();
        data.scores = Some(AlleleScores { ploidy, values });
        Ok(data)
    }

    /// Creates genotype data from observed allele labels.
    ///
    /// Each column holds one observed allele (e.g. two columns per marker
    /// for diploid data). Consecutive columns with the same base name (see
    /// [`marker_base_name`]) form one marker. The distinct labels observed
    /// at a marker, sorted, become its alleles; an accession's frequency for
    /// an allele is the share of its non-missing columns carrying it. Cells
    /// that are `None`, blank, `NA` or `-` are missing.
    pub fn from_default(
        headers: Vec<AccessionHeader>,
        column_names: &[String],
        genotypes: &[Vec<Option<String>>],
    ) -> Result<Self> {
        if genotypes.is_empty() {
            return Err(CoreHunterError::validation(
                ValidationErrorKind::EmptyData,
                "Empty genotype matrix",
            ));
        }
        let markers = infer_marker_columns(column_names)?;
        for (i, row) in genotypes.iter().enumerate() {
            if row.len() != column_names.len() {
                return Err(CoreHunterError::validation(
                    ValidationErrorKind::DimensionMismatch,
                    format!(
                        "Incorrect number of values for accession {i}. Expected: {}, actual: {}",
                        column_names.len(),
                        row.len()
                    ),
                ));
            }
        }

        let cell = |i: usize, c: usize| genotype_cell(genotypes, i, c);

        let mut allele_names = Vec::with_capacity(markers.len());
        let mut frequencies = vec![Vec::with_capacity(markers.len()); genotypes.len()];
        for marker in &markers {
            let columns = marker.start..marker.start + marker.columns;
            let alleles: BTreeSet<&str> = (0..genotypes.len())
                .flat_map(|i| columns.clone().filter_map(move |c| cell(i, c)))
                .collect();
            let alleles: Vec<&str> = alleles.into_iter().collect();

            for (i, row) in frequencies.iter_mut().enumerate() {
                let observed: Vec<&str> = columns.clone().filter_map(|c| cell(i, c)).collect();
                if observed.is_empty() {
                    row.push(vec![None; alleles.len()]);
                } else {
                    let total = observed.len() as f64;
                    row.push(
                        alleles
                            .iter()
                            .map(|a| Some(observed.iter().filter(|o| **o == *a).count() as f64 / total))
                            .collect(),
                    );
                }
            }
            allele_names.push(alleles.into_iter().map(|a| Some(a.to_string())).collect());
        }

        let marker_names = markers.iter().map(|m| Some(m.name.clone())).collect();
        let mut data = Self::from_frequencies(headers, Some(marker_names), Some(allele_names), &frequencies)?;
        data.name = DEFAULT_DATA_NAME.to_string();
        Ok(data)
    }

    /// Sets the dataset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of accessions.
    #[inline]
    pub fn size(&self) -> usize {
        self.headers.len()
    }

    /// Header of accession `index`.
    ///
    /// # Panics
    /// If `index >= size()`.
    pub fn header(&self, index: usize) -> &AccessionHeader {
        &self.headers[index]
    }

    /// All headers, by accession index.
    pub fn headers(&self) -> &[AccessionHeader] {
        &self.headers
    }

    /// Number of markers.
    #[inline]
    pub fn number_of_markers(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of alleles of `marker`.
    #[inline]
    pub fn number_of_alleles(&self, marker: usize) -> usize {
        self.offsets[marker + 1] - self.offsets[marker]
    }

    /// Number of alleles summed over all markers.
    #[inline]
    pub fn total_number_of_alleles(&self) -> usize {
        self.offsets[self.number_of_markers()]
    }

    /// Name of `marker`, if assigned.
    pub fn marker_name(&self, marker: usize) -> Option<&str> {
        self.marker_names[marker].as_deref()
    }

    /// Name of allele `allele` of `marker`, if assigned.
    pub fn allele_name(&self, marker: usize, allele: usize) -> Option<&str> {
        self.allele_names[self.column(marker, allele)].as_deref()
    }

    /// Frequency of an allele in one accession; `None` if missing.
    ///
    /// # Panics
    /// If any index is out of range.
    #[inline]
    pub fn allele_frequency(&self, accession: usize, marker: usize, allele: usize) -> Option<f64> {
        self.frequencies[accession * self.total_number_of_alleles() + self.column(marker, allele)]
    }

    /// All allele frequencies of one accession at one marker.
    pub fn marker_frequencies(&self, accession: usize, marker: usize) -> &[Option<f64>] {
        let row = accession * self.total_number_of_alleles();
        &self.frequencies[row + self.offsets[marker]..row + self.offsets[marker + 1]]
    }

    /// Average frequency of an allele over a set of accessions.
    ///
    /// Missing values count as 0 but stay in the denominator. An empty set
    /// yields 0.0.
    pub fn average_allele_frequency(&self, accessions: &[usize], marker: usize, allele: usize) -> f64 {
        if accessions.is_empty() {
            return 0.0;
        }
        let sum: f64 = accessions
            .iter()
            .map(|&i| self.allele_frequency(i, marker, allele).unwrap_or(0.0))
            .sum();
        sum / accessions.len() as f64
    }

    /// Average frequencies of every allele of `marker`, written into `out`.
    ///
    /// Same semantics as [`average_allele_frequency`](Self::average_allele_frequency),
    /// computed in one pass over the selected rows.
    pub fn average_marker_frequencies(&self, accessions: &[usize], marker: usize, out: &mut Vec<f64>) {
        out.clear();
        out.resize(self.number_of_alleles(marker), 0.0);
        if accessions.is_empty() {
            return;
        }
        for &i in accessions {
            for (acc, freq) in out.iter_mut().zip(self.marker_frequencies(i, marker)) {
                *acc += freq.unwrap_or(0.0);
            }
        }
        let n = accessions.len() as f64;
        out.iter_mut().for_each(|f| *f /= n);
    }

    /// Dosage score of an accession at a marker.
    ///
    /// `None` if the score is missing or the data was not built from scores.
    pub fn allele_score(&self, accession: usize, marker: usize) -> Option<u32> {
        self.scores
            .as_ref()
            .and_then(|s| s.values[accession * self.number_of_markers() + marker])
    }

    /// Ploidy, for data built from dosage scores.
    pub fn ploidy(&self) -> Option<u32> {
        self.scores.as_ref().map(|s| s.ploidy)
    }

    /// Whether this data was built from dosage scores.
    pub fn has_scores(&self) -> bool {
        self.scores.is_some()
    }

    /// Marker names, by marker index.
    pub fn marker_names(&self) -> &[Option<String>] {
        &self.marker_names
    }

    /// Allele names grouped per marker.
    pub fn allele_names_by_marker(&self) -> Vec<Vec<Option<String>>> {
        (0..self.number_of_markers())
            .map(|m| self.allele_names[self.offsets[m]..self.offsets[m + 1]].to_vec())
            .collect()
    }

    /// Frequencies as a nested accession x marker x allele array.
    pub fn frequency_array(&self) -> Vec<Vec<Vec<Option<f64>>>> {
        (0..self.size())
            .map(|i| {
                (0..self.number_of_markers())
                    .map(|m| self.marker_frequencies(i, m).to_vec())
                    .collect()
            })
            .collect()
    }

    /// Dosage scores as an accession x marker array, if present.
    pub fn score_array(&self) -> Option<Vec<Vec<Option<u32>>>> {
        let markers = self.number_of_markers();
        self.scores
            .as_ref()
            .map(|s| s.values.chunks(markers).map(<[Option<u32>]>::to_vec).collect())
    }

    #[inline]
    fn column(&self, marker: usize, allele: usize) -> usize {
        debug_assert!(allele < self.number_of_alleles(marker));
        self.offsets[marker] + allele
    }
}

/// A run of consecutive columns that belong to one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerColumns {
    /// Marker name (column base name).
    pub name: String,
    /// Index of the first column.
    pub start: usize,
    /// Number of columns.
    pub columns: usize,
}

/// Base name of a column: the name with a trailing `-x` or `.x` removed.
///
/// Names without such a suffix are their own base name.
pub fn marker_base_name(column: &str) -> &str {
    match column.rfind(|c| c == '-' || c == '.') {
        Some(pos) if pos > 0 && pos + 1 < column.len() => &column[..pos],
        _ => column,
    }
}

/// Groups consecutive columns sharing a base name into markers.
///
/// # Errors
/// If a marker's columns are not consecutive (its base name reappears
/// after another marker) or there are no columns.
pub fn infer_marker_columns(column_names: &[String]) -> Result<Vec<MarkerColumns>> {
    if column_names.is_empty() {
        return Err(CoreHunterError::validation(
            ValidationErrorKind::EmptyData,
            "No marker columns",
        ));
    }
    let mut markers: Vec<MarkerColumns> = Vec::new();
    let mut seen = HashSet::new();
    for (c, column) in column_names.iter().enumerate() {
        let base = marker_base_name(column.trim());
        match markers.last_mut() {
            Some(last) if last.name == base => last.columns += 1,
            _ => {
                if !seen.insert(base.to_string()) {
                    return Err(CoreHunterError::validation(
                        ValidationErrorKind::DimensionMismatch,
                        format!("Columns of marker '{base}' are not consecutive (column {c})"),
                    ));
                }
                markers.push(MarkerColumns {
                    name: base.to_string(),
                    start: c,
                    columns: 1,
                });
            }
        }
    }
    Ok(markers)
}

fn genotype_cell(genotypes: &[Vec<Option<String>>], accession: usize, column: usize) -> Option<&str> {
    genotypes[accession][column]
        .as_deref()
        .map(str::trim)
        .filter(|v| !is_missing_genotype(v))
}

/// Whether an allele label cell denotes a missing observation.
pub fn is_missing_genotype(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell == "-" || cell.eq_ignore_ascii_case("NA")
}

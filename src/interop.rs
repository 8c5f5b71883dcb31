//! Flat-array constructors for foreign callers.
//!
//! Hosts such as R pass data as rectangular numeric or string matrices
//! with identifiers and column names on the side, and encode missing
//! numbers in-band. R's `NA_real_` is a NaN with payload 1954; R's
//! `NA_integer_` is `i32::MIN`. The helpers here translate between
//! those encodings and the `Option`-based models at the boundary only.
//!
//! Frequency and allele-label matrices have one column per allele (or
//! per observed allele); consecutive columns with the same base name form
//! one marker (see [`infer_marker_columns`]).

use crate::error::{CoreHunterError, Result, ValidationErrorKind};
use crate::models::{DistanceMatrixData, GenotypeData, headers_from_ids, infer_marker_columns};

/// Bit pattern of R's `NA_real_`.
pub const R_NA_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// R's `NA_integer_`.
pub const R_NA_INTEGER: i32 = i32::MIN;

/// R's `NA_real_` as a float.
#[inline]
pub fn r_na() -> f64 {
    f64::from_bits(R_NA_BITS)
}

/// Replaces missing values with R's `NA_real_`.
pub fn frequencies_to_sentinel(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or_else(r_na)).collect()
}

/// Treats every NaN (including `NA_real_`) as missing.
pub fn frequencies_from_sentinel(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|&v| if v.is_nan() { None } else { Some(v) })
        .collect()
}

/// Allele frequencies as one flat row per accession, `NA_real_` for
/// missing values.
pub fn allele_frequencies(data: &GenotypeData) -> Vec<Vec<f64>> {
    (0..data.size())
        .map(|i| {
            let row: Vec<Option<f64>> = (0..data.number_of_markers())
                .flat_map(|m| data.marker_frequencies(i, m).iter().copied())
                .collect();
            frequencies_to_sentinel(&row)
        })
        .collect()
}

/// Builds frequency genotype data from a flat matrix.
///
/// `frequencies[i][c]` is the frequency of the allele in column `c` for
/// accession `i`. `column_names` group columns into markers and
/// `allele_names` labels each column.
pub fn create_frequency_genotype_data(
    frequencies: &[Vec<f64>],
    ids: &[String],
    names: Option<&[Option<String>]>,
    column_names: &[String],
    allele_names: &[String],
) -> Result<GenotypeData> {
    check_rows(frequencies, ids, names, column_names.len(), "allele frequency")?;
    if allele_names.len() != column_names.len() {
        return Err(CoreHunterError::validation(
            ValidationErrorKind::DimensionMismatch,
            format!(
                "Number of allele names ({}) does not correspond to number of columns ({})",
                allele_names.len(),
                column_names.len()
            ),
        ));
    }
    let markers = infer_marker_columns(column_names)?;

    let split = |row: &[Option<f64>]| -> Vec<Vec<Option<f64>>> {
        markers
            .iter()
            .map(|m| row[m.start..m.start + m.columns].to_vec())
            .collect()
    };
    let frequencies: Vec<Vec<Vec<Option<f64>>>> = frequencies
        .iter()
        .map(|row| split(&frequencies_from_sentinel(row)))
        .collect();
    let marker_names: Vec<Option<String>> = markers.iter().map(|m| Some(m.name.clone())).collect();
    let allele_names: Vec<Vec<Option<String>>> = markers
        .iter()
        .map(|m| {
            allele_names[m.start..m.start + m.columns]
                .iter()
                .map(|a| Some(a.clone()))
                .collect()
        })
        .collect();

    GenotypeData::from_frequencies(
        headers_from_ids(ids, names),
        Some(marker_names),
        Some(allele_names),
        &frequencies,
    )
}

/// Builds diploid biallelic genotype data from integer scores, with
/// `NA_integer_` for missing values.
pub fn create_biparental_genotype_data(
    scores: &[Vec<i32>],
    ids: &[String],
    names: Option<&[Option<String>]>,
    marker_names: Option<&[String]>,
) -> Result<GenotypeData> {
    let markers = scores.first().map_or(0, Vec::len);
    check_rows(scores, ids, names, markers, "allele score")?;

    let mut converted = Vec::with_capacity(scores.len());
    for (i, row) in scores.iter().enumerate() {
        let row = row
            .iter()
            .enumerate()
            .map(|(m, &s)| match s {
                R_NA_INTEGER => Ok(None),
                s => u32::try_from(s).map(Some).map_err(|_| {
                    CoreHunterError::validation(
                        ValidationErrorKind::OutOfRange,
                        format!("Negative score {s} of accession {i} at marker {m}"),
                    )
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        converted.push(row);
    }

    let marker_names: Option<Vec<Option<String>>> =
        marker_names.map(|names| names.iter().map(|n| Some(n.clone())).collect());
    GenotypeData::from_scores(headers_from_ids(ids, names), marker_names, &converted, 2)
}

/// Builds genotype data from observed allele labels, one column per
/// observed allele.
pub fn create_default_genotype_data(
    alleles: &[Vec<String>],
    ids: &[String],
    names: Option<&[Option<String>]>,
    column_names: &[String],
) -> Result<GenotypeData> {
    check_rows(alleles, ids, names, column_names.len(), "allele")?;
    let cells: Vec<Vec<Option<String>>> = alleles
        .iter()
        .map(|row| row.iter().map(|a| Some(a.clone())).collect())
        .collect();
    GenotypeData::from_default(headers_from_ids(ids, names), column_names, &cells)
}

/// Builds a distance matrix with identifiers and optional names.
pub fn create_distance_matrix_data(
    distances: &[Vec<f64>],
    ids: &[String],
    names: Option<&[Option<String>]>,
) -> Result<DistanceMatrixData> {
    check_rows(distances, ids, names, distances.len(), "distance")?;
    DistanceMatrixData::new(headers_from_ids(ids, names), distances)
}

/// Common shape checks: non-empty, one id (and name) per row, equal row
/// lengths.
fn check_rows<T>(
    rows: &[Vec<T>],
    ids: &[String],
    names: Option<&[Option<String>]>,
    columns: usize,
    what: &str,
) -> Result<()> {
    if rows.is_empty() {
        return Err(CoreHunterError::validation(
            ValidationErrorKind::EmptyData,
            format!("Empty {what} matrix"),
        ));
    }
    let n = rows.len();
    if ids.len() != n {
        return Err(mismatch(format!(
            "Number of ids ({}) does not correspond to number of rows ({n})",
            ids.len()
        )));
    }
    if let Some(names) = names {
        if names.len() != n {
            return Err(mismatch(format!(
                "Number of names ({}) does not correspond to number of rows ({n})",
                names.len()
            )));
        }
    }
    if let Some(i) = rows.iter().position(|row| row.len() != columns) {
        return Err(mismatch(format!(
            "Incorrect number of values at row {i}. Expected: {columns}, actual: {}",
            rows[i].len()
        )));
    }
    Ok(())
}

fn mismatch(message: String) -> CoreHunterError {
    CoreHunterError::validation(ValidationErrorKind::DimensionMismatch, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("acc-{i}")).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sentinel_round_trip() {
        let na = r_na();
        assert!(na.is_nan());
        assert_eq!(na.to_bits(), 9218868437227407266);

        let values = [Some(0.25), None, Some(0.0)];
        let encoded = frequencies_to_sentinel(&values);
        assert_eq!(encoded[0], 0.25);
        assert_eq!(encoded[1].to_bits(), R_NA_BITS);
        assert_eq!(frequencies_from_sentinel(&encoded), values);
        assert_eq!(frequencies_from_sentinel(&[f64::NAN]), vec![None]);
    }

    #[test]
    fn test_frequency_data_from_flat_columns() {
        let na = r_na();
        let frequencies = vec![
            vec![0.5, 0.5, 1.0, 0.0, 0.0],
            vec![na, na, 0.2, 0.3, 0.5],
        ];
        let data = create_frequency_genotype_data(
            &frequencies,
            &ids(2),
            None,
            &strings(&["mk1", "mk1", "mk2", "mk2", "mk2"]),
            &strings(&["a", "b", "x", "y", "z"]),
        )
        .unwrap();

        assert_eq!(data.number_of_markers(), 2);
        assert_eq!(data.number_of_alleles(1), 3);
        assert_eq!(data.marker_name(1), Some("mk2"));
        assert_eq!(data.allele_name(1, 2), Some("z"));
        assert_eq!(data.allele_frequency(1, 0, 0), None);
        assert_eq!(data.allele_frequency(1, 1, 2), Some(0.5));
        assert_eq!(data.header(0).name.as_deref(), Some("acc-1"));

        let flat = allele_frequencies(&data);
        assert_eq!(flat[0], frequencies[0]);
        assert_eq!(flat[1][0].to_bits(), R_NA_BITS);
    }

    #[test]
    fn test_frequency_data_shape_errors() {
        let frequencies = vec![vec![1.0, 0.0]];
        let columns = strings(&["mk1", "mk1"]);
        let err = create_frequency_genotype_data(&frequencies, &ids(2), None, &columns, &strings(&["a", "b"]))
            .unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationErrorKind::DimensionMismatch));

        let err =
            create_frequency_genotype_data(&frequencies, &ids(1), None, &columns, &strings(&["a"])).unwrap_err();
        assert!(err.to_string().contains("allele names"));

        let err = create_frequency_genotype_data(&[], &[], None, &columns, &columns).unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationErrorKind::EmptyData));
    }

    #[test]
    fn test_biparental_data() {
        let scores = vec![vec![0, 2, R_NA_INTEGER], vec![1, 1, 0]];
        let names = vec![Some("Alice".to_string()), None];
        let data = create_biparental_genotype_data(&scores, &ids(2), Some(&names), None).unwrap();
        assert_eq!(data.ploidy(), Some(2));
        assert_eq!(data.allele_score(0, 2), None);
        assert_eq!(data.allele_frequency(1, 0, 1), Some(0.5));
        assert_eq!(data.header(0).name.as_deref(), Some("Alice"));
        assert_eq!(data.header(1).name, None);

        let err = create_biparental_genotype_data(&[vec![-1]], &ids(1), None, None).unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_default_data_from_labels() {
        let alleles = vec![
            strings(&["A", "B", "1"]),
            strings(&["A", "A", "NA"]),
        ];
        let data =
            create_default_genotype_data(&alleles, &ids(2), None, &strings(&["mk1-1", "mk1-2", "mk2"])).unwrap();
        assert_eq!(data.number_of_markers(), 2);
        assert_eq!(data.allele_frequency(0, 0, 0), Some(0.5));
        assert_eq!(data.allele_frequency(1, 0, 0), Some(1.0));
        assert_eq!(data.allele_frequency(1, 1, 0), None);
    }

    #[test]
    fn test_distance_matrix() {
        let distances = vec![vec![0.0, 0.4], vec![0.4, 0.0]];
        let data = create_distance_matrix_data(&distances, &ids(2), None).unwrap();
        assert_eq!(data.distance(1, 0), 0.4);
        assert_eq!(data.header(1).id.as_deref(), Some("acc-2"));

        let err = create_distance_matrix_data(&[vec![0.0]], &ids(2), None).unwrap_err();
        assert!(err.to_string().contains("Number of ids"));
    }
}

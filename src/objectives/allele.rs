//! Allele-based diversity objectives on genotype data.
//!
//! All measures except coverage work on the average allele frequencies
//! of the selected accessions (missing counted as 0, see
//! [`GenotypeData::average_marker_frequencies`]).
//!
//! # Degenerate markers
//! A marker whose average frequencies are all 0 (every selected accession
//! missing) is left out of per-marker means. With no marker left the
//! value is 0.
//!
//! # Reference
//! - Nei (1973), "Analysis of gene diversity in subdivided populations"
//! - Shannon (1948), "A mathematical theory of communication"
//! - Thachuk et al. (2009), "Core Hunter: an algorithm for sampling genetic resources"

use crate::models::GenotypeData;

/// Fraction of all alleles carried by at least one selected accession.
///
/// An allele is carried when its frequency is present and positive.
pub fn coverage(data: &GenotypeData, selected: &[usize]) -> f64 {
    let total = data.total_number_of_alleles();
    if total == 0 {
        return 0.0;
    }
    covered_alleles(data, selected) as f64 / total as f64
}

/// Fraction of alleles absent from the selection; `1 - coverage`.
pub fn proportion_non_informative(data: &GenotypeData, selected: &[usize]) -> f64 {
    1.0 - coverage(data, selected)
}

/// Number of alleles carried by at least one selected accession.
pub fn covered_alleles(data: &GenotypeData, selected: &[usize]) -> usize {
    (0..data.number_of_markers())
        .map(|m| {
            (0..data.number_of_alleles(m))
                .filter(|&a| {
                    selected
                        .iter()
                        .any(|&i| data.allele_frequency(i, m, a).is_some_and(|f| f > 0.0))
                })
                .count()
        })
        .sum()
}

/// Mean over markers of a function of the average frequencies,
/// skipping degenerate markers.
fn marker_mean(data: &GenotypeData, selected: &[usize], f: impl Fn(&[f64]) -> f64) -> f64 {
    let mut freqs = Vec::new();
    let mut sum = 0.0;
    let mut counted = 0usize;
    for m in 0..data.number_of_markers() {
        data.average_marker_frequencies(selected, m, &mut freqs);
        if freqs.iter().all(|&p| p == 0.0) {
            continue;
        }
        sum += f(&freqs);
        counted += 1;
    }
    if counted == 0 { 0.0 } else { sum / counted as f64 }
}

/// Expected proportion of heterozygous loci: mean of `1 - sum p^2`.
pub fn heterozygous_loci(data: &GenotypeData, selected: &[usize]) -> f64 {
    marker_mean(data, selected, |p| 1.0 - p.iter().map(|x| x * x).sum::<f64>())
}

/// Effective number of alleles: mean of `1 / sum p^2`.
pub fn number_effective_alleles(data: &GenotypeData, selected: &[usize]) -> f64 {
    marker_mean(data, selected, |p| 1.0 / p.iter().map(|x| x * x).sum::<f64>())
}

/// Shannon diversity over the genome-wide allele distribution.
///
/// The average frequencies of all alleles of all markers are scaled to
/// sum to one and `-sum q ln q` is taken over positive `q`.
pub fn shannon_diversity(data: &GenotypeData, selected: &[usize]) -> f64 {
    let mut freqs = Vec::new();
    let mut all = Vec::with_capacity(data.total_number_of_alleles());
    for m in 0..data.number_of_markers() {
        data.average_marker_frequencies(selected, m, &mut freqs);
        all.extend_from_slice(&freqs);
    }
    let total: f64 = all.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    -all.iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| {
            let q = p / total;
            q * q.ln()
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{frequencies, headers};

    fn data() -> GenotypeData {
        GenotypeData::from_frequencies(headers(), None, None, &frequencies()).unwrap()
    }

    #[test]
    fn test_proportion_non_informative() {
        let data = data();
        assert_eq!(proportion_non_informative(&data, &[1, 2]), 0.10526315789473684);
        assert_eq!(covered_alleles(&data, &[1, 2]), 17);
    }

    #[test]
    fn test_complement_law() {
        let data = data();
        for subset in [vec![0], vec![1, 2], vec![0, 3], vec![2, 3, 4], vec![0, 1, 2, 3, 4]] {
            let sum = coverage(&data, &subset) + proportion_non_informative(&data, &subset);
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_coverage_monotone() {
        let data = data();
        let mut subset = Vec::new();
        let mut previous = 0;
        for i in [3, 0, 4, 1, 2] {
            subset.push(i);
            let covered = covered_alleles(&data, &subset);
            assert!(covered >= previous);
            previous = covered;
        }
        // allele 0 of marker 2 is absent from the whole collection
        assert_eq!(previous, 18);
    }

    #[test]
    fn test_heterozygous_loci() {
        let data = data();
        // accession 0 alone: markers 0 and 4 degenerate, 3 markers at 0.5, 2 at 0
        assert!((heterozygous_loci(&data, &[0]) - 0.3).abs() < 1e-10);
        assert!((heterozygous_loci(&data, &[1, 2]) - 0.5010714285714285).abs() < 1e-10);
    }

    #[test]
    fn test_number_effective_alleles() {
        let data = data();
        assert!((number_effective_alleles(&data, &[0]) - 1.6).abs() < 1e-10);
        assert!((number_effective_alleles(&data, &[0, 3]) - 4.2).abs() < 1e-10);
        assert!((number_effective_alleles(&data, &[1, 2]) - 2.060424169667867).abs() < 1e-10);
    }

    #[test]
    fn test_shannon_diversity() {
        let data = data();
        assert!((shannon_diversity(&data, &[1, 2]) - 2.7137269849866583).abs() < 1e-10);
        assert!((shannon_diversity(&data, &[0]) - 2.0253262207700673).abs() < 1e-10);
    }

    #[test]
    fn test_all_missing_selection_is_zero() {
        let freqs = vec![
            vec![vec![None, None], vec![None, None, None]],
            vec![vec![Some(1.0), Some(0.0)], vec![Some(0.2), Some(0.3), Some(0.5)]],
        ];
        let data = GenotypeData::from_frequencies(Vec::new(), None, None, &freqs).unwrap();
        assert_eq!(heterozygous_loci(&data, &[0]), 0.0);
        assert_eq!(number_effective_alleles(&data, &[0]), 0.0);
        assert_eq!(shannon_diversity(&data, &[0]), 0.0);
        assert_eq!(coverage(&data, &[0]), 0.0);
        assert_eq!(proportion_non_informative(&data, &[0]), 1.0);
    }
}

//! Genetic distances on allele frequencies.

use crate::models::GenotypeData;

use super::DistanceMeasure;

/// Sum over all alleles of `f(p, q)`, missing frequencies as 0.
fn allele_sum(data: &GenotypeData, i: usize, j: usize, f: impl Fn(f64, f64) -> f64) -> f64 {
    (0..data.number_of_markers())
        .map(|m| {
            data.marker_frequencies(i, m)
                .iter()
                .zip(data.marker_frequencies(j, m))
                .map(|(p, q)| f(p.unwrap_or(0.0), q.unwrap_or(0.0)))
                .sum::<f64>()
        })
        .sum()
}

/// Modified Rogers distance.
///
/// `sqrt(sum_m sum_a (p_ma - q_ma)^2 / 2M)`; in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ModifiedRogers<'a> {
    data: &'a GenotypeData,
}

impl<'a> ModifiedRogers<'a> {
    pub fn new(data: &'a GenotypeData) -> Self {
        Self { data }
    }
}

impl DistanceMeasure for ModifiedRogers<'_> {
    fn distance(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let markers = self.data.number_of_markers() as f64;
        let sum = allele_sum(self.data, i, j, |p, q| (p - q) * (p - q));
        (sum / (2.0 * markers)).sqrt()
    }
}

/// Cavalli-Sforza & Edwards chord distance.
///
/// `sqrt(sum_m sum_a (sqrt p_ma - sqrt q_ma)^2 / 2M)`; in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct CavalliSforzaEdwards<'a> {
    data: &'a GenotypeData,
}

impl<'a> CavalliSforzaEdwards<'a> {
    pub fn new(data: &'a GenotypeData) -> Self {
        Self { data }
    }
}

impl DistanceMeasure for CavalliSforzaEdwards<'_> {
    fn distance(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let markers = self.data.number_of_markers() as f64;
        let sum = allele_sum(self.data, i, j, |p, q| {
            let d = p.sqrt() - q.sqrt();
            d * d
        });
        (sum / (2.0 * markers)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{frequencies, headers};

    fn data() -> GenotypeData {
        GenotypeData::from_frequencies(headers(), None, None, &frequencies()).unwrap()
    }

    #[test]
    fn test_modified_rogers() {
        let data = data();
        let mr = ModifiedRogers::new(&data);
        assert!((mr.distance(1, 2) - 0.6115943255521743).abs() < 1e-10);
        assert!((mr.distance(0, 3) - 0.36187343222787294).abs() < 1e-10);
        assert_eq!(mr.distance(1, 2), mr.distance(2, 1));
        assert_eq!(mr.distance(4, 4), 0.0);
    }

    #[test]
    fn test_cavalli_sforza_edwards() {
        let data = data();
        let ce = CavalliSforzaEdwards::new(&data);
        assert!((ce.distance(1, 2) - 0.6446379659302455).abs() < 1e-10);
        assert!((ce.distance(0, 1) - 0.7559289460184544).abs() < 1e-10);
        assert_eq!(ce.distance(0, 1), ce.distance(1, 0));
    }

    #[test]
    fn test_identical_rows_have_zero_distance() {
        let freqs = vec![
            vec![vec![Some(0.5), Some(0.5)]],
            vec![vec![Some(0.5), Some(0.5)]],
        ];
        let data = GenotypeData::from_frequencies(Vec::new(), None, None, &freqs).unwrap();
        assert_eq!(ModifiedRogers::new(&data).distance(0, 1), 0.0);
        assert_eq!(CavalliSforzaEdwards::new(&data).distance(0, 1), 0.0);
    }
}

//! Gower distance on mixed-type phenotypes.

use crate::models::{PhenotypeData, PhenotypeValue};

use super::DistanceMeasure;

/// Gower distance: mean per-feature distance over comparable features.
///
/// Numeric features contribute `|x - y| / range` (0 when the range is
/// zero), nominal features a 0/1 mismatch. A feature missing for either
/// accession is skipped; with no comparable feature the distance is 0.
#[derive(Debug, Clone, Copy)]
pub struct Gower<'a> {
    data: &'a PhenotypeData,
}

impl<'a> Gower<'a> {
    pub fn new(data: &'a PhenotypeData) -> Self {
        Self { data }
    }

    fn feature_distance(&self, feature: usize, x: &PhenotypeValue, y: &PhenotypeValue) -> f64 {
        if self.data.feature(feature).scale.is_numeric() {
            if let (Some(x), Some(y), Some(range)) = (x.as_f64(), y.as_f64(), self.data.range(feature)) {
                return if range > 0.0 { ((x - y).abs() / range).min(1.0) } else { 0.0 };
            }
        }
        if x == y { 0.0 } else { 1.0 }
    }
}

impl DistanceMeasure for Gower<'_> {
    fn distance(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let mut sum = 0.0;
        let mut compared = 0usize;
        for f in 0..self.data.number_of_features() {
            if let (Some(x), Some(y)) = (self.data.value(i, f), self.data.value(j, f)) {
                sum += self.feature_distance(f, x, y);
                compared += 1;
            }
        }
        if compared == 0 { 0.0 } else { sum / compared as f64 }
    }
}

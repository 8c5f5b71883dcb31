//! Distance-based objectives.
//!
//! | Objective | Definition | Orientation |
//! |-----------|------------|-------------|
//! | EE | mean distance over unordered pairs of selected accessions | maximize |
//! | EN | mean distance of each selected accession to its nearest selected neighbour | maximize |
//! | AN | mean distance of every accession to its nearest selected accession | minimize |
//!
//! Fewer than two selected accessions give 0 for EE and EN; an empty
//! selection gives 0 for AN.

use crate::distance::DistanceMeasure;

/// Average entry-to-entry distance (EE).
pub fn entry_to_entry(measure: &dyn DistanceMeasure, selected: &[usize]) -> f64 {
    let k = selected.len();
    if k < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (x, &i) in selected.iter().enumerate() {
        for &j in &selected[x + 1..] {
            sum += measure.distance(i, j);
        }
    }
    sum / (k * (k - 1) / 2) as f64
}

/// Average entry-to-nearest-entry distance (EN).
pub fn entry_to_nearest_entry(measure: &dyn DistanceMeasure, selected: &[usize]) -> f64 {
    if selected.len() < 2 {
        return 0.0;
    }
    let sum: f64 = selected
        .iter()
        .map(|&i| {
            selected
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| measure.distance(i, j))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    sum / selected.len() as f64
}

/// Average accession-to-nearest-entry distance (AN) over all `size` accessions.
///
/// Selected accessions are their own nearest entry and contribute 0.
pub fn accession_to_nearest_entry(measure: &dyn DistanceMeasure, selected: &[usize], size: usize) -> f64 {
    if selected.is_empty() || size == 0 {
        return 0.0;
    }
    let sum: f64 = (0..size)
        .map(|i| {
            selected
                .iter()
                .map(|&j| measure.distance(i, j))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    sum / size as f64
}

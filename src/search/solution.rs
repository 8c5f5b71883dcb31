//! Subset solution representation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreHunterError, Result};

/// A subset of accession indices `0..size`, split into selected and
/// unselected indices.
///
/// Order within either list carries no meaning; [`swap`](Self::swap)
/// exchanges one selected with one unselected index in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetSolution {
    selected: Vec<usize>,
    unselected: Vec<usize>,
}

impl SubsetSolution {
    /// Creates a solution over `size` accessions.
    ///
    /// # Errors
    /// If an index is out of range or repeated.
    pub fn new(size: usize, selected: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut chosen = Vec::new();
        for i in selected {
            if i >= size {
                return Err(CoreHunterError::invalid_argument(format!(
                    "Accession index {i} out of range for {size} accessions"
                )));
            }
            if !seen.insert(i) {
                return Err(CoreHunterError::invalid_argument(format!(
                    "Accession index {i} selected twice"
                )));
            }
            chosen.push(i);
        }
        let unselected = (0..size).filter(|i| !seen.contains(i)).collect();
        Ok(Self {
            selected: chosen,
            unselected,
        })
    }

    /// Selected indices, in no particular order.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Unselected indices, in no particular order.
    pub fn unselected(&self) -> &[usize] {
        &self.unselected
    }

    /// Selected indices in ascending order.
    pub fn sorted_selected(&self) -> Vec<usize> {
        let mut sorted = self.selected.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Number of selected indices.
    pub fn subset_size(&self) -> usize {
        self.selected.len()
    }

    /// Total number of accessions.
    pub fn size(&self) -> usize {
        self.selected.len() + self.unselected.len()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Swaps `selected()[selected_pos]` with `unselected()[unselected_pos]`.
    ///
    /// Applying the same swap twice restores the solution.
    ///
    /// # Panics
    /// If a position is out of range.
    pub fn swap(&mut self, selected_pos: usize, unselected_pos: usize) {
        std::mem::swap(&mut self.selected[selected_pos], &mut self.unselected[unselected_pos]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_partitions_indices() {
        let s = SubsetSolution::new(5, [3, 1]).unwrap();
        assert_eq!(s.selected(), &[3, 1]);
        assert_eq!(s.unselected(), &[0, 2, 4]);
        assert_eq!(s.sorted_selected(), vec![1, 3]);
        assert_eq!(s.size(), 5);
        assert!(s.is_selected(3));
        assert!(!s.is_selected(0));
    }

    #[test]
    fn test_rejects_invalid_indices() {
        assert!(SubsetSolution::new(3, [0, 3]).is_err());
        assert!(SubsetSolution::new(3, [1, 1]).is_err());
    }

    #[test]
    fn test_swap_is_an_involution() {
        let mut s = SubsetSolution::new(4, [0, 1]).unwrap();
        s.swap(1, 0);
        assert_eq!(s.sorted_selected(), vec![0, 2]);
        assert_eq!(s.subset_size(), 2);
        s.swap(1, 0);
        assert_eq!(s, SubsetSolution::new(4, [0, 1]).unwrap());
    }
}

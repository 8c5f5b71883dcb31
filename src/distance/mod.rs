//! Pairwise distance measures between accessions.
//!
//! A [`Measure`] names a measure; [`Measure::bind`] resolves it against a
//! dataset into a [`DistanceMeasure`] that borrows the required source.
//!
//! # Measures
//!
//! | Measure | Source | Definition |
//! |---------|--------|------------|
//! | MR | genotypes | `sqrt(sum (p - q)^2 / 2M)` |
//! | CE | genotypes | `sqrt(sum (sqrt p - sqrt q)^2 / 2M)` |
//! | GD | phenotypes | mean per-feature Gower distance |
//! | PD | distances | matrix lookup |
//!
//! Missing allele frequencies count as 0.
//!
//! # Reference
//! - Wright (1978), "Evolution and the Genetics of Populations", Vol. 4
//! - Cavalli-Sforza & Edwards (1967), "Phylogenetic analysis: models and estimation procedures"
//! - Gower (1971), "A general coefficient of similarity and some of its properties"

mod genetic;
mod gower;

pub use genetic::{CavalliSforzaEdwards, ModifiedRogers};
pub use gower::Gower;

use serde::{Deserialize, Serialize};

use crate::error::{CoreHunterError, Result};
use crate::models::{CoreHunterData, DistanceMatrixData};

/// Distance between two accessions of a bound dataset.
pub trait DistanceMeasure: Send + Sync {
    /// Distance between accessions `i` and `j`. Symmetric, zero for `i == j`.
    fn distance(&self, i: usize, j: usize) -> f64;
}

/// Lookup in a precomputed distance matrix.
#[derive(Debug, Clone, Copy)]
pub struct Precomputed<'a> {
    data: &'a DistanceMatrixData,
}

impl<'a> Precomputed<'a> {
    pub fn new(data: &'a DistanceMatrixData) -> Self {
        Self { data }
    }
}

impl DistanceMeasure for Precomputed<'_> {
    fn distance(&self, i: usize, j: usize) -> f64 {
        self.data.distance(i, j)
    }
}

/// Named distance measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    ModifiedRogers,
    CavalliSforzaEdwards,
    GowersDistance,
    PrecomputedDistance,
}

impl Measure {
    /// All measures.
    pub const ALL: [Measure; 4] = [
        Measure::ModifiedRogers,
        Measure::CavalliSforzaEdwards,
        Measure::GowersDistance,
        Measure::PrecomputedDistance,
    ];

    /// Short code (`MR`, `CE`, `GD`, `PD`).
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Measure::ModifiedRogers => "MR",
            Measure::CavalliSforzaEdwards => "CE",
            Measure::GowersDistance => "GD",
            Measure::PrecomputedDistance => "PD",
        }
    }

    /// Parses a short code, case-insensitively.
    pub fn from_abbreviation(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.abbreviation().eq_ignore_ascii_case(s.trim()))
    }

    /// Whether `data` carries the source this measure reads.
    pub fn is_supported_by(&self, data: &CoreHunterData) -> bool {
        match self {
            Measure::ModifiedRogers | Measure::CavalliSforzaEdwards => data.has_genotypes(),
            Measure::GowersDistance => data.has_phenotypes(),
            Measure::PrecomputedDistance => data.has_distances(),
        }
    }

    /// Binds this measure to the matching source of `data`.
    ///
    /// # Errors
    /// If `data` lacks that source.
    pub fn bind<'a>(&self, data: &'a CoreHunterData) -> Result<Box<dyn DistanceMeasure + 'a>> {
        let missing = |source: &str| {
            CoreHunterError::invalid_argument(format!(
                "Distance measure {} requires {source}",
                self.abbreviation()
            ))
        };
        let measure: Box<dyn DistanceMeasure + 'a> = match self {
            Measure::ModifiedRogers => {
                Box::new(ModifiedRogers::new(data.genotypes().ok_or_else(|| missing("genotypes"))?))
            }
            Measure::CavalliSforzaEdwards => Box::new(CavalliSforzaEdwards::new(
                data.genotypes().ok_or_else(|| missing("genotypes"))?,
            )),
            Measure::GowersDistance => {
                Box::new(Gower::new(data.phenotypes().ok_or_else(|| missing("phenotypes"))?))
            }
            Measure::PrecomputedDistance => {
                Box::new(Precomputed::new(data.distances().ok_or_else(|| missing("distances"))?))
            }
        };
        Ok(measure)
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

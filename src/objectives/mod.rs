//! Objective functions over candidate subsets.
//!
//! Every objective maps `(selected accessions, dataset)` to a scalar and
//! declares whether it is minimized or maximized. Evaluation is pure and
//! deterministic.
//!
//! # Objectives
//!
//! | Code | Objective | Needs | Orientation |
//! |------|-----------|-------|-------------|
//! | EE | average entry-to-entry distance | measure | maximize |
//! | EN | average entry-to-nearest-entry distance | measure | maximize |
//! | AN | average accession-to-nearest-entry distance | measure | minimize |
//! | CV | allele coverage | genotypes | maximize |
//! | PN | proportion of non-informative alleles | genotypes | minimize |
//! | HE | expected proportion of heterozygous loci | genotypes | maximize |
//! | SH | Shannon diversity | genotypes | maximize |
//! | NE | effective number of alleles | genotypes | maximize |
//!
//! # Submodules
//!
//! - [`allele`]: allele frequency based measures
//! - [`distance`]: distance based measures

pub mod allele;
pub mod distance;
mod weighted;

pub use weighted::WeightedObjective;

use serde::{Deserialize, Serialize};

use crate::distance::Measure;
use crate::error::{CoreHunterError, Result};
use crate::models::{CoreHunterData, GenotypeData};
use crate::normalization::NormalizationRange;

/// A scalar objective over a subset of accession indices.
pub trait Objective: Send + Sync {
    /// Value of the objective for `selected`.
    ///
    /// # Errors
    /// If `data` lacks a source the objective needs.
    ///
    /// # Panics
    /// If an index in `selected` is out of range.
    fn evaluate(&self, selected: &[usize], data: &CoreHunterData) -> Result<f64>;

    /// Whether smaller values are better.
    fn is_minimizing(&self) -> bool;
}

/// Kind of core selection objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveType {
    AverageEntryToEntry,
    AverageEntryToNearestEntry,
    AverageAccessionToNearestEntry,
    Coverage,
    ProportionNonInformative,
    HeterozygousLoci,
    Shannon,
    NumberEffectiveAlleles,
}

impl ObjectiveType {
    /// All objective types.
    pub const ALL: [ObjectiveType; 8] = [
        ObjectiveType::AverageEntryToEntry,
        ObjectiveType::AverageEntryToNearestEntry,
        ObjectiveType::AverageAccessionToNearestEntry,
        ObjectiveType::Coverage,
        ObjectiveType::ProportionNonInformative,
        ObjectiveType::HeterozygousLoci,
        ObjectiveType::Shannon,
        ObjectiveType::NumberEffectiveAlleles,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            ObjectiveType::AverageEntryToEntry => "EE",
            ObjectiveType::AverageEntryToNearestEntry => "EN",
            ObjectiveType::AverageAccessionToNearestEntry => "AN",
            ObjectiveType::Coverage => "CV",
            ObjectiveType::ProportionNonInformative => "PN",
            ObjectiveType::HeterozygousLoci => "HE",
            ObjectiveType::Shannon => "SH",
            ObjectiveType::NumberEffectiveAlleles => "NE",
        }
    }

    /// Parses a short code, case-insensitively.
    pub fn from_abbreviation(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.abbreviation().eq_ignore_ascii_case(s.trim()))
    }

    /// Whether the objective is computed from a distance measure.
    pub fn requires_measure(&self) -> bool {
        matches!(
            self,
            ObjectiveType::AverageEntryToEntry
                | ObjectiveType::AverageEntryToNearestEntry
                | ObjectiveType::AverageAccessionToNearestEntry
        )
    }

    /// Whether smaller values are better.
    pub fn is_minimizing(&self) -> bool {
        matches!(
            self,
            ObjectiveType::AverageAccessionToNearestEntry | ObjectiveType::ProportionNonInformative
        )
    }
}

impl std::fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// A configured objective: type, optional measure, weight and optional
/// normalization range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreHunterObjective {
    pub objective: ObjectiveType,
    /// Distance measure; required by distance objectives, unused otherwise.
    pub measure: Option<Measure>,
    /// Weight in the composite objective (>= 0).
    pub weight: f64,
    /// Range used to rescale values before weighting.
    pub range: Option<NormalizationRange>,
}

impl CoreHunterObjective {
    /// Creates an objective with weight 1 and no range.
    pub fn new(objective: ObjectiveType, measure: Option<Measure>) -> Self {
        Self {
            objective,
            measure,
            weight: 1.0,
            range: None,
        }
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the normalization range.
    pub fn with_range(mut self, range: NormalizationRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Checks that the objective is well formed and applicable to `data`.
    pub fn validate(&self, data: &CoreHunterData) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(CoreHunterError::invalid_argument(format!(
                "Weight of objective {self} should be finite and non-negative, got {}",
                self.weight
            )));
        }
        match (self.objective.requires_measure(), self.measure) {
            (true, None) => Err(CoreHunterError::invalid_argument(format!(
                "Objective {} requires a distance measure",
                self.objective
            ))),
            (true, Some(measure)) if !measure.is_supported_by(data) => {
                Err(CoreHunterError::invalid_argument(format!(
                    "Measure {measure} of objective {} is not supported by the dataset",
                    self.objective
                )))
            }
            (false, _) if !data.has_genotypes() => Err(CoreHunterError::invalid_argument(format!(
                "Objective {} requires genotypes",
                self.objective
            ))),
            _ => Ok(()),
        }
    }

    fn genotypes<'a>(&self, data: &'a CoreHunterData) -> Result<&'a GenotypeData> {
        data.genotypes().ok_or_else(|| {
            CoreHunterError::invalid_argument(format!("Objective {} requires genotypes", self.objective))
        })
    }
}

impl Objective for CoreHunterObjective {
    fn evaluate(&self, selected: &[usize], data: &CoreHunterData) -> Result<f64> {
        if self.objective.requires_measure() {
            let measure = self.measure.ok_or_else(|| {
                CoreHunterError::invalid_argument(format!(
                    "Objective {} requires a distance measure",
                    self.objective
                ))
            })?;
            let measure = measure.bind(data)?;
            return Ok(match self.objective {
                ObjectiveType::AverageEntryToEntry => distance::entry_to_entry(measure.as_ref(), selected),
                ObjectiveType::AverageEntryToNearestEntry => {
                    distance::entry_to_nearest_entry(measure.as_ref(), selected)
                }
                _ => distance::accession_to_nearest_entry(measure.as_ref(), selected, data.size()),
            });
        }

        let genotypes = self.genotypes(data)?;
        Ok(match self.objective {
            ObjectiveType::Coverage => allele::coverage(genotypes, selected),
            ObjectiveType::ProportionNonInformative => allele::proportion_non_informative(genotypes, selected),
            ObjectiveType::HeterozygousLoci => allele::heterozygous_loci(genotypes, selected),
            ObjectiveType::Shannon => allele::shannon_diversity(genotypes, selected),
            _ => allele::number_effective_alleles(genotypes, selected),
        })
    }

    fn is_minimizing(&self) -> bool {
        self.objective.is_minimizing()
    }
}

impl std::fmt::Display for CoreHunterObjective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.measure {
            Some(measure) => write!(f, "{}-{}", self.objective, measure),
            None => write!(f, "{}", self.objective),
        }
    }
}

impl CoreHunterData {
    /// Default objectives: average entry-to-nearest-entry distance for each
    /// source (Modified Rogers, Gower, precomputed), weighted equally.
    pub fn default_objectives(&self) -> Vec<CoreHunterObjective> {
        let measures: Vec<Measure> = [
            (self.has_genotypes(), Measure::ModifiedRogers),
            (self.has_phenotypes(), Measure::GowersDistance),
            (self.has_distances(), Measure::PrecomputedDistance),
        ]
        .into_iter()
        .filter_map(|(present, measure)| present.then_some(measure))
        .collect();
        let weight = 1.0 / measures.len().max(1) as f64;
        measures
            .into_iter()
            .map(|measure| {
                CoreHunterObjective::new(ObjectiveType::AverageEntryToNearestEntry, Some(measure))
                    .with_weight(weight)
            })
            .collect()
    }

    /// Objective types applicable to this dataset.
    pub fn allowed_objectives(&self) -> Vec<ObjectiveType> {
        ObjectiveType::ALL
            .into_iter()
            .filter(|o| !self.allowed_measures(*o).is_empty() || (!o.requires_measure() && self.has_genotypes()))
            .collect()
    }

    /// Measures usable with `objective` on this dataset. Empty for
    /// objectives that take no measure.
    pub fn allowed_measures(&self, objective: ObjectiveType) -> Vec<Measure> {
        if !objective.requires_measure() {
            return Vec::new();
        }
        Measure::ALL
            .into_iter()
            .filter(|m| m.is_supported_by(self))
            .collect()
    }
}

//! Pareto-bound normalization of objectives.
//!
//! Objectives live on unrelated scales (a coverage fraction, a distance,
//! an effective allele count). Before they are summed, each is rescaled
//! to `[0, 1]` with a heuristic range estimated from single-objective
//! optima.
//!
//! # Algorithm
//! 1. Optimize each objective `o` on its own, all runs in parallel on a
//!    dedicated pool with one thread per objective and the same stop
//!    conditions; call the result `S_o`.
//! 2. Cross-evaluate `V[o][o'] = f_o(S_o')`.
//! 3. Maximized: `upper = V[o][o]`, `lower = min_o' V[o][o']`.
//!    Minimized: `lower = V[o][o]`, `upper = max_o' V[o][o']`.
//!
//! Any failed run fails the whole estimate; there are no retries.
//!
//! # Reference
//! Miettinen (1999), "Nonlinear Multiobjective Optimization", Ch. 2.4:
//! payoff tables and the ideal/nadir estimate

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::error::{CoreHunterError, Result};
use crate::models::CoreHunterData;
use crate::objectives::{CoreHunterObjective, Objective};
use crate::search::{CoreHunterListener, StopConditions, SubsetOptimizer, SubsetSolution};

/// Closed interval `[lower, upper]` used to rescale objective values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    lower: f64,
    upper: f64,
}

impl NormalizationRange {
    /// Creates a range.
    ///
    /// # Errors
    /// If a bound is not finite or `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(CoreHunterError::invalid_argument(format!(
                "Invalid normalization range [{lower}, {upper}]"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether `lower == upper`.
    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }

    /// `(value - lower) / (upper - lower)` clamped to `[0, 1]`; 1 for a
    /// degenerate range.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        ((value - self.lower) / (self.upper - self.lower)).clamp(0.0, 1.0)
    }
}

/// Estimates one normalization range per objective.
///
/// Weights and existing ranges of `objectives` are ignored: each
/// run optimizes the bare objective.
///
/// # Errors
/// [`CoreHunterError::Optimization`] if the pool cannot be built or any
/// run fails.
pub fn normalize(
    optimizer: &dyn SubsetOptimizer,
    objectives: &[CoreHunterObjective],
    data: &CoreHunterData,
    subset_size: usize,
    stop: &StopConditions,
    listener: Option<&dyn CoreHunterListener>,
) -> Result<Vec<NormalizationRange>> {
    if objectives.is_empty() {
        return Ok(Vec::new());
    }
    let k = objectives.len();
    let span = info_span!("normalization", objectives = k, subset_size);
    let _guard = span.enter();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(k)
        .thread_name(|i| format!("core-hunter-normalize-{i}"))
        .build()
        .map_err(|e| CoreHunterError::optimization(format!("Failed to create thread pool: {e}")))?;

    info!("Optimizing {k} objectives separately");
    let runs: Vec<Result<SubsetSolution>> = pool.install(|| {
        objectives
            .par_iter()
            .map(|objective| {
                let _run = info_span!("preliminary_run", objective = %objective).entered();
                optimizer.optimize(objective, data, subset_size, stop, listener)
            })
            .collect()
    });

    let mut solutions = Vec::with_capacity(k);
    for (objective, run) in objectives.iter().zip(runs) {
        let solution = run.map_err(|e| {
            CoreHunterError::optimization(format!("Normalization run for objective {objective} failed: {e}"))
        })?;
        solutions.push(solution);
    }

    let mut ranges = Vec::with_capacity(k);
    for (o, objective) in objectives.iter().enumerate() {
        let row = solutions
            .iter()
            .map(|s| objective.evaluate(s.selected(), data))
            .collect::<Result<Vec<f64>>>()?;
        let own = row[o];
        let range = if objective.is_minimizing() {
            NormalizationRange::new(own, row.iter().copied().fold(own, f64::max))?
        } else {
            NormalizationRange::new(row.iter().copied().fold(own, f64::min), own)?
        };
        debug!(objective = %objective, lower = range.lower(), upper = range.upper(), "Normalization range");
        ranges.push(range);
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Measure;
    use crate::models::{DistanceMatrixData, GenotypeData};
    use crate::objectives::ObjectiveType;
    use crate::search::RandomDescent;
    use crate::testing::{distances, frequencies, headers};

    /// Enumerates every subset; optimal and deterministic on tiny data.
    struct Exhaustive;

    impl SubsetOptimizer for Exhaustive {
        fn optimize(
            &self,
            objective: &dyn Objective,
            data: &CoreHunterData,
            subset_size: usize,
            _stop: &StopConditions,
            _listener: Option<&dyn CoreHunterListener>,
        ) -> Result<SubsetSolution> {
            let n = data.size();
            let mut best: Option<(f64, Vec<usize>)> = None;
            for mask in 0u32..(1 << n) {
                if mask.count_ones() as usize != subset_size {
                    continue;
                }
                let subset: Vec<usize> = (0..n).filter(|i| mask & (1 << i) != 0).collect();
                let value = objective.evaluate(&subset, data)?;
                let better = match &best {
                    None => true,
                    Some((b, _)) if objective.is_minimizing() => value < *b,
                    Some((b, _)) => value > *b,
                };
                if better {
                    best = Some((value, subset));
                }
            }
            let (_, subset) = best.ok_or_else(|| CoreHunterError::optimization("no subset of that size"))?;
            SubsetSolution::new(n, subset)
        }
    }

    struct Failing;

    impl SubsetOptimizer for Failing {
        fn optimize(
            &self,
            _objective: &dyn Objective,
            _data: &CoreHunterData,
            _subset_size: usize,
            _stop: &StopConditions,
            _listener: Option<&dyn CoreHunterListener>,
        ) -> Result<SubsetSolution> {
            Err(CoreHunterError::invalid_argument("no feasible subset"))
        }
    }

    fn data() -> CoreHunterData {
        let g = GenotypeData::from_frequencies(headers(), None, None, &frequencies()).unwrap();
        let d = DistanceMatrixData::new(Vec::new(), &distances()).unwrap();
        CoreHunterData::new(Some(g), None, Some(d)).unwrap()
    }

    fn objectives() -> Vec<CoreHunterObjective> {
        vec![
            CoreHunterObjective::new(ObjectiveType::AverageEntryToEntry, Some(Measure::PrecomputedDistance)),
            CoreHunterObjective::new(ObjectiveType::ProportionNonInformative, None),
            CoreHunterObjective::new(ObjectiveType::HeterozygousLoci, None),
            CoreHunterObjective::new(
                ObjectiveType::AverageAccessionToNearestEntry,
                Some(Measure::ModifiedRogers),
            ),
        ]
    }

    fn stop() -> StopConditions {
        StopConditions::default().with_max_steps(100)
    }

    #[test]
    fn test_range_validation() {
        assert!(NormalizationRange::new(0.5, 0.2).is_err());
        assert!(NormalizationRange::new(f64::NAN, 1.0).is_err());
        let r = NormalizationRange::new(1.0, 3.0).unwrap();
        assert_eq!(r.normalize(2.0), 0.5);
        assert_eq!(r.normalize(5.0), 1.0);
        assert_eq!(r.normalize(0.0), 0.0);
        let flat = NormalizationRange::new(2.0, 2.0).unwrap();
        assert!(flat.is_degenerate());
        assert_eq!(flat.normalize(7.0), 1.0);
    }

    #[test]
    fn test_bounds_match_own_optimum() {
        let data = data();
        let objectives = objectives();
        let ranges = normalize(&Exhaustive, &objectives, &data, 2, &stop(), None).unwrap();
        assert_eq!(ranges.len(), objectives.len());

        for (objective, range) in objectives.iter().zip(&ranges) {
            assert!(range.lower() <= range.upper());
            let own = Exhaustive.optimize(objective, &data, 2, &stop(), None).unwrap();
            let value = objective.evaluate(own.selected(), &data).unwrap();
            if objective.is_minimizing() {
                assert_eq!(range.lower(), value, "{objective}");
            } else {
                assert_eq!(range.upper(), value, "{objective}");
            }
        }
        // EE optimum is the pair (0, 4) at distance 0.8
        assert_eq!(ranges[0].upper(), 0.8);
    }

    #[test]
    fn test_single_objective_is_degenerate() {
        let data = data();
        let objectives = vec![CoreHunterObjective::new(ObjectiveType::Coverage, None)];
        let ranges = normalize(&Exhaustive, &objectives, &data, 3, &stop(), None).unwrap();
        assert!(ranges[0].is_degenerate());
    }

    #[test]
    fn test_failed_run_is_terminal() {
        let data = data();
        let err = normalize(&Failing, &objectives(), &data, 2, &stop(), None).unwrap_err();
        assert!(matches!(err, CoreHunterError::Optimization { .. }));
    }

    #[test]
    fn test_subset_size_out_of_range() {
        let data = data();
        let err = normalize(&RandomDescent::new(), &objectives(), &data, 9, &stop(), None).unwrap_err();
        assert!(matches!(err, CoreHunterError::Optimization { .. }));
    }

    #[test]
    fn test_random_descent_bounds_are_ordered() {
        let data = data();
        let optimizer = RandomDescent::new().with_seed(11);
        let ranges = normalize(&optimizer, &objectives(), &data, 3, &stop(), None).unwrap();
        assert!(ranges.iter().all(|r| r.lower() <= r.upper()));
    }
}

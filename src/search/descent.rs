//! Random descent over the swap neighbourhood.
//!
//! # Algorithm
//! 1. Draw a uniformly random subset of the requested size.
//! 2. Repeatedly swap a random selected accession for a random
//!    unselected one; keep the swap if the objective strictly improves,
//!    undo it otherwise.
//! 3. Stop when a [`StopConditions`] limit is reached, or immediately
//!    when every accession is selected.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{CoreHunterError, Result};
use crate::models::CoreHunterData;
use crate::objectives::Objective;

use super::{CoreHunterListener, StopConditions, SubsetOptimizer, SubsetSolution};

/// Default optimizer: first-improvement random descent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomDescent {
    /// Random seed; a fresh seed is drawn per run when `None`.
    pub seed: Option<u64>,
}

impl RandomDescent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the random seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl SubsetOptimizer for RandomDescent {
    fn optimize(
        &self,
        objective: &dyn Objective,
        data: &CoreHunterData,
        subset_size: usize,
        stop: &StopConditions,
        listener: Option<&dyn CoreHunterListener>,
    ) -> Result<SubsetSolution> {
        let n = data.size();
        if subset_size < 2 || subset_size > n {
            return Err(CoreHunterError::invalid_argument(format!(
                "Subset size {subset_size} should be between 2 and {n}"
            )));
        }
        if !stop.is_bounded() {
            return Err(CoreHunterError::invalid_argument(
                "At least one stop condition is required",
            ));
        }

        let mut rng = SmallRng::seed_from_u64(self.seed.unwrap_or_else(rand::random));
        let initial = rand::seq::index::sample(&mut rng, n, subset_size).into_vec();
        let mut solution = SubsetSolution::new(n, initial)?;
        let mut best = objective.evaluate(solution.selected(), data)?;
        let minimizing = objective.is_minimizing();

        if let Some(l) = listener {
            l.search_started();
            l.new_best_solution(&solution, best);
        }

        let start = Instant::now();
        let mut last_improvement = start;
        let mut steps = 0u64;
        while !solution.unselected().is_empty()
            && !stop.should_stop(steps, start.elapsed(), last_improvement.elapsed())
        {
            steps += 1;
            let remove = rng.random_range(0..solution.selected().len());
            let add = rng.random_range(0..solution.unselected().len());
            solution.swap(remove, add);

            let value = objective.evaluate(solution.selected(), data)?;
            let improved = if minimizing { value < best } else { value > best };
            if improved {
                best = value;
                last_improvement = Instant::now();
                if let Some(l) = listener {
                    l.new_best_solution(&solution, best);
                }
            } else {
                solution.swap(remove, add);
            }
        }

        let elapsed = start.elapsed();
        debug!(steps, best, elapsed_ms = elapsed.as_millis() as u64, "Random descent finished");
        if let Some(l) = listener {
            l.search_stopped(steps, elapsed);
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Measure;
    use crate::models::DistanceMatrixData;
    use crate::objectives::{CoreHunterObjective, ObjectiveType};
    use crate::testing::distances;
    use std::sync::Mutex;
    use std::time::Duration;

    fn data() -> CoreHunterData {
        let d = DistanceMatrixData::new(Vec::new(), &distances()).unwrap();
        CoreHunterData::new(None, None, Some(d)).unwrap()
    }

    fn entry_to_entry() -> CoreHunterObjective {
        CoreHunterObjective::new(ObjectiveType::AverageEntryToEntry, Some(Measure::PrecomputedDistance))
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl CoreHunterListener for Recorder {
        fn search_started(&self) {
            self.events.lock().unwrap().push("started".into());
        }

        fn new_best_solution(&self, _solution: &SubsetSolution, value: f64) {
            self.events.lock().unwrap().push(format!("best {value}"));
        }

        fn search_stopped(&self, steps: u64, _elapsed: Duration) {
            self.events.lock().unwrap().push(format!("stopped {steps}"));
        }
    }

    #[test]
    fn test_finds_most_distant_pair() {
        let data = data();
        let stop = StopConditions::default().with_max_steps(500);
        let solution = RandomDescent::new()
            .with_seed(7)
            .optimize(&entry_to_entry(), &data, 2, &stop, None)
            .unwrap();
        assert_eq!(solution.sorted_selected(), vec![0, 4]);
    }

    #[test]
    fn test_same_seed_same_result() {
        let data = data();
        let stop = StopConditions::default().with_max_steps(3);
        let optimizer = RandomDescent::new().with_seed(42);
        let a = optimizer.optimize(&entry_to_entry(), &data, 3, &stop, None).unwrap();
        let b = optimizer.optimize(&entry_to_entry(), &data, 3, &stop, None).unwrap();
        assert_eq!(a.sorted_selected(), b.sorted_selected());
    }

    #[test]
    fn test_full_selection_stops_immediately() {
        let data = data();
        let recorder = Recorder::default();
        let stop = StopConditions::default().with_time_limit(Duration::from_secs(60));
        let solution = RandomDescent::new()
            .optimize(&entry_to_entry(), &data, 5, &stop, Some(&recorder))
            .unwrap();
        assert_eq!(solution.sorted_selected(), vec![0, 1, 2, 3, 4]);
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("started"));
        assert_eq!(events.last().map(String::as_str), Some("stopped 0"));
    }

    #[test]
    fn test_minimizing_objective() {
        let data = data();
        let an = CoreHunterObjective::new(
            ObjectiveType::AverageAccessionToNearestEntry,
            Some(Measure::PrecomputedDistance),
        );
        let stop = StopConditions::default().with_max_steps(500);
        let solution = RandomDescent::new().with_seed(3).optimize(&an, &data, 2, &stop, None).unwrap();
        let best = an.evaluate(solution.selected(), &data).unwrap();
        // exhaustive optimum over all pairs
        let mut optimum = f64::INFINITY;
        for i in 0..5 {
            for j in i + 1..5 {
                optimum = optimum.min(an.evaluate(&[i, j], &data).unwrap());
            }
        }
        assert!((best - optimum).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let data = data();
        let stop = StopConditions::default().with_max_steps(10);
        let optimizer = RandomDescent::new();
        assert!(optimizer.optimize(&entry_to_entry(), &data, 1, &stop, None).is_err());
        assert!(optimizer.optimize(&entry_to_entry(), &data, 6, &stop, None).is_err());
        assert!(optimizer
            .optimize(&entry_to_entry(), &data, 2, &StopConditions::default(), None)
            .is_err());
    }
}

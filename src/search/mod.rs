//! Subset search.
//!
//! The optimizer is a collaborator of the core: any [`SubsetOptimizer`]
//! can drive the objectives. [`RandomDescent`] is the default.
//!
//! # Submodules
//!
//! - [`SubsetSolution`]: selected/unselected index partition
//! - [`CoreHunterListener`]: progress callbacks

mod descent;
mod listener;
mod solution;

pub use descent::RandomDescent;
pub use listener::{CoreHunterListener, TracingListener};
pub use solution::SubsetSolution;

use std::time::Duration;

use crate::error::Result;
use crate::models::CoreHunterData;
use crate::objectives::Objective;

/// When a search run stops. At least one condition must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopConditions {
    /// Total runtime.
    pub time_limit: Option<Duration>,
    /// Runtime since the last improvement.
    pub max_time_without_improvement: Option<Duration>,
    /// Number of search steps.
    pub max_steps: Option<u64>,
}

impl StopConditions {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_max_time_without_improvement(mut self, limit: Duration) -> Self {
        self.max_time_without_improvement = Some(limit);
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Whether any condition is set.
    pub fn is_bounded(&self) -> bool {
        self.time_limit.is_some() || self.max_time_without_improvement.is_some() || self.max_steps.is_some()
    }

    /// Whether a run with the given progress should stop.
    pub fn should_stop(&self, steps: u64, elapsed: Duration, since_improvement: Duration) -> bool {
        self.max_steps.is_some_and(|max| steps >= max)
            || self.time_limit.is_some_and(|limit| elapsed >= limit)
            || self
                .max_time_without_improvement
                .is_some_and(|limit| since_improvement >= limit)
    }
}

/// Searches for a subset of fixed size that optimizes an objective.
pub trait SubsetOptimizer: Send + Sync {
    /// Runs one search and returns the best subset found.
    ///
    /// # Errors
    /// If `subset_size` is not in `2..=data.size()`, `stop` is unbounded,
    /// or the objective cannot be evaluated on `data`.
    fn optimize(
        &self,
        objective: &dyn Objective,
        data: &CoreHunterData,
        subset_size: usize,
        stop: &StopConditions,
        listener: Option<&dyn CoreHunterListener>,
    ) -> Result<SubsetSolution>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_conditions() {
        assert!(!StopConditions::default().is_bounded());

        let stop = StopConditions::default().with_max_steps(10);
        assert!(stop.is_bounded());
        assert!(!stop.should_stop(9, Duration::from_secs(60), Duration::from_secs(60)));
        assert!(stop.should_stop(10, Duration::ZERO, Duration::ZERO));

        let stop = StopConditions::default()
            .with_time_limit(Duration::from_millis(100))
            .with_max_time_without_improvement(Duration::from_millis(20));
        assert!(!stop.should_stop(1000, Duration::from_millis(50), Duration::from_millis(10)));
        assert!(stop.should_stop(0, Duration::from_millis(50), Duration::from_millis(20)));
        assert!(stop.should_stop(0, Duration::from_millis(100), Duration::ZERO));
    }
}

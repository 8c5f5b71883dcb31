//! Weighted composite of several objectives.

use crate::error::{CoreHunterError, Result};
use crate::models::CoreHunterData;

use super::{CoreHunterObjective, Objective};

/// Weighted sum of objective contributions; always maximized.
///
/// Each objective contributes `weight * r`, where `r` is:
///
/// | Orientation | With range | Without range |
/// |-------------|------------|---------------|
/// | maximize | `(v - lower) / (upper - lower)` clamped to `[0, 1]` | `v` |
/// | minimize | `1 - (v - lower) / (upper - lower)`, clamped | `-v` |
///
/// A degenerate range (`lower == upper`) rescales every value to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedObjective {
    objectives: Vec<CoreHunterObjective>,
}

impl WeightedObjective {
    /// Creates the composite.
    ///
    /// # Errors
    /// If `objectives` is empty.
    pub fn new(objectives: Vec<CoreHunterObjective>) -> Result<Self> {
        if objectives.is_empty() {
            return Err(CoreHunterError::invalid_argument(
                "A weighted objective needs at least one objective",
            ));
        }
        Ok(Self { objectives })
    }

    pub fn objectives(&self) -> &[CoreHunterObjective] {
        &self.objectives
    }

    /// Contribution of one objective before weighting.
    pub fn contribution(objective: &CoreHunterObjective, value: f64) -> f64 {
        match (&objective.range, objective.is_minimizing()) {
            (Some(range), false) => range.normalize(value),
            (Some(range), true) if range.is_degenerate() => 1.0,
            (Some(range), true) => 1.0 - range.normalize(value),
            (None, false) => value,
            (None, true) => -value,
        }
    }
}

impl Objective for WeightedObjective {
    fn evaluate(&self, selected: &[usize], data: &CoreHunterData) -> Result<f64> {
        let mut total = 0.0;
        for objective in &self.objectives {
            let value = objective.evaluate(selected, data)?;
            total += objective.weight * Self::contribution(objective, value);
        }
        Ok(total)
    }

    fn is_minimizing(&self) -> bool {
        false
    }
}

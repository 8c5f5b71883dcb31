//! Core selection execution.
//!
//! [`CoreHunter`] turns [`CoreHunterArguments`] into a selected subset:
//!
//! 1. Validate subset size and objectives against the dataset.
//! 2. With several objectives and normalization enabled, estimate missing
//!    ranges (see [`crate::normalization`]); the listener sees one
//!    `preprocessing_started`/`preprocessing_stopped` pair around it, also
//!    when [`CoreHunter::normalize`] is called on its own.
//! 3. Combine objectives into a [`WeightedObjective`] (a single objective
//!    without range is optimized directly) and run the optimizer.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreHunterError, Result};
use crate::models::CoreHunterData;
use crate::normalization::{NormalizationRange, normalize};
use crate::objectives::{CoreHunterObjective, Objective, WeightedObjective};
use crate::search::{CoreHunterListener, RandomDescent, StopConditions, SubsetOptimizer, SubsetSolution};

/// Execution mode; selects the default stop condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Stop after 10 s without improvement.
    #[default]
    Default,
    /// Stop after 2 s without improvement.
    Fast,
}

impl ExecutionMode {
    /// Max time without improvement applied when no time limit is set.
    pub fn default_max_time_without_improvement(&self) -> Duration {
        match self {
            ExecutionMode::Default => Duration::from_secs(10),
            ExecutionMode::Fast => Duration::from_secs(2),
        }
    }
}

/// Search settings shared by normalization runs and the main run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub mode: ExecutionMode,
    /// Total runtime per run (ms).
    pub time_limit_ms: Option<u64>,
    /// Runtime since the last improvement (ms).
    pub max_time_without_improvement_ms: Option<u64>,
    /// Search steps per run.
    pub max_steps: Option<u64>,
    /// Random seed for reproducible runs.
    pub seed: Option<u64>,
}

impl ExecutionSettings {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_max_time_without_improvement_ms(mut self, ms: u64) -> Self {
        self.max_time_without_improvement_ms = Some(ms);
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stop conditions for one run.
    ///
    /// Without a time limit or a max time without improvement, the mode's
    /// default max time without improvement applies.
    pub fn stop_conditions(&self) -> StopConditions {
        let mut stop = StopConditions {
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            max_time_without_improvement: self.max_time_without_improvement_ms.map(Duration::from_millis),
            max_steps: self.max_steps,
        };
        if stop.time_limit.is_none() && stop.max_time_without_improvement.is_none() {
            stop.max_time_without_improvement = Some(self.mode.default_max_time_without_improvement());
        }
        stop
    }
}

/// What to select: dataset, subset size and objectives.
#[derive(Debug, Clone)]
pub struct CoreHunterArguments {
    pub data: Arc<CoreHunterData>,
    pub subset_size: usize,
    pub objectives: Vec<CoreHunterObjective>,
    /// Estimate normalization ranges for several objectives (default on).
    pub normalize: bool,
}

impl CoreHunterArguments {
    /// Creates arguments. An empty objective list selects the dataset's
    /// default objectives.
    pub fn new(data: Arc<CoreHunterData>, subset_size: usize, objectives: Vec<CoreHunterObjective>) -> Self {
        let objectives = if objectives.is_empty() {
            data.default_objectives()
        } else {
            objectives
        };
        Self {
            data,
            subset_size,
            objectives,
            normalize: true,
        }
    }

    /// Enables or disables normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Checks subset size and objectives against the dataset.
    pub fn validate(&self) -> Result<()> {
        let n = self.data.size();
        if self.subset_size < 2 || self.subset_size > n {
            return Err(CoreHunterError::invalid_argument(format!(
                "Subset size {} should be between 2 and {n}",
                self.subset_size
            )));
        }
        if self.objectives.is_empty() {
            return Err(CoreHunterError::invalid_argument("No objectives"));
        }
        for objective in &self.objectives {
            objective.validate(&self.data)?;
        }
        Ok(())
    }

    fn needs_normalization(&self) -> bool {
        self.normalize && self.objectives.len() > 1 && self.objectives.iter().any(|o| o.range.is_none())
    }
}

/// Core selection executor.
pub struct CoreHunter {
    settings: ExecutionSettings,
    optimizer: Box<dyn SubsetOptimizer>,
    listener: Option<Arc<dyn CoreHunterListener>>,
}

impl CoreHunter {
    /// Creates an executor with the [`RandomDescent`] optimizer.
    pub fn new(settings: ExecutionSettings) -> Self {
        let optimizer = RandomDescent { seed: settings.seed };
        Self {
            settings,
            optimizer: Box::new(optimizer),
            listener: None,
        }
    }

    /// Replaces the optimizer.
    pub fn with_optimizer(mut self, optimizer: impl SubsetOptimizer + 'static) -> Self {
        self.optimizer = Box::new(optimizer);
        self
    }

    /// Sets the progress listener.
    pub fn with_listener(mut self, listener: Arc<dyn CoreHunterListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Value of `objective` for the selected accessions of `solution`.
    pub fn evaluate(
        &self,
        solution: &SubsetSolution,
        data: &CoreHunterData,
        objective: &CoreHunterObjective,
    ) -> Result<f64> {
        objective.evaluate(solution.selected(), data)
    }

    /// Estimates one normalization range per objective of `arguments`.
    ///
    /// The listener sees one `preprocessing_started`/`preprocessing_stopped`
    /// pair around the preliminary runs, also when one of them fails.
    pub fn normalize(&self, arguments: &CoreHunterArguments) -> Result<Vec<NormalizationRange>> {
        arguments.validate()?;
        if let Some(l) = &self.listener {
            l.preprocessing_started("Normalizing objectives");
        }
        let ranges = self.estimate_ranges(arguments);
        if let Some(l) = &self.listener {
            l.preprocessing_stopped("Normalization finished");
        }
        ranges
    }

    fn estimate_ranges(&self, arguments: &CoreHunterArguments) -> Result<Vec<NormalizationRange>> {
        normalize(
            self.optimizer.as_ref(),
            &arguments.objectives,
            &arguments.data,
            arguments.subset_size,
            &self.settings.stop_conditions(),
            self.listener.as_deref(),
        )
    }

    /// Selects a core subset.
    pub fn execute(&self, arguments: &CoreHunterArguments) -> Result<SubsetSolution> {
        arguments.validate()?;
        let mut objectives = arguments.objectives.clone();

        if arguments.needs_normalization() {
            let ranges = self.normalize(arguments)?;
            for (objective, range) in objectives.iter_mut().zip(ranges) {
                objective.range.get_or_insert(range);
            }
        }

        info!(
            objectives = objectives.len(),
            subset_size = arguments.subset_size,
            size = arguments.data.size(),
            "Selecting core subset"
        );
        let stop = self.settings.stop_conditions();
        let listener = self.listener.as_deref();
        if objectives.len() == 1 && objectives[0].range.is_none() {
            return self
                .optimizer
                .optimize(&objectives[0], &arguments.data, arguments.subset_size, &stop, listener);
        }
        let objective = WeightedObjective::new(objectives)?;
        self.optimizer
            .optimize(&objective, &arguments.data, arguments.subset_size, &stop, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Measure;
    use crate::models::{DistanceMatrixData, GenotypeData};
    use crate::objectives::ObjectiveType;
    use crate::testing::{distances, frequencies, headers};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<&'static str>>,
    }

    impl Recorder {
        fn count(&self, event: &str) -> usize {
            self.events.lock().unwrap().iter().filter(|e| **e == event).count()
        }
    }

    impl CoreHunterListener for Recorder {
        fn preprocessing_started(&self, _message: &str) {
            self.events.lock().unwrap().push("preprocessing_started");
        }

        fn preprocessing_stopped(&self, _message: &str) {
            self.events.lock().unwrap().push("preprocessing_stopped");
        }

        fn search_started(&self) {
            self.events.lock().unwrap().push("search_started");
        }
    }

    fn data() -> Arc<CoreHunterData> {
        let g = GenotypeData::from_frequencies(headers(), None, None, &frequencies()).unwrap();
        let d = DistanceMatrixData::new(Vec::new(), &distances()).unwrap();
        Arc::new(CoreHunterData::new(Some(g), None, Some(d)).unwrap())
    }

    fn settings() -> ExecutionSettings {
        ExecutionSettings::new(ExecutionMode::Fast).with_max_steps(200).with_seed(5)
    }

    #[test]
    fn test_stop_conditions_from_mode() {
        let stop = ExecutionSettings::default().stop_conditions();
        assert_eq!(stop.max_time_without_improvement, Some(Duration::from_secs(10)));
        let stop = ExecutionSettings::new(ExecutionMode::Fast).with_max_steps(5).stop_conditions();
        assert_eq!(stop.max_time_without_improvement, Some(Duration::from_secs(2)));
        assert_eq!(stop.max_steps, Some(5));
        let stop = ExecutionSettings::default().with_time_limit_ms(500).stop_conditions();
        assert_eq!(stop.time_limit, Some(Duration::from_millis(500)));
        assert_eq!(stop.max_time_without_improvement, None);
    }

    #[test]
    fn test_settings_serde() {
        let settings = settings();
        let json = serde_json::to_string(&settings).unwrap();
        let back: ExecutionSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        let partial: ExecutionSettings = serde_json::from_str(r#"{"mode":"Fast"}"#).unwrap();
        assert_eq!(partial, ExecutionSettings::new(ExecutionMode::Fast));
    }

    #[test]
    fn test_default_objectives_when_empty() {
        let args = CoreHunterArguments::new(data(), 3, Vec::new());
        assert_eq!(args.objectives, args.data.default_objectives());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_subset_size() {
        let args = CoreHunterArguments::new(data(), 1, Vec::new());
        assert!(CoreHunter::new(settings()).execute(&args).is_err());
        let args = CoreHunterArguments::new(data(), 6, Vec::new());
        assert!(CoreHunter::new(settings()).execute(&args).is_err());
    }

    #[test]
    fn test_single_objective_skips_preprocessing() {
        let recorder = Arc::new(Recorder::default());
        let hunter = CoreHunter::new(settings()).with_listener(recorder.clone());
        let cv = CoreHunterObjective::new(ObjectiveType::Coverage, None);
        let args = CoreHunterArguments::new(data(), 3, vec![cv]);
        let solution = hunter.execute(&args).unwrap();
        assert_eq!(solution.subset_size(), 3);
        assert_eq!(recorder.count("preprocessing_started"), 0);
        assert_eq!(recorder.count("search_started"), 1);
    }

    #[test]
    fn test_preprocessing_events_fire_once() {
        let recorder = Arc::new(Recorder::default());
        let hunter = CoreHunter::new(settings()).with_listener(recorder.clone());
        let objectives = vec![
            CoreHunterObjective::new(ObjectiveType::Coverage, None),
            CoreHunterObjective::new(ObjectiveType::AverageEntryToEntry, Some(Measure::PrecomputedDistance)),
            CoreHunterObjective::new(ObjectiveType::HeterozygousLoci, None),
        ];
        let args = CoreHunterArguments::new(data(), 2, objectives.clone());
        let solution = hunter.execute(&args).unwrap();
        assert_eq!(solution.subset_size(), 2);
        assert_eq!(recorder.count("preprocessing_started"), 1);
        assert_eq!(recorder.count("preprocessing_stopped"), 1);
        // three preliminary runs plus the main run
        assert_eq!(recorder.count("search_started"), 4);

        let recorder = Arc::new(Recorder::default());
        let hunter = CoreHunter::new(settings()).with_listener(recorder.clone());
        let args = CoreHunterArguments::new(data(), 2, objectives).with_normalize(false);
        hunter.execute(&args).unwrap();
        assert_eq!(recorder.count("preprocessing_started"), 0);
    }

    #[test]
    fn test_evaluate() {
        let data = data();
        let hunter = CoreHunter::new(settings());
        let pn = CoreHunterObjective::new(ObjectiveType::ProportionNonInformative, None);
        let solution = SubsetSolution::new(5, [2, 1]).unwrap();
        assert_eq!(hunter.evaluate(&solution, &data, &pn).unwrap(), 0.10526315789473684);
    }

    #[test]
    fn test_normalize_ranges() {
        let recorder = Arc::new(Recorder::default());
        let hunter = CoreHunter::new(settings()).with_listener(recorder.clone());
        let args = CoreHunterArguments::new(data(), 2, Vec::new());
        let ranges = hunter.normalize(&args).unwrap();
        assert_eq!(ranges.len(), 2);
        assert!(ranges.iter().all(|r| r.lower() <= r.upper()));
        assert_eq!(recorder.count("preprocessing_started"), 1);
        assert_eq!(recorder.count("preprocessing_stopped"), 1);
        assert_eq!(recorder.count("search_started"), 2);
    }

    struct FailingOptimizer;

    impl SubsetOptimizer for FailingOptimizer {
        fn optimize(
            &self,
            _objective: &dyn Objective,
            _data: &CoreHunterData,
            _subset_size: usize,
            _stop: &StopConditions,
            _listener: Option<&dyn CoreHunterListener>,
        ) -> Result<SubsetSolution> {
            Err(CoreHunterError::optimization("search failed"))
        }
    }

    #[test]
    fn test_preprocessing_stopped_after_failed_normalization() {
        let recorder = Arc::new(Recorder::default());
        let hunter = CoreHunter::new(settings())
            .with_optimizer(FailingOptimizer)
            .with_listener(recorder.clone());
        let args = CoreHunterArguments::new(data(), 2, Vec::new());

        let err = hunter.normalize(&args).unwrap_err();
        assert!(err.to_string().contains("search failed"));
        assert_eq!(recorder.count("preprocessing_started"), 1);
        assert_eq!(recorder.count("preprocessing_stopped"), 1);

        assert!(hunter.execute(&args).is_err());
        assert_eq!(recorder.count("preprocessing_started"), 2);
        assert_eq!(recorder.count("preprocessing_stopped"), 2);
    }

    #[test]
    fn test_invalid_arguments_fire_no_events() {
        let recorder = Arc::new(Recorder::default());
        let hunter = CoreHunter::new(settings()).with_listener(recorder.clone());
        let args = CoreHunterArguments::new(data(), 1, Vec::new());
        assert!(hunter.normalize(&args).is_err());
        assert!(recorder.events.lock().unwrap().is_empty());
    }
}

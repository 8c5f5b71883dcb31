//! Progress callbacks for preprocessing and search.

use std::time::Duration;

use tracing::{debug, info};

use super::SubsetSolution;

/// Receives progress events. All methods default to no-ops.
///
/// Listeners are shared with concurrent normalization runs and must be
/// `Send + Sync`.
pub trait CoreHunterListener: Send + Sync {
    /// Normalization is about to run.
    fn preprocessing_started(&self, _message: &str) {}

    /// Normalization finished.
    fn preprocessing_stopped(&self, _message: &str) {}

    /// A search run started.
    fn search_started(&self) {}

    /// A search run found a new best solution.
    fn new_best_solution(&self, _solution: &SubsetSolution, _value: f64) {}

    /// A search run stopped after `steps` steps.
    fn search_stopped(&self, _steps: u64, _elapsed: Duration) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl CoreHunterListener for TracingListener {
    fn preprocessing_started(&self, message: &str) {
        info!("{message}");
    }

    fn preprocessing_stopped(&self, message: &str) {
        info!("{message}");
    }

    fn search_started(&self) {
        info!("Search started");
    }

    fn new_best_solution(&self, solution: &SubsetSolution, value: f64) {
        debug!(value, subset_size = solution.subset_size(), "New best solution");
    }

    fn search_stopped(&self, steps: u64, elapsed: Duration) {
        info!(steps, elapsed_ms = elapsed.as_millis() as u64, "Search stopped");
    }
}

//! High-level runtime engine settings
//!
//! Selects the worker pool size and the seed used to randomize the initial
//! state when building a `Scenario`

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub workers: usize, // long-lived worker threads besides the coordinator
    pub seed: u64, // seed actually used for the initial state
}

impl Engine {
    /// One worker per available core, leaving a core for the coordinator.
    pub fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }
}

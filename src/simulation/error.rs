//! Simulation errors

use thiserror::Error;

/// Simulation result type
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Everything that can go wrong while building or ticking a simulation.
///
/// Only `Spawn` and `StateMismatch` happen in normal use, at startup. The rest
/// are tick-protocol breaches, reported instead of deadlocking. Overrun,
/// underrun, incomplete-tick and range errors leave the buffers untouched;
/// after `WorkerLost` or `WorkerPanicked` the simulation cannot tick again.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("state length mismatch: {positions} positions, {velocities} velocities")]
    StateMismatch { positions: usize, velocities: usize },

    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("worker {worker} released twice without being awaited")]
    SignalOverrun { worker: usize },

    #[error("worker {worker} awaited without being released")]
    SignalUnderrun { worker: usize },

    #[error("worker {worker} terminated unexpectedly")]
    WorkerLost { worker: usize },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("worker pool has been shut down")]
    Terminated,

    #[error("cannot commit a tick while workers are still running")]
    TickInFlight,

    #[error("cannot commit an incomplete tick: {missing}")]
    IncompleteTick { missing: String },

    #[error("previous-state snapshot is still shared with a worker")]
    SnapshotShared,

    #[error("range {start}..{end} is outside the population of {population}")]
    RangeOutOfBounds { start: usize, end: usize, population: usize },

    #[error("range {start}..{end} overlaps the chunk of running worker {worker}")]
    RangeOwnedByWorker { start: usize, end: usize, worker: usize },
}

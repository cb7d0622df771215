pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;
pub mod logging;
pub mod periodic_logger;

pub use simulation::states::{NVec3, Real, StateBuffers};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::error::SimulationError;
pub use simulation::partition::Partition;
pub use simulation::initializer::{random_state, sample_in_ball};
pub use simulation::forces::update_velocities_chunk;
pub use simulation::integrator::update_positions;
pub use simulation::worker::{Worker, WorkerPool};
pub use simulation::coordinator::Simulation;
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    BodyConfig, ConfigError, EngineConfig, ParametersConfig, ScenarioConfig,
};

#[cfg(feature = "viewer")]
pub use visualization::viewer::run_viewer;

pub use benchmark::benchmark::bench_ticks;
pub use logging::init_logging;
pub use periodic_logger::PeriodicLogger;

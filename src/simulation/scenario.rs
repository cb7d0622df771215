//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`
//! containing:
//! - engine settings (`Engine`: worker count and the seed actually used)
//! - physical parameters (`Parameters`)
//! - the initial state, either listed explicitly or randomized from the seed
//!
//! `Scenario::into_simulation` then spawns the worker pool.

use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::simulation::coordinator::Simulation;
use crate::simulation::engine::Engine;
use crate::simulation::error::SimulationError;
use crate::simulation::initializer::random_state;
use crate::simulation::params::Parameters;
use crate::simulation::states::NVec3;
use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub positions: Vec<NVec3>,
    pub velocities: Vec<NVec3>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            workers: cfg.engine.workers.unwrap_or_else(Engine::default_workers),
            seed: cfg.engine.seed.unwrap_or_else(rand::random),
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            gravitational_constant: p_cfg.gravitational_constant,
            time_step: p_cfg.time_step,
            max_velocity: p_cfg.max_velocity,
        };

        // Initial state: listed bodies win over random sampling
        let (positions, velocities) = if cfg.bodies.is_empty() {
            let mut rng = Pcg64Mcg::seed_from_u64(engine.seed);
            random_state(&mut rng, p_cfg.population, p_cfg.spawn_radius, p_cfg.velocity_radius)
        } else {
            cfg.bodies
                .iter()
                .map(|bc: &BodyConfig| (NVec3::from(bc.x), NVec3::from(bc.v)))
                .unzip()
        };

        info!(
            "scenario: {} stars, {} workers, seed {}, G = {}, dt = {}",
            positions.len(),
            engine.workers,
            engine.seed,
            parameters.gravitational_constant,
            parameters.time_step,
        );

        Ok(Self {
            engine,
            parameters,
            positions,
            velocities,
        })
    }

    pub fn into_simulation(self) -> Result<Simulation, SimulationError> {
        Simulation::new(self.parameters, self.engine.workers, self.positions, self.velocities)
    }
}

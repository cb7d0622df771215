//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – worker pool size and random seed
//! - [`ParametersConfig`] – population, spawn radii and physical constants
//! - [`BodyConfig`]       – optional explicit initial state for each star
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   workers: 7              # optional, defaults to one per spare core
//!   seed: 23                # optional, defaults to fresh entropy
//!
//! parameters:
//!   population: 1024        # number of stars when no bodies are listed
//!   spawn_radius: 2.0       # positions are drawn inside this ball
//!   velocity_radius: 5.0    # velocities are drawn inside this ball
//!   G: 0.01                 # gravitational constant
//!   time_step: 0.02         # fixed step, seconds
//!   max_velocity: 10.0      # optional clamp on velocity magnitude
//!
//! bodies:                   # optional, replaces the random initial state
//!   - x: [ 0.0, 0.0, 0.0 ]
//!     v: [ 0.0, 0.0, 0.0 ]
//! ```
//!
//! [`Scenario`](crate::Scenario) maps this configuration into the runtime types.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::states::Real;

/// Errors raised while loading or validating a scenario
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot open scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Engine configuration: how the simulation is run, not what it simulates
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    // worker threads besides the coordinator, `0` computes everything on the coordinator
    pub workers: Option<usize>,
    pub seed: Option<u64>, // deterministic seed to make runs reproducible
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(default)]
    pub population: usize, // star count for the random initial state
    #[serde(default)]
    pub spawn_radius: Real, // radius of the position ball
    #[serde(default)]
    pub velocity_radius: Real, // radius of the velocity ball
    #[serde(rename = "G", alias = "gravitational_constant")]
    pub gravitational_constant: Real,
    pub time_step: Real, // fixed step size, also the viewer tick period
    #[serde(default)]
    pub max_velocity: Option<Real>, // clamp, absent means none
}

/// Configuration for a single star's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [Real; 3], // initial position
    #[serde(default)]
    pub v: [Real; 3], // initial velocity
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // explicit initial state, overrides `population`
}

impl ScenarioConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: ScenarioConfig = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Number of stars this scenario will simulate
    pub fn population(&self) -> usize {
        if self.bodies.is_empty() {
            self.parameters.population
        } else {
            self.bodies.len()
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;

        if self.population() == 0 {
            return Err(invalid("population", "at least one star is required"));
        }
        if !(p.spawn_radius.is_finite() && p.spawn_radius >= 0.0) {
            let reason = format!("must be finite and non-negative, got {}", p.spawn_radius);
            return Err(invalid("spawn_radius", reason));
        }
        if !(p.velocity_radius.is_finite() && p.velocity_radius >= 0.0) {
            let reason = format!("must be finite and non-negative, got {}", p.velocity_radius);
            return Err(invalid("velocity_radius", reason));
        }
        if !p.gravitational_constant.is_finite() {
            return Err(invalid("G", format!("must be finite, got {}", p.gravitational_constant)));
        }
        if !(p.time_step.is_finite() && p.time_step > 0.0) {
            let reason = format!("must be finite and positive, got {}", p.time_step);
            return Err(invalid("time_step", reason));
        }
        if let Some(max) = p.max_velocity {
            if !(max.is_finite() && max > 0.0) {
                let reason = format!("must be finite and positive, got {max}");
                return Err(invalid("max_velocity", reason));
            }
        }
        if let Some(i) = self
            .bodies
            .iter()
            .position(|b| b.x.iter().chain(b.v.iter()).any(|c| !c.is_finite()))
        {
            return Err(invalid("bodies", format!("body {i} has a non-finite component")));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GALAXY: &str = "
engine:
  workers: 3
  seed: 23
parameters:
  population: 64
  spawn_radius: 2.0
  velocity_radius: 5.0
  G: 0.01
  time_step: 0.02
";

    #[test]
    fn parses_full_scenario() {
        let cfg = ScenarioConfig::from_yaml(GALAXY).unwrap();
        assert_eq!(cfg.engine.workers, Some(3));
        assert_eq!(cfg.engine.seed, Some(23));
        assert_eq!(cfg.population(), 64);
        assert_eq!(cfg.parameters.max_velocity, None);
        cfg.validate().unwrap();
    }

    #[test]
    fn engine_section_is_optional() {
        let cfg = ScenarioConfig::from_yaml(
            "
parameters:
  population: 8
  gravitational_constant: 1.0
  time_step: 1.0
",
        )
        .unwrap();
        assert_eq!(cfg.engine.workers, None);
        assert_eq!(cfg.parameters.gravitational_constant, 1.0);
        assert_eq!(cfg.parameters.spawn_radius, 0.0);
    }

    #[test]
    fn bodies_override_population() {
        let cfg = ScenarioConfig::from_yaml(
            "
parameters:
  population: 1000
  G: 1.0
  time_step: 1.0
bodies:
  - x: [0.0, 0.0, 0.0]
  - x: [1.0, 0.0, 0.0]
    v: [0.0, 1.0, 0.0]
",
        )
        .unwrap();
        assert_eq!(cfg.population(), 2);
        assert_eq!(cfg.bodies[0].v, [0.0, 0.0, 0.0]);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_time_step() {
        let mut cfg = ScenarioConfig::from_yaml(GALAXY).unwrap();
        cfg.parameters.time_step = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "time_step", .. }), "{err}");
    }

    #[test]
    fn rejects_empty_population() {
        let mut cfg = ScenarioConfig::from_yaml(GALAXY).unwrap();
        cfg.parameters.population = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { field: "population", .. })));
    }

    #[test]
    fn rejects_zero_velocity_clamp() {
        let mut cfg = ScenarioConfig::from_yaml(GALAXY).unwrap();
        cfg.parameters.max_velocity = Some(0.0);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { field: "max_velocity", .. })));
    }

    #[test]
    fn missing_time_step_is_a_yaml_error() {
        let err = ScenarioConfig::from_yaml("parameters:\n  G: 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}

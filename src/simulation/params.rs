//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds the constants every force evaluation needs:
//! - gravitational constant `G` and the fixed step `time_step`,
//! - an optional velocity clamp `max_velocity` (off unless configured)
//!
//! All masses are unit, so there is no per-body mass here.

use super::states::Real;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub gravitational_constant: Real, // G
    pub time_step: Real, // fixed step dt
    pub max_velocity: Option<Real>, // clamp on freshly evaluated velocities
}

impl Parameters {
    pub fn new(gravitational_constant: Real, time_step: Real) -> Self {
        Self {
            gravitational_constant,
            time_step,
            max_velocity: None,
        }
    }

    pub fn with_max_velocity(mut self, max_velocity: Real) -> Self {
        self.max_velocity = Some(max_velocity);
        self
    }
}

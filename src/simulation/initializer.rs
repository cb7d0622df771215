//! Randomized initial state
//!
//! Every star gets an independent position inside a ball of `spawn_radius`
//! and an independent velocity inside a ball of `velocity_radius`, both drawn
//! with the same rejection-free sampler.

use rand::distributions::Open01;
use rand::Rng;

use super::states::{NVec3, Real};

#[cfg(not(feature = "f32"))]
use std::f64::consts::TAU;
#[cfg(feature = "f32")]
use std::f32::consts::TAU;

/// Sample a point in a ball of `radius` around the origin.
///
/// Direction is uniform on the sphere (inverse CDF on the polar angle),
/// distance from the origin is `sqrt(u) * radius`, so half the samples lie
/// beyond `radius / sqrt(2)`.
pub fn sample_in_ball<R: Rng + ?Sized>(rng: &mut R, radius: Real) -> NVec3 {
    let u1: Real = rng.sample(Open01);
    let u2: Real = rng.sample(Open01);
    let u3: Real = rng.sample(Open01);

    let scale = u1.sqrt() * radius;
    let theta = TAU * u2;
    let phi = (1.0 - 2.0 * u3).acos();

    NVec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()) * scale
}

/// Initial positions and velocities for `population` stars.
///
/// Per star the position is drawn first, then the velocity, so a given seed
/// always yields the same state.
pub fn random_state<R: Rng + ?Sized>(
    rng: &mut R,
    population: usize,
    spawn_radius: Real,
    velocity_radius: Real,
) -> (Vec<NVec3>, Vec<NVec3>) {
    let mut positions = Vec::with_capacity(population);
    let mut velocities = Vec::with_capacity(population);
    for _ in 0..population {
        positions.push(sample_in_ball(rng, spawn_radius));
        velocities.push(sample_in_ball(rng, velocity_radius));
    }
    (positions, velocities)
}

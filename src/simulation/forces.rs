//! Force evaluation for the n-body engine
//!
//! Direct Newtonian gravity between unit masses, evaluated for one contiguous
//! range of stars at a time. This is the unit of parallel work: the result for
//! a range depends only on the previous state and the range itself.

use std::ops::Range;

use super::params::Parameters;
use super::states::NVec3;

/// Compute next-tick velocities for every star in `range`.
///
/// - `positions`, `velocities`: the full previous state, read-only
/// - `out[k]` receives the new velocity of star `range.start + k`
///
/// Each star starts from its previous velocity and gains
/// `G * dt / r^2` along the unit vector towards every other star.
/// There is no softening: coincident stars produce non-finite velocities.
pub fn update_velocities_chunk(
    params: &Parameters,
    positions: &[NVec3],
    velocities: &[NVec3],
    range: Range<usize>,
    out: &mut [NVec3],
) {
    debug_assert_eq!(out.len(), range.len());

    // G * dt is the same for every pair
    let kick = params.gravitational_constant * params.time_step;
    let max_sq = params.max_velocity.map(|v| v * v);

    for (i, slot) in range.zip(out.iter_mut()) {
        let xi = positions[i];
        let mut v = velocities[i];

        for (j, xj) in positions.iter().enumerate() {
            if i == j {
                continue;
            }

            // Displacement from i to j; i is pulled along +r
            let r = xj - xi;
            let r2 = r.norm_squared();

            // |dv| = G * dt / |r|^2, direction r / |r|
            let accel_scale = kick / r2;
            v += r * (accel_scale / r2.sqrt());
        }

        if let Some(max_sq) = max_sq {
            if v.norm_squared() >= max_sq {
                v = v.normalize() * max_sq.sqrt();
            }
        }

        *slot = v;
    }
}

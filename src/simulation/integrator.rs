//! Fixed-step position integrator
//!
//! Positions advance with the velocities from the start of the tick, while
//! velocities advance with forces from the start-of-tick positions. Both land
//! in the next buffers and only become visible after the buffer swap.

use super::params::Parameters;
use super::states::NVec3;

/// x_n+1 = x_n + dt * v_n, for the whole population.
///
/// Reads only the previous state, so it can run while workers evaluate forces.
pub fn update_positions(
    params: &Parameters,
    positions: &[NVec3],
    velocities: &[NVec3],
    out: &mut [NVec3],
) {
    let dt = params.time_step;
    for ((next, x), v) in out.iter_mut().zip(positions).zip(velocities) {
        *next = x + v * dt;
    }
}

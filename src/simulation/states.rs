//! Core state types for the N-body simulation.
//!
//! Defines the component type and the four double-buffered state arrays:
//! - `Real`  the floating-point component, `f64` unless the `f32` feature is on
//! - `NVec3` a 3-component vector of `Real`
//! - `StateBuffers` previous/next positions and velocities
//!
//! The "previous" pair is held behind an `Arc` so the worker pool can read it
//! while the coordinator writes the "next" pair.

use std::sync::Arc;

use nalgebra::Vector3;

use super::error::{Result, SimulationError};

#[cfg(not(feature = "f32"))]
pub type Real = f64;
#[cfg(feature = "f32")]
pub type Real = f32;

pub type NVec3 = Vector3<Real>;

/// Previous/next positions and velocities, all of the same fixed length.
///
/// `*_prev` is fully valid for the whole tick and is only ever read.
/// `*_next` is scratch during a tick and becomes `*_prev` on [`commit`].
///
/// [`commit`]: StateBuffers::commit
#[derive(Debug)]
pub struct StateBuffers {
    positions_prev: Arc<Vec<NVec3>>,
    velocities_prev: Arc<Vec<NVec3>>,
    positions_next: Vec<NVec3>,
    velocities_next: Vec<NVec3>,
}

impl StateBuffers {
    /// Take ownership of an initial state. Both vectors must have the same length.
    pub fn new(positions: Vec<NVec3>, velocities: Vec<NVec3>) -> Result<Self> {
        if positions.len() != velocities.len() {
            return Err(SimulationError::StateMismatch {
                positions: positions.len(),
                velocities: velocities.len(),
            });
        }

        let n = positions.len();
        Ok(Self {
            positions_prev: Arc::new(positions),
            velocities_prev: Arc::new(velocities),
            positions_next: vec![NVec3::zeros(); n],
            velocities_next: vec![NVec3::zeros(); n],
        })
    }

    pub fn len(&self) -> usize {
        self.positions_prev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions_prev.is_empty()
    }

    pub fn positions(&self) -> &[NVec3] {
        &self.positions_prev
    }

    pub fn velocities(&self) -> &[NVec3] {
        &self.velocities_prev
    }

    /// Shared handles on the previous positions and velocities, for dispatch.
    pub(crate) fn snapshot(&self) -> (Arc<Vec<NVec3>>, Arc<Vec<NVec3>>) {
        (Arc::clone(&self.positions_prev), Arc::clone(&self.velocities_prev))
    }

    pub(crate) fn velocities_next_mut(&mut self) -> &mut [NVec3] {
        &mut self.velocities_next
    }

    /// Read-only previous state together with the writable next velocities.
    pub(crate) fn split_for_velocities(&mut self) -> (&[NVec3], &[NVec3], &mut [NVec3]) {
        (&self.positions_prev, &self.velocities_prev, &mut self.velocities_next)
    }

    /// Read-only previous state together with the writable next positions.
    pub(crate) fn split_for_positions(&mut self) -> (&[NVec3], &[NVec3], &mut [NVec3]) {
        (&self.positions_prev, &self.velocities_prev, &mut self.positions_next)
    }

    /// Swap the roles of previous and next. No element is copied.
    ///
    /// Fails if a snapshot handed out by [`snapshot`](Self::snapshot) is still alive,
    /// which means a worker has not finished with the tick.
    pub(crate) fn commit(&mut self) -> Result<()> {
        let (Some(positions), Some(velocities)) = (
            Arc::get_mut(&mut self.positions_prev),
            Arc::get_mut(&mut self.velocities_prev),
        ) else {
            return Err(SimulationError::SnapshotShared);
        };
        std::mem::swap(positions, &mut self.positions_next);
        std::mem::swap(velocities, &mut self.velocities_next);
        Ok(())
    }
}

//! The coordinator: owns the state buffers and the worker pool, and drives
//! one fork-join tick at a time.
//!
//! A tick is
//! 1. release `begin` to every worker,
//! 2. integrate positions for the whole population,
//! 3. evaluate forces for the residual range,
//! 4. await `complete` from every worker, in order,
//! 5. swap previous/next buffer roles.
//!
//! The individual steps are public so a caller can sequence them itself; each
//! one checks that it is legal at that point of the tick.

use std::ops::Range;
use std::time::Instant;

use log::{info, trace};

use super::error::{Result, SimulationError};
use super::forces;
use super::integrator;
use super::params::Parameters;
use super::partition::Partition;
use super::states::{NVec3, Real, StateBuffers};
use super::worker::WorkerPool;

pub struct Simulation {
    parameters: Parameters,
    partition: Partition,
    state: StateBuffers,
    pool: WorkerPool,
    progress: TickProgress,
    ticks: u64,
}

/// What has been written into the next buffers since the last commit
#[derive(Debug)]
struct TickProgress {
    integrated: bool,
    evaluated: Vec<bool>,
}

impl TickProgress {
    fn new(population: usize) -> Self {
        Self {
            integrated: false,
            evaluated: vec![false; population],
        }
    }

    fn mark(&mut self, range: Range<usize>) {
        self.evaluated[range].fill(true);
    }

    /// Why the tick cannot be committed yet, if anything is left
    fn missing(&self) -> Option<String> {
        if !self.integrated {
            return Some("positions were not integrated".to_string());
        }
        let first = self.evaluated.iter().position(|done| !done)?;
        let last = self.evaluated.iter().rposition(|done| !done).unwrap_or(first);
        Some(format!("velocities of stars {first}..={last} were not evaluated"))
    }

    fn reset(&mut self) {
        self.integrated = false;
        self.evaluated.fill(false);
    }
}

impl Simulation {
    /// Build a simulation from an initial state and spawn its `workers` threads.
    pub fn new(
        parameters: Parameters,
        workers: usize,
        positions: Vec<NVec3>,
        velocities: Vec<NVec3>,
    ) -> Result<Self> {
        let state = StateBuffers::new(positions, velocities)?;
        let partition = Partition::new(state.len(), workers);
        let pool = WorkerPool::spawn(&partition, parameters)?;
        let progress = TickProgress::new(state.len());

        info!(
            "simulation ready: {} stars, {} workers x {} stars, residual {:?}",
            partition.population(),
            partition.workers(),
            partition.chunk_size(),
            partition.residual(),
        );

        Ok(Self {
            parameters,
            partition,
            state,
            pool,
            progress,
            ticks: 0,
        })
    }

    /// Current positions, valid until the next [`step`](Self::step).
    pub fn vertices(&self) -> &[NVec3] {
        self.state.positions()
    }

    /// Current positions as a flat `x, y, z, x, y, z, ...` slice.
    pub fn vertex_data(&self) -> &[Real] {
        bytemuck::cast_slice(self.state.positions())
    }

    /// Current velocities, valid until the next [`step`](Self::step).
    pub fn velocities(&self) -> &[NVec3] {
        self.state.velocities()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn population(&self) -> usize {
        self.partition.population()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.len()
    }

    /// Ticks committed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Release every worker on the current previous state. Does not block.
    pub fn release_workers(&mut self) -> Result<()> {
        self.pool.release_all(&self.state)
    }

    /// Advance every position into the next buffer using pre-tick velocities.
    pub fn update_positions(&mut self) {
        let (positions, velocities, out) = self.state.split_for_positions();
        integrator::update_positions(&self.parameters, positions, velocities, out);
        self.progress.integrated = true;
    }

    /// Evaluate forces for `range` into the next velocity buffer.
    ///
    /// While workers are released, `range` must stay clear of their chunks.
    pub fn update_velocities_chunk(&mut self, range: Range<usize>) -> Result<()> {
        let population = self.population();
        if range.start > range.end || range.end > population {
            return Err(SimulationError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                population,
            });
        }
        if let Some(worker) = self.pool.running_owner_of(&range) {
            return Err(SimulationError::RangeOwnedByWorker {
                start: range.start,
                end: range.end,
                worker,
            });
        }

        let (positions, velocities, next) = self.state.split_for_velocities();
        let out = &mut next[range.clone()];
        let params = &self.parameters;
        forces::update_velocities_chunk(params, positions, velocities, range.clone(), out);
        self.progress.mark(range);
        Ok(())
    }

    /// Block until every released worker has completed this tick.
    pub fn await_workers(&mut self) -> Result<()> {
        self.pool.await_all(self.state.velocities_next_mut())?;
        self.progress.mark(0..self.partition.residual().start);
        Ok(())
    }

    /// Commit the tick by swapping previous/next roles.
    ///
    /// Refused until positions are integrated and every velocity has been
    /// written this tick, by an awaited worker or by the coordinator.
    pub fn step(&mut self) -> Result<()> {
        if self.pool.in_flight() {
            return Err(SimulationError::TickInFlight);
        }
        if let Some(missing) = self.progress.missing() {
            return Err(SimulationError::IncompleteTick { missing });
        }
        self.state.commit()?;
        self.progress.reset();
        self.ticks += 1;
        Ok(())
    }

    /// One full tick: release, integrate, residual, await, step.
    pub fn tick(&mut self) -> Result<()> {
        let start = Instant::now();

        self.release_workers()?;
        self.update_positions();
        let residual = self.partition.residual();
        let local = self.update_velocities_chunk(residual);
        // always rendezvous, even if the local part failed
        let awaited = self.await_workers();
        local?;
        awaited?;
        self.step()?;

        trace!("tick {} took {:?}", self.ticks, start.elapsed());
        Ok(())
    }

    /// Run `count` ticks back to back.
    pub fn run(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.tick()?;
        }
        Ok(())
    }

    /// Stop and join every worker. Later releases fail with `Terminated`.
    pub fn shutdown(&mut self) -> Result<()> {
        self.pool.shutdown()
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.is_terminated()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("parameters", &self.parameters)
            .field("partition", &self.partition)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

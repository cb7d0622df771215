//! Long-lived worker threads and their begin/complete signalling
//!
//! Each [`Worker`] owns one thread bound to a fixed chunk of the population.
//! A tick is a two-phase rendezvous with the coordinator:
//!
//! 1. `begin`: the coordinator sends a [`Dispatch`] holding shared handles on
//!    the previous state and the worker's own result block.
//! 2. `complete`: the worker evaluates its chunk into that block, drops the
//!    shared handles and sends the block back.
//!
//! Both signals are `bounded(1)` channels, so at most one release is ever
//! pending. Workers never talk to each other.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, error, trace};

use super::error::{Result, SimulationError};
use super::forces::update_velocities_chunk;
use super::params::Parameters;
use super::partition::Partition;
use super::states::{NVec3, StateBuffers};

/// Work handed to a worker on `begin`
pub(crate) struct Dispatch {
    positions: Arc<Vec<NVec3>>,
    velocities: Arc<Vec<NVec3>>,
    block: Vec<NVec3>, // exclusive output for this worker's chunk
}

/// Coordinator-side handle of one worker thread
pub struct Worker {
    index: usize,
    range: Range<usize>,
    begin: Sender<Option<Dispatch>>,
    complete: Receiver<Vec<NVec3>>,
    alive: Arc<AtomicBool>,
    // Some while idle, None while the block is out with the thread
    block: Option<Vec<NVec3>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a worker permanently bound to `range`.
    pub fn spawn(index: usize, range: Range<usize>, params: Parameters) -> Result<Self> {
        let (begin_tx, begin_rx) = bounded::<Option<Dispatch>>(1);
        let (complete_tx, complete_rx) = bounded::<Vec<NVec3>>(1);
        let alive = Arc::new(AtomicBool::new(true));

        let thread_range = range.clone();
        let thread_alive = Arc::clone(&alive);
        let handle = thread::Builder::new()
            .name(format!("star-worker-{index}"))
            .spawn(move || run(index, thread_range, params, thread_alive, begin_rx, complete_tx))
            .map_err(|source| SimulationError::Spawn { worker: index, source })?;

        debug!("worker {index} spawned for {range:?}");

        Ok(Self {
            index,
            block: Some(vec![NVec3::zeros(); range.len()]),
            range,
            begin: begin_tx,
            complete: complete_rx,
            alive,
            handle: Some(handle),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Released and not yet awaited
    pub fn is_running(&self) -> bool {
        self.block.is_none()
    }

    /// Raise `begin` without waiting for the worker to start.
    fn release(&mut self, positions: Arc<Vec<NVec3>>, velocities: Arc<Vec<NVec3>>) -> Result<()> {
        let worker = self.index;
        if self.handle.is_none() {
            return Err(SimulationError::Terminated);
        }
        let block = self.block.take().ok_or(SimulationError::SignalOverrun { worker })?;

        match self.begin.try_send(Some(Dispatch { positions, velocities, block })) {
            Ok(()) => Ok(()),
            Err(err) => {
                let full = matches!(err, TrySendError::Full(_));
                // take the block back so the worker stays usable for reporting
                if let Some(Dispatch { block, .. }) = err.into_inner() {
                    self.block = Some(block);
                }
                if full {
                    Err(SimulationError::SignalOverrun { worker })
                } else {
                    Err(SimulationError::WorkerLost { worker })
                }
            }
        }
    }

    /// Block on `complete` and copy the finished chunk into `velocities_next`.
    fn await_completion(&mut self, velocities_next: &mut [NVec3]) -> Result<()> {
        let worker = self.index;
        if !self.is_running() {
            return Err(SimulationError::SignalUnderrun { worker });
        }
        let block = self
            .complete
            .recv()
            .map_err(|_| SimulationError::WorkerLost { worker })?;
        velocities_next[self.range.clone()].copy_from_slice(&block);
        self.block = Some(block);
        Ok(())
    }

    /// Flip the liveness flag, send the final `begin` and join the thread.
    fn terminate(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let worker = self.index;

        // The store happens-before the send that wakes the worker
        self.alive.store(false, Ordering::Release);
        // A disconnected channel means the thread is already gone
        let _ = self.begin.send(None);

        handle.join().map_err(|_| SimulationError::WorkerPanicked { worker })?;
        debug!("worker {worker} joined");
        Ok(())
    }

    /// End the thread behind the coordinator's back, leaving the handle in place.
    #[cfg(test)]
    fn stop_thread(&mut self) {
        let _ = self.begin.send(None);
        if let Some(handle) = &self.handle {
            while !handle.is_finished() {
                thread::yield_now();
            }
        }
    }
}

/// Thread body: Idle -> Running -> Idle until the liveness flag drops.
fn run(
    index: usize,
    range: Range<usize>,
    params: Parameters,
    alive: Arc<AtomicBool>,
    begin: Receiver<Option<Dispatch>>,
    complete: Sender<Vec<NVec3>>,
) {
    // Idle: waiting for begin
    while let Ok(signal) = begin.recv() {
        if !alive.load(Ordering::Acquire) {
            break;
        }
        let Some(Dispatch { positions, velocities, mut block }) = signal else {
            break;
        };

        // Running
        update_velocities_chunk(&params, &positions, &velocities, range.clone(), &mut block);
        drop(positions);
        drop(velocities);

        if complete.send(block).is_err() {
            break;
        }
        trace!("worker {index} completed {range:?}");
    }
    // Terminated
    debug!("worker {index} exiting");
}

/// Fixed pool of workers covering every chunk of a [`Partition`]
/// except the coordinator's residual.
pub struct WorkerPool {
    partition: Partition,
    workers: Vec<Worker>,
    terminated: bool,
}

impl WorkerPool {
    /// Spawn one worker per partition chunk. On failure the workers already
    /// spawned are shut down before the error is returned.
    pub fn spawn(partition: &Partition, params: Parameters) -> Result<Self> {
        let mut pool = Self {
            partition: *partition,
            workers: Vec::with_capacity(partition.workers()),
            terminated: false,
        };
        for index in 0..partition.workers() {
            let worker = Worker::spawn(index, partition.worker_range(index), params)?;
            pool.workers.push(worker);
        }
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Any worker released and not yet awaited
    pub fn in_flight(&self) -> bool {
        self.workers.iter().any(Worker::is_running)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Running worker whose chunk overlaps `range`
    pub fn running_owner_of(&self, range: &Range<usize>) -> Option<usize> {
        self.partition
            .owners(range)
            .find(|&index| self.workers.get(index).is_some_and(Worker::is_running))
    }

    /// Release `begin` to every worker. Nothing is sent unless all are idle.
    pub fn release_all(&mut self, state: &StateBuffers) -> Result<()> {
        if self.terminated {
            return Err(SimulationError::Terminated);
        }
        if let Some(worker) = self.workers.iter().find(|w| w.is_running()) {
            return Err(SimulationError::SignalOverrun { worker: worker.index });
        }
        for worker in &mut self.workers {
            let (positions, velocities) = state.snapshot();
            worker.release(positions, velocities)?;
        }
        Ok(())
    }

    /// Wait for `complete` from every worker, in worker order.
    ///
    /// Keeps waiting on the remaining workers after a failure so no thread is
    /// left holding the previous state; the first error is returned.
    pub fn await_all(&mut self, velocities_next: &mut [NVec3]) -> Result<()> {
        let mut first_err = None;
        for worker in &mut self.workers {
            if let Err(err) = worker.await_completion(velocities_next) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Stop and join every worker thread. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        let mut first_err = None;
        for worker in &mut self.workers {
            if let Err(err) = worker.terminate() {
                first_err.get_or_insert(err);
            }
        }
        self.terminated = true;
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
impl WorkerPool {
    pub(crate) fn stop_thread(&mut self, index: usize) {
        self.workers[index].stop_thread();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!("worker pool shutdown failed: {err}");
        }
    }
}

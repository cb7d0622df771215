use std::time::Instant;

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::simulation::coordinator::Simulation;
use crate::simulation::error::Result;
use crate::simulation::initializer::random_state;
use crate::simulation::params::Parameters;

const SEED: u64 = 23;

/// Helper to build a randomized simulation of size `n` with `workers` threads
fn make_simulation(n: usize, workers: usize) -> Result<Simulation> {
    let mut rng = Pcg64Mcg::seed_from_u64(SEED);
    let (positions, velocities) = random_state(&mut rng, n, 2.0, 5.0);
    let parameters = Parameters::new(0.01, 0.02);
    Simulation::new(parameters, workers, positions, velocities)
}

/// Milliseconds per tick for every population / worker-count pair
/// Paste output directly into excel to graph
pub fn bench_ticks() -> Result<()> {
    let ns = [256, 512, 1024, 2048];
    let worker_counts = [0, 1, 2, 4, 8];

    println!("population,workers,ms_per_tick");

    for n in ns {
        // Small n: average over more ticks to smooth noise
        let ticks = if n <= 512 { 20 } else { 5 };

        for workers in worker_counts {
            let mut sim = make_simulation(n, workers)?;

            // Warm-up one tick
            sim.tick()?;

            let t0 = Instant::now();
            sim.run(ticks)?;
            let ms = t0.elapsed().as_secs_f64() * 1000.0 / ticks as f64;

            println!("{},{},{:.6}", n, workers, ms);
            sim.shutdown()?;
        }
    }
    Ok(())
}

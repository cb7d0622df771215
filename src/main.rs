use starsim::{bench_ticks, init_logging, PeriodicLogger, Scenario, ScenarioConfig, Simulation};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, Level, LevelFilter};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Gravitational N-body simulation on a fixed worker pool")]
struct Args {
    /// Scenario file, as a path or a name under `scenarios/`
    #[arg(short, default_value = "galaxy.yaml")]
    file_name: String,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 500)]
    ticks: u64,

    /// Override the worker count of the scenario
    #[arg(long)]
    workers: Option<usize>,

    /// Override the random seed of the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Override the population of the scenario
    #[arg(long)]
    population: Option<usize>,

    /// Print the tick-time benchmark as CSV and exit
    #[arg(long)]
    bench: bool,

    /// More logging, repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let given = PathBuf::from(file_name);
    if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    }
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<Scenario> {
    let path = scenario_path(&args.file_name);
    let mut cfg = ScenarioConfig::from_path(&path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;

    if args.workers.is_some() {
        cfg.engine.workers = args.workers;
    }
    if args.seed.is_some() {
        cfg.engine.seed = args.seed;
    }
    if let Some(population) = args.population {
        cfg.parameters.population = population;
    }

    Scenario::build_scenario(cfg).context("invalid scenario")
}

fn run_headless(mut simulation: Simulation, ticks: u64) -> Result<()> {
    let mut periodic = PeriodicLogger::new(&format!("simulating {ticks} ticks"), Level::Info);
    let start = Instant::now();
    for tick in 0..ticks {
        simulation.tick()?;
        periodic.log(format!("{} / {}", tick + 1, ticks));
    }
    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "{} ticks in {:.3} s ({:.1} ticks/s)",
        ticks,
        elapsed,
        ticks as f64 / elapsed.max(f64::EPSILON)
    );
    simulation.shutdown()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    init_logging(level)?;

    if args.bench {
        bench_ticks()?;
        return Ok(());
    }

    let simulation = load_scenario(&args)?.into_simulation()?;

    #[cfg(feature = "viewer")]
    if !args.headless {
        starsim::run_viewer(simulation);
        return Ok(());
    }

    run_headless(simulation, args.ticks)
}

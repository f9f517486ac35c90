//! Boss encounter simulator.
//!
//! Loads a boss (built-in or from a data directory) and a scripted scenario,
//! runs the encounter at a fixed tick rate and prints a summary.
//!
//! ```bash
//! boss-sim --scenario crates/sim/scenarios/pillars.ron --duration 90
//! RUST_LOG=boss_core=debug boss-sim --boss-dir ./my_boss --seed 7
//! ```

use std::path::PathBuf;

use anyhow::Result;
use boss_content::{BossLoader, load_builtin};
use boss_sim::{Scenario, Simulation};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "boss-sim")]
#[command(about = "Run a scripted boss encounter headlessly", long_about = None)]
#[command(version)]
struct Args {
    /// Scenario RON file (defaults to the built-in duel)
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Boss data directory with abilities.ron, phases.ron and config.toml
    #[arg(short = 'd', long, value_name = "DIR")]
    boss_dir: Option<PathBuf>,

    /// Built-in boss to use when no directory is given
    #[arg(short, long, default_value = "warden")]
    boss: String,

    /// Simulated seconds
    #[arg(long, default_value_t = 120.0)]
    duration: f32,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Overrides the boss's RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();

    if !(args.dt.is_finite() && args.dt > 0.0) {
        anyhow::bail!("--dt must be positive, got {}", args.dt);
    }

    let mut definition = match &args.boss_dir {
        Some(dir) => BossLoader::load_dir(dir)?,
        None => load_builtin(&args.boss)?,
    };
    if let Some(seed) = args.seed {
        definition.config.seed = seed;
    }

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::duel()?,
    };

    let mut simulation = Simulation::new(definition, scenario)?;
    let summary = simulation.run(args.duration, args.dt);
    println!("{summary}");

    Ok(())
}

/// Logs to stderr, `info` unless `RUST_LOG` says otherwise.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

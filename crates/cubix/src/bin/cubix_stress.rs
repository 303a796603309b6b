//! # cubix-stress
//!
//! Hammers one cube from a worker pool with random same-axis turns and
//! shows, undoes every turn, and checks the cube came back solved.
//!
//! ```text
//! cubix-stress --config config/stress.toml --threads 16 --seed 7
//! RUST_LOG=cubix_sync=trace cubix-stress --size 4 --rotations 10
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cubix::{stress, CubeResult, StressConfig, StressReport};

/// Concurrent round-trip stress test for the CUBIX cube
#[derive(Parser, Debug)]
#[command(name = "cubix-stress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with a stress configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Random turns in the forward pass
    #[arg(long)]
    rotations: Option<usize>,

    /// Shows interleaved with the forward pass
    #[arg(long)]
    shows: Option<usize>,

    /// Seed for the turn plan
    #[arg(long)]
    seed: Option<u64>,

    /// Axis to turn around (0, 1 or 2)
    #[arg(long)]
    axis: Option<usize>,

    /// Cube size N
    #[arg(long)]
    size: Option<usize>,
}

impl Cli {
    fn stress_config(&self) -> CubeResult<StressConfig> {
        let mut config = match &self.config {
            Some(path) => StressConfig::from_file(path)?,
            None => StressConfig::default(),
        };
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(rotations) = self.rotations {
            config.rotations = rotations;
        }
        if let Some(shows) = self.shows {
            config.shows = shows;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(axis) = self.axis {
            config.axis = axis;
        }
        if let Some(size) = self.size {
            config.cube.size = size;
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_report(report: &StressReport) {
    let stats = report.admission.stats;
    println!("=== CUBIX Stress Run ===");
    println!("Rotations:  {}", report.rotations);
    println!("Shows:      {}", report.shows);
    println!("Hook calls: {} (expected {})", report.hook_calls, report.expected_hook_calls);
    println!("Elapsed:    {:?}", report.elapsed);
    println!(
        "Admission:  {} immediate, {} waited, {} hand-offs",
        stats.immediate, stats.waited, stats.hand_offs
    );
    println!("Solved:     {}", if report.solved { "yes" } else { "NO" });
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = cli.stress_config().and_then(|config| stress::run(&config));
    match result {
        Ok(report) => {
            print_report(&report);
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            tracing::error!(%err, "stress run aborted");
            ExitCode::from(2)
        }
    }
}

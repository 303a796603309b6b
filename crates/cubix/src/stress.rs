//! # Stress Run
//!
//! Concurrent round trip over one cube:
//!
//! ```text
//!   seed ─► ChaCha8Rng ─► plan: r random turns around one axis
//!                               │
//!            ┌──────────────────┴─────────────────────┐
//!            │ job queue (crossbeam-channel)           │
//!            │  turn₀ show turn₁ show … turnᵣ₋₁ show   │
//!            │  inverse(turnᵣ₋₁) … inverse(turn₀)      │
//!            └──────┬─────────┬─────────┬──────────────┘
//!                worker    worker    worker  ...
//!                   └────── shared Cube ─────┘
//!                                │
//!                       final show == solved ?
//! ```
//!
//! All turns share one axis, so they commute and any interleaving the
//! workers produce must end back at the solved state.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use cubix_core::{Axis, Face, FaceletGrid, AXIS_COUNT};
use cubix_sync::AdmissionSnapshot;

use crate::config::{parse_toml, read_file, CubeConfig};
use crate::cube::Cube;
use crate::error::{CubeError, CubeResult};
use crate::hooks::CubeHooks;

/// Settings for a stress run.
///
/// ```toml
/// threads = 8
/// rotations = 100
/// shows = 100
/// seed = 42
/// axis = 0
///
/// [cube]
/// size = 40
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StressConfig {
    /// Worker threads.
    pub threads: usize,
    /// Random turns in the forward pass (the inverse pass adds as many).
    pub rotations: usize,
    /// `show` calls interleaved with the forward pass.
    pub shows: usize,
    /// Seed for the turn plan.
    pub seed: u64,
    /// Axis every turn is drawn from (`0..3`).
    pub axis: usize,
    /// The cube under test.
    pub cube: CubeConfig,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            rotations: 100,
            shows: 100,
            seed: 0x5EED,
            axis: 0,
            cube: CubeConfig {
                size: 40,
                ..CubeConfig::default()
            },
        }
    }
}

impl StressConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Config`] on malformed TOML or out-of-range
    /// values, and [`CubeError::InvalidSize`] on an unsupported cube size.
    pub fn from_toml_str(text: &str) -> CubeResult<Self> {
        let config: Self = parse_toml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// As [`from_toml_str`](Self::from_toml_str), plus [`CubeError::Config`]
    /// if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> CubeResult<Self> {
        Self::from_toml_str(&read_file(path.as_ref())?)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// See [`from_toml_str`](Self::from_toml_str).
    pub fn validate(&self) -> CubeResult<()> {
        if self.threads == 0 {
            return Err(CubeError::Config("threads must be greater than zero".into()));
        }
        if self.axis >= AXIS_COUNT {
            return Err(CubeError::Config(format!(
                "axis {} out of range: expected 0..{AXIS_COUNT}",
                self.axis
            )));
        }
        self.cube.validate()
    }
}

/// Outcome of [`run`].
#[derive(Clone, Debug)]
pub struct StressReport {
    /// Turns applied, forward and inverse.
    pub rotations: u64,
    /// `show` calls completed by workers.
    pub shows: u64,
    /// Intermediate `show` results with the wrong length.
    pub malformed_shows: u64,
    /// Hook invocations observed.
    pub hook_calls: u64,
    /// Hook invocations expected: two per rotation and per show.
    pub expected_hook_calls: u64,
    /// Whether the final grid equals a freshly solved one.
    pub solved: bool,
    /// Wall time of the concurrent phase.
    pub elapsed: Duration,
    /// Controller counters after the run.
    pub admission: AdmissionSnapshot,
}

impl StressReport {
    /// Whether every check passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.solved && self.malformed_shows == 0 && self.hook_calls == self.expected_hook_calls
    }
}

#[derive(Clone, Copy, Debug)]
enum Job {
    Rotate { face: Face, layer: usize },
    Show,
}

#[derive(Debug, Default)]
struct CountingHooks {
    calls: Arc<AtomicU64>,
}

impl CountingHooks {
    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl CubeHooks for CountingHooks {
    fn before_rotation(&self, _face: usize, _layer: usize) {
        self.bump();
    }

    fn after_rotation(&self, _face: usize, _layer: usize) {
        self.bump();
    }

    fn before_showing(&self) {
        self.bump();
    }

    fn after_showing(&self) {
        self.bump();
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    rotations: u64,
    shows: u64,
    malformed_shows: u64,
}

/// Draws `count` turns around `axis`, each from either of its two faces.
fn plan_turns(rng: &mut ChaCha8Rng, axis: Axis, size: usize, count: usize) -> Vec<(Face, usize)> {
    let faces = [axis.origin(), axis.origin().opposite()];
    (0..count)
        .map(|_| (faces[rng.gen_range(0..2)], rng.gen_range(0..size)))
        .collect()
}

fn worker(cube: &Cube, jobs: &Receiver<Job>) -> CubeResult<WorkerTally> {
    let expected_len = FaceletGrid::solved_serialization(cube.size()).len();
    let mut tally = WorkerTally::default();
    for job in jobs {
        match job {
            Job::Rotate { face, layer } => {
                cube.rotate(face.index(), layer)?;
                tally.rotations += 1;
            }
            Job::Show => {
                let state = cube.show()?;
                if state.len() != expected_len {
                    tally.malformed_shows += 1;
                }
                tally.shows += 1;
            }
        }
    }
    Ok(tally)
}

fn dispatch(jobs: &Sender<Job>, job: Job) -> CubeResult<()> {
    jobs.send(job)
        .map_err(|_| CubeError::Config("all stress workers exited early".into()))
}

/// Runs the round trip described in the module docs.
///
/// # Errors
///
/// Returns a configuration error, or the first error any worker hit.
///
/// # Panics
///
/// Re-raises a panic from a worker thread.
pub fn run(config: &StressConfig) -> CubeResult<StressReport> {
    config.validate()?;

    let hooks = CountingHooks::default();
    let calls = Arc::clone(&hooks.calls);
    let cube = Arc::new(Cube::from_config(&config.cube, hooks)?);
    let size = cube.size();

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let turns = plan_turns(&mut rng, Axis::ALL[config.axis], size, config.rotations);

    tracing::info!(
        threads = config.threads,
        rotations = config.rotations,
        shows = config.shows,
        size,
        seed = config.seed,
        "starting stress run"
    );

    let start = Instant::now();
    let (tx, rx) = crossbeam_channel::unbounded();
    let workers: Vec<_> = (0..config.threads)
        .map(|_| {
            let cube = Arc::clone(&cube);
            let rx = rx.clone();
            thread::spawn(move || worker(&cube, &rx))
        })
        .collect();
    drop(rx);

    let mut shows_left = config.shows;
    for &(face, layer) in &turns {
        dispatch(&tx, Job::Rotate { face, layer })?;
        if shows_left > 0 {
            dispatch(&tx, Job::Show)?;
            shows_left -= 1;
        }
    }
    for _ in 0..shows_left {
        dispatch(&tx, Job::Show)?;
    }
    for &(face, layer) in turns.iter().rev() {
        dispatch(
            &tx,
            Job::Rotate {
                face: face.opposite(),
                layer: size - 1 - layer,
            },
        )?;
    }
    drop(tx);

    let mut total = WorkerTally::default();
    let mut first_error = None;
    for handle in workers {
        match handle.join() {
            Ok(Ok(tally)) => {
                total.rotations += tally.rotations;
                total.shows += tally.shows;
                total.malformed_shows += tally.malformed_shows;
            }
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    let elapsed = start.elapsed();

    let expected_hook_calls = 2 * (total.rotations + total.shows);
    let hook_calls = calls.load(Ordering::Relaxed);
    let solved = cube.show()? == FaceletGrid::solved_serialization(size);

    let report = StressReport {
        rotations: total.rotations,
        shows: total.shows,
        malformed_shows: total.malformed_shows,
        hook_calls,
        expected_hook_calls,
        solved,
        elapsed,
        admission: cube.admission_snapshot(),
    };
    if report.is_success() {
        tracing::info!(?elapsed, "stress run passed");
    } else {
        tracing::warn!(?report, "stress run failed");
    }
    Ok(report)
}

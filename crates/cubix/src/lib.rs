//! # CUBIX
//!
//! A thread-safe `N × N × N` rotating cube.
//!
//! ## Operations
//!
//! - [`Cube::rotate`]: quarter-turn one slab, clockwise as seen from `face`
//! - [`Cube::show`]: serialize all `6 × N × N` facelets
//!
//! ## Concurrency
//!
//! ```text
//!              │ Axis0  Axis1  Axis2  Read
//!   ───────────┼──────────────────────────
//!   Axis0      │  (1)     ✗      ✗     ✗
//!   Axis1      │   ✗     (1)     ✗     ✗
//!   Axis2      │   ✗      ✗     (1)    ✗
//!   Read       │   ✗      ✗      ✗     ✓
//!
//!   (1) compatible only on different layers
//! ```
//!
//! Opposite faces share an axis: `rotate(0, l)` and `rotate(5, N-1-l)`
//! turn the same slab and are serialized. No waiter is bypassed forever.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use cubix::Cube;
//!
//! let cube = Arc::new(Cube::new(4)?);
//! let handles: Vec<_> = (0..4)
//!     .map(|layer| {
//!         let cube = Arc::clone(&cube);
//!         thread::spawn(move || cube.rotate(2, layer))
//!     })
//!     .collect();
//! for h in handles {
//!     h.join().unwrap()?;
//! }
//! assert_eq!(cube.show()?.len(), 6 * 4 * 4);
//! # Ok::<(), cubix::CubeError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod cube;
pub mod error;
pub mod hooks;
pub mod stress;

pub use config::CubeConfig;
pub use cube::Cube;
pub use error::{CubeError, CubeResult};
pub use hooks::{CubeHooks, FnHooks, NoopHooks};
pub use stress::{StressConfig, StressReport};

pub use cubix_core::{Axis, Face, MAX_CUBE_SIZE};
pub use cubix_sync::{AdmissionSnapshot, AdmissionStats, CancelToken};

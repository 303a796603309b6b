//! # CUBIX Sync
//!
//! Admission control for a cube shared by many threads.
//!
//! ## The Problem
//!
//! ```text
//! Thread 1:  rotate(0, 1)   ──┐
//! Thread 2:  rotate(5, 1)   ──┼──► one 6 × N × N grid
//! Thread 3:  rotate(1, 0)   ──┤
//! Thread 4:  show()         ──┘
//! ```
//!
//! Rotations around one axis touch disjoint slabs and may run together.
//! Rotations around different axes overlap at the edges and may not. A
//! `show` reads everything, so it excludes every rotation but not other
//! `show`s.
//!
//! ## The Solution
//!
//! Four classes (`Axis0`, `Axis1`, `Axis2`, `Read`), one coordination lock
//! for the counters, one condvar per queue, and a cyclic hand-off when a
//! class drains so no class is skipped forever.
//!
//! ## Rules
//!
//! 1. The coordination lock is never held across protected work
//! 2. Admission is proven by an [`Admission`] guard; dropping it releases
//! 3. Counter underflow is a bug and panics

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod cancel;
mod class;
mod controller;
mod error;
mod state;

pub use cancel::CancelToken;
pub use class::{AdmissionRequest, OperationClass, CLASS_COUNT};
pub use controller::{Admission, AdmissionController, DEFAULT_CANCEL_POLL};
pub use error::{AdmissionError, AdmissionResult};
pub use state::{AdmissionSnapshot, AdmissionStats};

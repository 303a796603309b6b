//! # CUBIX Core
//!
//! Cube state and geometry for an `N × N × N` rotating cube.
//!
//! This crate knows nothing about threads. It provides:
//!
//! 1. **Faces and axes** - the `(face, layer)` → [`SlabKey`] normalization
//!    the admission controller keys on
//! 2. **The facelet grid** - `6 × N × N` colors, solved at construction
//! 3. **The quarter-turn transform** - deterministic and allocation-light
//!
//! ## Example
//!
//! ```rust
//! use cubix_core::{Face, FaceletGrid};
//!
//! let grid = FaceletGrid::new(3)?;
//! grid.rotate(Face::Up, 0)?;
//! grid.rotate(Face::Down, 2)?; // the inverse turn
//! assert!(grid.is_solved());
//! # Ok::<(), cubix_core::GeometryError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod face;
pub mod grid;
pub mod rotation;

pub use error::{GeometryError, GeometryResult};
pub use face::{Axis, Face, SlabKey, AXIS_COUNT, FACE_COUNT};
pub use grid::{FaceletGrid, MAX_CUBE_SIZE};
pub use rotation::{slab_moves, FaceletMove};

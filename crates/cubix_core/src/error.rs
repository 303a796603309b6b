//! # Geometry Error Types
//!
//! All errors that can occur while addressing the cube grid.

use thiserror::Error;

/// Errors raised by the geometry layer.
///
/// Every variant is a precondition violation: it is reported before the
/// grid or any admission state is touched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// Face index outside `0..6`.
    #[error("invalid face {face}: expected 0..6")]
    InvalidFace {
        /// The rejected face index.
        face: usize,
    },

    /// Layer index outside `0..size`.
    #[error("invalid layer {layer} for cube of size {size}")]
    InvalidLayer {
        /// The rejected layer index.
        layer: usize,
        /// Size of the cube.
        size: usize,
    },

    /// Cube size outside `1..=MAX_CUBE_SIZE`.
    #[error("invalid cube size {size}: expected 1..={max}")]
    InvalidSize {
        /// The rejected size.
        size: usize,
        /// Largest supported size.
        max: usize,
    },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

//! # Cube Error Types
//!
//! All errors that can surface from the public cube API.

use thiserror::Error;

use cubix_core::GeometryError;
use cubix_sync::AdmissionError;

/// Errors returned by [`Cube`](crate::Cube) and the configuration loaders.
///
/// Argument errors are reported before any admission state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
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

    /// Cube size outside the supported range.
    #[error("invalid cube size {size}: expected 1..={max}")]
    InvalidSize {
        /// The rejected size.
        size: usize,
        /// Largest supported size.
        max: usize,
    },

    /// The caller's cancel token fired while waiting for admission.
    #[error("operation cancelled while waiting for admission")]
    Cancelled,

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<GeometryError> for CubeError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidFace { face } => Self::InvalidFace { face },
            GeometryError::InvalidLayer { layer, size } => Self::InvalidLayer { layer, size },
            GeometryError::InvalidSize { size, max } => Self::InvalidSize { size, max },
        }
    }
}

impl From<AdmissionError> for CubeError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<toml::de::Error> for CubeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for cube operations.
pub type CubeResult<T> = Result<T, CubeError>;

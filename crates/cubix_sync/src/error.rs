//! # Admission Error Types

use thiserror::Error;

/// Errors returned by a cancellable admission wait.
///
/// Invariant violations in the controller are not errors: they panic,
/// because mutual exclusion has already been lost by then.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    /// The caller's [`CancelToken`](crate::CancelToken) fired before
    /// admission. Controller counters are as if the caller never arrived.
    #[error("admission wait cancelled")]
    Cancelled,
}

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

//! # Operation Classes
//!
//! Every admission request belongs to one of four classes:
//!
//! ```text
//!   index   class      admitted alongside
//!   0       Axis0      Axis0 on other layers
//!   1       Axis1      Axis1 on other layers
//!   2       Axis2      Axis2 on other layers
//!   3       Read       Read
//! ```
//!
//! The index order is also the cyclic hand-off order.

use cubix_core::{Axis, SlabKey};

/// Number of operation classes.
pub const CLASS_COUNT: usize = 4;

const READ_INDEX: usize = 3;

/// Unit of cross-operation compatibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Rotations around one axis.
    Axis(Axis),
    /// `show` operations.
    Read,
}

impl OperationClass {
    /// All classes in hand-off order.
    pub const ALL: [Self; CLASS_COUNT] = [
        Self::Axis(Axis::UpDown),
        Self::Axis(Axis::LeftRight),
        Self::Axis(Axis::FrontBack),
        Self::Read,
    ];

    /// Returns the class index (`0..4`).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Axis(axis) => axis.index(),
            Self::Read => READ_INDEX,
        }
    }

    /// Returns the class `steps` positions later in hand-off order.
    #[must_use]
    pub const fn cycle(self, steps: usize) -> Self {
        Self::ALL[(self.index() + steps) % CLASS_COUNT]
    }
}

/// What a caller asks admission for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdmissionRequest {
    /// A `show`.
    Read,
    /// A rotation of one normalized slab.
    Rotate(SlabKey),
}

impl AdmissionRequest {
    /// Returns the request's class.
    #[inline]
    #[must_use]
    pub const fn class(self) -> OperationClass {
        match self {
            Self::Read => OperationClass::Read,
            Self::Rotate(key) => OperationClass::Axis(key.axis),
        }
    }

    /// Whether the two requests may never be active at the same time.
    #[must_use]
    pub fn conflicts_with(self, other: Self) -> bool {
        match (self, other) {
            (Self::Read, Self::Read) => false,
            (Self::Read, Self::Rotate(_)) | (Self::Rotate(_), Self::Read) => true,
            (Self::Rotate(a), Self::Rotate(b)) => a.axis != b.axis || a.layer == b.layer,
        }
    }
}

impl std::fmt::Display for AdmissionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Rotate(key) => write!(f, "rotate {key}"),
        }
    }
}

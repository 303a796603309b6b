//! # Faces, Axes and Slabs
//!
//! Face numbering follows the unfolded net:
//!
//! ```text
//!         ┌───┐
//!         │ 0 │
//!     ┌───┼───┼───┬───┐
//!     │ 1 │ 2 │ 3 │ 4 │
//!     └───┼───┼───┴───┘
//!         │ 5 │
//!         └───┘
//! ```
//!
//! Opposite faces share an [`Axis`]. A `(face, layer)` request is
//! normalized to a [`SlabKey`]: the lower-numbered face of each pair keeps
//! its layer, the other face is mirrored to `size - 1 - layer`. Two
//! requests touch the same facelets iff their slab keys are equal.

use crate::error::{GeometryError, GeometryResult};

/// Number of faces on the cube.
pub const FACE_COUNT: usize = 6;

/// Number of rotation axes.
pub const AXIS_COUNT: usize = 3;

/// One of the six cube faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Face {
    /// Face 0.
    Up = 0,
    /// Face 1.
    Left = 1,
    /// Face 2.
    Front = 2,
    /// Face 3.
    Right = 3,
    /// Face 4.
    Back = 4,
    /// Face 5.
    Down = 5,
}

impl Face {
    /// All faces in index order.
    pub const ALL: [Face; FACE_COUNT] = [
        Face::Up,
        Face::Left,
        Face::Front,
        Face::Right,
        Face::Back,
        Face::Down,
    ];

    /// Converts a raw face index.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidFace`] for indices outside `0..6`.
    pub fn from_index(index: usize) -> GeometryResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(GeometryError::InvalidFace { face: index })
    }

    /// Returns the raw face index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the face on the other side of the cube.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Front => Self::Back,
            Self::Right => Self::Left,
            Self::Back => Self::Front,
            Self::Down => Self::Up,
        }
    }

    /// Returns the axis this face turns around.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::UpDown,
            Self::Left | Self::Right => Axis::LeftRight,
            Self::Front | Self::Back => Axis::FrontBack,
        }
    }

    /// Whether this face counts layers from the axis origin.
    ///
    /// Layers requested through the other face of the pair are mirrored.
    #[inline]
    #[must_use]
    pub const fn is_axis_origin(self) -> bool {
        matches!(self, Self::Up | Self::Left | Self::Front)
    }

    /// Maps `(self, layer)` to the slab it turns.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidLayer`] if `layer >= size`.
    pub fn slab(self, layer: usize, size: usize) -> GeometryResult<SlabKey> {
        if layer >= size {
            return Err(GeometryError::InvalidLayer { layer, size });
        }
        let layer = if self.is_axis_origin() {
            layer
        } else {
            size - 1 - layer
        };
        Ok(SlabKey {
            axis: self.axis(),
            layer,
        })
    }
}

impl TryFrom<usize> for Face {
    type Error = GeometryError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

/// Rotation axis. Each axis spans two opposite faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Axis {
    /// Axis 0: faces 0 and 5.
    UpDown = 0,
    /// Axis 1: faces 1 and 3.
    LeftRight = 1,
    /// Axis 2: faces 2 and 4.
    FrontBack = 2,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::UpDown, Axis::LeftRight, Axis::FrontBack];

    /// Returns the raw axis index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The face whose layer numbering the axis adopts.
    #[must_use]
    pub const fn origin(self) -> Face {
        match self {
            Self::UpDown => Face::Up,
            Self::LeftRight => Face::Left,
            Self::FrontBack => Face::Front,
        }
    }
}

/// Normalized rotation target: an axis and a layer counted from the
/// axis origin face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlabKey {
    /// Axis of the slab.
    pub axis: Axis,
    /// Layer index counted from [`Axis::origin`].
    pub layer: usize,
}

impl SlabKey {
    /// Creates a slab key.
    #[inline]
    #[must_use]
    pub const fn new(axis: Axis, layer: usize) -> Self {
        Self { axis, layer }
    }
}

impl std::fmt::Display for SlabKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "axis{}/layer{}", self.axis.index(), self.layer)
    }
}

//! # Facelet Grid
//!
//! `6 × N × N` facelet colors, stored face-major then row-major.
//!
//! ## Thread Safety
//!
//! Facelets are `AtomicU8` so that rotations on disjoint slabs of the same
//! axis can write through `&self` at the same time. The grid itself does
//! not order anything: all loads and stores are `Relaxed`, and visibility
//! between conflicting operations comes from the admission lock the caller
//! held around them.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{GeometryError, GeometryResult};
use crate::face::{Face, FACE_COUNT};
use crate::rotation;

/// Largest supported cube size.
pub const MAX_CUBE_SIZE: usize = 1024;

/// The cube's facelets.
///
/// A fresh grid is solved: every facelet of face `f` has color `f`.
pub struct FaceletGrid {
    size: usize,
    facelets: Box<[AtomicU8]>,
}

impl FaceletGrid {
    /// Creates a solved grid.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidSize`] if `size` is zero or larger
    /// than [`MAX_CUBE_SIZE`].
    pub fn new(size: usize) -> GeometryResult<Self> {
        if size == 0 || size > MAX_CUBE_SIZE {
            return Err(GeometryError::InvalidSize {
                size,
                max: MAX_CUBE_SIZE,
            });
        }
        let per_face = size * size;
        let facelets = Face::ALL
            .iter()
            .flat_map(|face| (0..per_face).map(move |_| AtomicU8::new(*face as u8)))
            .collect();
        Ok(Self { size, facelets })
    }

    /// Returns the cube size `N`.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the total number of facelets, `6 × N × N`.
    #[inline]
    #[must_use]
    pub fn facelet_count(&self) -> usize {
        self.facelets.len()
    }

    /// Returns the flat index of a facelet.
    #[inline]
    pub(crate) fn index(&self, face: Face, row: usize, col: usize) -> usize {
        debug_assert!(row < self.size && col < self.size);
        (face.index() * self.size + row) * self.size + col
    }

    #[inline]
    pub(crate) fn load(&self, index: usize) -> u8 {
        self.facelets[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn store(&self, index: usize, color: u8) {
        self.facelets[index].store(color, Ordering::Relaxed);
    }

    /// Returns the color at `(face, row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below the cube size.
    #[must_use]
    pub fn color(&self, face: Face, row: usize, col: usize) -> u8 {
        assert!(
            row < self.size && col < self.size,
            "facelet ({row}, {col}) outside cube of size {}",
            self.size
        );
        self.load(self.index(face, row, col))
    }

    /// Turns the slab selected by `(face, layer)` a quarter turn clockwise
    /// as seen looking at `face`.
    ///
    /// The caller must hold exclusive admission for the slab.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidLayer`] if `layer >= size`.
    pub fn rotate(&self, face: Face, layer: usize) -> GeometryResult<()> {
        if layer >= self.size {
            return Err(GeometryError::InvalidLayer {
                layer,
                size: self.size,
            });
        }
        rotation::apply(self, face, layer);
        Ok(())
    }

    /// Returns all colors, face by face, row-major.
    #[must_use]
    pub fn colors(&self) -> Vec<u8> {
        self.facelets
            .iter()
            .map(|f| f.load(Ordering::Relaxed))
            .collect()
    }

    /// Serializes the grid as one decimal digit per facelet, face by face,
    /// row-major.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.facelets.len());
        for facelet in self.facelets.iter() {
            // Colors are always 0..6, a single digit.
            let _ = write!(out, "{}", facelet.load(Ordering::Relaxed));
        }
        out
    }

    /// Returns whether every face is a single color.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let per_face = self.size * self.size;
        self.facelets
            .chunks(per_face)
            .all(|face| {
                let first = face[0].load(Ordering::Relaxed);
                face.iter().all(|f| f.load(Ordering::Relaxed) == first)
            })
    }

    /// Returns the serialization of a solved grid of `size` without
    /// allocating the grid itself.
    #[must_use]
    pub fn solved_serialization(size: usize) -> String {
        let per_face = size * size;
        (0..FACE_COUNT)
            .flat_map(|face| std::iter::repeat(char::from(b'0' + face as u8)).take(per_face))
            .collect()
    }
}

impl std::fmt::Debug for FaceletGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceletGrid")
            .field("size", &self.size)
            .field("solved", &self.is_solved())
            .finish()
    }
}

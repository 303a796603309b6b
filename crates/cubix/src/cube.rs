//! # The Concurrent Cube
//!
//! [`Cube`] ties the pieces together:
//!
//! ```text
//!   rotate(face, layer)                         show()
//!        │ validate + normalize                    │
//!        ▼                                         ▼
//!   Rotate(axis, layer) ──► AdmissionController ◄── Read
//!                                 │ Admission guard
//!                                 ▼
//!                hooks + FaceletGrid (turn / serialize)
//! ```
//!
//! Validation happens before admission, so a bad argument never touches the
//! controller's counters.

use cubix_core::{Face, FaceletGrid};
use cubix_sync::{Admission, AdmissionController, AdmissionRequest, AdmissionSnapshot, CancelToken};

use crate::config::CubeConfig;
use crate::error::CubeResult;
use crate::hooks::{CubeHooks, FnHooks, NoopHooks};

/// A thread-safe `N × N × N` cube.
///
/// Share it between threads with `Arc<Cube>` or scoped threads. Rotations
/// around one axis on different layers run in parallel; everything else is
/// serialized as needed.
///
/// ## Usage
///
/// ```rust
/// use cubix::Cube;
///
/// let cube = Cube::new(2)?;
/// cube.rotate(0, 0)?;
/// assert_eq!(cube.show()?, "000022113322443311445555");
/// # Ok::<(), cubix::CubeError>(())
/// ```
pub struct Cube {
    grid: FaceletGrid,
    admission: AdmissionController,
    hooks: Box<dyn CubeHooks>,
}

impl Cube {
    /// Creates a solved cube of `size` layers per axis without hooks.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::InvalidSize`](crate::CubeError::InvalidSize)
    /// for a zero or unsupported size.
    pub fn new(size: usize) -> CubeResult<Self> {
        Self::with_hooks(size, NoopHooks)
    }

    /// Creates a solved cube that reports to `hooks`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_hooks(size: usize, hooks: impl CubeHooks + 'static) -> CubeResult<Self> {
        Self::from_config(
            &CubeConfig {
                size,
                ..CubeConfig::default()
            },
            hooks,
        )
    }

    /// Creates a solved cube with four callbacks, in firing order.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_callbacks<BR, AR, BS, AS>(
        size: usize,
        before_rotation: BR,
        after_rotation: AR,
        before_showing: BS,
        after_showing: AS,
    ) -> CubeResult<Self>
    where
        BR: Fn(usize, usize) + Send + Sync + 'static,
        AR: Fn(usize, usize) + Send + Sync + 'static,
        BS: Fn() + Send + Sync + 'static,
        AS: Fn() + Send + Sync + 'static,
    {
        Self::with_hooks(
            size,
            FnHooks::new(before_rotation, after_rotation, before_showing, after_showing),
        )
    }

    /// Creates a solved cube from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`CubeConfig::validate`].
    pub fn from_config(config: &CubeConfig, hooks: impl CubeHooks + 'static) -> CubeResult<Self> {
        config.validate()?;
        let grid = FaceletGrid::new(config.size)?;
        tracing::debug!(size = config.size, "cube created");
        Ok(Self {
            grid,
            admission: AdmissionController::with_cancel_poll(config.size, config.cancel_poll()),
            hooks: Box::new(hooks),
        })
    }

    /// Layers per axis.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Turns the slab at depth `layer` from `face` a quarter turn clockwise,
    /// as seen looking at `face`.
    ///
    /// Blocks until admitted.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::InvalidFace`](crate::CubeError::InvalidFace) or
    /// [`CubeError::InvalidLayer`](crate::CubeError::InvalidLayer) before
    /// waiting.
    pub fn rotate(&self, face: usize, layer: usize) -> CubeResult<()> {
        self.rotate_inner(face, layer, None)
    }

    /// Like [`rotate`](Self::rotate), but gives up if `token` is cancelled
    /// before admission.
    ///
    /// # Errors
    ///
    /// As [`rotate`](Self::rotate), plus
    /// [`CubeError::Cancelled`](crate::CubeError::Cancelled). A cancelled
    /// call leaves the cube untouched and fires no hooks.
    pub fn rotate_cancellable(&self, face: usize, layer: usize, token: &CancelToken) -> CubeResult<()> {
        self.rotate_inner(face, layer, Some(token))
    }

    /// Serializes all `6 × N × N` facelets, face by face, row-major.
    ///
    /// Blocks while any rotation is admitted; runs alongside other shows.
    ///
    /// # Errors
    ///
    /// Never fails without a cancel token; the `Result` keeps the signature
    /// aligned with [`show_cancellable`](Self::show_cancellable).
    pub fn show(&self) -> CubeResult<String> {
        self.show_inner(None)
    }

    /// Like [`show`](Self::show), but gives up if `token` is cancelled
    /// before admission.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Cancelled`](crate::CubeError::Cancelled).
    pub fn show_cancellable(&self, token: &CancelToken) -> CubeResult<String> {
        self.show_inner(Some(token))
    }

    /// Current admission counters.
    #[must_use]
    pub fn admission_snapshot(&self) -> AdmissionSnapshot {
        self.admission.snapshot()
    }

    fn admit(&self, request: AdmissionRequest, token: Option<&CancelToken>) -> CubeResult<Admission<'_>> {
        Ok(match token {
            Some(token) => self.admission.acquire_cancellable(request, token)?,
            None => self.admission.acquire(request),
        })
    }

    fn rotate_inner(&self, face_index: usize, layer: usize, token: Option<&CancelToken>) -> CubeResult<()> {
        let face = Face::from_index(face_index)?;
        let key = face.slab(layer, self.size())?;

        let _admission = self.admit(AdmissionRequest::Rotate(key), token)?;
        self.hooks.before_rotation(face_index, layer);
        self.grid.rotate(face, layer)?;
        self.hooks.after_rotation(face_index, layer);
        Ok(())
    }

    fn show_inner(&self, token: Option<&CancelToken>) -> CubeResult<String> {
        let _admission = self.admit(AdmissionRequest::Read, token)?;
        self.hooks.before_showing();
        let state = self.grid.serialize();
        self.hooks.after_showing();
        Ok(state)
    }
}

impl std::fmt::Debug for Cube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cube")
            .field("size", &self.size())
            .field("admission", &self.admission)
            .finish_non_exhaustive()
    }
}

//! # Cube Hooks
//!
//! User callbacks fired strictly inside the admission window of each
//! operation:
//!
//! ```text
//! rotate:  acquire ─► before_rotation ─► turn slab ─► after_rotation ─► release
//! show:    acquire ─► before_showing  ─► serialize ─► after_showing  ─► release
//! ```
//!
//! Hooks run on the calling thread and may run concurrently with other
//! hooks of compatible operations. They must not call `rotate` or `show`
//! on the same cube.

use std::sync::Arc;

/// Callbacks observed by a [`Cube`](crate::Cube).
///
/// Every method defaults to a no-op. Face and layer are passed exactly as
/// the caller supplied them, not normalized.
pub trait CubeHooks: Send + Sync {
    /// Runs after admission, before the slab turns.
    fn before_rotation(&self, _face: usize, _layer: usize) {}

    /// Runs after the slab turned, before release.
    fn after_rotation(&self, _face: usize, _layer: usize) {}

    /// Runs after admission, before serialization.
    fn before_showing(&self) {}

    /// Runs after serialization, before release.
    fn after_showing(&self) {}
}

impl<H: CubeHooks + ?Sized> CubeHooks for Arc<H> {
    fn before_rotation(&self, face: usize, layer: usize) {
        (**self).before_rotation(face, layer);
    }

    fn after_rotation(&self, face: usize, layer: usize) {
        (**self).after_rotation(face, layer);
    }

    fn before_showing(&self) {
        (**self).before_showing();
    }

    fn after_showing(&self) {
        (**self).after_showing();
    }
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl CubeHooks for NoopHooks {}

/// Adapts four closures into [`CubeHooks`].
pub struct FnHooks<BR, AR, BS, AS> {
    before_rotation: BR,
    after_rotation: AR,
    before_showing: BS,
    after_showing: AS,
}

impl<BR, AR, BS, AS> FnHooks<BR, AR, BS, AS>
where
    BR: Fn(usize, usize) + Send + Sync,
    AR: Fn(usize, usize) + Send + Sync,
    BS: Fn() + Send + Sync,
    AS: Fn() + Send + Sync,
{
    /// Wraps the four callbacks, in firing order.
    pub fn new(before_rotation: BR, after_rotation: AR, before_showing: BS, after_showing: AS) -> Self {
        Self {
            before_rotation,
            after_rotation,
            before_showing,
            after_showing,
        }
    }
}

impl<BR, AR, BS, AS> CubeHooks for FnHooks<BR, AR, BS, AS>
where
    BR: Fn(usize, usize) + Send + Sync,
    AR: Fn(usize, usize) + Send + Sync,
    BS: Fn() + Send + Sync,
    AS: Fn() + Send + Sync,
{
    fn before_rotation(&self, face: usize, layer: usize) {
        (self.before_rotation)(face, layer);
    }

    fn after_rotation(&self, face: usize, layer: usize) {
        (self.after_rotation)(face, layer);
    }

    fn before_showing(&self) {
        (self.before_showing)();
    }

    fn after_showing(&self) {
        (self.after_showing)();
    }
}

impl<BR, AR, BS, AS> std::fmt::Debug for FnHooks<BR, AR, BS, AS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHooks").finish_non_exhaustive()
    }
}

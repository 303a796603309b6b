//! # Admission Controller
//!
//! ## Architecture
//!
//! ```text
//!   rotate / show caller
//!          │ acquire(request)
//!          ▼
//!   ┌───────────────────────────────┐
//!   │  Mutex<AdmissionState>        │  O(1) bookkeeping only
//!   └──────┬───────────────┬────────┘
//!          │ must wait     │ admitted
//!          ▼               ▼
//!   ┌─────────────┐   Admission guard ──► protected work ──► drop
//!   │ read_ready  │                                           │
//!   │ slab_ready  │ ◄────────── notify(wakes) ◄── release ◄───┘
//!   │  [axis][l]  │
//!   └─────────────┘
//! ```
//!
//! One condvar per slab plus one for readers, so a release only disturbs
//! the queues it actually granted.

use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use cubix_core::AXIS_COUNT;

use crate::cancel::CancelToken;
use crate::class::AdmissionRequest;
use crate::error::{AdmissionError, AdmissionResult};
use crate::state::{AdmissionSnapshot, AdmissionState, Wake};

/// Default interval at which cancellable waiters re-check their token.
pub const DEFAULT_CANCEL_POLL: Duration = Duration::from_millis(10);

/// Decides which rotations and reads of one cube may run.
///
/// ## Usage
///
/// ```rust
/// use cubix_core::{Axis, SlabKey};
/// use cubix_sync::{AdmissionController, AdmissionRequest};
///
/// let controller = AdmissionController::new(4);
/// let request = AdmissionRequest::Rotate(SlabKey::new(Axis::UpDown, 1));
/// {
///     let _admission = controller.acquire(request);
///     // ... mutate the slab ...
/// } // released here
/// assert!(controller.snapshot().is_idle());
/// ```
pub struct AdmissionController {
    size: usize,
    state: Mutex<AdmissionState>,
    read_ready: Condvar,
    /// Indexed by `axis * size + layer`.
    slab_ready: Box<[Condvar]>,
    cancel_poll: Duration,
}

impl AdmissionController {
    /// Creates an idle controller for a cube of `size` layers per axis.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_cancel_poll(size, DEFAULT_CANCEL_POLL)
    }

    /// Creates an idle controller with a custom cancellation poll interval.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[must_use]
    pub fn with_cancel_poll(size: usize, cancel_poll: Duration) -> Self {
        assert!(size > 0, "cube size must be greater than zero");
        Self {
            size,
            state: Mutex::new(AdmissionState::new(size)),
            read_ready: Condvar::new(),
            slab_ready: (0..AXIS_COUNT * size).map(|_| Condvar::new()).collect(),
            cancel_poll,
        }
    }

    /// Returns the number of layers per axis.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Blocks until `request` is admitted.
    ///
    /// The returned guard releases admission when dropped.
    ///
    /// # Panics
    ///
    /// Panics if a rotation's layer is not below [`size`](Self::size).
    pub fn acquire(&self, request: AdmissionRequest) -> Admission<'_> {
        match self.wait_for_admission(request, None) {
            Ok(()) => Admission {
                controller: self,
                request,
            },
            Err(AdmissionError::Cancelled) => unreachable!("wait without a token cannot be cancelled"),
        }
    }

    /// Blocks until `request` is admitted or `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Cancelled`] if the token fires first. The
    /// controller is left as if this call never happened.
    ///
    /// # Panics
    ///
    /// Panics if a rotation's layer is not below [`size`](Self::size).
    pub fn acquire_cancellable(
        &self,
        request: AdmissionRequest,
        token: &CancelToken,
    ) -> AdmissionResult<Admission<'_>> {
        self.wait_for_admission(request, Some(token))?;
        Ok(Admission {
            controller: self,
            request,
        })
    }

    /// Admits `request` only if that needs no waiting.
    ///
    /// # Panics
    ///
    /// Panics if a rotation's layer is not below [`size`](Self::size).
    pub fn try_acquire(&self, request: AdmissionRequest) -> Option<Admission<'_>> {
        self.check(request);
        let mut state = self.state.lock();
        if state.must_wait(request) {
            return None;
        }
        state.admit(request);
        tracing::trace!(%request, "admitted without waiting");
        Some(Admission {
            controller: self,
            request,
        })
    }

    /// Returns the current counters.
    #[must_use]
    pub fn snapshot(&self) -> AdmissionSnapshot {
        self.state.lock().snapshot()
    }

    fn check(&self, request: AdmissionRequest) {
        if let AdmissionRequest::Rotate(key) = request {
            assert!(
                key.layer < self.size,
                "{request} outside cube of size {}",
                self.size
            );
        }
    }

    fn queue(&self, wake: Wake) -> &Condvar {
        match wake {
            Wake::Read => &self.read_ready,
            Wake::Slab(key) => &self.slab_ready[key.axis.index() * self.size + key.layer],
        }
    }

    fn queue_of(&self, request: AdmissionRequest) -> &Condvar {
        match request {
            AdmissionRequest::Read => self.queue(Wake::Read),
            AdmissionRequest::Rotate(key) => self.queue(Wake::Slab(key)),
        }
    }

    fn notify(&self, wakes: &[Wake]) {
        for &wake in wakes {
            self.queue(wake).notify_all();
        }
    }

    fn wait_for_admission(
        &self,
        request: AdmissionRequest,
        token: Option<&CancelToken>,
    ) -> AdmissionResult<()> {
        self.check(request);
        if token.is_some_and(CancelToken::is_cancelled) {
            return Err(AdmissionError::Cancelled);
        }

        let mut state = self.state.lock();
        if !state.must_wait(request) {
            state.admit(request);
            tracing::trace!(%request, "admitted without waiting");
            return Ok(());
        }

        state.enqueue(request);
        tracing::trace!(%request, "waiting for admission");
        let ready = self.queue_of(request);
        loop {
            if token.is_some_and(CancelToken::is_cancelled) {
                return Err(self.abandon(state, request));
            }
            if state.take_grant(request) {
                tracing::trace!(%request, "admitted after waiting");
                return Ok(());
            }
            match token {
                Some(_) => {
                    let _ = ready.wait_for(&mut state, self.cancel_poll);
                }
                None => ready.wait(&mut state),
            }
        }
    }

    /// Leaves the queue after cancellation. A grant that raced with the
    /// cancel is released as if the work had run.
    fn abandon(
        &self,
        mut state: MutexGuard<'_, AdmissionState>,
        request: AdmissionRequest,
    ) -> AdmissionError {
        let wakes = state.abandon(request);
        drop(state);
        tracing::warn!(%request, "admission wait cancelled");
        self.notify(&wakes);
        AdmissionError::Cancelled
    }

    fn release(&self, request: AdmissionRequest) {
        let wakes = self.state.lock().release(request);
        tracing::trace!(%request, woken = wakes.len(), "released");
        self.notify(&wakes);
    }
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("size", &self.size)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Proof of admission. Dropping it releases the admission and hands off
/// to the next eligible waiters.
///
/// A panic inside the protected work still releases during unwinding.
#[must_use = "dropping the admission releases it immediately"]
pub struct Admission<'a> {
    controller: &'a AdmissionController,
    request: AdmissionRequest,
}

impl Admission<'_> {
    /// Returns the admitted request.
    #[inline]
    #[must_use]
    pub fn request(&self) -> AdmissionRequest {
        self.request
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.controller.release(self.request);
    }
}

impl std::fmt::Debug for Admission<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission")
            .field("request", &self.request)
            .finish()
    }
}

//! # Admission Bookkeeping
//!
//! Pure counter logic, no locking. [`AdmissionController`] owns one
//! [`AdmissionState`] behind its coordination lock and turns the returned
//! [`Wake`]s into condvar notifications.
//!
//! ## Baton Passing
//!
//! A releaser never just signals "someone may try now". It moves the woken
//! waiters from *waiting* to *active* itself and leaves a grant on their
//! queue. Woken threads only consume the grant. A fresh arrival that looks
//! at the counters in between already sees the woken class as active.
//!
//! ## Hand-Off Order
//!
//! ```text
//!   release(class C, layer L)
//!     ├─ nobody outside C waiting ─► wake one waiter per free layer of C
//!     └─ someone outside C waiting
//!          ├─ free waiter on C, layer != L ─► wake that one waiter
//!          ├─ C still active ───────────────► nothing (let C drain)
//!          └─ C drained ────────────────────► scan C+1, C+2, C+3, C
//!                                             wake the first class with waiters:
//!                                               axis: one waiter per layer
//!                                               read: the whole cohort
//! ```
//!
//! Same-axis newcomers queue while another class waits, so the single
//! wakes above run out and the drain always comes.
//!
//! A withdrawn waiter reruns the same decision for whatever is still
//! active: the queues it was holding up may be admissible now.
//!
//! [`AdmissionController`]: crate::AdmissionController

use std::collections::BTreeSet;

use cubix_core::{Axis, SlabKey, AXIS_COUNT};

use crate::class::{AdmissionRequest, OperationClass, CLASS_COUNT};

/// A queue that must be notified after the lock is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Wake {
    /// The Read queue.
    Read,
    /// The queue of one slab.
    Slab(SlabKey),
}

#[derive(Clone, Copy, Debug, Default)]
struct Counters {
    waiting: usize,
    active: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct LayerSlot {
    waiting: usize,
    active: usize,
    /// Admissions handed to waiters that have not woken up yet.
    grants: usize,
}

/// Cumulative controller statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdmissionStats {
    /// Requests admitted without waiting.
    pub immediate: u64,
    /// Requests admitted after waiting.
    pub waited: u64,
    /// Waits abandoned through a cancel token.
    pub cancelled: u64,
    /// Times a drained class passed admission to another class.
    pub hand_offs: u64,
}

/// Point-in-time view of the controller's counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmissionSnapshot {
    /// Waiting callers per class, indexed by [`OperationClass::index`].
    pub waiting: [usize; CLASS_COUNT],
    /// Active callers per class, indexed by [`OperationClass::index`].
    pub active: [usize; CLASS_COUNT],
    /// Cumulative statistics.
    pub stats: AdmissionStats,
}

impl AdmissionSnapshot {
    /// Waiting callers of `class`.
    #[inline]
    #[must_use]
    pub fn waiting(&self, class: OperationClass) -> usize {
        self.waiting[class.index()]
    }

    /// Active callers of `class`.
    #[inline]
    #[must_use]
    pub fn active(&self, class: OperationClass) -> usize {
        self.active[class.index()]
    }

    /// Whether nobody is active or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.waiting.iter().chain(self.active.iter()).all(|&n| n == 0)
    }
}

/// Waiting/active counters per class and per `(axis, layer)`.
pub(crate) struct AdmissionState {
    classes: [Counters; CLASS_COUNT],
    layers: [Box<[LayerSlot]>; AXIS_COUNT],
    /// Layers with at least one waiter, per axis.
    waiting_layers: [BTreeSet<usize>; AXIS_COUNT],
    read_grants: usize,
    stats: AdmissionStats,
}

impl AdmissionState {
    pub(crate) fn new(size: usize) -> Self {
        let slots = || vec![LayerSlot::default(); size].into_boxed_slice();
        Self {
            classes: [Counters::default(); CLASS_COUNT],
            layers: [slots(), slots(), slots()],
            waiting_layers: Default::default(),
            read_grants: 0,
            stats: AdmissionStats::default(),
        }
    }

    fn class(&self, class: OperationClass) -> &Counters {
        &self.classes[class.index()]
    }

    fn class_mut(&mut self, class: OperationClass) -> &mut Counters {
        &mut self.classes[class.index()]
    }

    fn slot_mut(&mut self, key: SlabKey) -> &mut LayerSlot {
        &mut self.layers[key.axis.index()][key.layer]
    }

    fn busy(&self, class: OperationClass) -> bool {
        let counters = self.class(class);
        counters.active > 0 || counters.waiting > 0
    }

    fn others_waiting(&self, class: OperationClass) -> bool {
        OperationClass::ALL
            .iter()
            .any(|&other| other != class && self.class(other).waiting > 0)
    }

    /// Whether a fresh arrival has to queue.
    pub(crate) fn must_wait(&self, request: AdmissionRequest) -> bool {
        match request {
            AdmissionRequest::Read => Axis::ALL
                .iter()
                .any(|&axis| self.busy(OperationClass::Axis(axis))),
            AdmissionRequest::Rotate(key) => {
                let class = request.class();
                OperationClass::ALL
                    .iter()
                    .any(|&other| other != class && self.busy(other))
                    || self.layers[key.axis.index()][key.layer].active > 0
            }
        }
    }

    /// Records an immediate admission.
    pub(crate) fn admit(&mut self, request: AdmissionRequest) {
        self.class_mut(request.class()).active += 1;
        if let AdmissionRequest::Rotate(key) = request {
            let slot = self.slot_mut(key);
            slot.active += 1;
            assert_eq!(slot.active, 1, "two active rotations on {key}");
        }
        self.stats.immediate += 1;
    }

    /// Records a caller that starts waiting.
    pub(crate) fn enqueue(&mut self, request: AdmissionRequest) {
        self.class_mut(request.class()).waiting += 1;
        if let AdmissionRequest::Rotate(key) = request {
            self.slot_mut(key).waiting += 1;
            self.waiting_layers[key.axis.index()].insert(key.layer);
        }
    }

    /// Consumes a grant left for `request`'s queue, if any.
    ///
    /// On success the caller is admitted: the releaser already counted it
    /// as active.
    pub(crate) fn take_grant(&mut self, request: AdmissionRequest) -> bool {
        let granted = self.consume_grant(request);
        if granted {
            self.stats.waited += 1;
        }
        granted
    }

    fn consume_grant(&mut self, request: AdmissionRequest) -> bool {
        let grants = match request {
            AdmissionRequest::Read => &mut self.read_grants,
            AdmissionRequest::Rotate(key) => &mut self.layers[key.axis.index()][key.layer].grants,
        };
        if *grants == 0 {
            return false;
        }
        *grants -= 1;
        true
    }

    /// Takes a cancelled waiter out of the controller.
    ///
    /// If a grant raced with the cancellation, the admission is released
    /// as if the work had run, so the hand-off still happens.
    pub(crate) fn abandon(&mut self, request: AdmissionRequest) -> Vec<Wake> {
        if self.consume_grant(request) {
            self.stats.cancelled += 1;
            self.release(request)
        } else {
            self.withdraw(request)
        }
    }

    /// Removes a waiter that gave up before being granted.
    fn withdraw(&mut self, request: AdmissionRequest) -> Vec<Wake> {
        let class = request.class();
        let counters = self.class_mut(class);
        assert!(counters.waiting > 0, "withdraw of {request} without a waiter");
        counters.waiting -= 1;
        if let AdmissionRequest::Rotate(key) = request {
            self.unqueue_layer(key);
        }
        self.stats.cancelled += 1;
        self.resume_after_withdraw(class)
    }

    /// Wakes whatever the withdrawn waiter was holding up.
    fn resume_after_withdraw(&mut self, withdrawn: OperationClass) -> Vec<Wake> {
        // Waiters only exist while someone is active; if this one was the
        // last thing holding the queues up, restart them.
        if self.classes.iter().all(|c| c.active == 0) {
            return self.hand_off(withdrawn);
        }
        if self.class(OperationClass::Read).active > 0 {
            let axis_waiting = Axis::ALL
                .iter()
                .any(|&axis| self.class(OperationClass::Axis(axis)).waiting > 0);
            return if axis_waiting {
                Vec::new()
            } else {
                self.wake_readers()
            };
        }
        let running = Axis::ALL
            .iter()
            .copied()
            .find(|&axis| self.class(OperationClass::Axis(axis)).active > 0);
        match running {
            Some(axis) if !self.others_waiting(OperationClass::Axis(axis)) => {
                self.wake_free_layers(axis)
            }
            _ => Vec::new(),
        }
    }

    /// Records that an admitted caller finished (or was cancelled after
    /// being granted), and decides who runs next.
    ///
    /// # Panics
    ///
    /// Panics if `request` has no matching active admission.
    pub(crate) fn release(&mut self, request: AdmissionRequest) -> Vec<Wake> {
        let class = request.class();
        let counters = self.class_mut(class);
        assert!(counters.active > 0, "release of {request} without admission");
        counters.active -= 1;

        match request {
            AdmissionRequest::Read => {
                if self.class(class).active == 0 {
                    self.hand_off(class)
                } else {
                    Vec::new()
                }
            }
            AdmissionRequest::Rotate(key) => {
                let slot = self.slot_mut(key);
                assert_eq!(slot.active, 1, "release of {request} without admission");
                slot.active = 0;

                if !self.others_waiting(class) {
                    self.wake_free_layers(key.axis)
                } else if let Some(layer) = self.free_waiting_layer(key.axis, key.layer) {
                    vec![self.grant_layer(SlabKey::new(key.axis, layer))]
                } else if self.class(class).active == 0 {
                    self.hand_off(class)
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Passes admission from a drained class to the next class with
    /// waiters, in cyclic order.
    fn hand_off(&mut self, from: OperationClass) -> Vec<Wake> {
        for step in 1..=CLASS_COUNT {
            let next = from.cycle(step);
            if self.class(next).waiting == 0 {
                continue;
            }
            self.stats.hand_offs += 1;
            tracing::debug!(?from, ?next, "handing off admission");
            return match next {
                OperationClass::Read => self.wake_readers(),
                OperationClass::Axis(axis) => self.wake_free_layers(axis),
            };
        }
        Vec::new()
    }

    fn wake_readers(&mut self) -> Vec<Wake> {
        let counters = self.class_mut(OperationClass::Read);
        let cohort = counters.waiting;
        counters.waiting = 0;
        counters.active += cohort;
        self.read_grants += cohort;
        if cohort == 0 {
            Vec::new()
        } else {
            vec![Wake::Read]
        }
    }

    /// Grants one waiter on every waiting layer of `axis` that is free.
    fn wake_free_layers(&mut self, axis: Axis) -> Vec<Wake> {
        let free: Vec<usize> = self.waiting_layers[axis.index()]
            .iter()
            .copied()
            .filter(|&layer| self.layers[axis.index()][layer].active == 0)
            .collect();

        free.into_iter()
            .map(|layer| self.grant_layer(SlabKey::new(axis, layer)))
            .collect()
    }

    /// First free layer of `axis` with a waiter, other than `released`.
    fn free_waiting_layer(&self, axis: Axis, released: usize) -> Option<usize> {
        self.waiting_layers[axis.index()]
            .iter()
            .copied()
            .find(|&layer| layer != released && self.layers[axis.index()][layer].active == 0)
    }

    /// Moves one waiter of a free slab to active and leaves it a grant.
    fn grant_layer(&mut self, key: SlabKey) -> Wake {
        let slot = self.slot_mut(key);
        debug_assert_eq!(slot.active, 0, "grant on busy slab {key}");
        slot.active = 1;
        slot.grants += 1;
        self.unqueue_layer(key);
        let counters = self.class_mut(OperationClass::Axis(key.axis));
        counters.waiting -= 1;
        counters.active += 1;
        Wake::Slab(key)
    }

    fn unqueue_layer(&mut self, key: SlabKey) {
        let slot = self.slot_mut(key);
        assert!(slot.waiting > 0, "no waiter queued on {key}");
        slot.waiting -= 1;
        if slot.waiting == 0 {
            self.waiting_layers[key.axis.index()].remove(&key.layer);
        }
    }

    pub(crate) fn snapshot(&self) -> AdmissionSnapshot {
        AdmissionSnapshot {
            waiting: self.classes.map(|c| c.waiting),
            active: self.classes.map(|c| c.active),
            stats: self.stats,
        }
    }
}

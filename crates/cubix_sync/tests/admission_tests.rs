//! Integration tests for the admission controller under real threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use cubix_core::{Axis, SlabKey};
use cubix_sync::{
    AdmissionController, AdmissionError, AdmissionRequest, CancelToken, OperationClass,
    CLASS_COUNT,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const TIMEOUT: Duration = Duration::from_secs(10);

fn rot(axis: Axis, layer: usize) -> AdmissionRequest {
    AdmissionRequest::Rotate(SlabKey::new(axis, layer))
}

/// Spins until `condition` holds, failing the test after [`TIMEOUT`].
fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let start = Instant::now();
    while !condition() {
        assert!(start.elapsed() < TIMEOUT, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Live occupancy, checked by every admitted caller.
struct Occupancy {
    classes: [AtomicUsize; CLASS_COUNT],
    slabs: Vec<AtomicBool>,
    size: usize,
}

impl Occupancy {
    fn new(size: usize) -> Self {
        Self {
            classes: Default::default(),
            slabs: (0..3 * size).map(|_| AtomicBool::new(false)).collect(),
            size,
        }
    }

    fn enter(&self, request: AdmissionRequest) {
        let class = request.class();
        self.classes[class.index()].fetch_add(1, Ordering::SeqCst);
        for other in OperationClass::ALL {
            if other != class {
                assert_eq!(
                    self.classes[other.index()].load(Ordering::SeqCst),
                    0,
                    "{request} admitted while {other:?} active"
                );
            }
        }
        if let AdmissionRequest::Rotate(key) = request {
            let slab = &self.slabs[key.axis.index() * self.size + key.layer];
            assert!(!slab.swap(true, Ordering::SeqCst), "{key} admitted twice");
        }
    }

    fn leave(&self, request: AdmissionRequest) {
        if let AdmissionRequest::Rotate(key) = request {
            let slab = &self.slabs[key.axis.index() * self.size + key.layer];
            slab.store(false, Ordering::SeqCst);
        }
        self.classes[request.class().index()].fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn test_mixed_workload_keeps_mutual_exclusion() {
    let size = 4;
    let controller = Arc::new(AdmissionController::new(size));
    let occupancy = Arc::new(Occupancy::new(size));
    let num_threads = 12;
    let ops_per_thread = 400;

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let controller = Arc::clone(&controller);
            let occupancy = Arc::clone(&occupancy);
            thread::spawn(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(t);
                for _ in 0..ops_per_thread {
                    let request = if rng.gen_range(0..5) == 0 {
                        AdmissionRequest::Read
                    } else {
                        let axis = Axis::ALL[rng.gen_range(0..3)];
                        rot(axis, rng.gen_range(0..size))
                    };
                    let _admission = controller.acquire(request);
                    occupancy.enter(request);
                    if rng.gen_bool(0.1) {
                        thread::yield_now();
                    }
                    occupancy.leave(request);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let snapshot = controller.snapshot();
    assert!(snapshot.is_idle());
    assert_eq!(
        snapshot.stats.immediate + snapshot.stats.waited,
        num_threads * ops_per_thread
    );
}

#[test]
fn test_same_axis_disjoint_layers_run_concurrently() {
    let controller = AdmissionController::new(4);
    // Both must be inside at once to get past the barrier.
    let barrier = Barrier::new(2);

    thread::scope(|s| {
        for layer in [1, 2] {
            let controller = &controller;
            let barrier = &barrier;
            s.spawn(move || {
                let _admission = controller.acquire(rot(Axis::UpDown, layer));
                barrier.wait();
            });
        }
    });
    assert!(controller.snapshot().is_idle());
}

#[test]
fn test_opposite_faces_same_slab_are_serialized() {
    let controller = AdmissionController::new(4);
    // Face 5 layer 2 normalizes to the same slab as face 0 layer 1.
    let key = SlabKey::new(Axis::UpDown, 1);
    let entered = AtomicBool::new(false);

    let held = controller.acquire(AdmissionRequest::Rotate(key));
    thread::scope(|s| {
        s.spawn(|| {
            let _admission = controller.acquire(AdmissionRequest::Rotate(key));
            entered.store(true, Ordering::SeqCst);
        });

        wait_until("second rotation to queue", || {
            controller
                .snapshot()
                .waiting(OperationClass::Axis(Axis::UpDown))
                == 1
        });
        assert!(!entered.load(Ordering::SeqCst));
        drop(held);
    });
    assert!(entered.load(Ordering::SeqCst));
}

#[test]
fn test_read_waits_for_rotation_on_other_axis() {
    let controller = AdmissionController::new(3);
    let shown = AtomicBool::new(false);

    let held = controller.acquire(rot(Axis::LeftRight, 0));
    thread::scope(|s| {
        s.spawn(|| {
            let _admission = controller.acquire(AdmissionRequest::Read);
            shown.store(true, Ordering::SeqCst);
        });

        wait_until("read to queue", || {
            controller.snapshot().waiting(OperationClass::Read) == 1
        });
        assert!(!shown.load(Ordering::SeqCst));
        drop(held);
    });
    assert!(shown.load(Ordering::SeqCst));
}

#[test]
fn test_readers_share_the_cube() {
    let controller = AdmissionController::new(2);
    let barrier = Barrier::new(3);

    thread::scope(|s| {
        for _ in 0..3 {
            s.spawn(|| {
                let _admission = controller.acquire(AdmissionRequest::Read);
                barrier.wait();
            });
        }
    });
    assert_eq!(controller.snapshot().stats.immediate, 3);
}

#[test]
fn test_read_is_not_starved_by_rotation_flood() {
    let size = 3;
    let controller = Arc::new(AdmissionController::new(size));
    let stop = Arc::new(AtomicBool::new(false));

    let flooders: Vec<_> = (0..6)
        .map(|t| {
            let controller = Arc::clone(&controller);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut i = t;
                while !stop.load(Ordering::Relaxed) {
                    let _admission = controller.acquire(rot(Axis::UpDown, i % size));
                    i += 1;
                }
            })
        })
        .collect();

    wait_until("flood to start", || {
        controller
            .snapshot()
            .active(OperationClass::Axis(Axis::UpDown))
            > 0
    });

    let (tx, rx) = crossbeam_channel::bounded(1);
    let reader = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || {
            for _ in 0..5 {
                let _admission = controller.acquire(AdmissionRequest::Read);
            }
            tx.send(()).unwrap();
        })
    };

    let finished = rx.recv_timeout(TIMEOUT);
    stop.store(true, Ordering::Relaxed);
    for h in flooders {
        h.join().unwrap();
    }
    reader.join().unwrap();
    assert!(finished.is_ok(), "reads starved by rotations");
    assert!(controller.snapshot().is_idle());
}

#[test]
fn test_every_axis_makes_progress_under_contention() {
    let size = 2;
    let controller = Arc::new(AdmissionController::new(size));
    let done = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = Axis::ALL
        .iter()
        .flat_map(|&axis| (0..size).map(move |layer| (axis, layer)))
        .map(|(axis, layer)| {
            let controller = Arc::clone(&controller);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for _ in 0..200 {
                    let _admission = controller.acquire(rot(axis, layer));
                }
                done.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(done.load(Ordering::SeqCst), 3 * size);
    assert!(controller.snapshot().is_idle());
}

#[test]
fn test_cancelled_wait_restores_counters() {
    let controller = AdmissionController::with_cancel_poll(3, Duration::from_millis(2));
    let token = CancelToken::new();

    let held = controller.acquire(rot(Axis::UpDown, 0));
    thread::scope(|s| {
        let waiter = s.spawn(|| {
            controller
                .acquire_cancellable(AdmissionRequest::Read, &token)
                .map(|_| ())
        });

        wait_until("read to queue", || {
            controller.snapshot().waiting(OperationClass::Read) == 1
        });
        token.cancel();
        assert_eq!(waiter.join().unwrap(), Err(AdmissionError::Cancelled));
    });

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.waiting(OperationClass::Read), 0);
    assert_eq!(snapshot.stats.cancelled, 1);

    // The holder is unaffected and the cube is usable afterwards.
    drop(held);
    assert!(controller.snapshot().is_idle());
    drop(controller.acquire(AdmissionRequest::Read));
}

#[test]
fn test_cancel_of_last_blocker_restarts_queue() {
    let controller = AdmissionController::with_cancel_poll(3, Duration::from_millis(2));
    let token = CancelToken::new();
    let rotated = AtomicBool::new(false);

    let held = controller.acquire(AdmissionRequest::Read);
    thread::scope(|s| {
        // Axis0 queues behind the read; Axis1 queues behind Axis0.
        let first = s.spawn(|| {
            controller
                .acquire_cancellable(rot(Axis::UpDown, 0), &token)
                .map(|_| ())
        });
        wait_until("axis0 to queue", || {
            controller
                .snapshot()
                .waiting(OperationClass::Axis(Axis::UpDown))
                == 1
        });
        s.spawn(|| {
            let _admission = controller.acquire(rot(Axis::LeftRight, 1));
            rotated.store(true, Ordering::SeqCst);
        });
        wait_until("axis1 to queue", || {
            controller
                .snapshot()
                .waiting(OperationClass::Axis(Axis::LeftRight))
                == 1
        });

        drop(held);
        token.cancel();
        // Whether axis0 was granted first or not, axis1 must get through.
        let _ = first.join().unwrap();
    });

    assert!(rotated.load(Ordering::SeqCst));
    assert!(controller.snapshot().is_idle());
}

#[test]
fn test_panicking_holder_releases_admission() {
    let controller = Arc::new(AdmissionController::new(2));

    let worker = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || {
            let _admission = controller.acquire(rot(Axis::FrontBack, 1));
            panic!("hook failed");
        })
    };
    assert!(worker.join().is_err());

    assert!(controller.snapshot().is_idle());
    assert!(controller.try_acquire(AdmissionRequest::Read).is_some());
}

#[test]
fn test_cancelled_other_axis_lets_running_axis_admit_queued_layer() {
    let controller = AdmissionController::with_cancel_poll(3, Duration::from_millis(2));
    let token = CancelToken::new();
    let entered = AtomicBool::new(false);

    let held = controller.acquire(rot(Axis::UpDown, 0));
    thread::scope(|s| {
        let other = s.spawn(|| {
            controller
                .acquire_cancellable(rot(Axis::LeftRight, 0), &token)
                .map(|_| ())
        });
        wait_until("axis1 to queue", || {
            controller
                .snapshot()
                .waiting(OperationClass::Axis(Axis::LeftRight))
                == 1
        });
        s.spawn(|| {
            let _admission = controller.acquire(rot(Axis::UpDown, 1));
            entered.store(true, Ordering::SeqCst);
        });
        wait_until("axis0 layer 1 to queue", || {
            controller
                .snapshot()
                .waiting(OperationClass::Axis(Axis::UpDown))
                == 1
        });

        token.cancel();
        assert_eq!(other.join().unwrap(), Err(AdmissionError::Cancelled));
        // Layer 1 gets in while layer 0 is still held.
        wait_until("axis0 layer 1 to enter", || entered.load(Ordering::SeqCst));
    });

    assert_eq!(
        controller
            .snapshot()
            .active(OperationClass::Axis(Axis::UpDown)),
        1
    );
    drop(held);
    assert!(controller.snapshot().is_idle());
}

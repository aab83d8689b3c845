//! Lock primitives shared by the dispatcher and the transports.
//!
//! The dispatch lock and the transport bus lock are [`lock_api`] mutexes and
//! are generic over the raw lock. [`RawSpinlock`] is the default: it needs no
//! OS support, has a `const` constructor so it can live in a `static`, and
//! works the same on a bare-metal target and in host tests.
//!
//! On a preemptive RTOS a spinning high-priority task can starve the holder,
//! so implement [`RawMutex`] over the kernel mutex instead and name it as the
//! `R` parameter of [`Interpreter`](crate::cli::Interpreter) and
//! [`StreamConsole`](crate::console::StreamConsole).

use core::sync::atomic::{AtomicBool, Ordering};

pub use lock_api::{GuardNoSend, GuardSend, RawMutex};

/// Test-and-test-and-set spinlock.
#[derive(Debug)]
pub struct RawSpinlock {
    locked: AtomicBool,
}

// SAFETY: `locked` is only set by a successful compare-exchange with Acquire
// ordering and only cleared with Release ordering, so at most one holder exists.
unsafe impl RawMutex for RawSpinlock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self {
        locked: AtomicBool::new(false),
    };

    type GuardMarker = GuardSend;

    fn lock(&self) {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.locked.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
    }

    fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

/// Mutex built on [`RawSpinlock`].
pub type Mutex<T> = lock_api::Mutex<RawSpinlock, T>;

/// RAII guard returned by [`Mutex::lock`].
pub type MutexGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinlock, T>;

//! Time sources for default timestamps.
//!
//! A dictionary never reads the clock behind the caller's back: every
//! timestamp it records without an explicit argument comes from the
//! [`TimeSource`] it was built with. Swapping the source makes conflict
//! resolution fully deterministic in tests.
//!
//! The dictionary only compares timestamps. It makes no attempt to keep
//! clocks on different replicas in agreement; callers that merge replicas
//! with skewed clocks should supply their own timestamps.
//!
//! # Example
//!
//! ```
//! use lww_dict::clock::{ManualClock, TimeSource};
//!
//! let clock = ManualClock::new(100);
//! let t1 = clock.now();
//! let t2 = clock.now();
//! assert!(t2 > t1);
//!
//! clock.set(5_000);
//! assert_eq!(clock.now(), 5_000);
//! ```

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A capability that produces timestamps.
pub trait TimeSource {
    /// The timestamp domain. Must be totally ordered.
    type Timestamp: Ord + Clone;

    /// Read the current time.
    fn now(&self) -> Self::Timestamp;
}

/// Wall-clock time in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64
    }
}

/// A clock that only moves when told to.
///
/// Each [`now`](TimeSource::now) returns the current reading and then
/// advances by one tick, so consecutive readings are strictly increasing.
#[derive(Debug, Default)]
pub struct ManualClock {
    current: AtomicU64,
}

impl ManualClock {
    /// Create a clock whose next reading is `start`.
    pub fn new(start: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
        }
    }

    /// Jump to `t`. Moving backwards is allowed.
    pub fn set(&self, t: u64) {
        self.current.store(t, Ordering::SeqCst);
    }

    /// Move forward by `delta` ticks.
    pub fn advance(&self, delta: u64) {
        self.current.fetch_add(delta, Ordering::SeqCst);
    }

    /// The next reading, without consuming it.
    pub fn peek(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

impl Clone for ManualClock {
    fn clone(&self) -> Self {
        Self::new(self.peek())
    }
}

impl TimeSource for ManualClock {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst)
    }
}

/// Adapts any closure into a [`TimeSource`].
///
/// ```
/// use lww_dict::clock::{FnClock, TimeSource};
///
/// let clock = FnClock::new(|| 42u32);
/// assert_eq!(clock.now(), 42);
/// ```
#[derive(Clone, Copy)]
pub struct FnClock<F> {
    read: F,
}

impl<F> FnClock<F> {
    /// Wrap `read` as a time source.
    pub fn new(read: F) -> Self {
        Self { read }
    }
}

impl<F, T> TimeSource for FnClock<F>
where
    F: Fn() -> T,
    T: Ord + Clone,
{
    type Timestamp = T;

    fn now(&self) -> T {
        (self.read)()
    }
}

impl<F> core::fmt::Debug for FnClock<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnClock").finish_non_exhaustive()
    }
}

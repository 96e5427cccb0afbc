// ============================================
// File: crates/sealgram-common/src/time.rs
// ============================================
//! # Time Utilities
//!
//! ## Creation Reason
//! Channels record when they last issued a transmit key and when they
//! last accepted a packet. Those fields are advisory (never used for
//! correctness) and are updated from whatever thread happens to be
//! packing or unpacking, so they need lock-free storage.
//!
//! ## Main Functionality
//! - `AtomicInstant`: Thread-safe wrapper around `Instant`
//!
//! ## Main Logical Flow
//! 1. Channels store an `AtomicInstant` per direction
//! 2. Pack/unpack paths `touch()` them without taking any lock
//! 3. Housekeeping code reads `elapsed()` to find idle channels
//!
//! ## ⚠️ Important Note for Next Developer
//! - `AtomicInstant` uses `AtomicU64` internally (nanoseconds since a
//!   process-wide reference instant)
//! - Be aware of potential overflow after ~584 years of uptime
//!
//! ## Last Modified
//! v0.2.0 - Initial time utilities

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

// ============================================
// AtomicInstant
// ============================================

/// Thread-safe wrapper around [`Instant`] for concurrent access.
///
/// # Purpose
/// Allows multiple threads to read/write a timestamp without locks,
/// which keeps the packet hot paths free of incidental contention.
///
/// # Implementation
/// Stores nanoseconds elapsed since a reference instant captured the
/// first time any `AtomicInstant` is created. Uses `Relaxed` ordering
/// throughout: the value is advisory and never synchronizes other data.
///
/// # Example
/// ```
/// use sealgram_common::time::AtomicInstant;
///
/// let last_seen = AtomicInstant::now();
/// last_seen.touch();
/// assert!(last_seen.elapsed().as_secs() < 1);
/// ```
#[derive(Debug)]
pub struct AtomicInstant {
    /// Nanoseconds since the reference instant
    nanos: AtomicU64,
}

impl AtomicInstant {
    /// Reference instant, captured once per process.
    fn reference() -> Instant {
        static REFERENCE: OnceLock<Instant> = OnceLock::new();
        *REFERENCE.get_or_init(Instant::now)
    }

    /// Nanoseconds between the reference instant and `instant`.
    fn nanos_for(instant: Instant) -> u64 {
        instant
            .checked_duration_since(Self::reference())
            .map_or(0, |d| d.as_nanos() as u64)
    }

    /// Creates a new `AtomicInstant` set to the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            nanos: AtomicU64::new(Self::nanos_for(Instant::now())),
        }
    }

    /// Loads the stored instant.
    #[must_use]
    pub fn load(&self) -> Instant {
        let nanos = self.nanos.load(Ordering::Relaxed);
        Self::reference() + Duration::from_nanos(nanos)
    }

    /// Stores a new instant.
    pub fn store(&self, instant: Instant) {
        self.nanos.store(Self::nanos_for(instant), Ordering::Relaxed);
    }

    /// Updates the stored instant to the current time.
    pub fn touch(&self) {
        self.store(Instant::now());
    }

    /// Returns the elapsed time since the stored instant.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.load().elapsed()
    }
}

impl Default for AtomicInstant {
    fn default() -> Self {
        Self::now()
    }
}

impl Clone for AtomicInstant {
    fn clone(&self) -> Self {
        Self {
            nanos: AtomicU64::new(self.nanos.load(Ordering::Relaxed)),
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_atomic_instant_basic() {
        let atomic = AtomicInstant::now();
        let loaded = atomic.load();

        // Should be very close to now
        assert!(loaded.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_atomic_instant_touch_advances() {
        let atomic = AtomicInstant::now();
        thread::sleep(Duration::from_millis(10));

        let before = atomic.load();
        atomic.touch();
        let after = atomic.load();

        assert!(after > before);
    }

    #[test]
    fn test_atomic_instant_elapsed() {
        let atomic = AtomicInstant::now();
        thread::sleep(Duration::from_millis(10));

        assert!(atomic.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_atomic_instant_concurrent_touch() {
        let atomic = std::sync::Arc::new(AtomicInstant::now());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let atomic = std::sync::Arc::clone(&atomic);
                thread::spawn(move || {
                    for _ in 0..100 {
                        atomic.touch();
                        let _ = atomic.elapsed();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(atomic.elapsed() < Duration::from_secs(1));
    }
}

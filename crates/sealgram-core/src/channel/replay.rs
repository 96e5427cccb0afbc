// ============================================
// File: crates/sealgram-core/src/channel/replay.rs
// ============================================
//! # Replay History (Fixed-Capacity Anti-Replay)
//!
//! ## Creation Reason
//! Datagram transports deliver duplicates and reorder freely, so the
//! receiver must remember which sequence numbers it already accepted.
//! A full sliding-window bitmap is overkill for the small windows this
//! protocol uses; a fixed handful of slots with a linear scan is enough
//! and keeps the acceptance rules easy to state.
//!
//! ## Main Functionality
//! - `ReplayHistory`: the N most recently accepted sequence numbers
//! - `ReplayDecision`: outcome of a check-and-record operation
//!
//! ## Acceptance Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ 1. sequence already in history        → Duplicate           │
//! │ 2. history has a free slot            → record, Accepted    │
//! │ 3. history full, sequence < min slot  → TooOld              │
//! │ 4. history full, otherwise            → overwrite min slot, │
//! │                                         Accepted            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//! The slots are unordered: delivery may be reordered arbitrarily as
//! long as a sequence is not older than every tracked value. Capacity
//! is fixed at construction (default 10, minimum 1).
//!
//! ## ⚠️ Important Note for Next Developer
//! - These accept/reject rules are a compatibility surface: both
//!   endpoints reason about the same window behavior. Changing them
//!   (including swapping in a "smarter" structure with different
//!   decisions) breaks interop tests
//! - O(N) scans are fine - N defaults to 10
//!
//! ## Last Modified
//! v0.2.0 - Initial replay history

// ============================================
// Constants
// ============================================

/// Default number of accepted sequence numbers remembered per channel.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Smallest usable history capacity.
pub const MIN_HISTORY_CAPACITY: usize = 1;

// ============================================
// ReplayDecision
// ============================================

/// Result of a replay check operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayDecision {
    /// Sequence is new and has been recorded.
    Accepted,
    /// Sequence was already accepted before (duplicate or replay).
    Duplicate,
    /// Sequence is older than everything tracked (stale or replayed).
    TooOld,
}

// ============================================
// ReplayHistory
// ============================================

/// Fixed-capacity, order-agnostic record of accepted sequence numbers.
///
/// # Invariants
/// - Never contains duplicate values
/// - Never exceeds its configured capacity
/// - Slots carry no ordering; eviction always removes the minimum
#[derive(Debug, Clone)]
pub struct ReplayHistory {
    /// Accepted sequence values, in no particular order.
    slots: Vec<u64>,
    /// Maximum number of slots, fixed at construction.
    capacity: usize,
}

impl ReplayHistory {
    /// Creates an empty history with the given capacity.
    ///
    /// Capacities below [`MIN_HISTORY_CAPACITY`] are clamped up.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_HISTORY_CAPACITY);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Checks a received sequence number and records it if acceptable.
    ///
    /// # Arguments
    /// * `sequence` - The sequence number from an authenticated packet
    ///
    /// # Returns
    /// - `Accepted` if the value was recorded
    /// - `Duplicate` if the value was already present
    /// - `TooOld` if the history is full and the value is below its
    ///   current minimum
    pub fn check_and_record(&mut self, sequence: u64) -> ReplayDecision {
        if self.contains(sequence) {
            return ReplayDecision::Duplicate;
        }

        if self.slots.len() < self.capacity {
            self.slots.push(sequence);
            return ReplayDecision::Accepted;
        }

        // History full: evict the minimum, unless the arrival is even
        // older than that.
        let (min_index, min_value) = self.min_slot();
        if sequence < min_value {
            return ReplayDecision::TooOld;
        }
        self.slots[min_index] = sequence;
        ReplayDecision::Accepted
    }

    /// Checks whether a sequence value is currently tracked.
    #[must_use]
    pub fn contains(&self, sequence: u64) -> bool {
        self.slots.iter().any(|&s| s == sequence)
    }

    /// Returns the index and value of the smallest tracked sequence.
    ///
    /// Only called with at least one slot filled.
    fn min_slot(&self) -> (usize, u64) {
        let mut min_index = 0;
        let mut min_value = u64::MAX;
        for (index, &value) in self.slots.iter().enumerate() {
            if value <= min_value {
                min_index = index;
                min_value = value;
            }
        }
        (min_index, min_value)
    }

    /// Returns the number of sequence values currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_fresh_sequences() {
        let mut history = ReplayHistory::new(10);

        for sequence in 0..10 {
            assert_eq!(
                history.check_and_record(sequence),
                ReplayDecision::Accepted,
                "sequence {sequence} should be accepted"
            );
        }
        assert_eq!(history.len(), 10);
    }

    #[test]
    fn test_duplicate_detection() {
        let mut history = ReplayHistory::new(10);

        assert_eq!(history.check_and_record(100), ReplayDecision::Accepted);
        assert_eq!(history.check_and_record(100), ReplayDecision::Duplicate);

        // A duplicate must not consume a slot
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_eviction_removes_minimum() {
        let mut history = ReplayHistory::new(3);

        history.check_and_record(0);
        history.check_and_record(1);
        history.check_and_record(2);

        // Full. Accepting 5 must evict 0.
        assert_eq!(history.check_and_record(5), ReplayDecision::Accepted);
        assert!(!history.contains(0));
        assert!(history.contains(1));
        assert!(history.contains(2));
        assert!(history.contains(5));
    }

    #[test]
    fn test_too_old_below_new_minimum() {
        let mut history = ReplayHistory::new(3);

        for sequence in [0, 1, 2, 5] {
            history.check_and_record(sequence);
        }

        // Tracked: {1, 2, 5}. Zero is below the minimum now.
        assert_eq!(history.check_and_record(0), ReplayDecision::TooOld);
    }

    #[test]
    fn test_out_of_order_within_window() {
        let mut history = ReplayHistory::new(3);

        for sequence in [0, 1, 2, 5] {
            history.check_and_record(sequence);
        }

        // Tracked: {1, 2, 5}. Three was skipped and is above the
        // minimum, so late delivery is fine...
        assert_eq!(history.check_and_record(3), ReplayDecision::Accepted);

        // ...but only once.
        assert_eq!(history.check_and_record(3), ReplayDecision::Duplicate);
    }

    #[test]
    fn test_unordered_arrival() {
        let mut history = ReplayHistory::new(10);

        for sequence in [7, 3, 9, 1, 5] {
            assert_eq!(history.check_and_record(sequence), ReplayDecision::Accepted);
        }
        for sequence in [7, 3, 9, 1, 5] {
            assert_eq!(
                history.check_and_record(sequence),
                ReplayDecision::Duplicate
            );
        }
    }

    #[test]
    fn test_capacity_clamped_to_minimum() {
        let history = ReplayHistory::new(0);
        assert_eq!(history.capacity(), MIN_HISTORY_CAPACITY);
    }

    #[test]
    fn test_capacity_one_tracks_latest_only() {
        let mut history = ReplayHistory::new(1);

        assert_eq!(history.check_and_record(1), ReplayDecision::Accepted);
        assert_eq!(history.check_and_record(2), ReplayDecision::Accepted);
        assert_eq!(history.check_and_record(1), ReplayDecision::TooOld);
        assert_eq!(history.check_and_record(2), ReplayDecision::Duplicate);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut history = ReplayHistory::new(4);

        for sequence in 0..100 {
            history.check_and_record(sequence);
            assert!(history.len() <= 4);
        }
    }
}

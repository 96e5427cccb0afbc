// ============================================
// File: crates/sealgram-core/src/channel/mod.rs
// ============================================
//! # Channel State Machine
//!
//! ## Creation Reason
//! A channel is one side of a keyed, named endpoint pair: it owns the
//! transmit sequence counter, the receive replay history, and the key
//! set for both ciphersuites. The packet codec drives it; it never
//! touches the wire itself.
//!
//! ## Main Functionality
//! - `Channel`: per-channel keys, counters, and replay state
//! - [`replay`]: the fixed-capacity anti-replay history
//! - [`store`]: the concurrent tag→channel registry
//!
//! ## Concurrency Model
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Channel (shared as Arc<Channel>)                            │
//! │  ├─ keys            immutable after construction             │
//! │  ├─ tx sequence     AtomicU64::fetch_add (issued once each)  │
//! │  ├─ replay history  parking_lot::Mutex (short critical path) │
//! │  └─ timestamps      AtomicInstant (advisory, lock-free)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//! Packing and unpacking on the *same* channel serialize only on the
//! counter/window; different channels never contend with each other.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Keys NEVER change in place - rotation is delete + recreate
//! - `check_and_record_sequence` must only run after the packet
//!   authenticated; unauthenticated input must never mutate the window
//! - The counter is never reset; that is what makes AEAD nonces unique
//!
//! ## Last Modified
//! v0.2.0 - Initial channel implementation

pub mod replay;
pub mod store;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use sealgram_common::time::AtomicInstant;
use sealgram_common::types::ChannelTag;

use crate::crypto::ChannelConfig;
use crate::error::{CoreError, Result};
use crate::protocol::mode::WireMode;

use replay::{ReplayDecision, ReplayHistory, DEFAULT_HISTORY_CAPACITY};

// ============================================
// Channel
// ============================================

/// One endpoint's state for a named, keyed channel.
///
/// Shared as `Arc<Channel>`; all methods take `&self` and synchronize
/// internally, so concurrent pack/unpack calls are safe.
pub struct Channel {
    /// Key material for both ciphersuites; immutable once built.
    config: ChannelConfig,
    /// Next sequence value to issue for transmission.
    transmit_sequence: AtomicU64,
    /// Recently accepted receive sequence numbers.
    replay: Mutex<ReplayHistory>,
    /// When a transmit key was last issued (advisory).
    last_transmit: AtomicInstant,
    /// When a packet was last accepted (advisory).
    last_receive: AtomicInstant,
}

impl Channel {
    /// Creates a channel from provisioned keys.
    ///
    /// # Arguments
    /// * `config` - This endpoint's key set (see
    ///   [`ChannelConfig::swapped`] for the peer's)
    /// * `history_capacity` - Replay window size; clamped to at least 1
    #[must_use]
    pub fn new(config: ChannelConfig, history_capacity: usize) -> Self {
        Self {
            config,
            transmit_sequence: AtomicU64::new(0),
            replay: Mutex::new(ReplayHistory::new(history_capacity)),
            last_transmit: AtomicInstant::now(),
            last_receive: AtomicInstant::now(),
        }
    }

    /// Creates a channel with freshly generated random keys and the
    /// default replay history capacity.
    ///
    /// Hand [`Channel::remote_config`] to the peer so it can build the
    /// matching endpoint.
    #[must_use]
    pub fn generate(tag: ChannelTag) -> Self {
        Self::new(ChannelConfig::generate(tag), DEFAULT_HISTORY_CAPACITY)
    }

    /// Returns the channel's tag.
    #[must_use]
    pub fn tag(&self) -> &ChannelTag {
        &self.config.channel_tag
    }

    /// Returns the config the remote endpoint needs: same tag, both
    /// key pairs swapped.
    #[must_use]
    pub fn remote_config(&self) -> ChannelConfig {
        self.config.swapped()
    }

    // ========================================
    // Key Issuance
    // ========================================

    /// Issues the transmit key and the next sequence value for `mode`.
    ///
    /// The returned sequence is the pre-increment counter value; each
    /// value is handed out exactly once, even under concurrent callers.
    ///
    /// # Errors
    /// - `UnsupportedMode` if the channel has no key for `mode` (the
    ///   counter is not consumed in that case)
    pub fn next_transmit_key(&self, mode: WireMode) -> Result<(&[u8], u64)> {
        let key: &[u8] = match mode {
            WireMode::HmacSha256 => self.config.mac_transmit_key.as_bytes(),
            WireMode::ChaCha20Poly1305 => self.config.aead_transmit_key.as_bytes(),
            WireMode::None => return Err(CoreError::unsupported_mode(mode.as_byte())),
        };

        let sequence = self.transmit_sequence.fetch_add(1, Ordering::SeqCst);
        self.last_transmit.touch();
        Ok((key, sequence))
    }

    /// Returns the receive key for `mode`. No side effects.
    ///
    /// # Errors
    /// - `UnsupportedMode` if the channel has no key for `mode`
    pub fn receive_key(&self, mode: WireMode) -> Result<&[u8]> {
        match mode {
            WireMode::HmacSha256 => Ok(self.config.mac_receive_key.as_bytes()),
            WireMode::ChaCha20Poly1305 => Ok(self.config.aead_receive_key.as_bytes()),
            WireMode::None => Err(CoreError::unsupported_mode(mode.as_byte())),
        }
    }

    // ========================================
    // Replay Detection
    // ========================================

    /// Checks a received sequence number against the replay history and
    /// records it if acceptable.
    ///
    /// Must only be called once the packet has passed cryptographic
    /// verification: sequence state must never be mutated by
    /// unauthenticated input.
    ///
    /// # Errors
    /// - `DuplicateSequence` if the value was already accepted
    /// - `SequenceTooOld` if the value is below the tracked window
    pub fn check_and_record_sequence(&self, sequence: u64) -> Result<()> {
        let decision = self.replay.lock().check_and_record(sequence);

        match decision {
            ReplayDecision::Accepted => {
                self.last_receive.touch();
                trace!(channel = %self.tag(), sequence, "Sequence accepted");
                Ok(())
            }
            ReplayDecision::Duplicate => {
                debug!(
                    channel = %self.tag(),
                    sequence,
                    "Replay rejected - sequence already seen"
                );
                Err(CoreError::DuplicateSequence { sequence })
            }
            ReplayDecision::TooOld => {
                debug!(
                    channel = %self.tag(),
                    sequence,
                    "Replay rejected - sequence below window"
                );
                Err(CoreError::SequenceTooOld { sequence })
            }
        }
    }

    // ========================================
    // Introspection
    // ========================================

    /// Replay history capacity this channel was built with.
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        self.replay.lock().capacity()
    }

    /// When a transmit key was last issued. Advisory only.
    #[must_use]
    pub fn last_transmit(&self) -> Instant {
        self.last_transmit.load()
    }

    /// When a packet was last accepted. Advisory only.
    #[must_use]
    pub fn last_receive(&self) -> Instant {
        self.last_receive.load()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("tag", self.tag())
            .field(
                "transmit_sequence",
                &self.transmit_sequence.load(Ordering::Relaxed),
            )
            .field("history_capacity", &self.history_capacity())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

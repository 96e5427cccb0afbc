// ============================================
// File: crates/sealgram-core/src/lib.rs
// ============================================
//! # Sealgram Core - Secure Datagram Envelope Protocol
//!
//! ## Creation Reason
//! Implements a replay-resistant application-layer datagram protocol:
//! an arbitrary serialized object is wrapped in an authenticated (MAC)
//! or encrypted (AEAD) envelope bound to a named channel and a
//! monotonically tracked sequence number. Designed for peer-to-peer or
//! client/server links over lossy transports (e.g. UDP) where both
//! sides pre-share per-channel keys and no handshake runs.
//!
//! ## Main Functionality
//! - [`channel`]: Per-channel key/sequence state and the store registry
//! - [`protocol`]: Wire format - modes, header, pack/unpack codec
//! - [`crypto`]: Primitive adapters (ChaCha20-Poly1305, HMAC-SHA256)
//! - [`dto`]: Wire naming and the MessagePack object serializer
//! - [`error`]: The error taxonomy
//!
//! ## Typical Flow
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Endpoint A                           Endpoint B              │
//! │                                                               │
//! │  Channel::generate(tag) ── remote_config() ──► Channel::new   │
//! │        │                                           │          │
//! │  codec::pack ──────────── datagram ──────────► codec::unpack  │
//! │   (key + seq issued)                      (verify, replay     │
//! │                                            check, extract)    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```
//! use sealgram_core::channel::Channel;
//! use sealgram_core::protocol::{codec, WireMode};
//!
//! // Endpoint A provisions the channel, endpoint B gets swapped keys
//! let a = Channel::generate("Telemetry".parse().unwrap());
//! let b = Channel::new(a.remote_config(), 10);
//!
//! let packet = codec::pack(&a, WireMode::ChaCha20Poly1305, b"ReportDto", b"\x01\x02").unwrap();
//!
//! let opened = codec::unpack(&b, &packet).unwrap();
//! assert_eq!(opened.dto_name().unwrap(), "ReportDto");
//! assert_eq!(opened.payload_bytes(), b"\x01\x02");
//! ```
//!
//! ## Scope
//! Key exchange, channel discovery, retransmission, ordering, and
//! routing are out of scope: the transport above this crate decides
//! what to do with a rejected datagram.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Verification ALWAYS precedes replay-window mutation, which ALWAYS
//!   precedes payload exposure - in every mode, no exceptions
//! - Sequence width (u64), nonce layout, and mode numbering are pinned
//!   compatibility parameters; peers must run matching versions
//!
//! ## Last Modified
//! v0.2.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod crypto;
pub mod dto;
pub mod error;
pub mod protocol;

// Re-export commonly used items at crate root
pub use channel::store::ChannelStore;
pub use channel::Channel;
pub use crypto::ChannelConfig;
pub use dto::WireDto;
pub use error::{CoreError, Result};
pub use protocol::codec::Deserializer;
pub use protocol::WireMode;

// The shared foundation crate, re-exported for downstream convenience
pub use sealgram_common as common;

// ============================================
// File: crates/sealgram-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Centralizes the cryptographic primitives backing the two wire
//! ciphersuites, using audited RustCrypto implementations.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`keys`]: Key types and channel key configuration
//! - [`aead`]: AEAD ciphersuite adapter (ChaCha20-Poly1305)
//! - [`mac`]: MAC ciphersuite adapter (HMAC-SHA256)
//!
//! ## Cryptographic Design
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Pack (transmit)                         │
//! │                                                              │
//! │   transmit key + sequence ──► nonce ──► ChaCha20-Poly1305    │
//! │                                  (or)                        │
//! │   transmit key ──────────────────────► HMAC-SHA256           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//! - **Confidentiality** (AEAD mode): ChaCha20 stream cipher
//! - **Integrity**: Poly1305 tag or HMAC-SHA256 tag
//! - **Header Binding**: the envelope header is authenticated in both
//!   modes (as AEAD associated data, or as part of the MAC input)
//! - **Nonce Uniqueness**: nonces derive from the never-repeating
//!   transmit sequence counter
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL implementations use RustCrypto (audited)
//! - NEVER roll your own crypto
//! - ALL key types implement Zeroize
//! - Never reuse a (key, nonce) pair - the sequence counter must never
//!   be reset or decremented
//!
//! ## Last Modified
//! v0.2.0 - Initial crypto implementation

pub mod aead;
pub mod keys;
pub mod mac;

// Re-export primary types at module level
pub use keys::{AeadKey, ChannelConfig, MacKey};

// ============================================
// Constants
// ============================================

/// Size of a ChaCha20-Poly1305 key in bytes.
pub const AEAD_KEY_SIZE: usize = 32;

/// Size of a ChaCha20-Poly1305 nonce in bytes.
pub const AEAD_NONCE_SIZE: usize = 12;

/// Size of a Poly1305 authentication tag in bytes.
pub const AEAD_TAG_SIZE: usize = 16;

/// Byte offset inside the nonce where the little-endian sequence
/// number is written. Bytes before the offset stay zero.
pub const NONCE_SEQUENCE_OFFSET: usize = 4;

/// Size of an HMAC-SHA256 key in bytes (the SHA-256 input block size).
pub const MAC_KEY_SIZE: usize = 64;

/// Size of an HMAC-SHA256 tag in bytes.
pub const MAC_TAG_SIZE: usize = 32;

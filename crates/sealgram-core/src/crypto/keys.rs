// ============================================
// File: crates/sealgram-core/src/crypto/keys.rs
// ============================================
//! # Cryptographic Key Types
//!
//! ## Creation Reason
//! Defines the per-channel key material with proper security properties
//! (Zeroize on drop, redacted Debug output) and the provisioning
//! structure a pair of endpoints shares before any packet flows.
//!
//! ## Main Functionality
//! - `AeadKey`: 32-byte ChaCha20-Poly1305 key
//! - `MacKey`: 64-byte HMAC-SHA256 key
//! - `ChannelConfig`: one endpoint's complete key set for a channel
//!
//! ## Key Lifecycle
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  ChannelConfig::generate(tag)                              │
//! │  ├─ Draws all four keys from the OS RNG                    │
//! │  ├─ Local endpoint builds its Channel from it              │
//! │  └─ swapped() is sent to the peer over a trusted path      │
//! │                                                            │
//! │  Keys never change after the Channel is constructed        │
//! │  └─ Rotation = delete the channel and provision a new one  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL key types MUST implement Zeroize
//! - Keys should NEVER be logged; Debug prints [REDACTED]
//! - A serialized ChannelConfig contains live key material - it must
//!   only travel over an already-secured provisioning path
//!
//! ## Last Modified
//! v0.2.0 - Initial key type definitions

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use sealgram_common::types::ChannelTag;

use super::{AEAD_KEY_SIZE, MAC_KEY_SIZE};

// ============================================
// Serde Helpers
// ============================================

/// Serializes fixed-size key bytes: base64 string for human-readable
/// formats, raw bytes otherwise.
fn serialize_key_bytes<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&BASE64.encode(bytes))
    } else {
        serializer.serialize_bytes(bytes)
    }
}

/// Deserializes fixed-size key bytes from either representation.
fn deserialize_key_bytes<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bytes = if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(&s).map_err(serde::de::Error::custom)?
    } else {
        <Vec<u8>>::deserialize(deserializer)?
    };
    if bytes.len() != N {
        return Err(serde::de::Error::invalid_length(bytes.len(), &"key bytes"));
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

// ============================================
// AeadKey
// ============================================

/// Symmetric key for the AEAD ciphersuite (ChaCha20-Poly1305).
///
/// # Security
/// - Zeroed on drop
/// - Never logged; `Debug` prints `[REDACTED]`
/// - Generated from the operating system's secure RNG
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AeadKey([u8; AEAD_KEY_SIZE]);

impl AeadKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; AEAD_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generates a new random key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; AEAD_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the raw key bytes.
    ///
    /// # Security Warning
    /// Handle the returned reference carefully. Do not log or store the
    /// key material in unprotected storage.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; AEAD_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        write!(f, "AeadKey([REDACTED])")
    }
}

impl Serialize for AeadKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_key_bytes(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for AeadKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_key_bytes::<D, AEAD_KEY_SIZE>(deserializer).map(Self)
    }
}

// ============================================
// MacKey
// ============================================

/// Symmetric key for the MAC ciphersuite (HMAC-SHA256).
///
/// Sized to the SHA-256 input block (64 bytes) so the HMAC runs without
/// internal key hashing.
///
/// # Security
/// - Zeroed on drop
/// - Never logged; `Debug` prints `[REDACTED]`
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MacKey([u8; MAC_KEY_SIZE]);

impl MacKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; MAC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generates a new random key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; MAC_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the raw key bytes.
    ///
    /// # Security Warning
    /// Handle the returned reference carefully. Do not log or store the
    /// key material in unprotected storage.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        write!(f, "MacKey([REDACTED])")
    }
}

impl Serialize for MacKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_key_bytes(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for MacKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_key_bytes::<D, MAC_KEY_SIZE>(deserializer).map(Self)
    }
}

// ============================================
// ChannelConfig
// ============================================

/// One endpoint's complete key set for a channel.
///
/// # Duplex Pairing
/// A channel connects exactly two endpoints. One side generates a
/// config, keeps it, and hands [`ChannelConfig::swapped`] to the peer:
/// the peer's receive keys are this side's transmit keys and vice
/// versa, for both ciphersuites.
///
/// # Provisioning
/// The struct is serde-serializable so it can be provisioned out of
/// band (bootstrap handshake, configuration file, management API). The
/// serialized form contains live key material and must only travel
/// over an already-secured path.
///
/// # Example
/// ```
/// use sealgram_core::crypto::ChannelConfig;
///
/// let local = ChannelConfig::generate("Voice".parse().unwrap());
/// let remote = local.swapped();
///
/// assert_eq!(
///     local.aead_transmit_key.as_bytes(),
///     remote.aead_receive_key.as_bytes(),
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Tag of the channel these keys belong to.
    pub channel_tag: ChannelTag,
    /// AEAD key used when this endpoint transmits.
    pub aead_transmit_key: AeadKey,
    /// AEAD key used when this endpoint receives.
    pub aead_receive_key: AeadKey,
    /// MAC key used when this endpoint transmits.
    pub mac_transmit_key: MacKey,
    /// MAC key used when this endpoint receives.
    pub mac_receive_key: MacKey,
}

impl ChannelConfig {
    /// Generates a fresh config for `channel_tag` with all four keys
    /// drawn from the OS RNG.
    #[must_use]
    pub fn generate(channel_tag: ChannelTag) -> Self {
        Self {
            channel_tag,
            aead_transmit_key: AeadKey::generate(),
            aead_receive_key: AeadKey::generate(),
            mac_transmit_key: MacKey::generate(),
            mac_receive_key: MacKey::generate(),
        }
    }

    /// Returns the config for the remote endpoint of this channel.
    ///
    /// Swaps the transmit/receive roles of both key pairs so that what
    /// this endpoint sends, the peer can verify and decrypt.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            channel_tag: self.channel_tag.clone(),
            aead_transmit_key: self.aead_receive_key.clone(),
            aead_receive_key: self.aead_transmit_key.clone(),
            mac_transmit_key: self.mac_receive_key.clone(),
            mac_receive_key: self.mac_transmit_key.clone(),
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation_is_random() {
        let k1 = AeadKey::generate();
        let k2 = AeadKey::generate();
        assert_ne!(k1.as_bytes(), k2.as_bytes());

        let m1 = MacKey::generate();
        let m2 = MacKey::generate();
        assert_ne!(m1.as_bytes(), m2.as_bytes());
    }

    #[test]
    fn test_key_debug_redacted() {
        let key = AeadKey::from_bytes([0x42; 32]);
        assert_eq!(format!("{key:?}"), "AeadKey([REDACTED])");

        let key = MacKey::from_bytes([0x42; 64]);
        assert_eq!(format!("{key:?}"), "MacKey([REDACTED])");
    }

    #[test]
    fn test_key_serde_roundtrip() {
        let key = AeadKey::from_bytes([0x17; 32]);
        let json = serde_json::to_string(&key).unwrap();
        let restored: AeadKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());

        // Wrong length must be rejected
        let short = serde_json::to_string(&BASE64.encode([0u8; 16])).unwrap();
        assert!(serde_json::from_str::<AeadKey>(&short).is_err());
    }

    #[test]
    fn test_config_swap_is_symmetric() {
        let local = ChannelConfig::generate("Voice".parse().unwrap());
        let remote = local.swapped();

        assert_eq!(local.channel_tag, remote.channel_tag);
        assert_eq!(
            local.aead_transmit_key.as_bytes(),
            remote.aead_receive_key.as_bytes()
        );
        assert_eq!(
            local.aead_receive_key.as_bytes(),
            remote.aead_transmit_key.as_bytes()
        );
        assert_eq!(
            local.mac_transmit_key.as_bytes(),
            remote.mac_receive_key.as_bytes()
        );

        // Swapping twice gets back the original
        let back = remote.swapped();
        assert_eq!(
            local.aead_transmit_key.as_bytes(),
            back.aead_transmit_key.as_bytes()
        );
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = ChannelConfig::generate("Control".parse().unwrap());
        let json = serde_json::to_string(&config).unwrap();
        let restored: ChannelConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.channel_tag, restored.channel_tag);
        assert_eq!(
            config.aead_transmit_key.as_bytes(),
            restored.aead_transmit_key.as_bytes()
        );
        assert_eq!(
            config.mac_receive_key.as_bytes(),
            restored.mac_receive_key.as_bytes()
        );
    }
}

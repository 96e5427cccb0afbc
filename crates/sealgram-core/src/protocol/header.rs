// ============================================
// File: crates/sealgram-core/src/protocol/header.rs
// ============================================
//! # Envelope Header
//!
//! ## Creation Reason
//! Defines the routing record that opens every packet: which channel
//! the packet belongs to, its sequence number, and its ciphersuite.
//! The header is always readable (it must be, to find the keys) but
//! always authenticated - as AEAD associated data or MAC input.
//!
//! ## Main Functionality
//! - `EnvelopeHeader`: The header record
//! - MessagePack encoding/decoding of the record
//!
//! ## Wire Format
//! The header serializes as a compact MessagePack array
//! `[channel_tag, sequence, mode]` - positional, no field names - and
//! travels behind a little-endian `u16` length prefix.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Field order is the wire contract - DO NOT reorder
//! - `mode` stays a raw byte here so an unknown ciphersuite can be
//!   rejected as `UnsupportedMode` rather than a decode failure
//!
//! ## Last Modified
//! v0.2.0 - Initial header definitions

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

// ============================================
// EnvelopeHeader
// ============================================

/// The routing record at the front of every packet.
///
/// Carries everything a receiver needs before touching the body:
/// the channel to look keys up in, the sequence for replay checking
/// and nonce derivation, and the ciphersuite byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    /// Tag of the channel this packet is bound to.
    pub channel_tag: String,
    /// Transmit sequence number the sender stamped on this packet.
    pub sequence: u64,
    /// Raw ciphersuite byte (see [`crate::protocol::mode::WireMode`]).
    pub mode: u8,
}

impl EnvelopeHeader {
    /// Serializes the header to its MessagePack wire form.
    ///
    /// # Errors
    /// Returns `Encoding` if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| CoreError::encoding("envelope header", e))
    }

    /// Deserializes a header from its MessagePack wire form.
    ///
    /// # Errors
    /// Returns `MalformedPacket` if the bytes don't decode: a header
    /// that can't be read gives us nothing to authenticate against.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes)
            .map_err(|e| CoreError::malformed(format!("header decode failed: {e}")))
    }
}

// ============================================
// Tests
// ============================================

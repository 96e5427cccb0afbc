// ============================================
// File: crates/sealgram-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines the error taxonomy for channel registry, ciphersuite, and
//! packet codec operations. Every failure is surfaced to the immediate
//! caller; this layer never retries and never returns partial results.
//!
//! ## Main Functionality
//! - `CoreError`: Primary error enum for core operations
//! - `Result<T>`: Type alias using `CoreError`
//!
//! ## Error Categories
//! 1. **Registry Errors**: Channel creation, lookup, and binding failures
//! 2. **Crypto Errors**: Authentication and ciphersuite failures
//! 3. **Replay Errors**: Sequence-window rejections
//! 4. **Codec Errors**: Malformed packets, oversized fields, serializer failures
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include key material in error messages
//! - `AuthenticationFailed` deliberately carries no detail: the caller
//!   must not be able to tell how much of a tag matched
//!
//! ## Last Modified
//! v0.2.0 - Initial error definitions

use thiserror::Error;

use sealgram_common::error::CommonError;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Core error types for channel and packet operations.
///
/// # Security Note
/// Error messages are designed to be informative for debugging
/// without revealing sensitive information like key material.
#[derive(Error, Debug)]
pub enum CoreError {
    // ========================================
    // Registry Errors
    // ========================================

    /// A channel with the same tag already exists in the store.
    #[error("Channel '{tag}' already exists in store")]
    DuplicateChannel {
        /// Tag that was already registered
        tag: String,
    },

    /// The requested channel tag is not registered.
    #[error("Channel '{tag}' does not exist in store")]
    UnknownChannel {
        /// Tag that wasn't found
        tag: String,
    },

    /// The packet header names a different channel than the one provided.
    #[error("Packet is bound to channel '{got}', expected '{expected}'")]
    ChannelMismatch {
        /// Tag of the channel the caller supplied
        expected: String,
        /// Tag found in the packet header
        got: String,
    },

    // ========================================
    // Ciphersuite Errors
    // ========================================

    /// Unrecognized or unconfigured ciphersuite mode.
    #[error("Unsupported ciphersuite mode: 0x{mode:02x}")]
    UnsupportedMode {
        /// Wire value of the rejected mode
        mode: u8,
    },

    /// MAC mismatch or AEAD tag verification failure.
    ///
    /// Carries no detail on purpose: the comparison is constant-time and
    /// the error must not leak how much of the tag matched.
    #[error("Packet failed authentication")]
    AuthenticationFailed,

    // ========================================
    // Replay Errors
    // ========================================

    /// The sequence number was already accepted on this channel.
    #[error("Received sequence {sequence} has been duplicated")]
    DuplicateSequence {
        /// The duplicated sequence value
        sequence: u64,
    },

    /// The sequence number is older than everything in the replay window.
    #[error("Received sequence {sequence} is too old")]
    SequenceTooOld {
        /// The stale sequence value
        sequence: u64,
    },

    // ========================================
    // Codec Errors
    // ========================================

    /// A length-prefixed field would overflow its 16-bit encoding.
    #[error("Field '{field}' too large for wire format: {len} bytes, max {max}")]
    OversizedField {
        /// Which field overflowed
        field: &'static str,
        /// Actual length
        len: usize,
        /// Maximum encodable length
        max: usize,
    },

    /// Packet is truncated or its length fields are inconsistent.
    #[error("Malformed packet: {reason}")]
    MalformedPacket {
        /// What's wrong with the packet
        reason: String,
    },

    /// Failed to encode an object into its wire form.
    #[error("Encoding error: {context}")]
    Encoding {
        /// What was being encoded
        context: String,
        /// Error details
        details: String,
    },

    /// Failed to decode an object from its wire form.
    #[error("Decoding error: {context}")]
    Decoding {
        /// What was being decoded
        context: String,
        /// Error details
        details: String,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Error from the common crate.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl CoreError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `DuplicateChannel` error.
    pub fn duplicate_channel(tag: impl Into<String>) -> Self {
        Self::DuplicateChannel { tag: tag.into() }
    }

    /// Creates an `UnknownChannel` error.
    pub fn unknown_channel(tag: impl Into<String>) -> Self {
        Self::UnknownChannel { tag: tag.into() }
    }

    /// Creates a `ChannelMismatch` error.
    pub fn channel_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ChannelMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Creates an `UnsupportedMode` error.
    #[must_use]
    pub const fn unsupported_mode(mode: u8) -> Self {
        Self::UnsupportedMode { mode }
    }

    /// Creates an `OversizedField` error.
    #[must_use]
    pub const fn oversized(field: &'static str, len: usize) -> Self {
        Self::OversizedField {
            field,
            len,
            max: u16::MAX as usize,
        }
    }

    /// Creates a `MalformedPacket` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPacket {
            reason: reason.into(),
        }
    }

    /// Creates an `Encoding` error.
    pub fn encoding(context: impl Into<String>, details: impl ToString) -> Self {
        Self::Encoding {
            context: context.into(),
            details: details.to_string(),
        }
    }

    /// Creates a `Decoding` error.
    pub fn decoding(context: impl Into<String>, details: impl ToString) -> Self {
        Self::Decoding {
            context: context.into(),
            details: details.to_string(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this is a registry/routing error.
    #[must_use]
    pub const fn is_routing_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateChannel { .. }
                | Self::UnknownChannel { .. }
                | Self::ChannelMismatch { .. }
        )
    }

    /// Returns `true` if this is a replay-window rejection.
    #[must_use]
    pub const fn is_replay_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSequence { .. } | Self::SequenceTooOld { .. }
        )
    }

    /// Returns `true` if this error might indicate an attack.
    ///
    /// These errors warrant additional logging/monitoring by the
    /// transport layer that receives them.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::DuplicateSequence { .. }
                | Self::SequenceTooOld { .. }
                | Self::ChannelMismatch { .. }
        )
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::unknown_channel("Voice");
        assert!(err.to_string().contains("Voice"));

        let err = CoreError::oversized("payload", 100_000);
        assert!(err.to_string().contains("payload"));
        assert!(err.to_string().contains("100000"));

        let err = CoreError::unsupported_mode(0x7f);
        assert!(err.to_string().contains("0x7f"));
    }

    #[test]
    fn test_authentication_failure_is_opaque() {
        // The message must not vary with any input
        assert_eq!(
            CoreError::AuthenticationFailed.to_string(),
            "Packet failed authentication"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(CoreError::duplicate_channel("A").is_routing_error());
        assert!(CoreError::channel_mismatch("A", "B").is_routing_error());
        assert!(CoreError::channel_mismatch("A", "B").is_suspicious());

        assert!(CoreError::DuplicateSequence { sequence: 3 }.is_replay_error());
        assert!(CoreError::SequenceTooOld { sequence: 3 }.is_suspicious());

        assert!(CoreError::AuthenticationFailed.is_suspicious());
        assert!(!CoreError::AuthenticationFailed.is_routing_error());
        assert!(!CoreError::malformed("short").is_suspicious());
    }

    #[test]
    fn test_common_error_conversion() {
        let common = CommonError::invalid_input("tag", "empty");
        let core: CoreError = common.into();
        assert!(matches!(core, CoreError::Common(_)));
    }
}

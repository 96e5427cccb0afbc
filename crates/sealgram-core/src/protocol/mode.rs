// ============================================
// File: crates/sealgram-core/src/protocol/mode.rs
// ============================================
//! # Ciphersuite Mode
//!
//! ## Creation Reason
//! Pins the wire-stable identifiers of the envelope ciphersuites. The
//! mode byte travels inside every envelope header and both endpoints
//! must agree on the numbering forever.
//!
//! ## Main Functionality
//! - `WireMode`: Enum of the protection modes a packet can declare
//!
//! ## Wire Values (compatibility contract - never renumber)
//! | Value | Mode | Protection |
//! |-------|------|------------|
//! | 0x00 | None | none - always rejected |
//! | 0x01 | HmacSha256 | integrity only |
//! | 0x02 | ChaCha20Poly1305 | confidentiality + integrity |
//!
//! ## ⚠️ Important Note for Next Developer
//! - Add new modes at the end; NEVER reuse or renumber values
//! - `None` is a recognized wire value but no channel carries keys for
//!   it - packets declaring it fail with `UnsupportedMode`
//!
//! ## Last Modified
//! v0.2.0 - Initial mode definitions

// ============================================
// WireMode
// ============================================

/// Ciphersuite declared by an envelope.
///
/// # Wire Format
/// A single byte inside the serialized envelope header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireMode {
    /// No protection. Recognized for forward compatibility but always
    /// rejected: there is no unprotected ciphersuite.
    None = 0x00,
    /// MAC-only: HMAC-SHA256 tag over the clear envelope.
    HmacSha256 = 0x01,
    /// AEAD: ChaCha20-Poly1305 over the payload, header as AAD.
    ChaCha20Poly1305 = 0x02,
}

impl WireMode {
    /// Converts a byte to a `WireMode`.
    ///
    /// # Returns
    /// - `Some(WireMode)` if the byte is a known mode
    /// - `None` if the byte is unknown
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::None),
            0x01 => Some(Self::HmacSha256),
            0x02 => Some(Self::ChaCha20Poly1305),
            _ => None,
        }
    }

    /// Converts the mode to its wire byte.
    #[must_use]
    pub const fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Checks whether packets can actually be built in this mode.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Checks if this mode encrypts the payload.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::ChaCha20Poly1305)
    }
}

impl TryFrom<u8> for WireMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_byte(value).ok_or(value)
    }
}

impl From<WireMode> for u8 {
    fn from(mode: WireMode) -> Self {
        mode.as_byte()
    }
}

impl std::fmt::Display for WireMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::HmacSha256 => write!(f, "HMAC-SHA256"),
            Self::ChaCha20Poly1305 => write!(f, "ChaCha20-Poly1305"),
        }
    }
}

// ============================================
// Tests
// ============================================

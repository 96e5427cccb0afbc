// ============================================
// File: crates/sealgram-core/src/dto.rs
// ============================================
//! # DTO Wire Naming and Object Serialization
//!
//! ## Creation Reason
//! Every packet carries the wire name of the DTO type inside it so the
//! receiver can dispatch before deserializing. The mapping from a Rust
//! type to its name is an explicit compile-time constant - no runtime
//! reflection, no registry lookups on the hot path.
//!
//! ## Main Functionality
//! - `WireDto`: trait binding a type to its wire name
//! - `encode` / `decode`: the MessagePack object serializer
//!
//! ## Main Logical Flow
//! 1. A DTO type implements `WireDto` with its short wire name
//! 2. `codec::serialize` encodes the value and packs name + payload
//! 3. The receiver reads `dto_name()`, dispatches, calls `dto::<T>()`
//!
//! ## ⚠️ Important Note for Next Developer
//! - Wire names are a compatibility contract between endpoints - treat
//!   a rename like a protocol change
//! - Keep names short; they travel in every packet
//!
//! ## Last Modified
//! v0.2.0 - Initial DTO surface

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

// ============================================
// WireDto
// ============================================

/// Binds a DTO type to the short name identifying it on the wire.
///
/// # Example
/// ```
/// use serde::{Deserialize, Serialize};
/// use sealgram_core::dto::WireDto;
///
/// #[derive(Serialize, Deserialize)]
/// struct HeartbeatDto {
///     uptime_secs: u64,
/// }
///
/// impl WireDto for HeartbeatDto {
///     const WIRE_NAME: &'static str = "Heartbeat";
/// }
///
/// assert_eq!(HeartbeatDto::WIRE_NAME, "Heartbeat");
/// ```
pub trait WireDto {
    /// Short name identifying this DTO type on the wire.
    const WIRE_NAME: &'static str;

    /// Returns the wire name. Convenience for generic code that holds
    /// a value rather than a type.
    #[must_use]
    fn wire_name(&self) -> &'static str {
        Self::WIRE_NAME
    }
}

// ============================================
// Object Serializer
// ============================================

/// Encodes a value to its MessagePack wire form.
///
/// # Errors
/// Returns `Encoding` if serialization fails.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| CoreError::encoding("dto", e))
}

/// Decodes a value from its MessagePack wire form.
///
/// # Errors
/// Returns `Decoding` if the bytes don't deserialize as `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::decoding("dto", e))
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct SampleDto {
        callsign: String,
        counter: u32,
        data: Vec<u8>,
    }

    impl WireDto for SampleDto {
        const WIRE_NAME: &'static str = "Sample";
    }

    #[test]
    fn test_wire_name() {
        let dto = SampleDto {
            callsign: "X".into(),
            counter: 0,
            data: vec![],
        };
        assert_eq!(SampleDto::WIRE_NAME, "Sample");
        assert_eq!(dto.wire_name(), "Sample");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let dto = SampleDto {
            callsign: "SEAL1".into(),
            counter: 42,
            data: vec![9, 8, 7],
        };

        let bytes = encode(&dto).unwrap();
        let restored: SampleDto = decode(&bytes).unwrap();
        assert_eq!(dto, restored);
    }

    #[test]
    fn test_encoding_is_positional() {
        // Compact array form: no field names on the wire
        let dto = SampleDto {
            callsign: "AB".into(),
            counter: 1,
            data: vec![],
        };
        let bytes = encode(&dto).unwrap();
        let contains_field_name = bytes
            .windows(b"callsign".len())
            .any(|window| window == b"callsign");
        assert!(!contains_field_name);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result: Result<SampleDto> = decode(&[0xC1, 0xFF, 0x00]);
        assert!(matches!(result, Err(CoreError::Decoding { .. })));
    }
}

// ============================================
// File: crates/sealgram-core/src/crypto/mac.rs
// ============================================
//! # MAC Ciphersuite Adapter
//!
//! ## Creation Reason
//! Wraps HMAC-SHA256 behind the sign/verify contract the packet codec
//! needs for the MAC-only ciphersuite, where the envelope travels in
//! clear but carries an integrity tag.
//!
//! ## Main Functionality
//! - `sign`: Computes the 32-byte tag over a message
//! - `verify`: Constant-time comparison of a received tag
//!
//! ## Security Properties
//! - **Integrity**: HMAC-SHA256 over the entire length-prefixed envelope
//! - **Timing Safety**: verification uses the Mac trait's constant-time
//!   comparison; a mismatch reveals nothing about how many bytes matched
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER compare tags with `==` - that's a timing oracle
//! - This mode provides no confidentiality; the payload is readable by
//!   anyone on the path
//!
//! ## Last Modified
//! v0.2.0 - Initial MAC adapter

use hmac::{Hmac, Mac};
use sha2::Sha256;

use sealgram_common::error::CommonError;

use super::MAC_TAG_SIZE;
use crate::error::{CoreError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Builds the MAC instance for `key`.
///
/// HMAC accepts keys of any length, so this only fails if the
/// underlying implementation rejects the slice outright.
fn mac_for(key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key)
        .map_err(|_| CommonError::internal("HMAC key rejected").into())
}

/// Computes the HMAC-SHA256 tag over `message`.
///
/// # Arguments
/// * `key` - MAC key (64 bytes as provisioned, any length accepted)
/// * `message` - The bytes to authenticate
///
/// # Returns
/// The 32-byte tag.
pub fn sign(key: &[u8], message: &[u8]) -> Result<[u8; MAC_TAG_SIZE]> {
    let mut mac = mac_for(key)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Verifies a received tag against `message` in constant time.
///
/// # Errors
/// - `AuthenticationFailed` if the tag does not match (including when
///   the received tag has the wrong length)
pub fn verify(key: &[u8], message: &[u8], tag: &[u8]) -> Result<()> {
    let mut mac = mac_for(key)?;
    mac.update(message);
    mac.verify_slice(tag)
        .map_err(|_| CoreError::AuthenticationFailed)
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 64] = [0x42u8; 64];

    #[test]
    fn test_sign_verify_roundtrip() {
        let message = b"length-prefixed envelope bytes";

        let tag = sign(&KEY, message).unwrap();
        assert_eq!(tag.len(), MAC_TAG_SIZE);

        verify(&KEY, message, &tag).unwrap();
    }

    #[test]
    fn test_sign_is_deterministic() {
        let tag1 = sign(&KEY, b"message").unwrap();
        let tag2 = sign(&KEY, b"message").unwrap();
        assert_eq!(tag1, tag2);
    }

    #[test]
    fn test_wrong_key_fails() {
        let tag = sign(&KEY, b"message").unwrap();

        let result = verify(&[0x43u8; 64], b"message", &tag);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_modified_message_fails() {
        let tag = sign(&KEY, b"message").unwrap();

        let result = verify(&KEY, b"messagE", &tag);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let mut tag = sign(&KEY, b"message").unwrap();
        tag[0] ^= 0x01;

        let result = verify(&KEY, b"message", &tag);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_truncated_tag_fails() {
        let tag = sign(&KEY, b"message").unwrap();

        let result = verify(&KEY, b"message", &tag[..16]);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }
}

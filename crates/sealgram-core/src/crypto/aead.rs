// ============================================
// File: crates/sealgram-core/src/crypto/aead.rs
// ============================================
//! # AEAD Ciphersuite Adapter
//!
//! ## Creation Reason
//! Wraps ChaCha20-Poly1305 behind the narrow seal/open contract the
//! packet codec needs: key bytes in, sequence-derived nonce, associated
//! data authenticated alongside the ciphertext.
//!
//! ## Main Functionality
//! - `seal`: Encrypts a plaintext, authenticating it and the AAD
//! - `open`: Decrypts and verifies, allocating the plaintext
//! - `open_into`: Decrypts into a caller-supplied buffer
//! - Nonce construction from the transmit sequence number
//!
//! ## Nonce Construction
//! ```text
//! nonce (12 bytes) = 0x00000000 || sequence (8 bytes LE)
//!                    ▲ offset 0    ▲ offset 4
//! ```
//!
//! ## Security Properties
//! - **AEAD**: Authenticated Encryption with Associated Data
//! - **Nonce Uniqueness**: The transmit sequence is incremented on every
//!   key issuance and never reset, so a (key, nonce) pair never repeats
//!
//! ## ⚠️ Important Note for Next Developer
//! - Never reuse a (key, nonce) pair - catastrophic security failure
//! - A failed `open` must stay indistinguishable from the outside:
//!   every failure maps to `AuthenticationFailed`
//!
//! ## Last Modified
//! v0.2.0 - Initial AEAD adapter

use chacha20poly1305::{
    aead::{Aead, AeadInPlace, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};

use sealgram_common::error::CommonError;

use super::{AEAD_KEY_SIZE, AEAD_NONCE_SIZE, NONCE_SEQUENCE_OFFSET};
use crate::error::{CoreError, Result};

// ============================================
// Nonce Construction
// ============================================

/// Constructs the nonce for a given transmit sequence number.
///
/// # Format
/// ```text
/// nonce[0..4]  = 0x00000000 (padding)
/// nonce[4..12] = sequence (little-endian)
/// ```
fn make_nonce(sequence: u64) -> Nonce {
    let mut nonce = [0u8; AEAD_NONCE_SIZE];
    nonce[NONCE_SEQUENCE_OFFSET..].copy_from_slice(&sequence.to_le_bytes());
    Nonce::from(nonce)
}

/// Builds the cipher, validating the key length.
fn cipher_for(key: &[u8]) -> Result<ChaCha20Poly1305> {
    ChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| CommonError::invalid_length(AEAD_KEY_SIZE, key.len()).into())
}

// ============================================
// Seal / Open
// ============================================

/// Encrypts `plaintext`, authenticating it together with `aad`.
///
/// # Arguments
/// * `key` - 32-byte AEAD key
/// * `sequence` - Transmit sequence number (drives the nonce)
/// * `aad` - Associated data, sent in clear but authenticated
/// * `plaintext` - Data to encrypt
///
/// # Returns
/// Ciphertext with the 16-byte Poly1305 tag appended.
///
/// # Errors
/// - `Common(InvalidLength)` if the key is not 32 bytes
pub fn seal(key: &[u8], sequence: u64, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce = make_nonce(sequence);

    cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CommonError::internal("AEAD encryption failed").into())
}

/// Decrypts `ciphertext` (which includes the trailing tag), verifying
/// it together with `aad`.
///
/// # Errors
/// - `AuthenticationFailed` if the tag does not verify (tampered data,
///   wrong key, wrong nonce, or wrong AAD - deliberately not
///   distinguished)
/// - `Common(InvalidLength)` if the key is not 32 bytes
pub fn open(key: &[u8], sequence: u64, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce = make_nonce(sequence);

    cipher
        .decrypt(
            &nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CoreError::AuthenticationFailed)
}

/// Decrypts into a caller-supplied buffer, avoiding a fresh allocation
/// on the hot path.
///
/// The buffer is cleared, the ciphertext copied in, and decryption runs
/// in place; on success the buffer holds exactly the plaintext.
///
/// # Errors
/// Same as [`open`]. On error the buffer contents are unspecified and
/// must not be read.
pub fn open_into(
    key: &[u8],
    sequence: u64,
    aad: &[u8],
    ciphertext: &[u8],
    buffer: &mut Vec<u8>,
) -> Result<()> {
    let cipher = cipher_for(key)?;
    let nonce = make_nonce(sequence);

    buffer.clear();
    buffer.extend_from_slice(ciphertext);
    cipher
        .decrypt_in_place(&nonce, aad, buffer)
        .map_err(|_| CoreError::AuthenticationFailed)
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AEAD_TAG_SIZE;

    const KEY: [u8; 32] = [0x42u8; 32];

    #[test]
    fn test_seal_open_roundtrip() {
        let aad = b"header bytes";
        let plaintext = b"Hello, Sealgram!";

        let ciphertext = seal(&KEY, 7, aad, plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + AEAD_TAG_SIZE);

        let opened = open(&KEY, 7, aad, &ciphertext).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_different_sequences_produce_different_ciphertext() {
        let plaintext = b"Hello, Sealgram!";

        let ct1 = seal(&KEY, 1, b"", plaintext).unwrap();
        let ct2 = seal(&KEY, 2, b"", plaintext).unwrap();

        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_wrong_key_fails() {
        let ciphertext = seal(&KEY, 1, b"", b"secret").unwrap();

        let result = open(&[0x43u8; 32], 1, b"", &ciphertext);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_sequence_fails() {
        let ciphertext = seal(&KEY, 1, b"", b"secret").unwrap();

        let result = open(&KEY, 2, b"", &ciphertext);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let ciphertext = seal(&KEY, 1, b"header A", b"secret").unwrap();

        let result = open(&KEY, 1, b"header B", &ciphertext);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut ciphertext = seal(&KEY, 1, b"", b"secret").unwrap();
        ciphertext[0] ^= 0xFF;

        let result = open(&KEY, 1, b"", &ciphertext);
        assert!(matches!(result, Err(CoreError::AuthenticationFailed)));
    }

    #[test]
    fn test_open_into_matches_open() {
        let aad = b"aad";
        let ciphertext = seal(&KEY, 9, aad, b"payload bytes").unwrap();

        let allocated = open(&KEY, 9, aad, &ciphertext).unwrap();

        let mut buffer = Vec::new();
        open_into(&KEY, 9, aad, &ciphertext, &mut buffer).unwrap();
        assert_eq!(buffer, allocated);

        // Reusing the buffer works too
        open_into(&KEY, 9, aad, &ciphertext, &mut buffer).unwrap();
        assert_eq!(buffer, allocated);
    }

    #[test]
    fn test_empty_plaintext() {
        let ciphertext = seal(&KEY, 0, b"", b"").unwrap();

        // Just the tag
        assert_eq!(ciphertext.len(), AEAD_TAG_SIZE);

        let opened = open(&KEY, 0, b"", &ciphertext).unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn test_bad_key_length_rejected() {
        let result = seal(&[0u8; 16], 0, b"", b"data");
        assert!(matches!(result, Err(CoreError::Common(_))));
    }

    #[test]
    fn test_nonce_layout() {
        let nonce = make_nonce(0x0102_0304_0506_0708);

        // Four zero bytes, then the sequence little-endian
        let expected: [u8; 12] = [0, 0, 0, 0, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01];
        assert_eq!(nonce.as_slice(), &expected);
    }
}

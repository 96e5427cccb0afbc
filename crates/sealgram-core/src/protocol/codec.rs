// ============================================
// File: crates/sealgram-core/src/protocol/codec.rs
// ============================================
//! # Packet Codec
//!
//! ## Creation Reason
//! Builds and parses the wire envelope: drives the channel's
//! key/sequence operations, selects ciphersuite behavior, and owns the
//! exact byte layout. This is where an off-by-one breaks authentication
//! silently, so every slice is bounds-checked first.
//!
//! ## Wire Format (all integers little-endian)
//! ```text
//! MAC mode:
//!   ┌──────────────┬─────────────┬────────────┬───────────┬───────────────┬──────────────┬──────────┐
//!   │ u16 headerLen│ headerBytes │ u16 nameLen│ nameBytes │ u16 payloadLen│ payloadBytes │ tag (32) │
//!   └──────────────┴─────────────┴────────────┴───────────┴───────────────┴──────────────┴──────────┘
//!   ◄──────────────────── HMAC-SHA256 input ────────────────────────────────────────────►
//!
//! AEAD mode:
//!   ┌──────────────┬─────────────┬──────────────────────────────────────┐
//!   │ u16 headerLen│ headerBytes │ ChaCha20-Poly1305 ciphertext ‖ tag   │
//!   └──────────────┴─────────────┴──────────────────────────────────────┘
//!   ◄───── associated data ────►   decrypts to:
//!                                  [u16 nameLen][nameBytes][u16 payloadLen][payloadBytes]
//! ```
//!
//! ## Processing Order (mandatory, all modes)
//! 1. Cryptographic verification
//! 2. Replay-window mutation
//! 3. Caller access to payload bytes
//!
//! ## ⚠️ Important Note for Next Developer
//! - Always validate buffer lengths before slicing
//! - The sequence check must NEVER move before verification -
//!   unauthenticated input must not mutate channel state
//! - Length prefixes are a wire-compatibility contract: u16,
//!   little-endian, in exactly this order
//!
//! ## Last Modified
//! v0.2.0 - Initial codec implementation

use std::ops::Range;

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::channel::store::ChannelStore;
use crate::channel::Channel;
use crate::crypto::{aead, mac, AEAD_TAG_SIZE, MAC_TAG_SIZE};
use crate::dto::{self, WireDto};
use crate::error::{CoreError, Result};
use crate::protocol::header::EnvelopeHeader;
use crate::protocol::mode::WireMode;

// ============================================
// Constants
// ============================================

/// Size of every length prefix in the envelope.
const LEN_PREFIX_SIZE: usize = 2;

// ============================================
// Parsing Helpers
// ============================================

/// Reads a little-endian `u16` length prefix at `offset`.
fn read_len_prefix(bytes: &[u8], offset: usize, what: &'static str) -> Result<usize> {
    let end = offset
        .checked_add(LEN_PREFIX_SIZE)
        .ok_or_else(|| CoreError::malformed(format!("{what} length prefix offset overflows")))?;
    if bytes.len() < end {
        return Err(CoreError::malformed(format!(
            "truncated {what} length prefix"
        )));
    }
    Ok(u16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as usize)
}

/// Slices `len` bytes starting at `start`, verifying bounds first.
fn checked_slice<'a>(
    bytes: &'a [u8],
    start: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8]> {
    let end = start
        .checked_add(len)
        .ok_or_else(|| CoreError::malformed(format!("{what} length overflows")))?;
    if bytes.len() < end {
        return Err(CoreError::malformed(format!(
            "truncated {what}: need {end} bytes, have {}",
            bytes.len()
        )));
    }
    Ok(&bytes[start..end])
}

/// Validates that a field length fits its 16-bit wire encoding.
fn fit_u16(field: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| CoreError::oversized(field, len))
}

// ============================================
// Pack
// ============================================

/// Packs a named payload into an envelope, appending it to `buf`.
///
/// The zero/low-allocation variant: callers on a hot path reuse one
/// `BytesMut` across packets. Content already in `buf` is left intact.
///
/// # Errors
/// - `UnsupportedMode` if the channel carries no key for `mode`
/// - `OversizedField` if the header, name, or payload exceeds 16 bits
/// - `Encoding` if header serialization fails
pub fn pack_into(
    buf: &mut BytesMut,
    channel: &Channel,
    mode: WireMode,
    name: &[u8],
    payload: &[u8],
) -> Result<()> {
    // Validate field sizes before a sequence value is consumed
    let name_len = fit_u16("dto name", name.len())?;
    let payload_len = fit_u16("dto payload", payload.len())?;

    let (key, sequence) = channel.next_transmit_key(mode)?;

    let header = EnvelopeHeader {
        channel_tag: channel.tag().to_string(),
        sequence,
        mode: mode.as_byte(),
    };
    let header_bytes = header.encode()?;
    let header_len = fit_u16("envelope header", header_bytes.len())?;

    match mode {
        WireMode::HmacSha256 => {
            let start = buf.len();
            buf.reserve(
                LEN_PREFIX_SIZE * 3
                    + header_bytes.len()
                    + name.len()
                    + payload.len()
                    + MAC_TAG_SIZE,
            );
            buf.put_u16_le(header_len);
            buf.put_slice(&header_bytes);
            buf.put_u16_le(name_len);
            buf.put_slice(name);
            buf.put_u16_le(payload_len);
            buf.put_slice(payload);

            // The tag covers everything appended so far
            let tag = mac::sign(key, &buf[start..])?;
            buf.put_slice(&tag);
            Ok(())
        }
        WireMode::ChaCha20Poly1305 => {
            let mut aad = Vec::with_capacity(LEN_PREFIX_SIZE + header_bytes.len());
            aad.extend_from_slice(&header_len.to_le_bytes());
            aad.extend_from_slice(&header_bytes);

            let mut plaintext =
                Vec::with_capacity(LEN_PREFIX_SIZE * 2 + name.len() + payload.len());
            plaintext.extend_from_slice(&name_len.to_le_bytes());
            plaintext.extend_from_slice(name);
            plaintext.extend_from_slice(&payload_len.to_le_bytes());
            plaintext.extend_from_slice(payload);

            let sealed = aead::seal(key, sequence, &aad, &plaintext)?;

            buf.reserve(aad.len() + sealed.len());
            buf.put_slice(&aad);
            buf.put_slice(&sealed);
            Ok(())
        }
        WireMode::None => Err(CoreError::unsupported_mode(mode.as_byte())),
    }
}

/// Packs a named payload into a freshly allocated envelope.
///
/// # Errors
/// See [`pack_into`].
pub fn pack(channel: &Channel, mode: WireMode, name: &[u8], payload: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    pack_into(&mut buf, channel, mode, name, payload)?;
    Ok(buf.freeze())
}

/// Packs a named payload on a tag-addressed channel.
///
/// # Errors
/// - `UnknownChannel` if the tag is not registered
/// - otherwise see [`pack_into`]
pub fn pack_with_store(
    store: &ChannelStore,
    tag: &str,
    mode: WireMode,
    name: &[u8],
    payload: &[u8],
) -> Result<Bytes> {
    let channel = store.get_or_err(tag)?;
    pack(&channel, mode, name, payload)
}

/// Serializes a typed DTO and packs it under its wire name.
///
/// # Errors
/// - `Encoding` if the DTO fails to serialize
/// - otherwise see [`pack_into`]
pub fn serialize<T>(channel: &Channel, mode: WireMode, dto: &T) -> Result<Bytes>
where
    T: WireDto + Serialize,
{
    let payload = dto::encode(dto)?;
    pack(channel, mode, T::WIRE_NAME.as_bytes(), &payload)
}

/// Serializes a typed DTO on a tag-addressed channel.
///
/// # Errors
/// See [`serialize`] and [`pack_with_store`].
pub fn serialize_with_store<T>(
    store: &ChannelStore,
    tag: &str,
    mode: WireMode,
    dto: &T,
) -> Result<Bytes>
where
    T: WireDto + Serialize,
{
    let channel = store.get_or_err(tag)?;
    serialize(&channel, mode, dto)
}

// ============================================
// Unpack
// ============================================

/// Parsed-and-validated front of a packet: everything known before any
/// cryptography runs.
struct Head {
    header: EnvelopeHeader,
    mode: WireMode,
    /// Offset just past the header (= start of the mode-specific body).
    end: usize,
}

/// Reads the length-prefixed header and resolves the ciphersuite.
fn parse_head(bytes: &[u8]) -> Result<Head> {
    let header_len = read_len_prefix(bytes, 0, "header")?;
    let header_bytes = checked_slice(bytes, LEN_PREFIX_SIZE, header_len, "header")?;
    let header = EnvelopeHeader::decode(header_bytes)?;
    let mode = WireMode::from_byte(header.mode)
        .ok_or(CoreError::UnsupportedMode { mode: header.mode })?;
    Ok(Head {
        header,
        mode,
        end: LEN_PREFIX_SIZE + header_len,
    })
}

/// Verifies the packet is bound to the channel the caller expects.
fn check_binding(channel: &Channel, head: &Head) -> Result<()> {
    if head.header.channel_tag != channel.tag().as_str() {
        return Err(CoreError::channel_mismatch(
            channel.tag().as_str(),
            head.header.channel_tag.clone(),
        ));
    }
    Ok(())
}

/// Where the verified body bytes live.
enum Body<'a> {
    /// MAC mode (or caller-buffer AEAD): slices of memory we don't own.
    Borrowed(&'a [u8]),
    /// AEAD mode with internal allocation: the decrypted plaintext.
    Owned(Vec<u8>),
}

impl Body<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Body::Borrowed(bytes) => bytes,
            Body::Owned(bytes) => bytes,
        }
    }
}

/// Locates the name/payload fields inside a length-prefixed body
/// starting at `offset`. Returns the two ranges and the end offset.
fn parse_fields(bytes: &[u8], offset: usize) -> Result<(Range<usize>, Range<usize>, usize)> {
    let name_len = read_len_prefix(bytes, offset, "dto name")?;
    let name_start = offset + LEN_PREFIX_SIZE;
    checked_slice(bytes, name_start, name_len, "dto name")?;

    let payload_len_offset = name_start + name_len;
    let payload_len = read_len_prefix(bytes, payload_len_offset, "dto payload")?;
    let payload_start = payload_len_offset + LEN_PREFIX_SIZE;
    checked_slice(bytes, payload_start, payload_len, "dto payload")?;

    Ok((
        name_start..name_start + name_len,
        payload_start..payload_start + payload_len,
        payload_start + payload_len,
    ))
}

/// Runs verification, the replay check, and body parsing for a packet
/// whose head is already resolved and whose channel binding is checked.
fn open_envelope<'a>(
    channel: &Channel,
    head: Head,
    bytes: &'a [u8],
    scratch: Option<&'a mut Vec<u8>>,
) -> Result<Deserializer<'a>> {
    let sequence = head.header.sequence;

    match head.mode {
        WireMode::HmacSha256 => {
            // Locate the fields to find where the signed region ends.
            // Nothing is exposed until the tag verifies.
            let (name_range, payload_range, signed_end) = parse_fields(bytes, head.end)?;

            let tag = &bytes[signed_end..];
            if tag.len() != MAC_TAG_SIZE {
                return Err(CoreError::malformed(format!(
                    "MAC tag must be {MAC_TAG_SIZE} bytes, found {}",
                    tag.len()
                )));
            }

            let key = channel.receive_key(head.mode)?;
            mac::verify(key, &bytes[..signed_end], tag)?;
            channel.check_and_record_sequence(sequence)?;

            Ok(Deserializer {
                header: head.header,
                mode: head.mode,
                body: Body::Borrowed(bytes),
                name_range,
                payload_range,
            })
        }
        WireMode::ChaCha20Poly1305 => {
            let aad = &bytes[..head.end];
            let ciphertext = &bytes[head.end..];
            if ciphertext.len() < AEAD_TAG_SIZE {
                return Err(CoreError::malformed(format!(
                    "AEAD body must be at least {AEAD_TAG_SIZE} bytes, found {}",
                    ciphertext.len()
                )));
            }

            let key = channel.receive_key(head.mode)?;
            let body = match scratch {
                Some(buffer) => {
                    aead::open_into(key, sequence, aad, ciphertext, &mut *buffer)?;
                    Body::Borrowed(&buffer[..])
                }
                None => Body::Owned(aead::open(key, sequence, aad, ciphertext)?),
            };
            channel.check_and_record_sequence(sequence)?;

            let (name_range, payload_range, _) = parse_fields(body.as_slice(), 0)?;

            Ok(Deserializer {
                header: head.header,
                mode: head.mode,
                body,
                name_range,
                payload_range,
            })
        }
        WireMode::None => Err(CoreError::unsupported_mode(head.mode.as_byte())),
    }
}

/// Unpacks a packet against a directly held channel.
///
/// The header's channel tag must match the channel exactly; this binds
/// the packet to the caller's expected peer even without a store.
///
/// # Errors
/// - `MalformedPacket` for truncation or inconsistent length fields
/// - `ChannelMismatch` if the packet is bound to another channel
/// - `UnsupportedMode` for an unrecognized or keyless ciphersuite
/// - `AuthenticationFailed` if verification fails
/// - `DuplicateSequence` / `SequenceTooOld` from the replay window
pub fn unpack<'a>(channel: &Channel, bytes: &'a [u8]) -> Result<Deserializer<'a>> {
    let head = parse_head(bytes)?;
    check_binding(channel, &head)?;
    open_envelope(channel, head, bytes, None)
}

/// Unpacks against a directly held channel, decrypting into a
/// caller-supplied buffer (AEAD mode) instead of allocating.
///
/// In MAC mode the buffer is untouched. On error the buffer contents
/// are unspecified and must not be read.
///
/// # Errors
/// See [`unpack`].
pub fn unpack_into<'a>(
    channel: &Channel,
    bytes: &'a [u8],
    scratch: &'a mut Vec<u8>,
) -> Result<Deserializer<'a>> {
    let head = parse_head(bytes)?;
    check_binding(channel, &head)?;
    open_envelope(channel, head, bytes, Some(scratch))
}

/// Unpacks a packet, resolving its channel from the store by the tag
/// carried in the header.
///
/// # Errors
/// - `UnknownChannel` if the header names an unregistered tag
/// - otherwise see [`unpack`]
pub fn unpack_with_store<'a>(
    store: &ChannelStore,
    bytes: &'a [u8],
) -> Result<Deserializer<'a>> {
    let head = parse_head(bytes)?;
    let channel = store.get_or_err(&head.header.channel_tag)?;
    open_envelope(&channel, head, bytes, None)
}

/// Store-resolved variant of [`unpack_into`].
///
/// # Errors
/// See [`unpack_with_store`].
pub fn unpack_into_with_store<'a>(
    store: &ChannelStore,
    bytes: &'a [u8],
    scratch: &'a mut Vec<u8>,
) -> Result<Deserializer<'a>> {
    let head = parse_head(bytes)?;
    let channel = store.get_or_err(&head.header.channel_tag)?;
    open_envelope(&channel, head, bytes, Some(scratch))
}

// ============================================
// Deserializer
// ============================================

/// A fully verified, replay-checked packet, ready for payload
/// extraction.
///
/// Only constructed after authentication and the sequence check have
/// both passed; holding one is proof the packet was accepted.
pub struct Deserializer<'a> {
    header: EnvelopeHeader,
    mode: WireMode,
    body: Body<'a>,
    name_range: Range<usize>,
    payload_range: Range<usize>,
}

impl Deserializer<'_> {
    /// Tag of the channel this packet was accepted on.
    #[must_use]
    pub fn channel_tag(&self) -> &str {
        &self.header.channel_tag
    }

    /// Sequence number the sender stamped on this packet.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.header.sequence
    }

    /// Ciphersuite the packet used.
    #[must_use]
    pub fn mode(&self) -> WireMode {
        self.mode
    }

    /// Raw bytes of the DTO wire name.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        &self.body.as_slice()[self.name_range.clone()]
    }

    /// The DTO wire name as text.
    ///
    /// # Errors
    /// Returns `Decoding` if the name is not valid UTF-8.
    pub fn dto_name(&self) -> Result<&str> {
        std::str::from_utf8(self.name_bytes())
            .map_err(|e| CoreError::decoding("dto name", e))
    }

    /// Raw bytes of the serialized DTO payload.
    #[must_use]
    pub fn payload_bytes(&self) -> &[u8] {
        &self.body.as_slice()[self.payload_range.clone()]
    }

    /// Decodes the payload into a typed DTO.
    ///
    /// # Errors
    /// Returns `Decoding` if the payload doesn't deserialize as `T`.
    pub fn dto<T: DeserializeOwned>(&self) -> Result<T> {
        dto::decode(self.payload_bytes())
    }
}

impl std::fmt::Debug for Deserializer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deserializer")
            .field("channel_tag", &self.header.channel_tag)
            .field("sequence", &self.header.sequence)
            .field("mode", &self.mode)
            .field("payload_len", &self.payload_range.len())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

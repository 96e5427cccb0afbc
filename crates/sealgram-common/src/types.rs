// ============================================
// File: crates/sealgram-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes the channel identifier type so every crate agrees on its
//! validation rules and serialized form.
//!
//! ## Main Functionality
//! - `ChannelTag`: Validated UTF-8 name of a logical channel
//!
//! ## Main Logical Flow
//! 1. Tags are created when a channel is provisioned
//! 2. Used as keys in the channel store registry
//! 3. Serialized into every envelope header for routing/binding checks
//!
//! ## ⚠️ Important Note for Next Developer
//! - The tag travels in the envelope header, whose serialized form must
//!   fit a 16-bit length prefix - keep `MAX_CHANNEL_TAG_LEN` well below that
//! - Tags are immutable after creation; renaming a channel means
//!   deleting and recreating it
//!
//! ## Last Modified
//! v0.2.0 - Initial type definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================
// Constants
// ============================================

/// Maximum length of a channel tag in bytes (UTF-8 encoded).
pub const MAX_CHANNEL_TAG_LEN: usize = 255;

// ============================================
// ChannelTag Error Type
// ============================================

/// Error type for `ChannelTag` validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelTagError {
    /// The tag string was empty.
    #[error("Channel tag must not be empty")]
    Empty,

    /// The tag string exceeded the maximum length.
    #[error("Channel tag too long: {actual} bytes, max {max}")]
    TooLong {
        /// Actual encoded length
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}

// ============================================
// ChannelTag
// ============================================

/// Validated UTF-8 identifier of a logical channel.
///
/// # Properties
/// - Non-empty, at most [`MAX_CHANNEL_TAG_LEN`] bytes
/// - Unique within a channel store
/// - Immutable after creation
/// - Serialized into the envelope header of every packet, where it binds
///   the packet to the channel it was built for
///
/// # Example
/// ```
/// use sealgram_common::types::ChannelTag;
///
/// let tag: ChannelTag = "Benchmark".parse().unwrap();
/// assert_eq!(tag.as_str(), "Benchmark");
/// assert!("".parse::<ChannelTag>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelTag(String);

impl ChannelTag {
    /// Creates a new `ChannelTag` from a string.
    ///
    /// # Arguments
    /// * `tag` - The channel name; non-empty, at most
    ///   [`MAX_CHANNEL_TAG_LEN`] bytes of UTF-8
    ///
    /// # Errors
    /// Returns `ChannelTagError` if the string is empty or too long.
    pub fn new(tag: impl Into<String>) -> Result<Self, ChannelTagError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(ChannelTagError::Empty);
        }
        if tag.len() > MAX_CHANNEL_TAG_LEN {
            return Err(ChannelTagError::TooLong {
                actual: tag.len(),
                max: MAX_CHANNEL_TAG_LEN,
            });
        }
        Ok(Self(tag))
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the tag's UTF-8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ChannelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelTag {
    type Err = ChannelTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelTag {
    type Error = ChannelTagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelTag> for String {
    fn from(tag: ChannelTag) -> Self {
        tag.0
    }
}

impl AsRef<str> for ChannelTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets map keyed by ChannelTag be queried with a plain &str.
impl std::borrow::Borrow<str> for ChannelTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ChannelTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ChannelTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================
// Tests
// ============================================

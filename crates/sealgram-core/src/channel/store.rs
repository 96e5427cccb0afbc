// ============================================
// File: crates/sealgram-core/src/channel/store.rs
// ============================================
//! # Channel Store
//!
//! ## Creation Reason
//! Servers talk to many peers at once and address them by channel tag.
//! The store is the concurrent registry that owns every channel,
//! serializes create/delete per tag, and resolves tags for callers
//! that don't hold a channel handle.
//!
//! ## Main Functionality
//! - `ChannelStore`: tag → channel registry
//! - Failing and non-failing lookup/delete variants
//! - Key/sequence pass-throughs for tag-addressed callers
//!
//! ## Concurrency
//! Channels live in a `DashMap` behind `Arc`, so:
//! - create/delete on the same tag serialize on the map shard
//! - a create/delete race can never expose a half-initialized entry
//!   (insertion goes through the entry API, fully constructed)
//! - operations on different channels never contend
//! - deleting a tag while another thread unpacks on its `Arc` is safe;
//!   the channel is dropped when the last handle goes away
//!
//! ## ⚠️ Important Note for Next Developer
//! - One channel instance per tag - `create` on an existing tag is an
//!   error, it does NOT rotate keys in place
//! - Key rotation = `delete` + `create` with a fresh config
//!
//! ## Last Modified
//! v0.2.0 - Initial store implementation

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};
use zeroize::Zeroizing;

use sealgram_common::types::ChannelTag;

use super::replay::DEFAULT_HISTORY_CAPACITY;
use super::Channel;
use crate::crypto::ChannelConfig;
use crate::error::{CoreError, Result};
use crate::protocol::mode::WireMode;

// ============================================
// ChannelStore
// ============================================

/// Concurrent registry mapping channel tags to channels.
#[derive(Default)]
pub struct ChannelStore {
    channels: DashMap<ChannelTag, Arc<Channel>>,
}

impl ChannelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    // ========================================
    // Creation / Deletion
    // ========================================

    /// Creates and registers a channel with the default replay history
    /// capacity.
    ///
    /// # Errors
    /// Returns `DuplicateChannel` if the tag is already registered.
    pub fn create(&self, config: ChannelConfig) -> Result<Arc<Channel>> {
        self.create_with_history(config, DEFAULT_HISTORY_CAPACITY)
    }

    /// Creates and registers a channel with an explicit replay history
    /// capacity.
    ///
    /// # Errors
    /// Returns `DuplicateChannel` if the tag is already registered.
    pub fn create_with_history(
        &self,
        config: ChannelConfig,
        history_capacity: usize,
    ) -> Result<Arc<Channel>> {
        let tag = config.channel_tag.clone();
        match self.channels.entry(tag) {
            Entry::Occupied(entry) => {
                Err(CoreError::duplicate_channel(entry.key().as_str()))
            }
            Entry::Vacant(entry) => {
                let channel = Arc::new(Channel::new(config, history_capacity));
                info!(
                    channel = %channel.tag(),
                    history_capacity = channel.history_capacity(),
                    "Channel created"
                );
                entry.insert(Arc::clone(&channel));
                Ok(channel)
            }
        }
    }

    /// Removes a channel.
    ///
    /// # Errors
    /// Returns `UnknownChannel` if the tag is not registered.
    pub fn delete(&self, tag: &str) -> Result<()> {
        match self.channels.remove(tag) {
            Some((tag, _)) => {
                info!(channel = %tag, "Channel deleted");
                Ok(())
            }
            None => Err(CoreError::unknown_channel(tag)),
        }
    }

    /// Removes a channel if it exists. Never fails.
    ///
    /// # Returns
    /// `true` if a channel was removed.
    pub fn delete_if_exists(&self, tag: &str) -> bool {
        let removed = self.channels.remove(tag).is_some();
        if removed {
            info!(channel = %tag, "Channel deleted");
        } else {
            debug!(channel = %tag, "Delete skipped - channel not registered");
        }
        removed
    }

    // ========================================
    // Lookup
    // ========================================

    /// Looks up a channel by tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Arc<Channel>> {
        self.channels.get(tag).map(|entry| Arc::clone(entry.value()))
    }

    /// Looks up a channel by tag, failing if absent.
    ///
    /// # Errors
    /// Returns `UnknownChannel` if the tag is not registered.
    pub fn get_or_err(&self, tag: &str) -> Result<Arc<Channel>> {
        self.get(tag).ok_or_else(|| CoreError::unknown_channel(tag))
    }

    /// Returns the number of registered channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no channels are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Returns the tags of all registered channels.
    #[must_use]
    pub fn tags(&self) -> Vec<ChannelTag> {
        self.channels.iter().map(|entry| entry.key().clone()).collect()
    }

    // ========================================
    // Tag-Addressed Pass-Throughs
    // ========================================

    /// Issues the transmit key and sequence for a tag-addressed channel.
    ///
    /// The key bytes are copied out (and zeroed when dropped) because
    /// the channel handle doesn't outlive this call. Callers on a hot
    /// path should hold the `Arc<Channel>` and use it directly.
    ///
    /// # Errors
    /// - `UnknownChannel` if the tag is not registered
    /// - `UnsupportedMode` if the channel has no key for `mode`
    pub fn next_transmit_key_for(
        &self,
        tag: &str,
        mode: WireMode,
    ) -> Result<(Zeroizing<Vec<u8>>, u64)> {
        let channel = self.get_or_err(tag)?;
        let (key, sequence) = channel.next_transmit_key(mode)?;
        Ok((Zeroizing::new(key.to_vec()), sequence))
    }

    /// Returns the receive key for a tag-addressed channel.
    ///
    /// # Errors
    /// - `UnknownChannel` if the tag is not registered
    /// - `UnsupportedMode` if the channel has no key for `mode`
    pub fn receive_key_for(&self, tag: &str, mode: WireMode) -> Result<Zeroizing<Vec<u8>>> {
        let channel = self.get_or_err(tag)?;
        let key = channel.receive_key(mode)?;
        Ok(Zeroizing::new(key.to_vec()))
    }

    /// Runs the replay check for a tag-addressed channel.
    ///
    /// # Errors
    /// - `UnknownChannel` if the tag is not registered
    /// - `DuplicateSequence` / `SequenceTooOld` from the replay window
    pub fn check_sequence_for(&self, tag: &str, sequence: u64) -> Result<()> {
        self.get_or_err(tag)?.check_and_record_sequence(sequence)
    }
}

impl std::fmt::Debug for ChannelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelStore")
            .field("channels", &self.len())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tag: &str) -> ChannelConfig {
        ChannelConfig::generate(tag.parse().unwrap())
    }

    #[test]
    fn test_create_and_get() {
        let store = ChannelStore::new();
        assert!(store.is_empty());

        let channel = store.create(config("Voice")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(channel.tag().as_str(), "Voice");

        let looked_up = store.get("Voice").unwrap();
        assert!(Arc::ptr_eq(&channel, &looked_up));
        assert!(store.get("Data").is_none());
    }

    #[test]
    fn test_duplicate_create_rejected() {
        let store = ChannelStore::new();
        store.create(config("Voice")).unwrap();

        let result = store.create(config("Voice"));
        assert!(matches!(result, Err(CoreError::DuplicateChannel { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete() {
        let store = ChannelStore::new();
        store.create(config("Voice")).unwrap();

        store.delete("Voice").unwrap();
        assert!(store.is_empty());

        assert!(matches!(
            store.delete("Voice"),
            Err(CoreError::UnknownChannel { .. })
        ));
    }

    #[test]
    fn test_delete_if_exists_never_fails() {
        let store = ChannelStore::new();
        store.create(config("Voice")).unwrap();

        assert!(store.delete_if_exists("Voice"));
        assert!(!store.delete_if_exists("Voice"));
    }

    #[test]
    fn test_get_or_err() {
        let store = ChannelStore::new();

        assert!(matches!(
            store.get_or_err("Missing"),
            Err(CoreError::UnknownChannel { .. })
        ));

        store.create(config("Present")).unwrap();
        assert!(store.get_or_err("Present").is_ok());
    }

    #[test]
    fn test_recreate_after_delete_rotates_keys() {
        let store = ChannelStore::new();
        let first = store.create(config("Voice")).unwrap();
        let first_key = first
            .receive_key(WireMode::ChaCha20Poly1305)
            .unwrap()
            .to_vec();

        store.delete("Voice").unwrap();
        let second = store.create(config("Voice")).unwrap();
        let second_key = second.receive_key(WireMode::ChaCha20Poly1305).unwrap();

        assert_ne!(first_key, second_key);
    }

    #[test]
    fn test_pass_throughs() {
        let store = ChannelStore::new();
        store.create(config("Voice")).unwrap();

        let (key, sequence) = store
            .next_transmit_key_for("Voice", WireMode::ChaCha20Poly1305)
            .unwrap();
        assert_eq!(key.len(), crate::crypto::AEAD_KEY_SIZE);
        assert_eq!(sequence, 0);

        let (_, sequence) = store
            .next_transmit_key_for("Voice", WireMode::ChaCha20Poly1305)
            .unwrap();
        assert_eq!(sequence, 1);

        let rx = store.receive_key_for("Voice", WireMode::HmacSha256).unwrap();
        assert_eq!(rx.len(), crate::crypto::MAC_KEY_SIZE);

        store.check_sequence_for("Voice", 0).unwrap();
        assert!(matches!(
            store.check_sequence_for("Voice", 0),
            Err(CoreError::DuplicateSequence { .. })
        ));

        assert!(matches!(
            store.check_sequence_for("Missing", 0),
            Err(CoreError::UnknownChannel { .. })
        ));
    }

    #[test]
    fn test_tags_lists_registered_channels() {
        let store = ChannelStore::new();
        store.create(config("A")).unwrap();
        store.create(config("B")).unwrap();

        let mut tags = store.tags();
        tags.sort();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].as_str(), "A");
        assert_eq!(tags[1].as_str(), "B");
    }

    #[test]
    fn test_concurrent_create_single_winner() {
        let store = Arc::new(ChannelStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.create(config("Contested")).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        // Exactly one creation may succeed; the entry is fully usable
        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
        store.get_or_err("Contested").unwrap();
    }

    #[test]
    fn test_delete_while_handle_alive() {
        let store = ChannelStore::new();
        let channel = store.create(config("Voice")).unwrap();

        store.delete("Voice").unwrap();

        // The held Arc keeps working after removal from the registry
        let (_, sequence) = channel.next_transmit_key(WireMode::HmacSha256).unwrap();
        assert_eq!(sequence, 0);
    }
}

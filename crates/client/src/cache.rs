//! Channel message read cache
//!
//! A short-TTL, process-local cache of the most recent message page per
//! channel. Reads within the TTL window return the cached snapshot without
//! touching storage; stale or absent entries run the supplied loader and
//! repopulate. Entries are immutable value snapshots, so a redundant refresh
//! race simply means the last writer wins.
//!
//! The cache is constructed once per session and passed by reference; there
//! is no ambient static state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use banter_core::{ChannelId, MessageView, Result};
use tracing::debug;

/// How long a snapshot counts as fresh. Tuning parameter: balances read
/// amplification against staleness after sends from other users.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Maximum number of channel snapshots kept before the oldest is evicted
pub const DEFAULT_CAPACITY: usize = 256;

struct CacheEntry {
    messages: Vec<MessageView>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Per-channel read cache for message pages
pub struct MessageCache {
    entries: HashMap<ChannelId, CacheEntry>,
    ttl: Duration,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity: DEFAULT_CAPACITY,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the channel's page, consulting storage only when the cached
    /// snapshot is absent or stale.
    pub fn get_or_load<F>(&mut self, channel_id: &ChannelId, load: F) -> Result<Vec<MessageView>>
    where
        F: FnOnce() -> Result<Vec<MessageView>>,
    {
        if let Some(entry) = self.entries.get(channel_id) {
            if entry.is_fresh(self.ttl) {
                self.hits += 1;
                return Ok(entry.messages.clone());
            }
        }

        self.misses += 1;
        let messages = load()?;
        self.insert(channel_id.clone(), messages.clone());
        Ok(messages)
    }

    /// The last snapshot regardless of age. Used as a degraded fallback when
    /// a refresh fails and for timeout recovery on the read path.
    pub fn peek(&self, channel_id: &ChannelId) -> Option<&[MessageView]> {
        self.entries.get(channel_id).map(|e| e.messages.as_slice())
    }

    /// Drop a channel's snapshot so the next read goes to storage.
    /// Called as write-through after a local send.
    pub fn invalidate(&mut self, channel_id: &ChannelId) {
        self.entries.remove(channel_id);
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    fn insert(&mut self, channel_id: ChannelId, messages: Vec<MessageView>) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&channel_id) {
            // Evict the oldest snapshot to stay within capacity
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(id, _)| id.clone())
            {
                debug!(channel_id = %oldest, "Evicting oldest cache entry");
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            channel_id,
            CacheEntry {
                messages,
                fetched_at: Instant::now(),
            },
        );
    }
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_core::Error;
    use chrono::Utc;
    use uuid::Uuid;

    fn view(content: &str, channel_id: &ChannelId) -> MessageView {
        MessageView {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author_id: Uuid::new_v4(),
            author_name: Some("Alice".to_string()),
            channel_id: channel_id.clone(),
            parent_id: None,
            is_edited: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_entry_skips_loader() {
        let mut cache = MessageCache::with_ttl(Duration::from_secs(60));
        let channel = ChannelId::random();
        let mut loads = 0;

        for _ in 0..3 {
            let page = cache
                .get_or_load(&channel, || {
                    loads += 1;
                    Ok(vec![view("hello", &channel)])
                })
                .unwrap();
            assert_eq!(page.len(), 1);
        }

        assert_eq!(loads, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_stale_entry_reloads() {
        let mut cache = MessageCache::with_ttl(Duration::from_millis(10));
        let channel = ChannelId::random();
        let mut loads = 0;

        cache
            .get_or_load(&channel, || {
                loads += 1;
                Ok(vec![])
            })
            .unwrap();

        std::thread::sleep(Duration::from_millis(20));

        cache
            .get_or_load(&channel, || {
                loads += 1;
                Ok(vec![view("new", &channel)])
            })
            .unwrap();

        assert_eq!(loads, 2);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut cache = MessageCache::with_ttl(Duration::from_secs(60));
        let channel = ChannelId::random();
        let mut loads = 0;

        cache
            .get_or_load(&channel, || {
                loads += 1;
                Ok(vec![])
            })
            .unwrap();
        cache.invalidate(&channel);
        cache
            .get_or_load(&channel, || {
                loads += 1;
                Ok(vec![])
            })
            .unwrap();

        assert_eq!(loads, 2);
    }

    #[test]
    fn test_loader_error_leaves_previous_snapshot_peekable() {
        let mut cache = MessageCache::with_ttl(Duration::from_millis(10));
        let channel = ChannelId::random();

        cache
            .get_or_load(&channel, || Ok(vec![view("kept", &channel)]))
            .unwrap();

        std::thread::sleep(Duration::from_millis(20));

        let err = cache.get_or_load(&channel, || {
            Err(Error::ChannelUnavailable("storage down".to_string()))
        });
        assert!(err.is_err());

        let snapshot = cache.peek(&channel).unwrap();
        assert_eq!(snapshot[0].content, "kept");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = MessageCache::with_ttl(Duration::from_secs(60));
        cache.capacity = 2;

        let first = ChannelId::random();
        let second = ChannelId::random();
        let third = ChannelId::random();

        cache.get_or_load(&first, || Ok(vec![])).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        cache.get_or_load(&second, || Ok(vec![])).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        cache.get_or_load(&third, || Ok(vec![])).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.peek(&first).is_none());
        assert!(cache.peek(&third).is_some());
    }
}

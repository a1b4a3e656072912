//! Unread and mention tracking
//!
//! Per-channel and per-DM-peer unread counters, a has-mention flag per
//! channel, and an independent per-message read set for unread highlighting.
//! The whole state persists as JSON in the client's data directory under a
//! namespaced file, loaded on startup and written after every mutation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use banter_core::ChannelId;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// File name within the client data directory
pub const STATE_FILE: &str = "unread-state.json";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct UnreadState {
    channel_unreads: HashMap<ChannelId, u32>,
    dm_unreads: HashMap<Uuid, u32>,
    channel_mentions: HashMap<ChannelId, bool>,
    read_messages: HashSet<Uuid>,
}

/// Client-persisted unread/mention counters
pub struct UnreadTracker {
    state: UnreadState,
    path: Option<PathBuf>,
}

impl UnreadTracker {
    /// Tracker without persistence (tests, throwaway sessions)
    pub fn in_memory() -> Self {
        Self {
            state: UnreadState::default(),
            path: None,
        }
    }

    /// Load persisted state, falling back to empty on a missing or
    /// unreadable file. Unread counts are best-effort client state; losing
    /// them must never fail startup.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt unread state, starting empty");
                    UnreadState::default()
                }
            },
            Err(_) => UnreadState::default(),
        };
        Self {
            state,
            path: Some(path),
        }
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        let write = || -> banter_core::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&self.state)?;
            std::fs::write(path, json)?;
            Ok(())
        };
        if let Err(e) = write() {
            warn!(path = %path.display(), error = %e, "Failed to persist unread state");
        }
    }

    /// A new top-level message arrived in a channel the viewer is not
    /// looking at
    pub fn increment_channel_unread(&mut self, channel_id: &ChannelId, has_mention: bool) {
        *self
            .state
            .channel_unreads
            .entry(channel_id.clone())
            .or_insert(0) += 1;
        if has_mention {
            self.state
                .channel_mentions
                .insert(channel_id.clone(), true);
        }
        self.save();
    }

    /// A new direct message arrived from a peer whose conversation is not
    /// in focus
    pub fn increment_dm_unread(&mut self, peer_id: Uuid) {
        *self.state.dm_unreads.entry(peer_id).or_insert(0) += 1;
        self.save();
    }

    /// Viewing a channel resets its counter and clears its mention flag
    pub fn mark_channel_read(&mut self, channel_id: &ChannelId) {
        self.state.channel_unreads.insert(channel_id.clone(), 0);
        self.state
            .channel_mentions
            .insert(channel_id.clone(), false);
        self.save();
    }

    /// Viewing a direct conversation resets the peer's counter
    pub fn mark_dm_read(&mut self, peer_id: Uuid) {
        self.state.dm_unreads.insert(peer_id, 0);
        self.save();
    }

    /// Per-message read state, independent of the aggregate counters
    pub fn mark_message_read(&mut self, message_id: Uuid) {
        if self.state.read_messages.insert(message_id) {
            self.save();
        }
    }

    pub fn is_message_read(&self, message_id: Uuid) -> bool {
        self.state.read_messages.contains(&message_id)
    }

    pub fn channel_unread(&self, channel_id: &ChannelId) -> u32 {
        self.state
            .channel_unreads
            .get(channel_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn dm_unread(&self, peer_id: Uuid) -> u32 {
        self.state.dm_unreads.get(&peer_id).copied().unwrap_or(0)
    }

    pub fn has_mention(&self, channel_id: &ChannelId) -> bool {
        self.state
            .channel_mentions
            .get(channel_id)
            .copied()
            .unwrap_or(false)
    }

    /// Wipe everything (sign-out, workspace switch)
    pub fn reset(&mut self) {
        self.state = UnreadState::default();
        self.save();
    }
}

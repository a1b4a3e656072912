//! Chat operations on a session
//!
//! Opening channels and direct conversations, optimistic sends, and unread
//! accounting. Reads prefer graceful degradation (cached snapshot, empty
//! list); writes always surface failures so the caller can retry with the
//! restored draft.

use banter_core::{
    contains_mention, ensure_direct_channel, invariants, Channel, ChannelId, Error, Message,
    MessageView, Result, DEFAULT_PAGE_SIZE,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::outbox::{merge_timeline, TimelineItem};
use crate::session::Session;

impl Session {
    /// Focus a channel and return its timeline, oldest first.
    /// Viewing resets the channel's unread counter and mention flag.
    pub fn open_channel(&mut self, channel_id: &ChannelId) -> Result<Vec<TimelineItem>> {
        let channel = self
            .db
            .channels()
            .find_by_id(channel_id)?
            .ok_or_else(|| Error::NotFound(format!("channel {channel_id}")))?;
        invariants::assert_channel_invariants(&channel);

        self.focus(&channel.id);
        self.refresh_timeline(&channel.id)
    }

    /// Open the direct conversation with a peer, materializing the backing
    /// channel on first use.
    pub fn open_dm(&mut self, peer_id: Uuid) -> Result<(Channel, Vec<TimelineItem>)> {
        let channel = ensure_direct_channel(&self.db, self.current_user.id, peer_id)?;
        self.focus(&channel.id);
        let timeline = self.refresh_timeline(&channel.id)?;
        Ok((channel, timeline))
    }

    /// Send the compose draft to the focused channel.
    ///
    /// The message is visible immediately as a pending timeline entry; the
    /// durable write follows. On failure the pending entry is withdrawn and
    /// the draft is restored so the user can retry. Retries are never
    /// automatic: the server treats every send as new.
    pub fn send_draft(&mut self, parent_id: Option<Uuid>) -> Result<MessageView> {
        let channel_id = self
            .focused
            .clone()
            .ok_or_else(|| Error::Validation("no channel in focus".to_string()))?;

        let content = self.draft.trim().to_string();
        if content.is_empty() {
            return Err(Error::Validation("message content is required".to_string()));
        }

        let original = std::mem::take(&mut self.draft);

        let message = match parent_id {
            Some(parent) => Message::reply(channel_id.clone(), self.current_user.id, parent, content),
            None => Message::new(channel_id.clone(), self.current_user.id, content),
        };
        invariants::assert_message_invariants(&message);

        let view = MessageView::from_message(&message, Some(self.current_user.name.clone()));
        self.outbox.push(view.clone());

        match self.write_durable(&message) {
            Ok(()) => {
                // Write-through: the next read must include the new row
                self.cache.invalidate(&channel_id);
                self.unread.mark_message_read(message.id);
                debug!(message_id = %message.id, channel_id = %channel_id, "Message sent");
                Ok(view)
            }
            Err(e) => {
                self.outbox.remove(message.id);
                self.draft = original;
                Err(e)
            }
        }
    }

    fn write_durable(&self, message: &Message) -> Result<()> {
        // A first DM send may target a channel that does not exist yet
        if let Some((a, b)) = message.channel_id.direct_peers() {
            ensure_direct_channel(&self.db, a, b)?;
        }
        self.db.messages().create(message)
    }

    /// Thread replies under a parent message, oldest first, pending
    /// replies included
    pub fn thread(&self, parent_id: Uuid) -> Result<Vec<TimelineItem>> {
        let replies = self.db.messages().list_thread(parent_id)?;
        let pending = self.outbox.pending_for_parent(parent_id);
        Ok(merge_timeline(replies, pending))
    }

    /// Account for a message that arrived from another participant.
    ///
    /// Thread replies and the viewer's own messages never count. A message
    /// in the focused channel is read on arrival; anywhere else it bumps the
    /// channel counter (with mention detection against the viewer's name) or,
    /// for direct conversations, the sending peer's counter.
    pub fn note_incoming(&mut self, view: &MessageView) {
        if view.parent_id.is_some() || view.author_id == self.current_user.id {
            return;
        }

        if self.focused.as_ref() == Some(&view.channel_id) {
            self.unread.mark_message_read(view.id);
            return;
        }

        if view.channel_id.is_direct() {
            self.unread.increment_dm_unread(view.author_id);
        } else {
            let mentioned = contains_mention(&view.content, &self.current_user.name);
            self.unread.increment_channel_unread(&view.channel_id, mentioned);
        }
    }

    fn focus(&mut self, channel_id: &ChannelId) {
        self.focused = Some(channel_id.clone());
        self.unread.mark_channel_read(channel_id);
        if let Some(peer) = channel_id.direct_peer_of(self.current_user.id) {
            self.unread.mark_dm_read(peer);
        }
    }

    fn refresh_timeline(&mut self, channel_id: &ChannelId) -> Result<Vec<TimelineItem>> {
        let db = &self.db;
        let page = match self.cache.get_or_load(channel_id, || {
            db.messages().list_for_channel(channel_id, DEFAULT_PAGE_SIZE)
        }) {
            Ok(page) => page,
            Err(e) => {
                // Degraded read: history is not safety-critical
                warn!(channel_id = %channel_id, error = %e, "Timeline refresh failed, serving cached snapshot");
                self.cache
                    .peek(channel_id)
                    .map(|s| s.to_vec())
                    .unwrap_or_default()
            }
        };

        self.outbox.reconcile(&page);
        for message in &page {
            self.unread.mark_message_read(message.id);
        }

        let pending = self
            .outbox
            .pending_for(channel_id)
            .into_iter()
            .filter(|m| m.parent_id.is_none())
            .collect();
        Ok(merge_timeline(page, pending))
    }
}

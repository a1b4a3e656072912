//! Optimistic send outbox
//!
//! A message the user just sent shows up in the timeline immediately, before
//! the durable write settles. The client generates the message's durable id
//! up front, so the id itself is the correlation token: once an authoritative
//! fetch contains it, the pending copy is dropped and the confirmed row takes
//! its place. No content or timestamp matching is involved.

use banter_core::{ChannelId, MessageView};
use uuid::Uuid;

/// Pending (not yet confirmed) sends, oldest first
#[derive(Default)]
pub struct Outbox {
    pending: Vec<MessageView>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly composed message as pending
    pub fn push(&mut self, view: MessageView) {
        self.pending.push(view);
    }

    /// Remove a pending entry, returning it. Used when the durable write
    /// fails and the composed content must go back to the input field.
    pub fn remove(&mut self, id: Uuid) -> Option<MessageView> {
        let index = self.pending.iter().position(|m| m.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Drop every pending entry confirmed by an authoritative page
    pub fn reconcile(&mut self, authoritative: &[MessageView]) {
        self.pending
            .retain(|p| !authoritative.iter().any(|m| m.id == p.id));
    }

    pub fn is_pending(&self, id: Uuid) -> bool {
        self.pending.iter().any(|m| m.id == id)
    }

    /// Pending entries addressed to one channel
    pub fn pending_for(&self, channel_id: &ChannelId) -> Vec<MessageView> {
        self.pending
            .iter()
            .filter(|m| &m.channel_id == channel_id)
            .cloned()
            .collect()
    }

    /// Pending thread replies under one parent message
    pub fn pending_for_parent(&self, parent_id: Uuid) -> Vec<MessageView> {
        self.pending
            .iter()
            .filter(|m| m.parent_id == Some(parent_id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One rendered timeline row
#[derive(Debug, Clone)]
pub struct TimelineItem {
    pub view: MessageView,
    pub is_pending: bool,
}

/// Merge an authoritative page (newest first, as storage returns it) with
/// pending sends into the render order: ascending by creation time. Pending
/// entries already present in the page are skipped, so a message never shows
/// twice while the cache catches up.
pub fn merge_timeline(authoritative: Vec<MessageView>, pending: Vec<MessageView>) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = authoritative
        .into_iter()
        .map(|view| TimelineItem {
            view,
            is_pending: false,
        })
        .collect();

    for view in pending {
        if items.iter().any(|item| item.view.id == view.id) {
            continue;
        }
        items.push(TimelineItem {
            view,
            is_pending: true,
        });
    }

    // Ties are broken by id only to keep the order deterministic
    items.sort_by(|a, b| {
        a.view
            .created_at
            .cmp(&b.view.created_at)
            .then_with(|| a.view.id.cmp(&b.view.id))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn view_at(content: &str, channel_id: &ChannelId, seconds_ago: i64) -> MessageView {
        MessageView {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author_id: Uuid::new_v4(),
            author_name: Some("Alice".to_string()),
            channel_id: channel_id.clone(),
            parent_id: None,
            is_edited: false,
            created_at: Utc::now() - Duration::seconds(seconds_ago),
        }
    }

    #[test]
    fn test_pending_appears_in_correct_position() {
        let channel = ChannelId::random();
        let old = view_at("old", &channel, 60);
        let new = view_at("new", &channel, 0);
        let pending = view_at("between", &channel, 30);

        // Storage page is newest first
        let items = merge_timeline(vec![new, old], vec![pending]);

        let contents: Vec<&str> = items.iter().map(|i| i.view.content.as_str()).collect();
        assert_eq!(contents, vec!["old", "between", "new"]);
        assert!(items[1].is_pending);
        assert!(!items[0].is_pending);
    }

    #[test]
    fn test_confirmed_entry_is_not_duplicated() {
        let channel = ChannelId::random();
        let confirmed = view_at("hello", &channel, 0);
        let pending = confirmed.clone();

        let items = merge_timeline(vec![confirmed], vec![pending]);
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_pending);
    }

    #[test]
    fn test_reconcile_drops_confirmed() {
        let channel = ChannelId::random();
        let mut outbox = Outbox::new();

        let confirmed = view_at("confirmed", &channel, 1);
        let inflight = view_at("inflight", &channel, 0);
        outbox.push(confirmed.clone());
        outbox.push(inflight.clone());

        outbox.reconcile(&[confirmed]);

        assert_eq!(outbox.len(), 1);
        assert!(outbox.is_pending(inflight.id));
    }

    #[test]
    fn test_remove_returns_entry_for_draft_restore() {
        let channel = ChannelId::random();
        let mut outbox = Outbox::new();
        let entry = view_at("failed send", &channel, 0);
        outbox.push(entry.clone());

        let removed = outbox.remove(entry.id).unwrap();
        assert_eq!(removed.content, "failed send");
        assert!(outbox.is_empty());
        assert!(outbox.remove(entry.id).is_none());
    }

    #[test]
    fn test_pending_for_filters_by_channel() {
        let here = ChannelId::random();
        let elsewhere = ChannelId::random();
        let mut outbox = Outbox::new();
        outbox.push(view_at("here", &here, 0));
        outbox.push(view_at("elsewhere", &elsewhere, 0));

        let pending = outbox.pending_for(&here);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].content, "here");
    }
}

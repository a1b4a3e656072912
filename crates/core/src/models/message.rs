//! Message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChannelId;

/// A message in a channel.
///
/// `parent_id` is None for top-level messages; thread replies carry the id of
/// the message they answer and are excluded from the main channel listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub channel_id: ChannelId,
    pub parent_id: Option<Uuid>,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// A new top-level channel message
    pub fn new(channel_id: ChannelId, author_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content,
            author_id,
            channel_id,
            parent_id: None,
            is_edited: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A thread reply to an existing message
    pub fn reply(channel_id: ChannelId, author_id: Uuid, parent_id: Uuid, content: String) -> Self {
        let mut message = Self::new(channel_id, author_id, content);
        message.parent_id = Some(parent_id);
        message
    }
}

/// A message joined with its author's name for display.
///
/// The join is a LEFT JOIN, so `author_name` stays None rather than dropping
/// the row if the user lookup comes up empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub channel_id: ChannelId,
    pub parent_id: Option<Uuid>,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    /// View of a message the client just composed locally
    pub fn from_message(message: &Message, author_name: Option<String>) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            author_id: message.author_id,
            author_name,
            channel_id: message.channel_id.clone(),
            parent_id: message.parent_id,
            is_edited: message.is_edited,
            created_at: message.created_at,
        }
    }

    pub fn format_timestamp(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

/// A search hit carrying the channel the message lives in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHit {
    pub view: MessageView,
    pub channel_name: Option<String>,
}

//! Message storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_channel_id, parse_datetime, parse_uuid, parse_uuid_opt, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{ChannelId, Message, MessageHit, MessageView};

/// Page size for the main channel listing
pub const DEFAULT_PAGE_SIZE: u32 = 50;

pub struct MessageStore<'a> {
    conn: &'a Connection,
}

impl<'a> MessageStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
        Ok(Message {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            content: row.get(1)?,
            author_id: parse_uuid(&row.get::<_, String>(2)?)?,
            channel_id: parse_channel_id(row.get::<_, String>(3)?),
            parent_id: parse_uuid_opt(row.get::<_, Option<String>>(4)?)?,
            is_edited: row.get::<_, i32>(5)? != 0,
            created_at: parse_datetime(&row.get::<_, String>(6)?)?,
            updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
        })
    }

    fn map_view(row: &Row<'_>) -> rusqlite::Result<MessageView> {
        Ok(MessageView {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            content: row.get(1)?,
            author_id: parse_uuid(&row.get::<_, String>(2)?)?,
            author_name: row.get(3)?,
            channel_id: parse_channel_id(row.get::<_, String>(4)?),
            parent_id: parse_uuid_opt(row.get::<_, Option<String>>(5)?)?,
            is_edited: row.get::<_, i32>(6)? != 0,
            created_at: parse_datetime(&row.get::<_, String>(7)?)?,
        })
    }

    const VIEW_COLUMNS: &'static str = "m.id, m.content, m.author_id, u.name, m.channel_id,
             m.parent_id, m.is_edited, m.created_at";

    /// Create a new message
    #[instrument(skip(self, message), fields(message_id = %message.id, channel_id = %message.channel_id))]
    pub fn create(&self, message: &Message) -> Result<()> {
        if message.content.trim().is_empty() {
            return Err(Error::Validation("message content is required".to_string()));
        }
        self.conn.execute(
            "INSERT INTO messages (id, content, author_id, channel_id, parent_id, is_edited, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                message.id.to_string(),
                message.content,
                message.author_id.to_string(),
                message.channel_id.as_str(),
                message.parent_id.map(|p| p.to_string()),
                message.is_edited as i32,
                message.created_at.to_rfc3339(),
                message.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get message by ID
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, author_id, channel_id, parent_id, is_edited, created_at, updated_at
             FROM messages WHERE id = ?1",
        )?;

        let message = stmt
            .query_row(params![id.to_string()], Self::map_message)
            .optional()?;

        Ok(message)
    }

    /// The main channel listing: top-level messages (thread replies excluded),
    /// newest first, bounded to one page.
    #[instrument(skip(self))]
    pub fn list_for_channel(&self, channel_id: &ChannelId, limit: u32) -> Result<Vec<MessageView>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM messages m
             LEFT JOIN users u ON u.id = m.author_id
             WHERE m.channel_id = ?1 AND m.parent_id IS NULL
             ORDER BY m.created_at DESC
             LIMIT ?2",
            Self::VIEW_COLUMNS
        ))?;

        let messages = stmt
            .query_map(params![channel_id.as_str(), limit], Self::map_view)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Thread replies for a parent message, oldest first
    #[instrument(skip(self))]
    pub fn list_thread(&self, parent_id: Uuid) -> Result<Vec<MessageView>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM messages m
             LEFT JOIN users u ON u.id = m.author_id
             WHERE m.parent_id = ?1
             ORDER BY m.created_at",
            Self::VIEW_COLUMNS
        ))?;

        let messages = stmt
            .query_map(params![parent_id.to_string()], Self::map_view)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Update message content, marking it edited
    #[instrument(skip(self, new_content))]
    pub fn update_content(&self, message_id: Uuid, new_content: &str) -> Result<()> {
        if new_content.trim().is_empty() {
            return Err(Error::Validation("message content is required".to_string()));
        }
        let updated = self.conn.execute(
            "UPDATE messages SET content = ?1, is_edited = 1, updated_at = ?2 WHERE id = ?3",
            params![
                new_content.trim(),
                Utc::now().to_rfc3339(),
                message_id.to_string()
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("message {message_id}")));
        }
        Ok(())
    }

    /// Delete a message (replies cascade away at the schema level)
    #[instrument(skip(self))]
    pub fn delete(&self, message_id: Uuid) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM messages WHERE id = ?1",
            params![message_id.to_string()],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("message {message_id}")));
        }
        Ok(())
    }

    /// Search messages within one channel, newest first
    #[instrument(skip(self))]
    pub fn search_in_channel(&self, channel_id: &ChannelId, query: &str) -> Result<Vec<MessageView>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM messages m
             LEFT JOIN users u ON u.id = m.author_id
             WHERE m.channel_id = ?1 AND m.content LIKE ?2
             ORDER BY m.created_at DESC",
            Self::VIEW_COLUMNS
        ))?;

        let messages = stmt
            .query_map(params![channel_id.as_str(), pattern], Self::map_view)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Search messages across all channels, newest first, with channel names
    #[instrument(skip(self))]
    pub fn search_all(&self, query: &str) -> Result<Vec<MessageHit>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, c.name FROM messages m
             LEFT JOIN users u ON u.id = m.author_id
             LEFT JOIN channels c ON c.id = m.channel_id
             WHERE m.content LIKE ?1
             ORDER BY m.created_at DESC",
            Self::VIEW_COLUMNS
        ))?;

        let hits = stmt
            .query_map(params![pattern], |row| {
                Ok(MessageHit {
                    view: Self::map_view(row)?,
                    channel_name: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    /// Count top-level messages in a channel
    pub fn count_for_channel(&self, channel_id: &ChannelId) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE channel_id = ?1 AND parent_id IS NULL",
            params![channel_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Count all messages
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

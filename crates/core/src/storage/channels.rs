//! Channel storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{parse_channel_id, parse_datetime, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{Channel, ChannelId};

pub struct ChannelStore<'a> {
    conn: &'a Connection,
}

impl<'a> ChannelStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_channel(row: &Row<'_>) -> rusqlite::Result<Channel> {
        Ok(Channel {
            id: parse_channel_id(row.get::<_, String>(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: parse_datetime(&row.get::<_, String>(3)?)?,
            updated_at: parse_datetime(&row.get::<_, String>(4)?)?,
        })
    }

    /// Create a new channel
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub fn create(&self, channel: &Channel) -> Result<()> {
        if channel.name.trim().is_empty() {
            return Err(Error::Validation("channel name is required".to_string()));
        }
        self.conn.execute(
            "INSERT INTO channels (id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                channel.id.as_str(),
                channel.name,
                channel.description,
                channel.created_at.to_rfc3339(),
                channel.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Insert a channel only if its id is not already present.
    ///
    /// Returns true when a row was inserted. This is the atomic get-or-create
    /// primitive the direct-message materializer relies on: two concurrent
    /// callers racing on the same canonical id cannot both insert, and losing
    /// the race is not an error.
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub fn insert_if_absent(&self, channel: &Channel) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO channels (id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO NOTHING",
            params![
                channel.id.as_str(),
                channel.name,
                channel.description,
                channel.created_at.to_rfc3339(),
                channel.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Find channel by ID
    pub fn find_by_id(&self, id: &ChannelId) -> Result<Option<Channel>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at, updated_at
             FROM channels WHERE id = ?1",
        )?;

        let channel = stmt
            .query_row(params![id.as_str()], Self::map_channel)
            .optional()?;

        Ok(channel)
    }

    /// List public channels ordered by name (direct channels are private
    /// to their participants and stay out of the sidebar list)
    pub fn list(&self) -> Result<Vec<Channel>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at, updated_at
             FROM channels WHERE id NOT LIKE 'dm\\_%' ESCAPE '\\'
             ORDER BY name",
        )?;

        let channels = stmt
            .query_map([], Self::map_channel)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(channels)
    }

    /// Update channel name and description
    #[instrument(skip(self))]
    pub fn update(&self, id: &ChannelId, name: &str, description: Option<&str>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Validation("channel name cannot be empty".to_string()));
        }
        let updated = self.conn.execute(
            "UPDATE channels SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                name.trim(),
                description.map(str::trim),
                chrono::Utc::now().to_rfc3339(),
                id.as_str(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("channel {id}")));
        }
        Ok(())
    }

    /// Delete a channel (messages cascade away at the schema level)
    #[instrument(skip(self))]
    pub fn delete(&self, id: &ChannelId) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM channels WHERE id = ?1",
            params![id.as_str()],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("channel {id}")));
        }
        Ok(())
    }

    /// Search public channels by name or description
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Result<Vec<Channel>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at, updated_at
             FROM channels
             WHERE (name LIKE ?1 OR description LIKE ?1)
               AND id NOT LIKE 'dm\\_%' ESCAPE '\\'
             ORDER BY name",
        )?;

        let channels = stmt
            .query_map(params![pattern], Self::map_channel)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(channels)
    }

    /// Count all channels, direct ones included
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM channels", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::storage::Database;

    #[test]
    fn test_create_and_find() {
        let db = Database::open_in_memory().unwrap();
        let channel = Channel::new("general".to_string(), Some("Town square".to_string()));
        db.channels().create(&channel).unwrap();

        let found = db.channels().find_by_id(&channel.id).unwrap().unwrap();
        assert_eq!(found.name, "general");
        assert_eq!(found.description.as_deref(), Some("Town square"));
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let db = Database::open_in_memory().unwrap();
        let channel = Channel::new("   ".to_string(), None);
        let err = db.channels().create(&channel).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_insert_if_absent_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let alice = User::new("Alice".to_string(), "alice@example.com".to_string(), None);
        let bob = User::new("Bob".to_string(), "bob@example.com".to_string(), None);
        let channel = Channel::direct(&alice, &bob);

        assert!(db.channels().insert_if_absent(&channel).unwrap());
        assert!(!db.channels().insert_if_absent(&channel).unwrap());
        assert_eq!(db.channels().count().unwrap(), 1);
    }

    #[test]
    fn test_list_excludes_direct_channels() {
        let db = Database::open_in_memory().unwrap();
        let alice = User::new("Alice".to_string(), "alice@example.com".to_string(), None);
        let bob = User::new("Bob".to_string(), "bob@example.com".to_string(), None);

        db.channels()
            .create(&Channel::new("general".to_string(), None))
            .unwrap();
        db.channels().create(&Channel::direct(&alice, &bob)).unwrap();

        let listed = db.channels().list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "general");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .channels()
            .update(&ChannelId::random(), "renamed", None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_search_by_description() {
        let db = Database::open_in_memory().unwrap();
        db.channels()
            .create(&Channel::new(
                "random".to_string(),
                Some("Watercooler chatter".to_string()),
            ))
            .unwrap();

        let hits = db.channels().search("watercooler").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "random");
    }
}

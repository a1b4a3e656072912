//! SQLite storage layer for Banter

mod channels;
mod messages;
mod migrations;
mod parse;
mod traits;
mod users;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Channel, ChannelId, Message, MessageHit, MessageView, User};

pub use channels::ChannelStore;
pub use messages::{MessageStore, DEFAULT_PAGE_SIZE};
pub use traits::{ChannelRepository, MessageRepository, Storage, UserRepository};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get channel store
    pub fn channels(&self) -> ChannelStore<'_> {
        ChannelStore::new(&self.conn)
    }

    /// Get message store
    pub fn messages(&self) -> MessageStore<'_> {
        MessageStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.users().list()
    }

    fn list_peers(&self, user_id: Uuid) -> Result<Vec<User>> {
        self.users().list_peers(user_id)
    }

    fn search_users(&self, query: &str, exclude: Option<Uuid>) -> Result<Vec<User>> {
        self.users().search(query, exclude)
    }

    fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.users().delete(user_id)
    }
}

impl ChannelRepository for Database {
    fn create_channel(&self, channel: &Channel) -> Result<()> {
        self.channels().create(channel)
    }

    fn insert_channel_if_absent(&self, channel: &Channel) -> Result<bool> {
        self.channels().insert_if_absent(channel)
    }

    fn find_channel_by_id(&self, id: &ChannelId) -> Result<Option<Channel>> {
        self.channels().find_by_id(id)
    }

    fn list_channels(&self) -> Result<Vec<Channel>> {
        self.channels().list()
    }

    fn update_channel(&self, id: &ChannelId, name: &str, description: Option<&str>) -> Result<()> {
        self.channels().update(id, name, description)
    }

    fn delete_channel(&self, id: &ChannelId) -> Result<()> {
        self.channels().delete(id)
    }

    fn search_channels(&self, query: &str) -> Result<Vec<Channel>> {
        self.channels().search(query)
    }
}

impl MessageRepository for Database {
    fn create_message(&self, message: &Message) -> Result<()> {
        self.messages().create(message)
    }

    fn find_message_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        self.messages().find_by_id(id)
    }

    fn list_messages(&self, channel_id: &ChannelId, limit: u32) -> Result<Vec<MessageView>> {
        self.messages().list_for_channel(channel_id, limit)
    }

    fn list_thread(&self, parent_id: Uuid) -> Result<Vec<MessageView>> {
        self.messages().list_thread(parent_id)
    }

    fn update_message_content(&self, message_id: Uuid, new_content: &str) -> Result<()> {
        self.messages().update_content(message_id, new_content)
    }

    fn delete_message(&self, message_id: Uuid) -> Result<()> {
        self.messages().delete(message_id)
    }

    fn search_messages_in_channel(
        &self,
        channel_id: &ChannelId,
        query: &str,
    ) -> Result<Vec<MessageView>> {
        self.messages().search_in_channel(channel_id, query)
    }

    fn search_messages(&self, query: &str) -> Result<Vec<MessageHit>> {
        self.messages().search_all(query)
    }

    fn count_messages(&self, channel_id: &ChannelId) -> Result<u64> {
        self.messages().count_for_channel(channel_id)
    }
}

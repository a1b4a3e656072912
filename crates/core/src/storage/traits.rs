//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future network backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Channel, ChannelId, Message, MessageHit, MessageView, User};

/// User repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// List all users ordered by name
    fn list_users(&self) -> Result<Vec<User>>;

    /// List direct-message peers for a user (everyone but themselves)
    fn list_peers(&self, user_id: Uuid) -> Result<Vec<User>>;

    /// Search users by name or email
    fn search_users(&self, query: &str, exclude: Option<Uuid>) -> Result<Vec<User>>;

    /// Delete a user
    fn delete_user(&self, user_id: Uuid) -> Result<()>;
}

/// Channel repository operations
pub trait ChannelRepository {
    /// Create a new channel
    fn create_channel(&self, channel: &Channel) -> Result<()>;

    /// Insert a channel only if absent; returns true when inserted
    fn insert_channel_if_absent(&self, channel: &Channel) -> Result<bool>;

    /// Find channel by ID
    fn find_channel_by_id(&self, id: &ChannelId) -> Result<Option<Channel>>;

    /// List public channels ordered by name
    fn list_channels(&self) -> Result<Vec<Channel>>;

    /// Update channel name and description
    fn update_channel(&self, id: &ChannelId, name: &str, description: Option<&str>) -> Result<()>;

    /// Delete a channel
    fn delete_channel(&self, id: &ChannelId) -> Result<()>;

    /// Search public channels by name or description
    fn search_channels(&self, query: &str) -> Result<Vec<Channel>>;
}

/// Message repository operations
pub trait MessageRepository {
    /// Create a new message
    fn create_message(&self, message: &Message) -> Result<()>;

    /// Find message by ID
    fn find_message_by_id(&self, id: Uuid) -> Result<Option<Message>>;

    /// List top-level messages for a channel, newest first
    fn list_messages(&self, channel_id: &ChannelId, limit: u32) -> Result<Vec<MessageView>>;

    /// List thread replies, oldest first
    fn list_thread(&self, parent_id: Uuid) -> Result<Vec<MessageView>>;

    /// Update message content
    fn update_message_content(&self, message_id: Uuid, new_content: &str) -> Result<()>;

    /// Delete a message
    fn delete_message(&self, message_id: Uuid) -> Result<()>;

    /// Search messages within one channel
    fn search_messages_in_channel(
        &self,
        channel_id: &ChannelId,
        query: &str,
    ) -> Result<Vec<MessageView>>;

    /// Search messages across all channels
    fn search_messages(&self, query: &str) -> Result<Vec<MessageHit>>;

    /// Count top-level messages in a channel
    fn count_messages(&self, channel_id: &ChannelId) -> Result<u64>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage: UserRepository + ChannelRepository + MessageRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: UserRepository + ChannelRepository + MessageRepository {}

//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Channel, ChannelId, Message};

/// Validate that a channel's state is internally consistent
pub fn assert_channel_invariants(channel: &Channel) {
    debug_assert!(
        !channel.name.trim().is_empty(),
        "Channel {} has empty name",
        channel.id
    );

    // A direct channel's id must decode back to a participant pair
    if channel.id.is_direct() {
        debug_assert!(
            channel.id.direct_peers().is_some(),
            "Channel {} looks direct but its id does not parse",
            channel.id
        );
    }
}

/// Validate that a message is internally consistent
pub fn assert_message_invariants(message: &Message) {
    debug_assert!(
        !message.content.trim().is_empty(),
        "Message {} has empty content",
        message.id
    );

    debug_assert!(
        message.author_id != Uuid::nil(),
        "Message {} has nil author_id",
        message.id
    );

    debug_assert!(
        message.parent_id != Some(message.id),
        "Message {} is its own thread parent",
        message.id
    );

    debug_assert!(
        message.created_at <= message.updated_at,
        "Message {} was updated before it was created",
        message.id
    );
}

/// Validate that a canonical direct identifier matches its participants
pub fn assert_direct_id_valid(id: &ChannelId, a: Uuid, b: Uuid) {
    debug_assert_eq!(
        *id,
        ChannelId::direct(a, b),
        "Direct channel id {} does not match participants {} / {}",
        id,
        a,
        b
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn make_users() -> (User, User) {
        (
            User::new("Alice".to_string(), "alice@example.com".to_string(), None),
            User::new("Bob".to_string(), "bob@example.com".to_string(), None),
        )
    }

    #[test]
    fn test_valid_public_channel() {
        let channel = Channel::new("general".to_string(), None);
        assert_channel_invariants(&channel);
    }

    #[test]
    fn test_valid_direct_channel() {
        let (alice, bob) = make_users();
        let channel = Channel::direct(&alice, &bob);
        assert_channel_invariants(&channel);
        assert_direct_id_valid(&channel.id, alice.id, bob.id);
    }

    #[test]
    fn test_valid_message() {
        let (alice, _) = make_users();
        let channel = Channel::new("general".to_string(), None);
        let message = Message::new(channel.id, alice.id, "hello".to_string());
        assert_message_invariants(&message);
    }

    #[test]
    #[should_panic(expected = "empty name")]
    fn test_empty_channel_name_panics() {
        let mut channel = Channel::new("general".to_string(), None);
        channel.name = "  ".to_string();
        assert_channel_invariants(&channel);
    }
}

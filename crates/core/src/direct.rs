//! Direct-message channel materialization
//!
//! DM channels are created lazily, the first time either participant opens
//! the conversation or sends a message. The channel row is keyed by the
//! canonical identifier, so the primary key makes get-or-create atomic: when
//! two callers race on the same pair, exactly one insert wins and the other
//! simply re-reads the row.

use std::time::Duration;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Channel, ChannelId};
use crate::storage::Database;

/// Backoff before the single re-read retry
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Ensure the DM channel between two users exists and return it.
///
/// At most one write ever happens per unordered pair; every later call is a
/// plain read. Fails with `NotFound` when either participant does not exist,
/// and with `ChannelUnavailable` when the row can neither be found nor
/// created after the bounded retry.
#[instrument(skip(db))]
pub fn ensure_direct_channel(db: &Database, a: Uuid, b: Uuid) -> Result<Channel> {
    let id = ChannelId::direct(a, b);

    if let Some(channel) = db.channels().find_by_id(&id)? {
        return Ok(channel);
    }

    let user_a = db
        .users()
        .find_by_id(a)?
        .ok_or_else(|| Error::NotFound(format!("user {a}")))?;
    let user_b = db
        .users()
        .find_by_id(b)?
        .ok_or_else(|| Error::NotFound(format!("user {b}")))?;

    let channel = Channel::direct(&user_a, &user_b);
    debug_assert_eq!(channel.id, id);

    if db.channels().insert_if_absent(&channel)? {
        debug!(channel_id = %id, "Materialized direct channel");
        return Ok(channel);
    }

    // Lost the creation race; the winner's row must be there.
    if let Some(channel) = db.channels().find_by_id(&id)? {
        return Ok(channel);
    }

    // Insert reported a conflict but the row is not readable. One brief
    // retry, then treat it as a storage fault.
    warn!(channel_id = %id, "Direct channel missing after conflicting insert, retrying");
    std::thread::sleep(RETRY_BACKOFF);

    db.channels()
        .find_by_id(&id)?
        .ok_or_else(|| Error::ChannelUnavailable(format!("direct channel {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use tempfile::tempdir;

    fn create_user(db: &Database, name: &str) -> User {
        let user = User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            None,
        );
        db.users().create(&user).unwrap();
        user
    }

    #[test]
    fn test_materializes_once() {
        let db = Database::open_in_memory().unwrap();
        let alice = create_user(&db, "Alice");
        let bob = create_user(&db, "Bob");

        let first = ensure_direct_channel(&db, alice.id, bob.id).unwrap();
        let second = ensure_direct_channel(&db, bob.id, alice.id).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.id, ChannelId::direct(alice.id, bob.id));
        assert_eq!(db.channels().count().unwrap(), 1);
    }

    #[test]
    fn test_name_is_derived_from_participants() {
        let db = Database::open_in_memory().unwrap();
        let alice = create_user(&db, "Alice");
        let bob = create_user(&db, "Bob");

        let channel = ensure_direct_channel(&db, alice.id, bob.id).unwrap();
        assert!(channel.name.contains("Alice"));
        assert!(channel.name.contains("Bob"));
    }

    #[test]
    fn test_missing_participant_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let alice = create_user(&db, "Alice");

        let err = ensure_direct_channel(&db, alice.id, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(db.channels().count().unwrap(), 0);
    }

    #[test]
    fn test_survives_losing_the_creation_race() {
        let db = Database::open_in_memory().unwrap();
        let alice = create_user(&db, "Alice");
        let bob = create_user(&db, "Bob");

        // Another process won the race: the row already exists under the
        // canonical id with its own metadata.
        let existing = Channel::direct(&alice, &bob);
        db.channels().create(&existing).unwrap();

        let channel = ensure_direct_channel(&db, alice.id, bob.id).unwrap();
        assert_eq!(channel.id, existing.id);
        assert_eq!(db.channels().count().unwrap(), 1);
    }

    #[test]
    fn test_self_conversation_materializes() {
        let db = Database::open_in_memory().unwrap();
        let alice = create_user(&db, "Alice");

        let channel = ensure_direct_channel(&db, alice.id, alice.id).unwrap();
        assert_eq!(channel.id, ChannelId::direct(alice.id, alice.id));
        assert_eq!(db.channels().count().unwrap(), 1);
    }

    #[test]
    fn test_materialization_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("banter.db");

        let (alice_id, bob_id, channel_id) = {
            let db = Database::open(&path).unwrap();
            let alice = create_user(&db, "Alice");
            let bob = create_user(&db, "Bob");
            let channel = ensure_direct_channel(&db, alice.id, bob.id).unwrap();
            (alice.id, bob.id, channel.id)
        };

        let db = Database::open(&path).unwrap();
        let channel = ensure_direct_channel(&db, alice_id, bob_id).unwrap();
        assert_eq!(channel.id, channel_id);
        assert_eq!(db.channels().count().unwrap(), 1);
    }
}

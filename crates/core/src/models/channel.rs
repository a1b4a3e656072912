//! Channel model and the canonical direct-message identifier

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking a lazily materialized direct-message channel.
const DIRECT_PREFIX: &str = "dm_";

/// Channel identifier.
///
/// Public channels get a random UUID string. Direct-message channels use the
/// canonical form `dm_<low>_<high>` derived from the two participant ids in
/// ascending order, so the same pair always resolves to the same channel no
/// matter who opens the conversation. UUID text never contains an underscore,
/// which keeps the canonical form free of separator collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    /// Identifier for a new public channel
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Canonical identifier for the conversation between two users.
    ///
    /// Order-independent: `direct(a, b) == direct(b, a)`. UUID byte order
    /// matches lexicographic order of the lowercase hex form, so sorting the
    /// ids directly gives the canonical low/high pair. Identical ids are
    /// accepted and yield the degenerate `dm_<a>_<a>` self-conversation.
    pub fn direct(a: Uuid, b: Uuid) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{DIRECT_PREFIX}{low}_{high}"))
    }

    /// Whether this identifies a direct-message channel
    pub fn is_direct(&self) -> bool {
        self.0.starts_with(DIRECT_PREFIX)
    }

    /// Recover the participant pair from a canonical direct identifier
    pub fn direct_peers(&self) -> Option<(Uuid, Uuid)> {
        let rest = self.0.strip_prefix(DIRECT_PREFIX)?;
        let (low, high) = rest.split_once('_')?;
        Some((Uuid::parse_str(low).ok()?, Uuid::parse_str(high).ok()?))
    }

    /// Given one participant, the other side of a direct conversation.
    /// For a self-conversation both sides are the viewer.
    pub fn direct_peer_of(&self, user_id: Uuid) -> Option<Uuid> {
        let (low, high) = self.direct_peers()?;
        if user_id == low {
            Some(high)
        } else if user_id == high {
            Some(low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A conversation: either a named public channel or a direct-message channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    /// A new public channel with a random identifier
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ChannelId::random(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// A direct-message channel between two users, keyed by the canonical id
    pub fn direct(a: &super::User, b: &super::User) -> Self {
        let now = Utc::now();
        Self {
            id: ChannelId::direct(a.id, b.id),
            name: format!("{} & {}", a.name, b.name),
            description: Some(format!("Direct messages between {} and {}", a.name, b.name)),
            created_at: now,
            updated_at: now,
        }
    }
}

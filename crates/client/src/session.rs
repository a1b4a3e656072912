//! Client session state
//!
//! One `Session` per running client: the database handle, the simulated
//! current user, the channel in focus, and the client-side read model
//! (message cache, optimistic outbox, unread tracker, compose draft).

use std::path::PathBuf;

use banter_core::{Database, Error, Result, User};
use directories::ProjectDirs;

use crate::cache::MessageCache;
use crate::outbox::Outbox;
use crate::unread::{UnreadTracker, STATE_FILE};

pub struct Session {
    pub(crate) db: Database,
    pub(crate) current_user: User,
    pub(crate) focused: Option<banter_core::ChannelId>,
    pub(crate) cache: MessageCache,
    pub(crate) outbox: Outbox,
    pub(crate) unread: UnreadTracker,
    pub(crate) draft: String,
}

impl Session {
    /// Session over an existing database, without persistence for unread
    /// state. The workhorse constructor for tests and embedding.
    pub fn new(db: Database, current_user: User) -> Self {
        Self::with_unread(db, current_user, UnreadTracker::in_memory())
    }

    pub fn with_unread(db: Database, current_user: User, unread: UnreadTracker) -> Self {
        Self {
            db,
            current_user,
            focused: None,
            cache: MessageCache::new(),
            outbox: Outbox::new(),
            unread,
            draft: String::new(),
        }
    }

    /// Open the session against the platform data directory: database at
    /// `banter.db`, unread state beside it, demo data seeded on first run.
    /// There is no real authentication; the first user (by name) acts as
    /// the signed-in user.
    pub fn open_default() -> Result<Self> {
        let data_dir = Self::data_path()?;
        std::fs::create_dir_all(&data_dir)?;

        let db = Database::open(data_dir.join("banter.db"))?;
        crate::seed::seed_demo_data(&db)?;

        let current_user = db
            .users()
            .list()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("no users in database".to_string()))?;

        let unread = UnreadTracker::load(data_dir.join(STATE_FILE));
        Ok(Self::with_unread(db, current_user, unread))
    }

    fn data_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "banter", "banter").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;

        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    pub fn focused_channel(&self) -> Option<&banter_core::ChannelId> {
        self.focused.as_ref()
    }

    pub fn unread(&self) -> &UnreadTracker {
        &self.unread
    }

    /// What is currently typed in the compose field
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }
}

//! Banter Core Library
//!
//! Core models, canonical direct-message identifiers, mention detection,
//! and SQLite storage for the Banter chat platform.

pub mod direct;
pub mod error;
pub mod invariants;
pub mod mention;
pub mod models;
pub mod storage;

pub use direct::ensure_direct_channel;
pub use error::{Error, Result};
pub use mention::contains_mention;
pub use models::*;
pub use storage::{
    ChannelRepository, ChannelStore, Database, MessageRepository, MessageStore, Storage,
    UserRepository, UserStore, DEFAULT_PAGE_SIZE,
};

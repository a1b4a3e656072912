//! Banter client library
//!
//! The client-side read model for the Banter chat platform: a short-TTL
//! message cache, an optimistic send outbox with id-based reconciliation,
//! client-persisted unread/mention tracking, and the session tying them to
//! the storage layer in `banter-core`.

pub mod cache;
pub mod chat;
pub mod outbox;
pub mod seed;
pub mod session;
pub mod unread;

pub use cache::MessageCache;
pub use outbox::{merge_timeline, Outbox, TimelineItem};
pub use seed::seed_demo_data;
pub use session::Session;
pub use unread::UnreadTracker;

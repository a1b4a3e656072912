//! Data models for Banter

mod channel;
mod message;
mod user;

pub use channel::*;
pub use message::*;
pub use user::*;

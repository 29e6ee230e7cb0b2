//! # tf-services
//!
//! Forum operations over a [`ForumStore`]: accounts, posts, paid content,
//! moderation and the local chat mock.

pub mod auth;
pub mod chat;
pub mod memory;
pub mod moderation;
pub mod posts;
pub mod purchase;
pub mod session;
pub mod store;

pub use memory::MemoryKvStore;
pub use session::{logout, Session};
pub use store::ForumStore;

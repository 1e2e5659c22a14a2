//! Comment feed module
//!
//! A feed is the flat, creation-ordered snapshot of every comment on one
//! catch post. Realtime events are applied to it in place and the reply
//! forest is rebuilt only when the snapshot digest changes.
//!
//! # Example
//!
//! ```ignore
//! use ct_core::feed::{FeedEvent, FeedManager};
//!
//! let storage = FileSystemStorage::new("/tmp/catch-thread")?;
//! let manager = FeedManager::new(storage);
//!
//! let feed = manager.import(catch_id.clone(), records)?;
//! let mut feed = manager.apply(&catch_id, FeedEvent::Insert { record })?;
//! let roots = feed.thread();
//! ```

mod manager;
pub mod migration;
mod model;
mod persistence;

pub use manager::FeedManager;
pub use migration::{FeedFile, FeedMigrator, CURRENT_SCHEMA_VERSION};
pub use model::{CommentFeed, FeedEvent, FeedInfo};
pub use persistence::FeedStorage;

#[cfg(test)]
pub use persistence::memory::MemoryStorage;

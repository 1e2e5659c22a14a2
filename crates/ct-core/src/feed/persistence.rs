//! Feed storage trait and abstractions

use super::model::{CommentFeed, FeedInfo};
use crate::error::Result;
use crate::types::CatchId;

/// Trait for feed storage implementations
pub trait FeedStorage: Send + Sync {
    /// Save a feed
    fn save(&self, feed: &CommentFeed) -> Result<()>;

    /// Load a feed by catch id
    fn load(&self, id: &CatchId) -> Result<CommentFeed>;

    /// List all feeds (as info)
    fn list(&self) -> Result<Vec<FeedInfo>>;

    /// Delete a feed
    fn delete(&self, id: &CatchId) -> Result<()>;

    /// Check if a feed exists
    fn exists(&self, id: &CatchId) -> bool;

    /// Get the most recently updated feed
    fn latest(&self) -> Result<Option<CommentFeed>> {
        match self.list()?.into_iter().max_by_key(|f| f.updated_at) {
            Some(info) => self.load(&info.catch_id).map(Some),
            None => Ok(None),
        }
    }
}

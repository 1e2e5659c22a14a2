//! Feed manager for CRUD operations

use super::model::{CommentFeed, FeedEvent, FeedInfo};
use super::persistence::FeedStorage;
use crate::comment::CommentRecord;
use crate::error::{CatchThreadError, Result};
use crate::types::CatchId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Manager for feed lifecycle
pub struct FeedManager {
    storage: Arc<dyn FeedStorage>,
}

impl FeedManager {
    /// Create a new feed manager with the given storage
    pub fn new(storage: impl FeedStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Create a new feed manager with shared storage
    pub fn with_storage(storage: Arc<dyn FeedStorage>) -> Self {
        Self { storage }
    }

    /// Create an empty feed for a catch
    pub fn create(&self, catch_id: CatchId) -> Result<CommentFeed> {
        if self.storage.exists(&catch_id) {
            return Err(CatchThreadError::Validation(format!(
                "Feed for catch {} already exists",
                catch_id
            )));
        }
        let feed = CommentFeed::new(catch_id);
        self.storage.save(&feed)?;
        Ok(feed)
    }

    /// Store a fetched snapshot, replacing any existing records for the catch
    pub fn import(&self, catch_id: CatchId, records: Vec<CommentRecord>) -> Result<CommentFeed> {
        let feed = if self.storage.exists(&catch_id) {
            let mut feed = self.storage.load(&catch_id)?;
            feed.replace(records);
            feed
        } else {
            CommentFeed::from_records(catch_id, records)
        };

        let report = feed.audit();
        if !report.is_clean() {
            report.log();
        }

        info!(catch = %feed.catch_id, comments = feed.len(), "Imported feed snapshot");
        self.storage.save(&feed)?;
        Ok(feed)
    }

    /// Load a feed by catch id
    pub fn load(&self, catch_id: &CatchId) -> Result<CommentFeed> {
        self.storage.load(catch_id)
    }

    /// Load the most recently updated feed
    pub fn load_latest(&self) -> Result<Option<CommentFeed>> {
        self.storage.latest()
    }

    /// Save a feed
    pub fn save(&self, feed: &mut CommentFeed) -> Result<()> {
        feed.touch();
        self.storage.save(feed)
    }

    /// Apply a realtime event to a stored feed and persist the result
    pub fn apply(&self, catch_id: &CatchId, event: FeedEvent) -> Result<CommentFeed> {
        let mut feed = self.storage.load(catch_id)?;
        feed.apply(event)?;
        self.storage.save(&feed)?;
        debug!(catch = %catch_id, revision = feed.revision, "Feed event stored");
        Ok(feed)
    }

    /// Apply a batch of events, storing the feed only if every event applies
    pub fn apply_all(&self, catch_id: &CatchId, events: Vec<FeedEvent>) -> Result<CommentFeed> {
        let mut feed = self.storage.load(catch_id)?;
        let count = events.len();

        for (i, event) in events.into_iter().enumerate() {
            let label = event.to_string();
            feed.apply(event).map_err(|e| {
                e.with_context(format!("event {} of {} ({})", i + 1, count, label))
            })?;
        }

        self.storage.save(&feed)?;
        debug!(catch = %catch_id, events = count, revision = feed.revision, "Feed batch stored");
        Ok(feed)
    }

    /// List all feeds, most recently updated first
    pub fn list(&self) -> Result<Vec<FeedInfo>> {
        let mut feeds = self.storage.list()?;
        feeds.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(feeds)
    }

    /// Delete a feed
    pub fn delete(&self, catch_id: &CatchId) -> Result<()> {
        self.storage.delete(catch_id)
    }

    /// Clean up feeds not updated since the given date
    pub fn clean(&self, before: DateTime<Utc>) -> Result<usize> {
        let mut deleted = 0;

        for info in self.storage.list()? {
            if info.updated_at >= before {
                continue;
            }
            match self.storage.delete(&info.catch_id) {
                Ok(()) => deleted += 1,
                Err(e) => warn!(catch = %info.catch_id, "Failed to delete stale feed: {}", e),
            }
        }

        Ok(deleted)
    }

    /// Check if a feed exists
    pub fn exists(&self, catch_id: &CatchId) -> bool {
        self.storage.exists(catch_id)
    }

    /// Get feed count
    pub fn count(&self) -> Result<usize> {
        Ok(self.storage.list()?.len())
    }
}

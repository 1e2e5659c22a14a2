//! Comment feed data models

use crate::comment::{AuditReport, CommentRecord, ThreadAudit};
use crate::error::{CatchThreadError, Result};
use crate::thread::{build_thread, ThreadNode, ThreadStats};
use crate::types::{CatchId, CommentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A change pushed by the backing store's realtime channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A new comment was posted
    Insert { record: CommentRecord },
    /// An existing comment changed
    Update { record: CommentRecord },
    /// A comment was soft-deleted; it stays in the thread as a placeholder
    Delete { id: CommentId, at: DateTime<Utc> },
    /// A comment was purged; its replies lose their parent
    Remove { id: CommentId },
}

impl FeedEvent {
    /// Id of the comment the event touches
    pub fn comment_id(&self) -> &CommentId {
        match self {
            FeedEvent::Insert { record } | FeedEvent::Update { record } => &record.id,
            FeedEvent::Delete { id, .. } | FeedEvent::Remove { id } => id,
        }
    }
}

impl fmt::Display for FeedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            FeedEvent::Insert { .. } => "insert",
            FeedEvent::Update { .. } => "update",
            FeedEvent::Delete { .. } => "delete",
            FeedEvent::Remove { .. } => "remove",
        };
        write!(f, "{} {}", action, self.comment_id())
    }
}

/// The flat comment snapshot of one catch post
///
/// Records are kept in ascending `created_at` order; equal timestamps keep
/// arrival order. The reply forest is rebuilt from scratch whenever the
/// snapshot digest changes and reused otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentFeed {
    /// Catch post the comments belong to
    pub catch_id: CatchId,
    /// When the feed was first stored
    pub created_at: DateTime<Utc>,
    /// When the feed last changed
    pub updated_at: DateTime<Utc>,
    /// Number of events applied
    #[serde(default)]
    pub revision: u64,
    /// Flat records in creation order
    records: Vec<CommentRecord>,
    #[serde(skip)]
    cache: Option<ThreadCache>,
}

#[derive(Debug, Clone)]
struct ThreadCache {
    digest: String,
    roots: Vec<ThreadNode>,
}

impl CommentFeed {
    /// Create an empty feed
    pub fn new(catch_id: CatchId) -> Self {
        let now = Utc::now();
        Self {
            catch_id,
            created_at: now,
            updated_at: now,
            revision: 0,
            records: Vec::new(),
            cache: None,
        }
    }

    /// Create a feed from a fetched snapshot, ordering it by creation time
    pub fn from_records(catch_id: CatchId, mut records: Vec<CommentRecord>) -> Self {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut feed = Self::new(catch_id);
        feed.records = records;
        feed
    }

    /// The flat records in order
    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    /// Get a record by id
    pub fn get(&self, id: &CommentId) -> Option<&CommentRecord> {
        self.position(id).map(|i| &self.records[i])
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Update the timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Apply a realtime event to the snapshot
    pub fn apply(&mut self, event: FeedEvent) -> Result<()> {
        debug!(catch = %self.catch_id, event = %event, "Applying feed event");

        match event {
            FeedEvent::Insert { record } => {
                if self.position(&record.id).is_some() {
                    return Err(CatchThreadError::DuplicateComment(record.id.to_string()));
                }
                self.insert_ordered(record);
            }
            FeedEvent::Update { record } => {
                let index = self.require(&record.id)?;
                if self.records[index].created_at == record.created_at {
                    self.records[index] = record;
                } else {
                    self.records.remove(index);
                    self.insert_ordered(record);
                }
            }
            FeedEvent::Delete { id, at } => {
                let index = self.require(&id)?;
                self.records[index].soft_delete(at);
            }
            FeedEvent::Remove { id } => {
                self.require(&id)?;
                self.records.retain(|r| r.id != id);
            }
        }

        self.revision += 1;
        self.touch();
        Ok(())
    }

    /// Replace the whole snapshot, as after a refetch
    pub fn replace(&mut self, records: Vec<CommentRecord>) {
        let catch_id = self.catch_id.clone();
        let revision = self.revision;
        let created_at = self.created_at;
        *self = Self::from_records(catch_id, records);
        self.created_at = created_at;
        self.revision = revision + 1;
    }

    /// Content digest of the snapshot
    ///
    /// Covers every record field in order, extension values included.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for record in &self.records {
            digest_record(&mut hasher, record);
        }
        hasher.finalize().to_hex().to_string()
    }

    /// The reply forest for the current snapshot
    pub fn thread(&mut self) -> &[ThreadNode] {
        let digest = self.digest();
        let stale = self
            .cache
            .as_ref()
            .map(|cache| cache.digest != digest)
            .unwrap_or(true);

        if stale {
            debug!(catch = %self.catch_id, records = self.records.len(), "Rebuilding thread");
            self.cache = Some(ThreadCache {
                digest,
                roots: build_thread(&self.records),
            });
        }

        self.cache
            .as_ref()
            .map(|cache| cache.roots.as_slice())
            .unwrap_or_default()
    }

    /// Shape summary of the current forest
    pub fn stats(&mut self) -> ThreadStats {
        ThreadStats::from_forest(self.thread())
    }

    /// Audit the snapshot for bad links
    pub fn audit(&self) -> AuditReport {
        ThreadAudit::run(&self.records)
    }

    /// Get feed info (summary)
    pub fn info(&self) -> FeedInfo {
        FeedInfo {
            catch_id: self.catch_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            revision: self.revision,
            comment_count: self.records.len(),
            deleted_count: self.records.iter().filter(|r| r.is_deleted()).count(),
        }
    }

    /// Index of the live copy of `id`; with repeated ids the last one wins
    fn position(&self, id: &CommentId) -> Option<usize> {
        self.records.iter().rposition(|r| &r.id == id)
    }

    fn require(&self, id: &CommentId) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| CatchThreadError::CommentNotFound(id.to_string()))
    }

    fn insert_ordered(&mut self, record: CommentRecord) {
        let index = self
            .records
            .partition_point(|r| r.created_at <= record.created_at);
        self.records.insert(index, record);
    }
}

fn digest_str(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn digest_opt_str(hasher: &mut blake3::Hasher, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update(&[1]);
            digest_str(hasher, value);
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

fn digest_opt_time(hasher: &mut blake3::Hasher, value: Option<DateTime<Utc>>) {
    match value {
        Some(at) => {
            hasher.update(&[1]);
            hasher.update(&at.timestamp_micros().to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

fn digest_record(hasher: &mut blake3::Hasher, record: &CommentRecord) {
    digest_str(hasher, record.id.as_str());
    digest_opt_str(hasher, record.parent_id.as_ref().map(|p| p.as_str()));
    hasher.update(&record.created_at.timestamp_micros().to_le_bytes());
    digest_opt_str(hasher, record.catch_id.as_ref().map(|c| c.as_str()));
    digest_opt_str(hasher, record.author.as_deref());
    digest_str(hasher, &record.body);
    digest_opt_time(hasher, record.updated_at);
    digest_opt_time(hasher, record.deleted_at);

    // extension maps have no stable iteration order
    let extensions: BTreeMap<_, _> = record.extensions.data.iter().collect();
    hasher.update(&(extensions.len() as u64).to_le_bytes());
    for (key, value) in extensions {
        digest_str(hasher, key);
        digest_str(hasher, &value.to_string());
    }
}

/// Feed summary for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedInfo {
    /// Catch post id
    pub catch_id: CatchId,
    /// When the feed was first stored
    pub created_at: DateTime<Utc>,
    /// When the feed last changed
    pub updated_at: DateTime<Utc>,
    /// Number of events applied
    pub revision: u64,
    /// Number of comments
    pub comment_count: usize,
    /// Number of soft-deleted comments
    pub deleted_count: usize,
}

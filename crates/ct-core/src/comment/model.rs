//! Comment data models

use crate::types::{CatchId, CommentId, Extensions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flat comment record as delivered by the backing store
///
/// Only `id`, `parent_id` and `created_at` matter for threading; every other
/// field is payload and passes through untouched. Both snake_case and the
/// store's camelCase spellings are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Unique comment identifier
    pub id: CommentId,
    /// Comment this one replies to, `None` for top-level comments
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<CommentId>,
    /// When the comment was created
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Catch post the comment belongs to
    #[serde(default, alias = "catchId", skip_serializing_if = "Option::is_none")]
    pub catch_id: Option<CatchId>,
    /// Author handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Comment text
    #[serde(default)]
    pub body: String,
    /// When the text was last edited
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete marker set by moderation or the author
    #[serde(default, alias = "deletedAt", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Fields the model does not know about
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl CommentRecord {
    /// Create a bare record with an empty body
    pub fn new(
        id: impl Into<CommentId>,
        parent_id: Option<CommentId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id,
            created_at,
            catch_id: None,
            author: None,
            body: String::new(),
            updated_at: None,
            deleted_at: None,
            extensions: Extensions::new(),
        }
    }

    /// Whether the record declares no parent
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the comment has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Mark the comment as deleted at the given time
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    /// Text to show for the comment, hiding deleted bodies
    pub fn display_body(&self) -> &str {
        if self.is_deleted() {
            "[deleted]"
        } else {
            &self.body
        }
    }
}

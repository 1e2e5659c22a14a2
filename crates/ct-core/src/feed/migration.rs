//! Feed file format and schema migration

use super::model::CommentFeed;
use crate::error::{CatchThreadError, Result};
use crate::types::ProtocolVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// Feed file format with schema version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFile {
    /// Schema version for migration
    pub schema_version: String,
    /// The feed data
    pub feed: CommentFeed,
    /// Extra fields for forward compatibility
    #[serde(flatten, default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl FeedFile {
    /// Create a new feed file with current schema version
    pub fn new(feed: CommentFeed) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            feed,
            extra: HashMap::new(),
        }
    }

    /// Get the feed, consuming the file
    pub fn into_feed(self) -> CommentFeed {
        self.feed
    }

    /// Parse schema version
    pub fn parse_version(&self) -> Option<ProtocolVersion> {
        ProtocolVersion::parse(&self.schema_version)
    }
}

/// Feed schema migrator
pub struct FeedMigrator;

impl FeedMigrator {
    /// Migrate a feed file to the current schema version
    pub fn migrate(mut file: FeedFile) -> Result<FeedFile> {
        let version = file.parse_version().ok_or_else(|| {
            CatchThreadError::UnsupportedSchemaVersion(file.schema_version.clone())
        })?;

        let current = ProtocolVersion::V1_0;
        if !version.is_compatible(&current) {
            return Err(CatchThreadError::UnsupportedSchemaVersion(format!(
                "{} (expected {}.x)",
                file.schema_version, current.major
            )));
        }

        // minor versions only add optional fields
        file.schema_version = CURRENT_SCHEMA_VERSION.to_string();
        Ok(file)
    }

    /// Check if a file needs migration
    pub fn needs_migration(file: &FeedFile) -> bool {
        file.schema_version != CURRENT_SCHEMA_VERSION
    }
}

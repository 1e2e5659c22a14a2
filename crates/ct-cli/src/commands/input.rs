//! Snapshot and event file loading
//!
//! A snapshot is either a JSON array of comment records or a stored feed
//! file. `-` reads from stdin.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use ct_core::comment::CommentRecord;
use ct_core::feed::{FeedEvent, FeedFile, FeedMigrator};

/// Read a path, or stdin for `-`
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load the flat records of a snapshot
pub fn load_records(path: &Path) -> Result<Vec<CommentRecord>> {
    let content = read_source(path)?;
    parse_records(&content).with_context(|| format!("Invalid snapshot in {}", path.display()))
}

/// Parse a record array or a feed file
pub fn parse_records(content: &str) -> Result<Vec<CommentRecord>> {
    let value: Value = serde_json::from_str(content).context("Not valid JSON")?;

    match value {
        Value::Array(_) => {
            serde_json::from_value(value).context("Expected an array of comment records")
        }
        Value::Object(ref map) if map.contains_key("feed") => {
            let file: FeedFile = serde_json::from_value(value).context("Malformed feed file")?;
            let file = FeedMigrator::migrate(file)?;
            Ok(file.into_feed().records().to_vec())
        }
        _ => bail!("Expected an array of comment records or a feed file"),
    }
}

/// Load one event or an array of events
pub fn load_events(path: &Path) -> Result<Vec<FeedEvent>> {
    let content = read_source(path)?;
    parse_events(&content).with_context(|| format!("Invalid events in {}", path.display()))
}

/// Parse one event or an array of events
pub fn parse_events(content: &str) -> Result<Vec<FeedEvent>> {
    let value: Value = serde_json::from_str(content).context("Not valid JSON")?;

    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}
